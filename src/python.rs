use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::core::entity::DIM;
use crate::core::{Direction, LaserConfig, Rates, Simulation};
use crate::error::Error;

fn py_err(e: Error) -> PyErr {
    match e {
        Error::StateInvariant(_) => PyRuntimeError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

fn points_to_array(points: impl ExactSizeIterator<Item = [f64; DIM]>) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((points.len(), DIM));
    for (i, p) in points.enumerate() {
        for k in 0..DIM {
            arr[[i, k]] = p[k];
        }
    }
    arr
}

/// Python-facing wrapper around the lasing-cavity `Simulation`.
///
/// Intended as the data source of a plotting/animation loop: call `step()` once
/// per frame and redraw from the getters.
#[pyclass]
pub struct LaserSim {
    sim: Simulation,
}

#[pymethods]
impl LaserSim {
    /// Build a cavity. Defaults reproduce the classroom setup.
    ///
    /// Errors: raises ValueError naming the offending option.
    #[new]
    #[pyo3(signature = (
        num_atoms=400,
        half_width=5.0,
        half_height=2.5,
        r_abs=1.0,
        y_abs=5.0,
        y_10=5.0,
        y_sp=10.0,
        y_nr=10.0,
        b_10=20.0,
        speed=10.0,
        dt=0.01,
        t_f=100.0,
        seed=None,
        initial_level=2,
        initial_photons=1,
        record_events=false,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        num_atoms: usize,
        half_width: f64,
        half_height: f64,
        r_abs: f64,
        y_abs: f64,
        y_10: f64,
        y_sp: f64,
        y_nr: f64,
        b_10: f64,
        speed: f64,
        dt: f64,
        t_f: f64,
        seed: Option<u64>,
        initial_level: u8,
        initial_photons: usize,
        record_events: bool,
    ) -> PyResult<Self> {
        let config = LaserConfig {
            num_atoms,
            half_width,
            half_height,
            capture_radius: r_abs,
            rates: Rates {
                y_abs,
                y_10,
                y_sp,
                y_nr,
                b_10,
            },
            speed,
            dt,
            total_time: t_f,
            seed,
            initial_level: initial_level
                .try_into()
                .map_err(|_| PyValueError::new_err("initial_level must be 0, 1 or 2"))?,
            initial_photons,
            record_events,
        };
        let sim = Simulation::new(config).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Inject a photon; `theta=None` draws a random direction. Returns its id.
    #[pyo3(signature = (x, y, theta=None))]
    fn add_photon(&mut self, x: f64, y: f64, theta: Option<f64>) -> PyResult<u64> {
        let direction = theta.map_or(Direction::Random, Direction::Fixed);
        self.sim.add_photon(x, y, direction).map_err(py_err)
    }

    /// Advance by one tick.
    fn step(&mut self) -> PyResult<()> {
        self.sim.step().map_err(py_err)
    }

    /// Run the remaining ticks of the configured run (releases the GIL).
    fn run(&mut self, py: Python<'_>) -> PyResult<()> {
        py.detach(|| self.sim.run(|_: &crate::core::Snapshot| {}))
            .map(drop)
            .map_err(py_err)
    }

    /// Advance to the specified absolute time (releases the GIL).
    fn advance_to(&mut self, py: Python<'_>, target_time: f64) -> PyResult<()> {
        py.detach(|| self.sim.advance_to(target_time))
            .map_err(py_err)
    }

    #[getter]
    fn time(&self) -> f64 {
        self.sim.time()
    }

    #[getter]
    fn tick(&self) -> u64 {
        self.sim.tick()
    }

    #[getter]
    fn total_ticks(&self) -> u64 {
        self.sim.total_ticks()
    }

    /// Photon positions as an (M, 2) float64 array.
    fn get_photon_positions<'py>(&self, py: Python<'py>) -> Py<PyArray2<f64>> {
        let arr = points_to_array(self.sim.photons().iter().map(|p| p.r));
        arr.into_pyarray(py).unbind()
    }

    /// Photon directions (radians) as an (M,) float64 array.
    fn get_photon_directions<'py>(&self, py: Python<'py>) -> Py<PyArray1<f64>> {
        let arr: Array1<f64> = self.sim.photons().iter().map(|p| p.theta).collect();
        arr.into_pyarray(py).unbind()
    }

    /// Atom positions as an (N, 2) float64 array.
    fn get_atom_positions<'py>(&self, py: Python<'py>) -> Py<PyArray2<f64>> {
        use crate::core::Positioned;
        let arr = points_to_array(self.sim.atoms().iter().map(|a| a.position()));
        arr.into_pyarray(py).unbind()
    }

    /// Atom levels as an (N,) uint8 array of codes 0, 1, 2.
    fn get_atom_levels<'py>(&self, py: Python<'py>) -> Py<PyArray1<u8>> {
        let arr: Array1<u8> = self.sim.atoms().iter().map(|a| a.level.code()).collect();
        arr.into_pyarray(py).unbind()
    }

    /// Population per level: (E0, E1, E2).
    fn get_populations(&self) -> (usize, usize, usize) {
        let p = self.sim.populations();
        (p.e0, p.e1, p.e2)
    }

    /// Return a (K, 3) array of [time, kind code, tick] events.
    ///
    /// Kind codes: 0 absorption, 1 spontaneous emission, 2 stimulated emission,
    /// 3 relaxation, 4 escape.
    /// Empty unless the simulation was built with `record_events=True`.
    ///
    /// Parameters
    /// - window: if provided, only events with time >= (current_time - window) are returned.
    #[pyo3(signature = (window=None))]
    fn get_event_history<'py>(
        &self,
        py: Python<'py>,
        window: Option<f64>,
    ) -> PyResult<Py<PyArray2<f64>>> {
        let events = self.sim.event_history(window).map_err(py_err)?;
        let mut arr = Array2::<f64>::zeros((events.len(), 3));
        for (i, e) in events.iter().enumerate() {
            arr[[i, 0]] = e.time_f64();
            arr[[i, 1]] = e.kind.code() as f64;
            arr[[i, 2]] = e.tick as f64;
        }
        Ok(arr.into_pyarray(py).unbind())
    }
}

/// The lasesim Python module entry point.
#[pymodule]
fn lasesim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<LaserSim>()?;
    Ok(())
}
