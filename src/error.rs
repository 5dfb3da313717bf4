use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the lasing-cavity simulation core.
///
/// Configuration problems are reported before any tick runs. Invariant violations are
/// programming defects: the driver stops at the first one instead of repairing state.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration option is out of its admissible range.
    #[error("invalid configuration: {param} = {value} ({reason})")]
    Config {
        param: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Invalid runtime argument (photon placement, diagnostic window, level code).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// World state drifted outside its invariants (atom count, level set).
    #[error("state invariant violated: {0}")]
    StateInvariant(String),
}

impl Error {
    pub(crate) fn config(param: &'static str, value: f64, reason: &'static str) -> Self {
        Error::Config {
            param,
            value,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_parameter_and_value() {
        let e = Error::config("dt", -0.5, "must be finite and > 0");
        let msg = format!("{e}");
        assert!(msg.contains("invalid configuration"));
        assert!(msg.contains("dt"));
        assert!(msg.contains("-0.5"));
    }

    #[test]
    fn invariant_error_display_is_informative() {
        let e = Error::StateInvariant("atom count 3 != 4".to_string());
        assert!(e.to_string().contains("atom count"));
    }

    #[test]
    fn result_type_alias_compiles() -> Result<()> {
        Ok(())
    }
}
