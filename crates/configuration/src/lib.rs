use crate::error::ConfigError;
use rust_decimal::Decimal;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, RiskSettings, ScenarioSettings, ValuationSettings};

/// Loads the application configuration from the `config.toml` file.
///
/// The file is optional: every setting has a documented default, and a
/// missing file simply yields the default configuration. Values that are
/// present are validated before the configuration is handed out.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`.
        .add_source(config::File::with_name("config.toml").required(false))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.valuation.irr_max_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "irr_max_iterations must be at least 1".to_string(),
        ));
    }
    if config.valuation.irr_tolerance <= 0.0 {
        return Err(ConfigError::ValidationError(
            "irr_tolerance must be positive".to_string(),
        ));
    }
    if config.risk.dscr_critical_threshold > config.risk.dscr_warning_threshold {
        return Err(ConfigError::ValidationError(
            "dscr_critical_threshold cannot exceed dscr_warning_threshold".to_string(),
        ));
    }
    if config.scenarios.pessimistic_revenue_factor <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(
            "pessimistic_revenue_factor must be positive".to_string(),
        ));
    }
    Ok(())
}
