use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{DatabaseSettings, LoggingSettings, PortfolioSettings, QuerySettings};
pub use telemetry::init_tracing;

/// Prefix for environment overrides, e.g. `ETF__DATABASE__URL=sqlite://other.db`.
pub const ENV_PREFIX: &str = "ETF";

/// Loads the application configuration from the `config.toml` file.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the configuration from `path`, applies `ETF__*` environment
/// overrides, and validates the result.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("portfolio.symbols"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(
        path = %path.display(),
        symbols = config.portfolio.symbols.len(),
        "Configuration loaded."
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{NumericField, Symbol};
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_full_config() {
        let file = write_config(
            r#"
            [database]
            url = "sqlite://etf.db"

            [portfolio]
            symbols = ["GDOT", "GS", "PYPL", "SQ"]

            [queries]
            symbol = "GS"
            filter_field = "open"
            threshold = 150.5
            top_n = 3

            [logging]
            level = "debug"
            "#,
        );

        let config = load_config_from(file.path()).unwrap();

        assert_eq!(config.database.url, "sqlite://etf.db");
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.portfolio.symbols.len(), 4);
        assert_eq!(config.portfolio.trading_days_per_year, 252);
        assert_eq!(config.queries.symbol, Symbol::new("GS").unwrap());
        assert_eq!(config.queries.filter_field, NumericField::Open);
        assert_eq!(config.queries.threshold, 150.5);
        assert_eq!(config.queries.top_field, NumericField::DailyReturns);
        assert_eq!(config.queries.top_n, 3);
        assert_eq!(config.queries.preview_rows, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let file = write_config(
            r#"
            [database]
            url = "sqlite://etf.db"

            [portfolio]
            symbols = ["PYPL"]
            "#,
        );

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.queries.symbol, Symbol::new("PYPL").unwrap());
        assert_eq!(config.queries.filter_field, NumericField::Close);
        assert_eq!(config.queries.threshold, 200.0);
        assert_eq!(config.queries.top_n, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn rejects_empty_portfolio() {
        let file = write_config(
            r#"
            [database]
            url = "sqlite://etf.db"

            [portfolio]
            symbols = []
            "#,
        );

        // Depending on how the source represents an empty array this fails
        // either deserialization or validation; both must reject it.
        assert!(load_config_from(file.path()).is_err());
    }

    #[test]
    fn rejects_invalid_symbol() {
        let file = write_config(
            r#"
            [database]
            url = "sqlite://etf.db"

            [portfolio]
            symbols = ["GS", "DROP TABLE"]
            "#,
        );

        let err = load_config_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn rejects_zero_trading_days() {
        let file = write_config(
            r#"
            [database]
            url = "sqlite://etf.db"

            [portfolio]
            symbols = ["GS"]
            trading_days_per_year = 0
            "#,
        );

        let err = load_config_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
