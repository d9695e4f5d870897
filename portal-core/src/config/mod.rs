use crate::error::AppError;
use serde::Deserialize;

const FILE_STEM: &str = "portal";
const ENV_PREFIX: &str = "PORTAL";

/// Settings shared by every portal service.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load base settings from an optional `portal` file plus
    /// `PORTAL__`-prefixed environment variables; the latter win.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let sources = config::Config::builder()
            .add_source(config::File::with_name(FILE_STEM).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        Ok(sources.build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_absent() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 8080);
    }
}
