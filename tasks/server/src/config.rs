use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};
use serde::Deserialize;

use crate::task::IdAssignment;

/// Prefix of every environment variable read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "TASKS";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Start the store with the "Complete Lab Activity" record.
    #[serde(default = "default_seed_sample_task")]
    pub seed_sample_task: bool,
    #[serde(default)]
    pub id_assignment: IdAssignment,
}

impl Config {
    /// Loads configuration from `TASKS_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(::config::Config::builder().add_source(Environment::with_prefix(ENV_PREFIX)))
    }

    /// Builds the configuration from an already assembled set of sources.
    pub fn load(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let settings = builder.build()?;
        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Address the web server binds to.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            seed_sample_task: default_seed_sample_task(),
            id_assignment: IdAssignment::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_seed_sample_task() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_load_defaults_without_sources() {
        let config = Config::load(::config::Config::builder()).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.server_address(), "0.0.0.0:8080");
        assert!(config.seed_sample_task);
        assert_eq!(config.id_assignment, IdAssignment::SequenceLength);
    }

    #[test]
    fn can_override_every_setting() {
        let builder = ::config::Config::builder()
            .set_override("host", "127.0.0.1")
            .unwrap()
            .set_override("port", 3000)
            .unwrap()
            .set_override("seed_sample_task", false)
            .unwrap()
            .set_override("id_assignment", "monotonic")
            .unwrap();

        let config = Config::load(builder).unwrap();

        assert_eq!(config.server_address(), "127.0.0.1:3000");
        assert!(!config.seed_sample_task);
        assert_eq!(config.id_assignment, IdAssignment::Monotonic);
    }

    #[test]
    fn rejects_unknown_id_assignment() {
        let builder = ::config::Config::builder()
            .set_override("id_assignment", "random")
            .unwrap();

        assert!(Config::load(builder).is_err());
    }
}
