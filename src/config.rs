use anyhow::Result;
use serde::Deserialize;

/// Output format of the log lines written to stdout
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings of the agent process itself.
///
/// The chaos parameters (eagerness, tolerance, ...) live in the ChaosAgent
/// resource inside the cluster, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Explicit kubeconfig file; in-cluster / KUBECONFIG inference when unset
    #[serde(default)]
    pub kubeconfig_path: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Wire the ConfigMap corruption policy into the control loop
    #[serde(default = "default_corrupt_config_maps")]
    pub corrupt_config_maps: bool,
}

fn default_corrupt_config_maps() -> bool {
    false
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: config::Config) -> Result<Self> {
        Ok(config.try_deserialize()?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kubeconfig_path: None,
            log_format: LogFormat::default(),
            corrupt_config_maps: default_corrupt_config_maps(),
        }
    }
}
