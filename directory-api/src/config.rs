use config::{Config, ConfigError, Environment, File};
use directory_store::search::DROPDOWN_LIMIT;
use directory_store::BackendSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "DIRECTORY";

const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[cors]
allowed_origins = ["http://localhost:3000"]

[backend]
# Leave url or api_key unset to serve the bundled dataset from memory.
# url = "https://your-project.supabase.co"
# api_key = "your-anon-key"
table = "companies"
logo_bucket = "company-logos"

[store]
search_limit = 8
seed_on_empty = true
"#;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApiConfig {
    pub server: Option<ServerConfig>,
    pub cors: Option<CorsConfig>,
    pub backend: Option<BackendSettings>,
    pub store: Option<StoreConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default = "default_seed_on_empty")]
    pub seed_on_empty: bool,
}

fn default_search_limit() -> usize {
    DROPDOWN_LIMIT
}

fn default_seed_on_empty() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            seed_on_empty: default_seed_on_empty(),
        }
    }
}

impl ApiConfig {
    /// Load from `path`, or the per-user config file, writing the default
    /// file first if it is missing. `DIRECTORY__SECTION__KEY` variables
    /// override file values.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let config: ApiConfig = Config::builder()
            .add_source(File::from(config_path.clone()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        })
    }

    pub fn backend(&self) -> BackendSettings {
        self.backend.clone().unwrap_or_default()
    }

    pub fn store(&self) -> StoreConfig {
        self.store.clone().unwrap_or_default()
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("ai-marketing-directory").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
