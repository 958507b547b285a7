use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Collections searched by basic queries, in response order
    #[serde(default = "default_collections")]
    pub collections: Vec<CollectionSettings>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchSettings::default(),
            export: ExportConfig::default(),
            storage: StorageConfig::default(),
            collections: default_collections(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.search.default_limit == 0 {
            return Err("search.default_limit must be > 0".into());
        }
        if self.collections.is_empty() {
            return Err("at least one collection must be configured".into());
        }
        for (i, c) in self.collections.iter().enumerate() {
            if c.name.trim().is_empty() {
                return Err(format!("collections[{i}].name must not be empty"));
            }
            if c.searchable_fields.is_empty() {
                return Err(format!(
                    "collections[{i}] ({}) must list searchable_fields",
                    c.name
                ));
            }
            if self.collections[..i].iter().any(|o| o.name == c.name) {
                return Err(format!("collection '{}' is configured twice", c.name));
            }
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Page size used when `limit` is absent or unusable
    #[serde(default = "default_limit")]
    pub default_limit: u64,
}

fn default_limit() -> u64 {
    25
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for request-scoped export files
    #[serde(default = "default_transient_dir")]
    pub transient_dir: PathBuf,
}

fn default_transient_dir() -> PathBuf {
    std::env::temp_dir().join("chemsearch-exports")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            transient_dir: default_transient_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// JSON file loaded into the in-memory store at startup
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSettings {
    pub name: String,
    #[serde(default)]
    pub searchable_fields: Vec<String>,
}

impl CollectionSettings {
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            searchable_fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

pub const CHEMICAL_FIELDS: &[&str] = &[
    "Substance_Name",
    "Substance_CASRN",
    "Structure_SMILES",
    "Structure_InChI",
    "Structure_Formula",
    "Structure_MolWt",
];

pub const TARGET_FIELDS: &[&str] = &[
    "intended_target_official_full_name",
    "intended_target_gene_name",
    "intended_target_official_symbol",
    "intended_target_gene_symbol",
    "technological_target_official_full_name",
    "technological_target_gene_name",
    "technological_target_official_symbol",
    "technological_target_gene_symbol",
];

fn default_collections() -> Vec<CollectionSettings> {
    vec![
        CollectionSettings::new("chemical", CHEMICAL_FIELDS),
        CollectionSettings::new("target", TARGET_FIELDS),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or("chemsearch.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., CHEMSEARCH__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("CHEMSEARCH")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
