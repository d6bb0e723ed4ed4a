//! Конфигурация сервера.
//!
//! Слои: значения по умолчанию -> `tabular-ml.toml` -> переменные окружения `TABULAR_ML_*`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "tabular-ml.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON-артефакт спецификации предобработки
    pub spec_path: PathBuf,
    /// JSON с весами модели
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            spec_path: PathBuf::from("artifacts/preprocessing_spec.json"),
            model_path: PathBuf::from("artifacts/model.json"),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }
}

pub fn figment(config_file: &Path) -> Figment {
    Figment::from(Serialized::defaults(ServerConfig::default()))
        .merge(Toml::file(config_file))
        .merge(Env::prefixed("TABULAR_ML_"))
}

pub fn load_config(config_file: &Path) -> Result<ServerConfig, Box<figment::Error>> {
    figment(config_file).extract().map_err(Box::new)
}
