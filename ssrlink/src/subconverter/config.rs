use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::service::Service;
use super::shortener::DEFAULT_SHORTENER_ENDPOINT;
use super::Params;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration")]
    Parse(#[from] toml_edit::de::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub subconverter: Settings,
    #[serde(default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Converter endpoint the generated query strings are appended to.
    pub endpoint: String,
    /// Rule list appended to profiles tagged with the home office tag.
    pub extend_url: String,
    #[serde(default = "default_shortener")]
    pub shortener: String,
    /// Converter rule file per profile `config_key`.
    #[serde(default)]
    pub config_files: BTreeMap<String, String>,
    /// Parameters shared by all services. Per-service overrides win.
    #[serde(default, deserialize_with = "deserialize_params")]
    pub defaults: Params,
}

fn default_shortener() -> String {
    DEFAULT_SHORTENER_ENDPOINT.into()
}

/// Converter parameters end up in a query string, so any scalar is accepted
/// and turned into its query form. Booleans are written in lowercase.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParamValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl From<ParamValue> for String {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Integer(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::String(s) => s,
        }
    }
}

pub(super) fn deserialize_params<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Params, D::Error> {
    let raw = BTreeMap::<String, ParamValue>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}

impl AppConfig {
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        Ok(toml_edit::de::from_str(text)?)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    let text = std::fs::read_to_string(path)?;
    AppConfig::from_toml(&text)
}
