use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The decoded form of one `ssr://` link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsrRecord {
    pub server: String,
    pub port: u16,
    #[serde(default)]
    pub protocol: String,
    pub method: String,
    #[serde(default)]
    pub obfs: String,
    #[serde(default)]
    pub password: String,
    /// Optional query parameters. A link that repeats a key keeps only the
    /// last value.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl SsrRecord {
    pub fn remarks(&self) -> Option<&str> {
        self.params
            .get(crate::share_link::REMARKS_KEY)
            .map(String::as_str)
    }
}
