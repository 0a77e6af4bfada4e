//! Engine settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::ANONYMOUS_DOMAIN;
use crate::error::{err, Result};

/// LMDB environment options for the relation store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub path: PathBuf,
    pub map_size: usize,
    pub max_readers: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            path: PathBuf::from("data/mediagate"),
            map_size: 1 << 30,
            max_readers: 126,
        }
    }
}

impl StoreOptions {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        StoreOptions { path: path.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Accounts whose email lives in this domain are anonymous sessions
    pub anonymous_domain: String,
    pub store: StoreOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            anonymous_domain: ANONYMOUS_DOMAIN.to_string(),
            store: StoreOptions::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(err)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(err)?;
        Self::from_json(&raw)
    }

    /// Whether an email address belongs to an anonymous session
    pub fn is_anonymous_email(&self, email: &str) -> bool {
        email
            .rsplit_once('@')
            .map(|(_, domain)| domain.eq_ignore_ascii_case(&self.anonymous_domain))
            .unwrap_or(false)
    }
}
