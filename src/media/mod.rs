pub mod form;
pub mod services;

use serde::{Deserialize, Serialize};

/// An object in the media store together with its public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMedia {
    pub key: String,
    pub url: String,
}

impl StoredMedia {
    /// Rebuilds the pair from two nullable columns.
    pub fn from_columns(key: Option<String>, url: Option<String>) -> Option<Self> {
        match (key, url) {
            (Some(key), Some(url)) => Some(Self { key, url }),
            _ => None,
        }
    }
}
