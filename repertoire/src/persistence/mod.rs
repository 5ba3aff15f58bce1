//! Persistence: the versioned collection codec, the key-value stores it is
//! written to, debounced background saving and user settings.

mod codec;
mod saver;
mod settings;
mod store;

pub use codec::{decode, encode, Loaded, SCHEMA_VERSION};
pub use saver::{DebouncedSaver, SaveEvent};
pub use settings::{Settings, StatsFilters};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Store key of the serialized collection.
pub const COLLECTION_KEY: &str = "repertoires";
/// Store key of the serialized settings.
pub const SETTINGS_KEY: &str = "settings";

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid store key: {0}")]
    InvalidKey(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
