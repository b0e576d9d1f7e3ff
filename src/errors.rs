//! Waterfall Detector Error Hierarchy
//!
//! Detection cycles never fail: a cycle that cannot produce a report simply
//! produces none. The only fallible surface is construction, where the
//! detector configuration is loaded and validated.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration sources could not be read or deserialized
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration was read but failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
