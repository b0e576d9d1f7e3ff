//! Query waterfall detection for client-side query caches.
//!
//! The detector subscribes to a [`QueryCache`], keeps the set of in-flight
//! queries between change notifications, and reports every pair where one
//! query finished and another started in the same interval. Pairs covered by
//! an [`ExemptionRule`] are left out.
//!
//! ```
//! use std::sync::Arc;
//!
//! use waterfall_detector::{query_key, watch_waterfalls, DetectorConfig, MemoryQueryCache, QueryStatus};
//!
//! let cache = Arc::new(MemoryQueryCache::new());
//! cache.set_status(query_key!["user"], QueryStatus::Pending);
//!
//! let config = DetectorConfig::default().with_exemption(query_key!["user"], query_key!["settings"]);
//! let handle = watch_waterfalls(cache.clone(), config).unwrap();
//!
//! // `user` finishing while `posts` starts is reported as `["user"] --> ["posts"]`.
//! cache.batch(|cache| {
//!     cache.set_status(query_key!["user"], QueryStatus::Success);
//!     cache.set_status(query_key!["posts"], QueryStatus::Pending);
//! });
//! assert_eq!(handle.pending_hashes(), vec![r#"["posts"]"#.to_string()]);
//!
//! handle.unsubscribe();
//! ```

mod cache;
mod config;
mod detector;
mod errors;
mod key;
mod query;

pub mod metrics;

pub use cache::*;
pub use crate::config::*;
pub use detector::*;
pub use errors::*;
pub use key::*;
pub use query::*;

#[doc(hidden)]
pub use serde_json as __serde_json;

//-----------------------------------------------------------
// Test utils
