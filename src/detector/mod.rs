//! Waterfall detection.
//!
//! A waterfall is a pair of queries where one starts only after another one
//! finished, without any declared dependency between them. Each cache change
//! notification drives one cycle:
//!
//! ```text
//! change notification
//!        │
//!        ▼
//!  Snapshot::capture ──► diff_snapshots ──(unchanged)──► done
//!                             │
//!                             ▼ started / finished
//!                      pair_waterfalls  (finished × started)
//!                             │
//!                             ▼
//!                      ExemptionList::filter
//!                             │
//!                             ▼
//!                      Reporter::report  (one block per cycle)
//! ```
//!
//! The previous snapshot is replaced whenever the in-flight set changed, and
//! kept as is otherwise.

mod exemption;
mod pairing;
mod reporter;
mod snapshot;
mod subscriber;


pub use exemption::*;
pub use pairing::*;
pub use reporter::*;
pub use snapshot::*;
pub use subscriber::*;
