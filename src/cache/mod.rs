//! Aggregate cache.
//!
//! A process-local read-through cache for the hot aggregate queries
//! (rankings, rating histograms, federation summaries, title cross-tab).
//! Entries expire a fixed time after insertion; there is no size bound and no
//! persistence.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 3600
//! ```

mod clock;
mod config;
mod keys;
mod lock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::StatsKey;
pub use store::TtlCache;
