//! Term interning, physical key layout, query planning and range scans.

pub mod dictionary;
pub mod index_set;
pub mod key_codec;
pub mod planner;
pub mod scan;

pub use dictionary::TermInterner;
pub use index_set::{IndexMatches, IndexSet};
pub use key_codec::{decode_key, encode_key, Rotation};
pub use planner::{PatternPlanner, Plan, ScanPlan, PLANS};
pub use scan::RangeScan;
