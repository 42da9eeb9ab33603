//! Cache module for the merged emission aggregate
//!
//! Computing the aggregate means one upstream request per country, so the
//! result of the last successful pass is kept in memory and served until a
//! failed pass clears it. Nothing is persisted across restarts.

mod slot;

pub use slot::{CachedAggregate, ResultCache};
