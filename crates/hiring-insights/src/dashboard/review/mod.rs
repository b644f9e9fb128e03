//! Application review list: filtering, sorting, multi-select, and single or
//! bulk status mutation.

pub mod board;
pub mod bulk;
pub mod filter;

#[cfg(test)]
pub(crate) mod tests;

pub use board::{ReviewBoard, ReviewError};
pub use bulk::{dispatch_status_updates, BulkFailure, BulkOutcome, BulkReport};
pub use filter::{
    AppliedWithin, ApplicationFilter, ApplicationSort, FilterPatch, JobScope, StatusScope,
};
