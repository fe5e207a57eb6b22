//! Plain data types shared by the taskdesk crates.
//!
//! Nothing here performs I/O: ids, job specifications and statuses, argument
//! bags, form declarations and the values a task may hand back when its job
//! is finished.

mod domain;
pub use domain::*;
