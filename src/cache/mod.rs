//! Cache Module
//!
//! Instrumented facade over the store plus the replay log built from its
//! recorded call history.

mod facade;
mod replay;


// Re-export public types
pub use facade::{Cache, STORE};
pub use replay::{CallRecord, ReplayLog};
