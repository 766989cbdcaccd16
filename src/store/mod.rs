//! Store Module
//!
//! In-memory key-value storage for typed scalars and string lists, with
//! lazy TTL expiration.

mod clock;
mod engine;
mod entry;
mod lock;
mod scalar;
mod stats;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::Store;
pub use entry::{Entry, Value};
pub use scalar::{decode_int, decode_utf8, RawValue, Scalar, ScalarKind};
pub use stats::StoreStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 8 * 1024;

/// Default maximum encoded value size in bytes
pub const MAX_VALUE_SIZE: usize = 16 * 1024 * 1024; // 16 MiB
