//! Call Counter
//!
//! Increments a per-method counter in the store before every call.

use tracing::debug;

use crate::error::Result;
use crate::instrument::{Interceptor, Invocation};
use crate::store::Store;

/// Counts call attempts under the method's qualified name.
///
/// The increment happens before the wrapped call runs, so a call that
/// fails is still counted.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountCalls;

impl Interceptor for CountCalls {
    fn before(&self, store: &Store, call: &Invocation<'_>) -> Result<()> {
        let count = store.incr(&call.method.qualified_name())?;
        debug!("{} call count is now {}", call.method, count);
        Ok(())
    }
}
