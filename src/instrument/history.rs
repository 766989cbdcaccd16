//! Call History Recorder
//!
//! Appends every call's arguments and result to a pair of lists in the store.

use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::instrument::{Interceptor, Invocation};
use crate::store::{Scalar, Store};

/// Records inputs to `<qualified_name>:inputs` and results to
/// `<qualified_name>:outputs`.
///
/// The input is pushed before the call and the output after it. A failed
/// call leaves its input without a matching output.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallHistory;

impl Interceptor for CallHistory {
    fn before(&self, store: &Store, call: &Invocation<'_>) -> Result<()> {
        let args = args_repr(call.args);
        let len = store.rpush(&call.method.inputs_key(), &args)?;
        debug!("{} input #{} recorded: {}", call.method, len, args);
        Ok(())
    }

    fn after(&self, store: &Store, call: &Invocation<'_>, output: &dyn fmt::Display) -> Result<()> {
        store.rpush(&call.method.outputs_key(), &output.to_string())?;
        Ok(())
    }
}

/// Renders positional arguments as a tuple literal: `()`, `('a',)`, `(1, 2.5)`.
pub fn args_repr(args: &[Scalar]) -> String {
    match args {
        [] => "()".to_string(),
        [single] => format!("({},)", single.repr()),
        many => {
            let parts: Vec<String> = many.iter().map(Scalar::repr).collect();
            format!("({})", parts.join(", "))
        }
    }
}
