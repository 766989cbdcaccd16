//! Interceptor Module
//!
//! The invocation-interceptor seam and the chain that composes interceptors
//! around a store-mutating call.

use std::fmt;

use tracing::trace;

use crate::error::Result;
use crate::store::{Scalar, Store};

// == Method ==
/// Identifies an instrumented method. Its qualified name is the store key
/// under which counters and history are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method {
    owner: &'static str,
    name: &'static str,
}

impl Method {
    pub const fn new(owner: &'static str, name: &'static str) -> Self {
        Self { owner, name }
    }

    /// Bare method name, e.g. `store`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Owner-qualified name, e.g. `Cache.store`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }

    /// List key holding the recorded argument tuples.
    pub fn inputs_key(&self) -> String {
        format!("{}:inputs", self.qualified_name())
    }

    /// List key holding the recorded results.
    pub fn outputs_key(&self) -> String {
        format!("{}:outputs", self.qualified_name())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

// == Invocation ==
/// One call passing through the chain: the method and its positional
/// arguments, receiver excluded.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub method: &'a Method,
    pub args: &'a [Scalar],
}

impl<'a> Invocation<'a> {
    pub fn new(method: &'a Method, args: &'a [Scalar]) -> Self {
        Self { method, args }
    }
}

// == Interceptor ==
/// Side effect attached around a call.
///
/// `before` runs ahead of the wrapped call and may abort it by returning an
/// error. `after` only runs once the wrapped call has succeeded; nothing
/// written in `before` is rolled back on failure.
pub trait Interceptor: Send + Sync + fmt::Debug {
    fn before(&self, store: &Store, call: &Invocation<'_>) -> Result<()>;

    fn after(&self, _store: &Store, _call: &Invocation<'_>, _output: &dyn fmt::Display) -> Result<()> {
        Ok(())
    }
}

// == Interceptor Chain ==
/// Ordered interceptor stack. The first layer added is the outermost.
#[derive(Debug, Default)]
pub struct InterceptorChain {
    layers: Vec<Box<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the current stack's inner side with `interceptor`.
    pub fn layer(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.layers.push(Box::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    // == Invoke ==
    /// Runs `call` through every layer.
    ///
    /// `before` hooks run outermost first, then the call, then `after`
    /// hooks innermost first. An error from the call skips every `after`
    /// hook and is returned unchanged.
    pub fn invoke<T, F>(&self, store: &Store, call: &Invocation<'_>, f: F) -> Result<T>
    where
        T: fmt::Display,
        F: FnOnce() -> Result<T>,
    {
        for layer in &self.layers {
            layer.before(store, call)?;
        }

        trace!("Invoking {}", call.method);
        let output = f()?;

        for layer in self.layers.iter().rev() {
            layer.after(store, call, &output)?;
        }
        Ok(output)
    }
}
