//! Instrumentation Module
//!
//! Composable interceptors that add call counting and call-history
//! recording around store-mutating methods.

mod count;
mod history;
mod interceptor;

pub use count::CountCalls;
pub use history::{args_repr, CallHistory};
pub use interceptor::{Interceptor, InterceptorChain, Invocation, Method};

/// Counter outermost, history innermost: every attempt is counted once
/// before its input is recorded.
pub fn standard_chain() -> InterceptorChain {
    InterceptorChain::new().layer(CountCalls).layer(CallHistory)
}
