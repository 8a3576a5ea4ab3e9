//! Scoped runtime contracts for Clause.
//!
//! A [`Contract`] checks preconditions and conditions where they are declared
//! and runs postconditions when it leaves scope. What happens on a failed
//! check is decided once, at construction, by a [`Policy`].
//!
//! - **`contract`**: The scope guard and the shared evaluation routine
//! - **`reporter`**: Where diagnostic lines go (stderr, `tracing`, memory)

mod contract;
mod reporter;

pub use clause_types::{
    Behavior, CheckKind, ContractViolation, Evaluation, Failure, Policy, PolicyParseError,
};
pub use contract::Contract;
pub use reporter::{RecordingReporter, Reporter, StderrReporter, TracingReporter};

/// Name of the enclosing function as a `&'static str`.
///
/// Closure frames are skipped, so inside `fn load() { let f = || function_name!(); }`
/// both the function body and the closure yield `"load"`.
///
/// ```
/// fn resize() -> &'static str {
///     clause_core::function_name!()
/// }
/// assert_eq!(resize(), "resize");
/// ```
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __clause_marker() {}
        let path = ::std::any::type_name_of_val(&__clause_marker);
        let path = path.strip_suffix("::__clause_marker").unwrap_or(path);
        path.rsplit("::")
            .find(|segment| *segment != "{{closure}}")
            .unwrap_or(path)
    }};
}
