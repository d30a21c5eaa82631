//! DocSQL expression evaluation
//!
//! The evaluation side of the expression engine:
//! - `FunctionProperties`, the per-query context that pins "now" to the
//!   query start instant
//! - `FunctionRegistry`, name plus argument types resolved once at plan
//!   time into a `ResolvedFunction` invoked per row
//! - the standard function library in `functions`: arithmetic, comparison,
//!   the temporal family, and the format/parse subsystem
//!
//! Absent-value propagation is centralized in `ResolvedFunction::apply`:
//! function bodies only ever see present values.

pub mod context;
pub mod functions;
pub mod registry;

pub use context::FunctionProperties;
pub use registry::{
    FunctionImpl, FunctionRegistry, FunctionSignature, ResolvedFunction, ReturnType,
};
