//! DocSQL expression value model and type system
//!
//! This crate defines:
//! - `ExprValue`, the tagged immutable runtime value with Missing/Null
//!   three-valued markers
//! - `ExprCoreType`, the schema-level type tags and the numeric widening
//!   lattice
//! - cross-type comparison (numeric, temporal, IP) in `coercion`
//! - temporal, interval and IP payload types with literal parsing

pub mod coercion;
pub mod error;
pub mod interval;
pub mod ip;
pub mod temporal;
pub mod type_system;
pub mod value;

pub use error::{ExprError, ExprResult};
pub use interval::{IntervalUnit, IntervalValue};
pub use ip::IpValue;
pub use type_system::ExprCoreType;
pub use value::ExprValue;
