//! Function registry for the expression engine
//!
//! Functions are registered under a name with an ordered list of accepted
//! signatures and a declared result type. The planner resolves a name plus
//! argument types once, at plan time, receiving a `ResolvedFunction` whose
//! closure is then invoked per row - overload dispatch never happens per
//! call.
//!
//! `ResolvedFunction::apply` wraps every invocation in the three-valued
//! propagation rule: any `Missing` argument yields `Missing`, otherwise any
//! `Null` argument yields `Null`, otherwise the implementation runs on
//! present values only. Missing dominates Null. Individual function bodies
//! never see an absent value.

use std::collections::HashMap;
use std::sync::Arc;

use docsql_types::{ExprCoreType, ExprError, ExprResult, ExprValue};

use crate::context::FunctionProperties;

/// Implementation of a registered function
pub type FunctionImpl =
    Arc<dyn Fn(&FunctionProperties, &[ExprValue]) -> ExprResult<ExprValue> + Send + Sync>;

/// Declared result type of an overload, possibly dependent on input types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    /// Always the same type
    Fixed(ExprCoreType),
    /// The least common ancestor of the numeric argument types
    WidestNumeric,
    /// The type of the first argument
    SameAsFirst,
}

impl ReturnType {
    /// Resolve the concrete result type for the given argument types
    pub fn resolve(&self, arg_types: &[ExprCoreType]) -> ExprResult<ExprCoreType> {
        match self {
            Self::Fixed(t) => Ok(*t),
            Self::WidestNumeric => arg_types
                .iter()
                .copied()
                .try_fold(ExprCoreType::Byte, ExprCoreType::widest_numeric),
            Self::SameAsFirst => arg_types.first().copied().ok_or_else(|| {
                ExprError::type_mismatch("at least one argument", "empty argument list")
            }),
        }
    }
}

/// Signature of one function overload
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Accepted argument types, in order
    pub arg_types: Vec<ExprCoreType>,
    /// Declared result type
    pub return_type: ReturnType,
}

impl FunctionSignature {
    /// Create a new signature
    pub fn new(
        name: impl Into<String>,
        arg_types: Vec<ExprCoreType>,
        return_type: ReturnType,
    ) -> Self {
        Self {
            name: name.into(),
            arg_types,
            return_type,
        }
    }

    /// Check if this signature accepts the given argument types
    pub fn matches(&self, actual: &[ExprCoreType]) -> bool {
        self.arg_types.len() == actual.len()
            && self
                .arg_types
                .iter()
                .zip(actual.iter())
                .all(|(declared, given)| declared.accepts(*given))
    }
}

/// A function resolved against concrete argument types.
///
/// Holds the implementation closure and the concrete result type; the
/// planner caches this and calls `apply` per row.
#[derive(Clone)]
pub struct ResolvedFunction {
    signature: FunctionSignature,
    return_type: ExprCoreType,
    implementation: FunctionImpl,
}

impl std::fmt::Debug for ResolvedFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFunction")
            .field("signature", &self.signature)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

impl ResolvedFunction {
    /// The matched signature
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    /// Concrete result type for the resolved argument types
    pub fn return_type(&self) -> ExprCoreType {
        self.return_type
    }

    /// Evaluate with automatic three-valued propagation
    pub fn apply(&self, props: &FunctionProperties, args: &[ExprValue]) -> ExprResult<ExprValue> {
        if args.len() != self.signature.arg_types.len() {
            return Err(ExprError::type_mismatch(
                format!(
                    "{} arguments for {}",
                    self.signature.arg_types.len(),
                    self.signature.name
                ),
                format!("{} arguments", args.len()),
            ));
        }
        if args.iter().any(ExprValue::is_missing) {
            return Ok(ExprValue::Missing);
        }
        if args.iter().any(ExprValue::is_null) {
            return Ok(ExprValue::Null);
        }
        (self.implementation)(props, args)
    }
}

/// Registry mapping function names to their overloads
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Vec<(FunctionSignature, FunctionImpl)>>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard function library registered
    pub fn with_standard_functions() -> Self {
        let mut registry = Self::new();
        crate::functions::register_all(&mut registry);
        registry
    }

    /// Register one overload
    pub fn register(
        &mut self,
        name: impl Into<String>,
        arg_types: Vec<ExprCoreType>,
        return_type: ReturnType,
        implementation: FunctionImpl,
    ) {
        let name = name.into();
        let signature = FunctionSignature::new(&name, arg_types, return_type);
        self.functions
            .entry(name)
            .or_default()
            .push((signature, implementation));
    }

    /// Resolve a function for the given argument types.
    ///
    /// Overloads are tried in registration order; the first match wins.
    pub fn resolve(&self, name: &str, arg_types: &[ExprCoreType]) -> ExprResult<ResolvedFunction> {
        let overloads = self.functions.get(name).ok_or_else(|| {
            ExprError::unresolved_function(name, format_types(arg_types))
        })?;
        let (signature, implementation) = overloads
            .iter()
            .find(|(sig, _)| sig.matches(arg_types))
            .ok_or_else(|| ExprError::unresolved_function(name, format_types(arg_types)))?;
        Ok(ResolvedFunction {
            signature: signature.clone(),
            return_type: signature.return_type.resolve(arg_types)?,
            implementation: Arc::clone(implementation),
        })
    }

    /// All overloads registered under a name
    pub fn get_overloads(&self, name: &str) -> Option<&[(FunctionSignature, FunctionImpl)]> {
        self.functions.get(name).map(|v| v.as_slice())
    }

    /// Iterate over all registered function names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

fn format_types(types: &[ExprCoreType]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}
