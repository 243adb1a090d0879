//! Function Registry
//!
//! Maps FTL function names (any identifier) to native implementations.
//! Each implementation carries a signature record describing its
//! positional arity, its named-parameter mapping from FTL spelling to
//! native spelling, and whether the caller's locale is injected via the
//! [`FunctionContext`]. Registration validates the record; a frozen
//! registry rejects further registration. The shared default registry is
//! frozen and copy-on-write: a bundle's first mutation clones it.

pub mod builtins;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::diagnostics::runtime::FormattingError;
use crate::locale::LocaleOracle;
use crate::resolver::value::FluentValue;

/// Call-time context handed to every function
pub struct FunctionContext<'a> {
    /// The bundle's locale; present for all calls, meaningful when the
    /// signature requested locale injection
    pub locale: &'a str,
    pub oracle: &'a dyn LocaleOracle,
}

/// Native function shape: positional values, named values (native
/// spelling), call context
pub type FluentFunction = Arc<
    dyn Fn(
            &[FluentValue],
            &BTreeMap<String, FluentValue>,
            &FunctionContext<'_>,
        ) -> Result<FluentValue, FormattingError>
        + Send
        + Sync,
>;

/// Declarative description of one registered function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// The name used in FTL source
    pub ftl_name: String,
    /// Exact number of required positional arguments
    pub positional_arity: usize,
    /// Ordered `(ftl_name, native_name)` pairs for named arguments
    pub param_mapping: Vec<(String, String)>,
    /// Whether the implementation consumes the caller's locale
    pub inject_locale: bool,
}

impl FunctionSignature {
    pub fn new(ftl_name: impl Into<String>, positional_arity: usize) -> Self {
        Self {
            ftl_name: ftl_name.into(),
            positional_arity,
            param_mapping: Vec::new(),
            inject_locale: false,
        }
    }

    pub fn with_param(mut self, ftl: &str, native: &str) -> Self {
        self.param_mapping.push((ftl.to_string(), native.to_string()));
        self
    }

    pub fn with_locale_injection(mut self) -> Self {
        self.inject_locale = true;
        self
    }

    /// Translate an FTL named-argument name to its native spelling
    pub fn native_param(&self, ftl_param: &str) -> Option<&str> {
        let wanted = canonical_param(ftl_param);
        self.param_mapping
            .iter()
            .find(|(ftl, _)| canonical_param(ftl) == wanted)
            .map(|(_, native)| native.as_str())
    }
}

/// Underscores and hyphens collapse for collision detection
fn canonical_param(name: &str) -> String {
    name.replace('-', "_").to_ascii_lowercase()
}

/// Registration failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    Frozen,
    DuplicateName(String),
    ParamCollision { ftl_name: String, param: String },
    ArityMismatch { ftl_name: String, reason: String },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Frozen => write!(f, "registry is frozen"),
            RegistryError::DuplicateName(name) => {
                write!(f, "function \"{name}\" is already registered")
            }
            RegistryError::ParamCollision { ftl_name, param } => write!(
                f,
                "function \"{ftl_name}\" has colliding parameter \"{param}\""
            ),
            RegistryError::ArityMismatch { ftl_name, reason } => {
                write!(f, "function \"{ftl_name}\": {reason}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// One registered implementation
#[derive(Clone)]
pub struct RegisteredFunction {
    pub signature: FunctionSignature,
    pub callable: FluentFunction,
}

impl std::fmt::Debug for RegisteredFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredFunction")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Name → implementation registry with freeze semantics
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, RegisteredFunction>,
    frozen: bool,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with NUMBER, DATETIME, and CURRENCY
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry).expect("builtin signatures are valid");
        registry
    }

    pub fn register(
        &mut self,
        signature: FunctionSignature,
        callable: FluentFunction,
    ) -> Result<(), RegistryError> {
        if self.frozen {
            return Err(RegistryError::Frozen);
        }
        if self.functions.contains_key(&signature.ftl_name) {
            return Err(RegistryError::DuplicateName(signature.ftl_name.clone()));
        }
        if signature.inject_locale && signature.positional_arity == 0 {
            return Err(RegistryError::ArityMismatch {
                ftl_name: signature.ftl_name.clone(),
                reason: "locale injection requires at least one positional argument (the value)"
                    .to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for (ftl, native) in &signature.param_mapping {
            if !seen.insert(canonical_param(ftl)) {
                return Err(RegistryError::ParamCollision {
                    ftl_name: signature.ftl_name.clone(),
                    param: ftl.clone(),
                });
            }
            if !seen.insert(canonical_param(native)) && canonical_param(ftl) != canonical_param(native) {
                return Err(RegistryError::ParamCollision {
                    ftl_name: signature.ftl_name.clone(),
                    param: native.clone(),
                });
            }
        }

        self.functions.insert(
            signature.ftl_name.clone(),
            RegisteredFunction {
                signature,
                callable,
            },
        );
        Ok(())
    }

    /// Reject all further registration
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// An unfrozen copy for copy-on-write mutation
    pub fn thawed_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.frozen = false;
        copy
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredFunction> {
        self.functions.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

/// The process-wide default registry: builtins only, frozen
static DEFAULT_REGISTRY: Lazy<Arc<FunctionRegistry>> = Lazy::new(|| {
    let mut registry = FunctionRegistry::with_builtins();
    registry.freeze();
    Arc::new(registry)
});

/// Shared frozen default registry
pub fn default_registry() -> Arc<FunctionRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> FluentFunction {
        Arc::new(|positional, _, _| Ok(positional.first().cloned().unwrap_or(FluentValue::Integer(0))))
    }

    #[test]
    fn frozen_registry_rejects_registration() {
        let mut registry = FunctionRegistry::new();
        registry.freeze();
        let err = registry
            .register(FunctionSignature::new("F", 1), noop())
            .unwrap_err();
        assert_eq!(err, RegistryError::Frozen);
    }

    #[test]
    fn thawed_copy_accepts_registration_again() {
        let mut thawed = default_registry().thawed_copy();
        assert!(thawed.register(FunctionSignature::new("MINE", 0), noop()).is_ok());
        // The shared default is untouched.
        assert!(default_registry().get("MINE").is_none());
    }

    #[test]
    fn locale_injection_requires_a_value_argument() {
        let mut registry = FunctionRegistry::new();
        let err = registry
            .register(
                FunctionSignature::new("F", 0).with_locale_injection(),
                noop(),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::ArityMismatch { .. }));
    }

    #[test]
    fn underscore_hyphen_param_collisions_are_rejected() {
        let mut registry = FunctionRegistry::new();
        let err = registry
            .register(
                FunctionSignature::new("F", 1)
                    .with_param("some-param", "some_param_native")
                    .with_param("some_param", "other_native"),
                noop(),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::ParamCollision { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(FunctionSignature::new("F", 1), noop())
            .unwrap();
        assert!(matches!(
            registry.register(FunctionSignature::new("F", 1), noop()),
            Err(RegistryError::DuplicateName(_))
        ));
    }

    #[test]
    fn param_mapping_resolves_hyphen_variants() {
        let signature = FunctionSignature::new("F", 1)
            .with_param("minimumFractionDigits", "minimum_fraction_digits");
        assert_eq!(
            signature.native_param("minimumFractionDigits"),
            Some("minimum_fraction_digits")
        );
        assert_eq!(signature.native_param("unknown"), None);
    }

    #[test]
    fn default_registry_carries_the_builtins() {
        let registry = default_registry();
        assert_eq!(registry.names(), vec!["CURRENCY", "DATETIME", "NUMBER"]);
        assert!(registry.is_frozen());
    }
}
