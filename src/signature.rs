//! Parameter tables, caller arguments and resolved arguments
//!
//! A [`Signature`] is the explicit, ordered description of a callable's
//! parameters (or a class's attributes). It is built once, when the target is
//! declared, and shared by every call.
//!
//! ```rust
//! use scope_injector::{Dependency, Param, Signature, signature};
//!
//! // Builder form
//! let sig = Signature::new()
//!     .param(Param::new("logger"))
//!     .param(Param::new("data").with_default(String::from("default")))
//!     .param(Param::new("id").inject(Dependency::provider(|| 42u64)));
//!
//! // Macro form, same table
//! let same = signature![
//!     logger,
//!     data = String::from("default"),
//!     id => Dependency::provider(|| 42u64),
//! ];
//!
//! assert_eq!(sig.names(), same.names());
//! ```

use crate::dependency::Dependency;
use crate::value::{Injectable, Value, downcast};
use crate::{DiError, Result};
use std::sync::Arc;

/// How a parameter gets its value when the caller does not supply one
pub enum ParamKind {
    /// No default. Looked up in the scope under the parameter's own name;
    /// missing if not bound.
    Required,
    /// Plain default, used as is. Never injected.
    Default(Value),
    /// Annotated default: looked up in the scope under the parameter's own
    /// name first, falling back to the default.
    Annotated(Value),
    /// Resolved through a dependency descriptor
    Inject(Dependency),
}

impl std::fmt::Debug for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::Required => f.write_str("Required"),
            ParamKind::Default(_) => f.write_str("Default(..)"),
            ParamKind::Annotated(_) => f.write_str("Annotated(..)"),
            ParamKind::Inject(dep) => f.debug_tuple("Inject").field(dep).finish(),
        }
    }
}

/// One declared parameter or attribute
#[derive(Debug)]
pub struct Param {
    name: String,
    kind: ParamKind,
}

impl Param {
    /// A parameter without default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Required,
        }
    }

    /// Give the parameter a plain default.
    pub fn with_default<T: Injectable>(self, value: T) -> Self {
        self.with_kind(ParamKind::Default(Arc::new(value)))
    }

    /// Give the parameter an annotated default: a scope binding under the
    /// parameter's name takes precedence over `value`.
    pub fn annotated<T: Injectable>(self, value: T) -> Self {
        self.with_kind(ParamKind::Annotated(Arc::new(value)))
    }

    /// Resolve the parameter through `dependency`.
    pub fn inject(self, dependency: Dependency) -> Self {
        self.with_kind(ParamKind::Inject(dependency))
    }

    /// Replace the parameter kind
    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> &ParamKind {
        &self.kind
    }

    /// Whether the engine may supply this parameter from a scope or provider
    pub fn is_injectable(&self) -> bool {
        !matches!(self.kind, ParamKind::Default(_))
    }

    /// Whether a fallback default exists
    pub fn has_default(&self) -> bool {
        matches!(self.kind, ParamKind::Default(_) | ParamKind::Annotated(_))
    }
}

/// Ordered parameter table of a callable, or attribute table of a class.
#[derive(Debug, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Empty signature
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    ///
    /// # Panics
    ///
    /// Panics if a parameter with the same name was already declared.
    #[track_caller]
    pub fn param(mut self, param: Param) -> Self {
        if self.position(param.name()).is_some() {
            panic!("duplicate parameter '{}' in signature", param.name());
        }
        self.params.push(param);
        self
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Declaration index of `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl FromIterator<Param> for Signature {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        iter.into_iter().fold(Signature::new(), Signature::param)
    }
}

/// Values supplied by the caller at a call site.
///
/// Positional values bind to parameters in declaration order; named values
/// bind by name. Anything not supplied is left to the engine.
#[derive(Clone, Default)]
pub struct Args {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Args {
    /// No arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional value
    pub fn positional<T: Injectable>(self, value: T) -> Self {
        self.positional_value(Arc::new(value))
    }

    /// Supply `name` explicitly
    pub fn named<T: Injectable>(self, name: impl Into<String>, value: T) -> Self {
        self.named_value(name, Arc::new(value))
    }

    pub fn positional_value(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    pub fn named_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.named.push((name.into(), value));
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<Value>, Vec<(String, Value)>) {
        (self.positional, self.named)
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("positional", &self.positional.len())
            .field(
                "named",
                &self.named.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The fully merged argument set handed to a wrapped body, in declaration order.
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    pub(crate) fn from_values(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    /// Erased value for `name`
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Typed value for `name`.
    ///
    /// # Errors
    ///
    /// [`DiError::NotFound`] if `name` is not a declared parameter,
    /// [`DiError::TypeMismatch`] if the value has another type.
    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        let value = self.value(name).ok_or_else(|| DiError::not_found(name))?;
        downcast::<T>(name, Arc::clone(value))
    }

    /// Owned copy of the typed value for `name`
    pub fn cloned<T: Injectable + Clone>(&self, name: &str) -> Result<T> {
        self.get::<T>(name).map(|v| T::clone(&v))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> Vec<&str> {
        self.values.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arguments")
            .field("names", &self.names())
            .finish()
    }
}

/// Build a [`Signature`] from a compact parameter list.
///
/// - `name` - no default, injected from the scope by name
/// - `name = expr` - plain default
/// - `name => dependency` - resolved through a [`Dependency`]
///
/// ```rust
/// use scope_injector::{Dependency, signature};
///
/// let sig = signature![database, config, retries = 3u8, ts => Dependency::cached(|| 0u64)];
/// assert_eq!(sig.names(), ["database", "config", "retries", "ts"]);
/// ```
#[macro_export]
macro_rules! signature {
    (@param $name:ident) => {
        $crate::Param::new(stringify!($name))
    };
    (@param $name:ident = $default:expr) => {
        $crate::Param::new(stringify!($name)).with_default($default)
    };
    (@param $name:ident => $dep:expr) => {
        $crate::Param::new(stringify!($name)).inject($dep)
    };
    () => {
        $crate::Signature::new()
    };
    ($($name:ident $(= $default:expr)? $(=> $dep:expr)?),+ $(,)?) => {
        $crate::Signature::new()
            $(.param($crate::signature!(@param $name $(= $default)? $(=> $dep)?)))+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_kinds() {
        let required = Param::new("db");
        assert!(required.is_injectable());
        assert!(!required.has_default());

        let plain = Param::new("data").with_default("default");
        assert!(!plain.is_injectable());
        assert!(plain.has_default());

        let annotated = Param::new("level").annotated("info");
        assert!(annotated.is_injectable());
        assert!(annotated.has_default());

        let injected = Param::new("id").inject(Dependency::key("id"));
        assert!(injected.is_injectable());
        assert!(!injected.has_default());
    }

    #[test]
    fn test_signature_order_and_position() {
        let sig = Signature::new()
            .param(Param::new("a"))
            .param(Param::new("b").with_default(1u8))
            .param(Param::new("c"));

        assert_eq!(sig.names(), ["a", "b", "c"]);
        assert_eq!(sig.position("c"), Some(2));
        assert_eq!(sig.position("z"), None);
        assert_eq!(sig.len(), 3);
    }

    #[test]
    #[should_panic(expected = "duplicate parameter 'a'")]
    fn test_duplicate_param_panics() {
        let _ = Signature::new().param(Param::new("a")).param(Param::new("a"));
    }

    #[test]
    fn test_signature_macro_forms() {
        let sig = signature![database, data = String::from("default"), id => Dependency::key("id")];

        assert_eq!(sig.names(), ["database", "data", "id"]);
        assert!(matches!(sig.params()[0].kind(), ParamKind::Required));
        assert!(matches!(sig.params()[1].kind(), ParamKind::Default(_)));
        assert!(matches!(sig.params()[2].kind(), ParamKind::Inject(_)));

        assert!(signature![].is_empty());
    }

    #[test]
    fn test_signature_from_iter() {
        let sig: Signature = ["x", "y"].into_iter().map(Param::new).collect();
        assert_eq!(sig.names(), ["x", "y"]);
    }

    #[test]
    fn test_args_building() {
        let args = Args::new().positional(1u8).named("b", 2u8);
        assert_eq!(args.len(), 2);
        assert!(!args.is_empty());
        assert!(Args::new().is_empty());
    }

    #[test]
    fn test_arguments_typed_access() {
        let args = Arguments::from_values(vec![
            ("host".to_string(), Arc::new(String::from("localhost")) as Value),
            ("port".to_string(), Arc::new(3306u16) as Value),
        ]);

        assert_eq!(args.cloned::<String>("host").unwrap(), "localhost");
        assert_eq!(*args.get::<u16>("port").unwrap(), 3306);
        assert!(matches!(
            args.get::<u16>("host"),
            Err(DiError::TypeMismatch { .. })
        ));
        assert!(matches!(args.get::<u16>("user"), Err(DiError::NotFound { .. })));
        assert_eq!(args.names(), ["host", "port"]);
        assert_eq!(args.iter().count(), 2);
    }
}
