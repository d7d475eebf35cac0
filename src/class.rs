//! Class attribute tables
//!
//! A [`ClassDef`] declares a class's attributes the same way a [`Signature`]
//! declares parameters. Wrapping it resolves every attribute once and yields
//! a [`Class`] whose attributes are plain values; reading them never touches
//! a scope again.
//!
//! ```rust
//! use scope_injector::{ClassDef, Dependency, Param, Scope};
//!
//! let scope = Scope::local("docs_class").unwrap();
//! scope.set("service", String::from("UserService"));
//!
//! let class = scope
//!     .wrap(
//!         ClassDef::new("Handler")
//!             .attr(Param::new("service").inject(Dependency::key("service")))
//!             .attr(Param::new("retries").with_default(3u8)),
//!     )
//!     .unwrap();
//!
//! assert_eq!(class.cloned::<String>("service").unwrap(), "UserService");
//! assert_eq!(*class.get::<u8>("retries").unwrap(), 3);
//! ```

use crate::scope::Scope;
use crate::signature::{Arguments, Param, Signature};
use crate::value::{Injectable, Value, downcast};
use crate::{DiError, Result};
use std::sync::Arc;

/// Declared, not yet resolved class
#[derive(Debug)]
pub struct ClassDef {
    name: String,
    attributes: Signature,
}

impl ClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Signature::new(),
        }
    }

    /// Declare an attribute.
    ///
    /// # Panics
    ///
    /// Panics if the attribute was already declared.
    #[track_caller]
    pub fn attr(mut self, attribute: Param) -> Self {
        self.attributes = self.attributes.param(attribute);
        self
    }

    /// Declare all attributes of `signature`, replacing any declared so far
    pub fn with_attributes(mut self, signature: Signature) -> Self {
        self.attributes = signature;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn attributes(&self) -> &Signature {
        &self.attributes
    }

    pub(crate) fn into_parts(self) -> (String, Signature) {
        (self.name, self.attributes)
    }
}

/// A wrapped class: every declared attribute holds its resolved value.
#[derive(Clone)]
pub struct Class {
    name: Arc<str>,
    attributes: Arguments,
    scope: Scope,
}

impl Class {
    pub(crate) fn new(name: String, attributes: Arguments, scope: Scope) -> Self {
        Self {
            name: Arc::from(name),
            attributes,
            scope,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The scope the class was resolved against
    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Erased attribute value
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.value(name)
    }

    /// Typed attribute value
    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>> {
        let value = self.attr(name).ok_or_else(|| DiError::not_found(name))?;
        downcast::<T>(name, Value::clone(value))
    }

    /// Owned copy of a typed attribute value
    pub fn cloned<T: Injectable + Clone>(&self, name: &str) -> Result<T> {
        self.get::<T>(name).map(|v| T::clone(&v))
    }

    /// Overwrite (or add) an attribute after wrapping
    pub fn set_attr<T: Injectable>(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        let mut values: Vec<(String, Value)> = self
            .attributes
            .iter()
            .filter(|(n, _)| *n != name)
            .map(|(n, v)| (n.to_string(), Value::clone(v)))
            .collect();
        values.push((name, Arc::new(value)));
        self.attributes = Arguments::from_values(values);
    }

    /// All attributes in declaration order
    #[inline]
    pub fn attributes(&self) -> &Arguments {
        &self.attributes
    }
}

impl std::fmt::Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("attributes", &self.attributes.names())
            .field("scope", &self.scope.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::Dependency;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_attributes_resolved_once_at_wrap() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        let scope = Scope::local("class_once").unwrap();

        let class = scope
            .wrap(ClassDef::new("Stamp").attr(
                Param::new("stamp").inject(Dependency::provider(|| {
                    CALLS.fetch_add(1, Ordering::SeqCst)
                })),
            ))
            .unwrap();

        let first = *class.get::<u32>("stamp").unwrap();
        let second = *class.get::<u32>("stamp").unwrap();
        assert_eq!(first, second);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_later_registration_not_seen_by_wrapped_class() {
        let scope = Scope::local("class_snapshot").unwrap();
        scope.set("service", String::from("v1"));

        let class = scope
            .wrap(ClassDef::new("Svc").attr(Param::new("service").inject(Dependency::key("service"))))
            .unwrap();

        scope.set("service", String::from("v2"));
        assert_eq!(class.cloned::<String>("service").unwrap(), "v1");
    }

    #[test]
    fn test_annotated_attribute_uses_scope_then_default() {
        let scope = Scope::local("class_annotated").unwrap();
        scope.set("class_annotated_level", String::from("debug"));

        let class = scope
            .wrap(
                ClassDef::new("Cfg")
                    .attr(Param::new("class_annotated_level").annotated(String::from("info")))
                    .attr(Param::new("class_annotated_mode").annotated(String::from("fast"))),
            )
            .unwrap();

        assert_eq!(class.cloned::<String>("class_annotated_level").unwrap(), "debug");
        assert_eq!(class.cloned::<String>("class_annotated_mode").unwrap(), "fast");
    }

    #[test]
    fn test_unresolvable_attribute_fails_with_class_name() {
        let scope = Scope::local("class_missing").unwrap();
        let err = scope
            .wrap(ClassDef::new("Broken").attr(
                Param::new("svc").inject(Dependency::key("class_missing_service")),
            ))
            .unwrap_err();

        assert_eq!(err.to_string(), "Broken() missing 1 required argument: 'svc'");
    }

    #[test]
    fn test_set_attr_replaces_value() {
        let scope = Scope::local("class_set_attr").unwrap();
        let mut class = scope
            .wrap(ClassDef::new("C").attr(Param::new("n").with_default(1u8)))
            .unwrap();

        class.set_attr("n", 2u8);
        class.set_attr("extra", "added");
        assert_eq!(*class.get::<u8>("n").unwrap(), 2);
        assert_eq!(*class.get::<&str>("extra").unwrap(), "added");
        assert_eq!(class.attributes().len(), 2);
    }
}
