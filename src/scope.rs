//! Scopes: named key/value registries consulted during resolution
//!
//! There is exactly one global scope, created on first access and alive for
//! the rest of the process. Local scopes are created on demand; each one
//! checks its own bindings first and falls back to the global scope.
//!
//! ```rust
//! use scope_injector::Scope;
//!
//! Scope::global().set("docs_scope_region", String::from("eu-west-1"));
//!
//! let module = Scope::local("docs_scope_module").unwrap();
//! module.set("docs_scope_logger", String::from("FileLogger"));
//!
//! // Local bindings first, then global
//! assert!(module.contains("docs_scope_logger"));
//! assert!(module.contains("docs_scope_region"));
//!
//! // The global scope never sees local bindings
//! assert!(!Scope::global().contains("docs_scope_logger"));
//! ```

use crate::storage::ScopeStorage;
use crate::value::{Injectable, Value, downcast};
use crate::wrap::Wrap;
use crate::{DiError, Result};
use ahash::RandomState;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Name reserved for the global scope.
pub const GLOBAL_SCOPE_NAME: &str = "global";

/// The process-wide global scope.
static GLOBAL: Lazy<Scope> = Lazy::new(|| {
    #[cfg(feature = "logging")]
    debug!(target: "scope_injector", "Creating global scope");

    Scope {
        name: Arc::from(GLOBAL_SCOPE_NAME),
        storage: Arc::new(ScopeStorage::new()),
    }
});

/// Local scopes handed out by [`Scope::named`].
static NAMED: Lazy<DashMap<String, Scope, RandomState>> = Lazy::new(DashMap::default);

/// A named registry of values.
///
/// `Scope` is a cheap handle: clones share the same bindings. Wrapped
/// callables keep a clone of the scope they were wrapped in and read it on
/// every call, so values registered after wrapping are still seen.
#[derive(Clone)]
pub struct Scope {
    name: Arc<str>,
    storage: Arc<ScopeStorage>,
}

impl Scope {
    /// The global scope.
    #[inline]
    pub fn global() -> &'static Scope {
        &GLOBAL
    }

    /// Create a new local scope that falls back to the global scope.
    ///
    /// Every call creates an independent scope, even for a name used before.
    /// Use [`Scope::named`] to share one scope between call sites.
    ///
    /// # Errors
    ///
    /// Returns [`DiError::ReservedScopeName`] for [`GLOBAL_SCOPE_NAME`].
    pub fn local(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name == GLOBAL_SCOPE_NAME {
            return Err(DiError::ReservedScopeName { name });
        }

        #[cfg(feature = "logging")]
        debug!(
            target: "scope_injector",
            scope = %name,
            "Creating local scope"
        );

        Ok(Self {
            name: Arc::from(name),
            storage: Arc::new(ScopeStorage::with_parent(Arc::clone(&GLOBAL.storage))),
        })
    }

    /// Get the local scope registered under `name`, creating it on first use.
    ///
    /// [`GLOBAL_SCOPE_NAME`] returns the global scope.
    pub fn named(name: &str) -> Scope {
        if name == GLOBAL_SCOPE_NAME {
            return Scope::clone(&GLOBAL);
        }
        if let Some(scope) = NAMED.get(name) {
            return Scope::clone(&scope);
        }

        let entry = NAMED.entry(name.to_string()).or_insert_with(|| {
            #[cfg(feature = "logging")]
            debug!(
                target: "scope_injector",
                scope = name,
                "Creating named local scope"
            );

            Self {
                name: Arc::from(name),
                storage: Arc::new(ScopeStorage::with_parent(Arc::clone(&GLOBAL.storage))),
            }
        });
        Scope::clone(&entry)
    }

    /// Scope name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the global scope
    #[inline]
    pub fn is_global(&self) -> bool {
        !self.storage.has_parent()
    }

    /// Whether two handles refer to the same scope
    #[inline]
    pub fn same_scope(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Bind `key` to `value` in this scope, replacing any previous binding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scope_injector::Scope;
    ///
    /// let scope = Scope::local("docs_set").unwrap();
    /// scope.set("port", 3306u16);
    /// scope.set("port", 5432u16);
    /// assert_eq!(*scope.resolve::<u16>("port").unwrap(), 5432);
    /// ```
    #[inline]
    pub fn set<T: Injectable>(&self, key: impl Into<String>, value: T) {
        self.set_value(key, Arc::new(value));
    }

    /// Bind `key` to an existing `Arc`, sharing it
    #[inline]
    pub fn set_arc<T: Injectable>(&self, key: impl Into<String>, value: Arc<T>) {
        self.set_value(key, value);
    }

    /// Bind `key` to an already erased value
    pub fn set_value(&self, key: impl Into<String>, value: Value) {
        let key = key.into();

        #[cfg(feature = "logging")]
        debug!(
            target: "scope_injector",
            scope = %self.name,
            key = %key,
            bindings = self.storage.len() + 1,
            "Registering value"
        );

        self.storage.insert(key, value);
    }

    /// Remove `key` from this scope. Global bindings are not touched from a
    /// local scope. Returns whether a binding was removed.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.storage.remove(key);

        #[cfg(feature = "logging")]
        debug!(
            target: "scope_injector",
            scope = %self.name,
            key = key,
            removed,
            "Removing value"
        );

        removed
    }

    /// Remove every binding from this scope
    pub fn clear(&self) {
        #[cfg(feature = "logging")]
        let count = self.storage.len();

        self.storage.clear();

        #[cfg(feature = "logging")]
        debug!(
            target: "scope_injector",
            scope = %self.name,
            removed = count,
            "Scope cleared"
        );
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Look `key` up here, then in the global scope.
    #[inline]
    pub fn get(&self, key: &str) -> Option<Value> {
        let value = self.storage.get_from_chain(key);

        #[cfg(feature = "logging")]
        trace!(
            target: "scope_injector",
            scope = %self.name,
            key = key,
            found = value.is_some(),
            "Scope lookup"
        );

        value
    }

    /// Look `key` up in this scope only, without the global fallback
    #[inline]
    pub fn get_local(&self, key: &str) -> Option<Value> {
        self.storage.get(key)
    }

    /// Typed lookup.
    ///
    /// `Ok(None)` when unbound, [`DiError::TypeMismatch`] when bound to
    /// another type.
    pub fn lookup<T: Injectable>(&self, key: &str) -> Result<Option<Arc<T>>> {
        self.get(key).map(|v| downcast::<T>(key, v)).transpose()
    }

    /// Typed lookup that fails with [`DiError::NotFound`] when unbound.
    pub fn resolve<T: Injectable>(&self, key: &str) -> Result<Arc<T>> {
        self.lookup::<T>(key)?.ok_or_else(|| DiError::not_found(key))
    }

    /// Typed lookup, `None` when unbound or of another type
    #[inline]
    pub fn try_get<T: Injectable>(&self, key: &str) -> Option<Arc<T>> {
        self.lookup::<T>(key).ok().flatten()
    }

    /// Whether `key` is bound here or in the global scope
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.storage.contains_in_chain(key)
    }

    /// Whether `key` is bound in this scope itself
    #[inline]
    pub fn contains_local(&self, key: &str) -> bool {
        self.storage.contains(key)
    }

    /// Keys bound in this scope (not including the global fallback)
    pub fn keys(&self) -> Vec<String> {
        self.storage.keys()
    }

    /// Number of bindings in this scope (not including the global fallback)
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    // =========================================================================
    // Wrapping
    // =========================================================================

    /// Make `target` injection-aware, resolving against this scope.
    ///
    /// See [`Wrap`] for the supported target shapes.
    pub fn wrap<W: Wrap>(&self, target: W) -> Result<W::Output> {
        target.wrap_in(self)
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("storage", &self.storage)
            .finish()
    }
}
