//! Dependency descriptors
//!
//! A [`Dependency`] is placed where a parameter or attribute would take a
//! default value and says how to produce the value instead: read a key from
//! the owning scope, or run a provider.
//!
//! ```rust
//! use scope_injector::Dependency;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! static NEXT_ID: AtomicU64 = AtomicU64::new(0);
//!
//! // Looked up in the owning scope on every call
//! let broker = Dependency::key("broker");
//!
//! // Fresh value on every call
//! let id = Dependency::provider(|| NEXT_ID.fetch_add(1, Ordering::SeqCst));
//!
//! // Computed on first use, then reused
//! let started = Dependency::cached(std::time::Instant::now);
//!
//! assert!(broker.is_key());
//! assert!(!id.is_cached());
//! assert!(started.is_cached());
//! ```

use crate::error::BoxError;
use crate::scope::Scope;
use crate::value::{Injectable, Value};
use crate::{DiError, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Type-erased provider function
type ProviderFn = Arc<dyn Fn() -> std::result::Result<Value, BoxError> + Send + Sync>;

/// Where a dependency's value comes from
#[derive(Clone)]
pub enum Source {
    /// Key looked up in the owning scope at resolution time
    Key(String),
    /// Zero-argument function computing the value
    Provider(ProviderFn),
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Source::Provider(_) => f.write_str("Provider(<fn>)"),
        }
    }
}

/// Marker describing how to resolve one injection point.
///
/// Descriptors are deliberately not `Clone`: each one owns its own cache
/// cell and belongs to exactly one signature or attribute table. Build a
/// second descriptor if two callables need the same provider.
pub struct Dependency {
    source: Source,
    cache: bool,
    /// Filled the first time a cached provider succeeds
    cached: OnceCell<Value>,
}

impl Dependency {
    /// Descriptor resolved by looking `key` up in the owning scope.
    ///
    /// # Panics
    ///
    /// Panics if `key` is empty. Use [`Dependency::try_key`] to handle that
    /// case as an error.
    #[track_caller]
    pub fn key(key: impl Into<String>) -> Self {
        match Self::try_key(key) {
            Ok(dep) => dep,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of [`Dependency::key`].
    pub fn try_key(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(DiError::InvalidDependency {
                reason: "dependency key must not be empty".into(),
            });
        }
        Ok(Self::from_source(Source::Key(key)))
    }

    /// Descriptor computed by an infallible provider. Not cached.
    pub fn provider<T, F>(provider: F) -> Self
    where
        T: Injectable,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let erased: ProviderFn =
            Arc::new(move || -> std::result::Result<Value, BoxError> { Ok(Arc::new(provider())) });
        Self::from_source(Source::Provider(erased))
    }

    /// Descriptor computed by a fallible provider. Not cached.
    ///
    /// An error returned by the provider reaches the caller of the wrapped
    /// callable as [`DiError::ProviderFailed`] with the error as its source.
    pub fn try_provider<T, E, F>(provider: F) -> Self
    where
        T: Injectable,
        E: Into<BoxError>,
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        let erased: ProviderFn = Arc::new(move || -> std::result::Result<Value, BoxError> {
            provider().map(|v| Arc::new(v) as Value).map_err(Into::into)
        });
        Self::from_source(Source::Provider(erased))
    }

    /// Descriptor computed by a provider on first use and reused afterwards.
    pub fn cached<T, F>(provider: F) -> Self
    where
        T: Injectable,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::provider(provider).with_cache(true)
    }

    /// Enable or disable caching. Has no effect on keyed descriptors.
    pub fn with_cache(mut self, cache: bool) -> Self {
        #[cfg(feature = "logging")]
        if cache && self.is_key() {
            debug!(
                target: "scope_injector",
                source = ?self.source,
                "Cache flag ignored on keyed dependency"
            );
        }

        self.cache = cache && !self.is_key();
        self
    }

    fn from_source(source: Source) -> Self {
        Self {
            source,
            cache: false,
            cached: OnceCell::new(),
        }
    }

    /// The value source
    #[inline]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The key, for keyed descriptors
    #[inline]
    pub fn key_name(&self) -> Option<&str> {
        match &self.source {
            Source::Key(key) => Some(key),
            Source::Provider(_) => None,
        }
    }

    #[inline]
    pub fn is_key(&self) -> bool {
        matches!(self.source, Source::Key(_))
    }

    #[inline]
    pub fn is_cached(&self) -> bool {
        self.cache
    }

    /// Whether a cached provider has already produced its value
    #[inline]
    pub fn has_cached(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Resolve against `scope` for the injection point `name`.
    ///
    /// Returns `Ok(None)` when a keyed descriptor's key is not bound.
    pub(crate) fn resolve(&self, name: &str, scope: &Scope) -> Result<Option<Value>> {
        match &self.source {
            Source::Key(key) => Ok(scope.get(key)),
            Source::Provider(provider) if self.cache => {
                let value = self.cached.get_or_try_init(|| {
                    #[cfg(feature = "logging")]
                    debug!(
                        target: "scope_injector",
                        param = name,
                        "Cached provider initializing on first resolution"
                    );

                    provider().map_err(|source| DiError::ProviderFailed {
                        name: name.to_string(),
                        source,
                    })
                })?;
                Ok(Some(Arc::clone(value)))
            }
            Source::Provider(provider) => {
                #[cfg(feature = "logging")]
                trace!(target: "scope_injector", param = name, "Invoking provider");

                provider()
                    .map(Some)
                    .map_err(|source| DiError::ProviderFailed {
                        name: name.to_string(),
                        source,
                    })
            }
        }
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Source::Key(key) => write!(f, "Dependency({key:?})"),
            Source::Provider(_) => write!(f, "Dependency(provider, cache={})", self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn scope(name: &str) -> Scope {
        Scope::local(name).unwrap()
    }

    #[test]
    fn test_keyed_dependency_rereads_scope() {
        let scope = scope("dep_keyed");
        let dep = Dependency::key("dep_keyed_value");

        assert!(dep.resolve("p", &scope).unwrap().is_none());

        scope.set("dep_keyed_value", 1u32);
        let first = dep.resolve("p", &scope).unwrap().unwrap();
        assert_eq!(*first.downcast::<u32>().unwrap(), 1);

        scope.set("dep_keyed_value", 2u32);
        let second = dep.resolve("p", &scope).unwrap().unwrap();
        assert_eq!(*second.downcast::<u32>().unwrap(), 2);
    }

    #[test]
    fn test_uncached_provider_runs_every_time() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        let dep = Dependency::provider(|| CALLS.fetch_add(1, Ordering::SeqCst));
        let scope = scope("dep_uncached");

        let a = dep.resolve("id", &scope).unwrap().unwrap();
        let b = dep.resolve("id", &scope).unwrap().unwrap();

        assert_eq!(*a.downcast::<u32>().unwrap(), 0);
        assert_eq!(*b.downcast::<u32>().unwrap(), 1);
        assert!(!dep.has_cached());
    }

    #[test]
    fn test_cached_provider_runs_once() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        let dep = Dependency::cached(|| CALLS.fetch_add(1, Ordering::SeqCst) + 100);
        let scope = scope("dep_cached");

        assert!(!dep.has_cached());
        let a = dep.resolve("ts", &scope).unwrap().unwrap();
        let b = dep.resolve("ts", &scope).unwrap().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a.downcast::<u32>().unwrap(), 100);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(dep.has_cached());
    }

    #[test]
    fn test_cache_flag_ignored_for_keys() {
        let dep = Dependency::key("k").with_cache(true);
        assert!(!dep.is_cached());
        assert_eq!(dep.key_name(), Some("k"));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            Dependency::try_key("  "),
            Err(DiError::InvalidDependency { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "dependency key must not be empty")]
    fn test_empty_key_panics() {
        let _ = Dependency::key("");
    }

    #[test]
    fn test_provider_error_propagates_with_source() {
        #[derive(Debug)]
        struct Refused;
        impl std::fmt::Display for Refused {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("refused")
            }
        }
        impl std::error::Error for Refused {}

        let dep = Dependency::try_provider(|| Err::<u8, _>(Refused));
        let err = dep.resolve("conn", &scope("dep_err")).unwrap_err();

        match err {
            DiError::ProviderFailed { name, source } => {
                assert_eq!(name, "conn");
                assert!(source.downcast_ref::<Refused>().is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_cached_provider_is_retried() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        let dep = Dependency::try_provider(|| {
            if CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("not yet")
            } else {
                Ok(7u8)
            }
        })
        .with_cache(true);
        let scope = scope("dep_retry");

        assert!(dep.resolve("v", &scope).is_err());
        assert!(!dep.has_cached());
        let v = dep.resolve("v", &scope).unwrap().unwrap();
        assert_eq!(*v.downcast::<u8>().unwrap(), 7);
        assert!(dep.has_cached());
    }

    #[test]
    fn test_cached_provider_converges_across_threads() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        let dep = Arc::new(Dependency::cached(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            String::from("shared")
        }));
        let scope = scope("dep_threads");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dep = Arc::clone(&dep);
                let scope = scope.clone();
                std::thread::spawn(move || dep.resolve("s", &scope).unwrap().unwrap())
            })
            .collect();

        let values: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for v in &values {
            assert!(Arc::ptr_eq(v, &values[0]));
        }
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_rendering() {
        assert_eq!(format!("{:?}", Dependency::key("db")), "Dependency(\"db\")");
        assert_eq!(
            format!("{:?}", Dependency::cached(|| 1u8)),
            "Dependency(provider, cache=true)"
        );
    }
}
