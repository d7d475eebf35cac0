//! # scope-injector - Scope-Based Dependency Injection
//!
//! Fill in the arguments a caller leaves out from named scopes. You wrap
//! functions, methods and classes once. Every call then resolves what is
//! missing: explicit arguments first, then dependency descriptors, then
//! scope bindings under the parameter's own name, then defaults.
//!
//! ## Features
//!
//! - 🌍 **Global + local scopes** - local scopes fall back to one process-wide global scope
//! - 🔑 **Keyed dependencies** - read a named binding from the owning scope on every call
//! - 🏭 **Providers** - fresh value per call, or computed once and cached
//! - 🎯 **Explicit wins** - a supplied argument always overrides injection
//! - 🧱 **Classes** - attributes resolved once, at wrap time
//! - ❓ **Clear errors** - every unresolvable parameter named in one error
//! - 📊 **Observable** - optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use scope_injector::{Args, Function, Scope, signature};
//!
//! let app = Scope::local("docs_quickstart").unwrap();
//! app.set("database", String::from("MySQL Connection"));
//!
//! let connect = app
//!     .wrap(Function::new("connect", signature![database], |args| {
//!         Ok(format!("connected to {}", args.get::<String>("database")?))
//!     }))
//!     .unwrap();
//!
//! assert_eq!(connect.call(Args::new()).unwrap(), "connected to MySQL Connection");
//! assert_eq!(
//!     connect.call(Args::new().named("database", String::from("PostgreSQL"))).unwrap(),
//!     "connected to PostgreSQL"
//! );
//! ```
//!
//! ## Dependencies
//!
//! ```rust
//! use scope_injector::{Args, Dependency, Function, Scope, signature};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! static NEXT: AtomicU64 = AtomicU64::new(0);
//!
//! let scope = Scope::local("docs_dependencies").unwrap();
//! scope.set("primary_db", String::from("MySQL"));
//!
//! let info = scope
//!     .wrap(Function::new(
//!         "get_info",
//!         signature![
//!             db => Dependency::key("primary_db"),
//!             id => Dependency::provider(|| NEXT.fetch_add(1, Ordering::SeqCst)),
//!             ts => Dependency::cached(|| NEXT.fetch_add(100, Ordering::SeqCst)),
//!         ],
//!         |args| Ok((*args.get::<u64>("id")?, *args.get::<u64>("ts")?)),
//!     ))
//!     .unwrap();
//!
//! let (id1, ts1) = info.call(Args::new()).unwrap();
//! let (id2, ts2) = info.call(Args::new()).unwrap();
//! assert_ne!(id1, id2);
//! assert_eq!(ts1, ts2);
//! ```
//!
//! ## Classes
//!
//! ```rust
//! use scope_injector::{ClassDef, Dependency, Param, Scope};
//!
//! let scope = Scope::local("docs_classes").unwrap();
//! scope.set("service", String::from("UserService"));
//!
//! let handler = scope
//!     .wrap(ClassDef::new("Handler").attr(Param::new("service").inject(Dependency::key("service"))))
//!     .unwrap();
//!
//! assert_eq!(handler.cloned::<String>("service").unwrap(), "UserService");
//! ```

// Lets the derive macro's `::scope_injector` paths resolve inside this crate
extern crate self as scope_injector;

mod class;
mod dependency;
mod engine;
mod error;
#[cfg(feature = "logging")]
pub mod logging;
mod scope;
mod signature;
mod storage;
mod value;
mod wrap;

pub use class::*;
pub use dependency::*;
pub use error::*;
pub use scope::*;
pub use signature::*;
pub use value::*;
pub use wrap::*;

#[cfg(feature = "derive")]
pub use scope_injector_derive::Inject;

// Re-export tracing macros for convenience when logging feature is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Args, Arguments, CallKind, Class, ClassDef, Dependency, DiError, Function, Injectable,
        Injected, InjectedMethod, Method, Param, Result, Scope, Signature, Wrap,
    };
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Debug, Clone)]
    struct Config {
        host: String,
        port: u16,
    }

    #[test]
    fn test_global_registration_and_override() {
        Scope::global().set("database", String::from("MySQL Connection"));
        Scope::global().set(
            "config",
            Config {
                host: "localhost".into(),
                port: 3306,
            },
        );

        let connect = wrap(Function::new("connect", signature![database, config], |args| {
            let database = args.get::<String>("database")?;
            let config = args.get::<Config>("config")?;
            Ok(format!("{database} @ {}:{}", config.host, config.port))
        }))
        .unwrap();

        let out = connect.call(Args::new()).unwrap();
        assert!(out.contains("MySQL Connection"));
        assert!(out.contains("localhost:3306"));

        let out = connect
            .call(Args::new().named("database", String::from("PostgreSQL")))
            .unwrap();
        assert!(out.contains("PostgreSQL"));
        assert!(out.contains("localhost:3306"));
        assert!(connect.scope().is_global());
    }

    #[test]
    fn test_local_scope_with_plain_default() {
        let module = Scope::local("my_module").unwrap();
        module.set("logger", String::from("FileLogger"));

        let process = module
            .wrap(Function::new(
                "process",
                signature![logger, data = String::from("default")],
                |args| {
                    Ok(format!(
                        "{} processed {}",
                        args.get::<String>("logger")?,
                        args.get::<String>("data")?
                    ))
                },
            ))
            .unwrap();

        let out = process.call(Args::new()).unwrap();
        assert!(out.contains("FileLogger"));
        assert!(out.contains("default"));
    }

    #[test]
    fn test_class_attribute_resolved_at_wrap() {
        let scope = Scope::local("lib_class").unwrap();
        scope.set("service", String::from("UserService"));

        let class = scope
            .wrap(ClassDef::new("Handler").attr(Param::new("service").inject(Dependency::key("service"))))
            .unwrap();

        scope.remove("service");
        assert_eq!(class.cloned::<String>("service").unwrap(), "UserService");
    }

    #[test]
    fn test_uncached_and_cached_providers() {
        static IDS: AtomicU64 = AtomicU64::new(1);
        static STAMPS: AtomicU64 = AtomicU64::new(1000);

        let get_info = Scope::local("lib_get_info")
            .unwrap()
            .wrap(Function::new(
                "get_info",
                signature![
                    id => Dependency::provider(|| IDS.fetch_add(1, Ordering::SeqCst)),
                    ts => Dependency::provider(|| STAMPS.fetch_add(1, Ordering::SeqCst)).with_cache(true),
                ],
                |args| Ok((*args.get::<u64>("id")?, *args.get::<u64>("ts")?)),
            ))
            .unwrap();

        let (id1, ts1) = get_info.call(Args::new()).unwrap();
        let (id2, ts2) = get_info.call(Args::new()).unwrap();

        assert_ne!(id1, id2);
        assert_eq!(ts1, ts2);
        assert_eq!(STAMPS.load(Ordering::SeqCst), 1001);
    }

    #[test]
    fn test_missing_dependency_names_parameter() {
        let risky = Scope::local("lib_risky")
            .unwrap()
            .wrap(Function::new("risky", signature![missing], |_| Ok(())))
            .unwrap();

        let err = risky.call(Args::new()).unwrap_err();
        assert!(matches!(err, DiError::MissingDependency { .. }));
        assert_eq!(err.missing_params(), ["missing".to_string()]);
        assert!(err.to_string().contains("'missing'"));
    }

    #[test]
    fn test_local_override_of_global_binding() {
        Scope::global().set("lib_region", String::from("eu-west-1"));
        let scope = Scope::local("lib_region_module").unwrap();

        let region = scope
            .wrap(Function::new("region", signature![lib_region], |args| {
                args.cloned::<String>("lib_region")
            }))
            .unwrap();
        assert_eq!(region.call(Args::new()).unwrap(), "eu-west-1");

        scope.set("lib_region", String::from("us-east-1"));
        assert_eq!(region.call(Args::new()).unwrap(), "us-east-1");
    }

    #[cfg(feature = "derive")]
    mod derive {
        use super::*;

        #[derive(Debug, PartialEq)]
        struct Database(&'static str);

        #[derive(Debug)]
        struct Cache;

        #[derive(Inject)]
        struct UserService {
            #[inject(key = "lib_derive_db")]
            database: Arc<Database>,
            #[inject(key = "lib_derive_primary")]
            primary: Arc<String>,
            #[inject(optional)]
            cache: Option<Arc<Cache>>,
            requests: u64,
        }

        #[test]
        fn test_derive_from_scope() {
            let scope = Scope::local("lib_derive").unwrap();
            scope.set("lib_derive_db", Database("sqlite"));
            scope.set("lib_derive_primary", String::from("replica-1"));

            let service = UserService::from_scope(&scope).unwrap();
            assert_eq!(*service.database, Database("sqlite"));
            assert_eq!(*service.primary, "replica-1");
            assert!(service.cache.is_none());
            assert_eq!(service.requests, 0);
        }

        #[test]
        fn test_derive_reports_all_missing_fields() {
            let scope = Scope::local("lib_derive_missing").unwrap();
            let err = UserService::from_scope(&scope).map(|_| ()).unwrap_err();
            assert_eq!(
                err.to_string(),
                "UserService() missing 2 required arguments: 'database' and 'primary'"
            );
        }
    }
}
