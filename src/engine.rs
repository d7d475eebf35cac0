//! Injection engine
//!
//! Binds a caller's [`Args`] to a [`Signature`] the way a native call would,
//! then fills every parameter the caller left out from the owning [`Scope`].
//! Explicit arguments always win.

use crate::scope::Scope;
use crate::signature::{Args, Arguments, ParamKind, Signature};
use crate::value::Value;
use crate::{DiError, Result};

#[cfg(feature = "logging")]
use tracing::trace;

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    Explicit,
    Dependency,
    ScopeByName,
    Default,
}

/// Produce the merged argument set for one call of `callable`.
///
/// Fails with [`DiError::MissingDependency`] listing every parameter that
/// has no explicit value, no resolvable source, and no default.
pub(crate) fn resolve(
    callable: &str,
    signature: &Signature,
    scope: &Scope,
    args: Args,
) -> Result<Arguments> {
    let mut supplied = bind(callable, signature, args)?;
    let mut values = Vec::with_capacity(signature.len());
    let mut missing = Vec::new();

    for (param, explicit) in signature.params().iter().zip(supplied.iter_mut()) {
        let name = param.name();

        let resolved = match explicit.take() {
            Some(value) => Some((value, Resolution::Explicit)),
            None => match param.kind() {
                ParamKind::Inject(dep) => dep
                    .resolve(name, scope)?
                    .map(|v| (v, Resolution::Dependency)),
                ParamKind::Required => scope.get(name).map(|v| (v, Resolution::ScopeByName)),
                ParamKind::Annotated(default) => Some(match scope.get(name) {
                    Some(v) => (v, Resolution::ScopeByName),
                    None => (Value::clone(default), Resolution::Default),
                }),
                ParamKind::Default(default) => Some((Value::clone(default), Resolution::Default)),
            },
        };

        match resolved {
            Some((value, _source)) => {
                #[cfg(feature = "logging")]
                trace!(
                    target: "scope_injector",
                    callable,
                    param = name,
                    source = ?_source,
                    scope = scope.name(),
                    "Parameter resolved"
                );

                values.push((name.to_string(), value));
            }
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(DiError::missing(callable, missing));
    }

    Ok(Arguments::from_values(values))
}

/// Map caller arguments onto declaration slots.
fn bind(callable: &str, signature: &Signature, args: Args) -> Result<Vec<Option<Value>>> {
    let (positional, named) = args.into_parts();

    if positional.len() > signature.len() {
        return Err(DiError::TooManyArguments {
            callable: callable.to_string(),
            expected: signature.len(),
            given: positional.len(),
        });
    }

    let mut slots: Vec<Option<Value>> = vec![None; signature.len()];
    for (slot, value) in slots.iter_mut().zip(positional) {
        *slot = Some(value);
    }

    for (name, value) in named {
        let index = signature
            .position(&name)
            .ok_or_else(|| DiError::UnexpectedArgument {
                callable: callable.to_string(),
                name: name.clone(),
            })?;

        if slots[index].is_some() {
            return Err(DiError::MultipleValues {
                callable: callable.to_string(),
                name,
            });
        }
        slots[index] = Some(value);
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::Dependency;
    use crate::signature::Param;
    use crate::signature;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn scope(name: &str) -> Scope {
        Scope::local(name).unwrap()
    }

    #[test]
    fn test_explicit_argument_wins_over_everything() {
        let scope = scope("engine_override");
        scope.set("db", String::from("registered"));

        let sig = Signature::new()
            .param(Param::new("db"))
            .param(Param::new("key").inject(Dependency::key("db")))
            .param(Param::new("made").inject(Dependency::provider(|| String::from("provided"))))
            .param(Param::new("ann").annotated(String::from("fallback")));

        let args = Args::new()
            .named("db", String::from("explicit-db"))
            .named("key", String::from("explicit-key"))
            .named("made", String::from("explicit-made"))
            .named("ann", String::from("explicit-ann"));

        let out = resolve("f", &sig, &scope, args).unwrap();
        assert_eq!(out.cloned::<String>("db").unwrap(), "explicit-db");
        assert_eq!(out.cloned::<String>("key").unwrap(), "explicit-key");
        assert_eq!(out.cloned::<String>("made").unwrap(), "explicit-made");
        assert_eq!(out.cloned::<String>("ann").unwrap(), "explicit-ann");
    }

    #[test]
    fn test_explicit_argument_skips_provider() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        let sig = signature![id => Dependency::provider(|| CALLS.fetch_add(1, Ordering::SeqCst))];

        let out = resolve("f", &sig, &scope("engine_skip"), Args::new().positional(99u32)).unwrap();
        assert_eq!(*out.get::<u32>("id").unwrap(), 99);
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_required_param_resolved_by_name() {
        let scope = scope("engine_by_name");
        scope.set("logger", String::from("FileLogger"));

        let sig = signature![logger, data = String::from("default")];
        let out = resolve("process", &sig, &scope, Args::new()).unwrap();

        assert_eq!(out.cloned::<String>("logger").unwrap(), "FileLogger");
        assert_eq!(out.cloned::<String>("data").unwrap(), "default");
        assert_eq!(out.names(), ["logger", "data"]);
    }

    #[test]
    fn test_plain_default_is_not_injected() {
        let scope = scope("engine_plain");
        scope.set("data", String::from("from-scope"));

        let sig = signature![data = String::from("default")];
        let out = resolve("f", &sig, &scope, Args::new()).unwrap();
        assert_eq!(out.cloned::<String>("data").unwrap(), "default");
    }

    #[test]
    fn test_annotated_default_prefers_scope() {
        let scope = scope("engine_annotated");
        let sig =
            Signature::new().param(Param::new("engine_level").annotated(String::from("info")));

        let out = resolve("f", &sig, &scope, Args::new()).unwrap();
        assert_eq!(out.cloned::<String>("engine_level").unwrap(), "info");

        scope.set("engine_level", String::from("debug"));
        let out = resolve("f", &sig, &scope, Args::new()).unwrap();
        assert_eq!(out.cloned::<String>("engine_level").unwrap(), "debug");
    }

    #[test]
    fn test_keyed_dependency_uses_its_own_key() {
        let scope = scope("engine_keyed");
        scope.set("primary_db", String::from("MySQL"));

        let sig = signature![conn => Dependency::key("primary_db")];
        let out = resolve("f", &sig, &scope, Args::new()).unwrap();
        assert_eq!(out.cloned::<String>("conn").unwrap(), "MySQL");
    }

    #[test]
    fn test_unbound_key_is_missing() {
        let sig = signature![conn => Dependency::key("engine_unbound_key")];
        let err = resolve("f", &sig, &scope("engine_unbound"), Args::new()).unwrap_err();
        assert_eq!(err.missing_params(), ["conn".to_string()]);
    }

    #[test]
    fn test_missing_lists_all_names_in_order() {
        let sig = signature![engine_missing_a, present = 1u8, engine_missing_b];
        let err = resolve("f", &sig, &scope("engine_missing"), Args::new()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "f() missing 2 required arguments: 'engine_missing_a' and 'engine_missing_b'"
        );
    }

    #[test]
    fn test_positional_binding() {
        let sig = signature![a, b, c = 3u8];
        let scope = scope("engine_positional");
        scope.set("b", 20u8);

        let out = resolve("f", &sig, &scope, Args::new().positional(10u8)).unwrap();
        assert_eq!(*out.get::<u8>("a").unwrap(), 10);
        assert_eq!(*out.get::<u8>("b").unwrap(), 20);
        assert_eq!(*out.get::<u8>("c").unwrap(), 3);
    }

    #[test]
    fn test_binding_errors() {
        let sig = signature![a, b];
        let scope = scope("engine_binding");

        let err = resolve(
            "f",
            &sig,
            &scope,
            Args::new().positional(1u8).positional(2u8).positional(3u8),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DiError::TooManyArguments { expected: 2, given: 3, .. }
        ));

        let err = resolve("f", &sig, &scope, Args::new().named("z", 1u8)).unwrap_err();
        assert_eq!(err.to_string(), "f() got an unexpected argument 'z'");

        let err = resolve(
            "f",
            &sig,
            &scope,
            Args::new().positional(1u8).named("a", 2u8),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "f() got multiple values for argument 'a'");
    }

    #[test]
    fn test_provider_failure_stops_resolution() {
        let sig = signature![
            ok => Dependency::provider(|| 1u8),
            bad => Dependency::try_provider(|| Err::<u8, _>("boom")),
        ];
        let err = resolve("f", &sig, &scope("engine_provider_err"), Args::new()).unwrap_err();
        match err {
            DiError::ProviderFailed { name, source } => {
                assert_eq!(name, "bad");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_signature() {
        let out = resolve("noop", &Signature::new(), &scope("engine_empty"), Args::new()).unwrap();
        assert!(out.is_empty());
    }
}
