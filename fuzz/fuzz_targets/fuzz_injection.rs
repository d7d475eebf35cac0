#![no_main]

//! Fuzz target for call-time injection
//!
//! Builds a signature from arbitrary parameter kinds, binds arbitrary caller
//! arguments against it and checks the outcome against the resolution rules.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scope_injector::{Args, DiError, Function, Param, Scope, Signature, Dependency};

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Kind {
    Required { bound: bool },
    Default,
    Annotated { bound: bool },
    Keyed { bound: bool },
    Provider,
    Cached,
}

#[derive(Debug, Arbitrary)]
struct Scenario {
    params: Vec<Kind>,
    positional: u8,
    named: Vec<u8>,
}

fuzz_target!(|scenario: Scenario| {
    let Ok(scope) = Scope::local("fuzz_injection") else {
        return;
    };

    let kinds: Vec<Kind> = scenario.params.into_iter().take(8).collect();
    let mut signature = Signature::new();
    let mut expected_missing = Vec::new();

    for (i, kind) in kinds.iter().enumerate() {
        let name = format!("p{i}");
        let param = match *kind {
            Kind::Required { bound } => {
                if bound {
                    scope.set(name.as_str(), i as u64);
                }
                Param::new(name.as_str())
            }
            Kind::Default => Param::new(name.as_str()).with_default(i as u64),
            Kind::Annotated { bound } => {
                if bound {
                    scope.set(name.as_str(), i as u64);
                }
                Param::new(name.as_str()).annotated(i as u64)
            }
            Kind::Keyed { bound } => {
                let key = format!("key{i}");
                if bound {
                    scope.set(key.as_str(), i as u64);
                }
                Param::new(name.as_str()).inject(Dependency::key(key))
            }
            Kind::Provider => Param::new(name.as_str()).inject(Dependency::provider(move || i as u64)),
            Kind::Cached => Param::new(name.as_str()).inject(Dependency::cached(move || i as u64)),
        };
        signature = signature.param(param);
        expected_missing.push(matches!(
            kind,
            Kind::Required { bound: false } | Kind::Keyed { bound: false }
        ));
    }

    let len = kinds.len();
    let f = match scope.wrap(Function::new("fuzzed", signature, |args| Ok(args.len()))) {
        Ok(f) => f,
        Err(_) => return,
    };

    let positional = usize::from(scenario.positional) % (len + 2);
    let mut args = Args::new();
    let mut supplied = vec![false; len];
    for i in 0..positional {
        args = args.positional(1000u64 + i as u64);
        if i < len {
            supplied[i] = true;
        }
    }
    let mut duplicate = false;
    let mut unknown = false;
    for n in scenario.named.into_iter().take(4) {
        let i = usize::from(n) % (len + 1);
        if i < len {
            duplicate |= supplied[i];
            supplied[i] = true;
        } else {
            unknown = true;
        }
        args = args.named(format!("p{i}"), 2000u64);
    }

    match f.call::<usize>(args) {
        Ok(count) => {
            assert_eq!(count, len);
            assert!(positional <= len);
        }
        Err(DiError::TooManyArguments { .. }) => assert!(positional > len),
        Err(DiError::UnexpectedArgument { .. }) => assert!(unknown),
        Err(DiError::MultipleValues { .. }) => assert!(duplicate),
        Err(DiError::MissingDependency { params, .. }) => {
            for name in &params {
                let i: usize = name[1..].parse().unwrap();
                assert!(expected_missing[i] && !supplied[i]);
            }
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
});
