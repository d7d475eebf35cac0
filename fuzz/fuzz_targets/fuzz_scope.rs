#![no_main]

//! Fuzz target for scope operations
//!
//! Interleaves bindings in local scopes and the global scope with lookups
//! and checks that local bindings shadow global ones and never leak upward.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scope_injector::Scope;

/// Keys are drawn from a small set so operations collide
#[derive(Debug, Clone, Copy, Arbitrary)]
enum Key {
    A,
    B,
    C,
    D,
}

impl Key {
    fn name(self) -> &'static str {
        match self {
            Key::A => "fuzz_scope_a",
            Key::B => "fuzz_scope_b",
            Key::C => "fuzz_scope_c",
            Key::D => "fuzz_scope_d",
        }
    }
}

#[derive(Debug, Arbitrary)]
enum ScopeOp {
    CreateLocal,
    DropLocal,
    SetGlobal(Key, u32),
    SetLocal(Key, u32),
    SetLocalString(Key, String),
    RemoveLocal(Key),
    Get(Key),
    Lookup(Key),
    ClearLocal,
}

fuzz_target!(|ops: Vec<ScopeOp>| {
    let mut locals: Vec<Scope> = Vec::new();

    for op in ops.into_iter().take(100) {
        match op {
            ScopeOp::CreateLocal => {
                if locals.len() < 10 {
                    if let Ok(scope) = Scope::local("fuzz_local") {
                        locals.push(scope);
                    }
                }
            }
            ScopeOp::DropLocal => {
                locals.pop();
            }
            ScopeOp::SetGlobal(key, value) => {
                Scope::global().set(key.name(), value);
            }
            ScopeOp::SetLocal(key, value) => {
                if let Some(scope) = locals.last() {
                    scope.set(key.name(), value);
                    assert!(scope.contains_local(key.name()));
                    assert_eq!(scope.try_get::<u32>(key.name()).as_deref(), Some(&value));
                }
            }
            ScopeOp::SetLocalString(key, value) => {
                if let Some(scope) = locals.last() {
                    scope.set(key.name(), value);
                    // Wrong type must be reported, not panic
                    assert!(scope.lookup::<u32>(key.name()).is_err());
                }
            }
            ScopeOp::RemoveLocal(key) => {
                if let Some(scope) = locals.last() {
                    scope.remove(key.name());
                    assert!(!scope.contains_local(key.name()));
                    assert_eq!(
                        scope.contains(key.name()),
                        Scope::global().contains(key.name())
                    );
                }
            }
            ScopeOp::Get(key) => {
                if let Some(scope) = locals.last() {
                    let found = scope.get(key.name()).is_some();
                    let expected =
                        scope.contains_local(key.name()) || Scope::global().contains(key.name());
                    assert_eq!(found, expected);
                }
            }
            ScopeOp::Lookup(key) => {
                let _ = Scope::global().lookup::<u32>(key.name());
                if let Some(scope) = locals.last() {
                    let _ = scope.lookup::<String>(key.name());
                }
            }
            ScopeOp::ClearLocal => {
                if let Some(scope) = locals.last() {
                    scope.clear();
                    assert!(scope.is_empty());
                }
            }
        }
    }

    // Local bindings never show up in the global scope
    assert!(!Scope::global().contains("fuzz_local_only"));
});
