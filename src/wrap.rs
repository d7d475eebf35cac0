//! Wrapping adapter
//!
//! [`Wrap`] turns a declared target into its injection-aware form:
//!
//! | declared            | wrapped                   | resolution            |
//! |---------------------|---------------------------|-----------------------|
//! | [`Function`]        | [`Injected`]              | every call            |
//! | [`Method`] (instance/class) | [`InjectedMethod`] | every call, receiver excluded |
//! | [`Method::static_fn`] | [`Injected`]            | every call            |
//! | [`ClassDef`]        | [`Class`]                 | once, at wrap time    |
//!
//! Wrapping something that is already wrapped returns it unchanged.
//!
//! ```rust
//! use scope_injector::{Args, Function, Result, Scope, signature};
//!
//! let scope = Scope::local("docs_wrap").unwrap();
//! scope.set("greeting", String::from("hello"));
//!
//! let greet = scope
//!     .wrap(Function::new("greet", signature![greeting, name = String::from("world")], |args| {
//!         let greeting = args.get::<String>("greeting")?;
//!         let name = args.get::<String>("name")?;
//!         Ok(format!("{greeting}, {name}"))
//!     }))
//!     .unwrap();
//!
//! assert_eq!(greet.call(Args::new()).unwrap(), "hello, world");
//! assert_eq!(
//!     greet.call(Args::new().named("name", String::from("rust"))).unwrap(),
//!     "hello, rust"
//! );
//! ```

use crate::class::{Class, ClassDef};
use crate::engine;
use crate::scope::Scope;
use crate::signature::{Args, Arguments, Signature};
use crate::Result;
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Something that can be made injection-aware.
pub trait Wrap: Sized {
    /// The wrapped form
    type Output;

    /// Wrap `self`, capturing `scope` as the owning scope.
    fn wrap_in(self, scope: &Scope) -> Result<Self::Output>;
}

/// Wrap `target` against the global scope.
///
/// Equivalent to `Scope::global().wrap(target)`.
pub fn wrap<W: Wrap>(target: W) -> Result<W::Output> {
    Scope::global().wrap(target)
}

/// Shape of a wrapped callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Function,
    Method,
    ClassMethod,
    StaticMethod,
}

// =============================================================================
// Functions
// =============================================================================

/// A declared function: name, parameter table and body.
pub struct Function<F> {
    name: String,
    kind: CallKind,
    signature: Signature,
    body: F,
}

impl<F> Function<F> {
    /// Declare a plain function.
    pub fn new<R>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&Arguments) -> Result<R>,
    {
        Self {
            name: name.into(),
            kind: CallKind::Function,
            signature,
            body,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

struct InjectedFn<F> {
    name: String,
    kind: CallKind,
    signature: Signature,
    scope: Scope,
    body: F,
}

/// An injection-aware function (or static method).
///
/// Cloning is cheap and shares the signature, its dependency caches and
/// the owning scope.
pub struct Injected<F> {
    inner: Arc<InjectedFn<F>>,
}

impl<F> Clone for Injected<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> Injected<F> {
    /// Resolve missing arguments from the owning scope and run the body.
    pub fn call<R>(&self, args: Args) -> Result<R>
    where
        F: Fn(&Arguments) -> Result<R>,
    {
        let inner = &*self.inner;
        let arguments = engine::resolve(&inner.name, &inner.signature, &inner.scope, args)?;
        (inner.body)(&arguments)
    }

    /// Name as it appears in errors (`Owner.name` for static methods)
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn kind(&self) -> CallKind {
        self.inner.kind
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    /// The scope captured at wrap time
    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }
}

impl<F> std::fmt::Debug for Injected<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injected")
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .field("params", &self.inner.signature.names())
            .field("scope", &self.inner.scope.name())
            .finish()
    }
}

impl<F> Wrap for Function<F> {
    type Output = Injected<F>;

    fn wrap_in(self, scope: &Scope) -> Result<Injected<F>> {
        #[cfg(feature = "logging")]
        debug!(
            target: "scope_injector",
            callable = %self.name,
            kind = ?self.kind,
            params = self.signature.len(),
            scope = scope.name(),
            "Wrapping callable"
        );

        Ok(Injected {
            inner: Arc::new(InjectedFn {
                name: self.name,
                kind: self.kind,
                signature: self.signature,
                scope: scope.clone(),
                body: self.body,
            }),
        })
    }
}

impl<F> Wrap for Injected<F> {
    type Output = Injected<F>;

    fn wrap_in(self, _scope: &Scope) -> Result<Injected<F>> {
        #[cfg(feature = "logging")]
        trace!(
            target: "scope_injector",
            callable = %self.inner.name,
            "Callable already wrapped, keeping original scope"
        );

        Ok(self)
    }
}

// =============================================================================
// Methods
// =============================================================================

/// A declared method taking a receiver of type `S`.
///
/// The receiver is passed through untouched and never takes part in
/// injection; only the declared parameters do.
pub struct Method<S, F> {
    name: String,
    kind: CallKind,
    signature: Signature,
    body: F,
    _receiver: PhantomData<fn(&S)>,
}

impl<S, F> Method<S, F> {
    /// Declare an instance method of `owner`.
    pub fn instance<R>(owner: &str, name: &str, signature: Signature, body: F) -> Self
    where
        F: Fn(&S, &Arguments) -> Result<R>,
    {
        Self {
            name: qualified(owner, name),
            kind: CallKind::Method,
            signature,
            body,
            _receiver: PhantomData,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> CallKind {
        self.kind
    }
}

impl<F> Method<Class, F> {
    /// Declare a class method; the receiver is the wrapped [`Class`].
    pub fn class<R>(owner: &str, name: &str, signature: Signature, body: F) -> Self
    where
        F: Fn(&Class, &Arguments) -> Result<R>,
    {
        Self {
            name: qualified(owner, name),
            kind: CallKind::ClassMethod,
            signature,
            body,
            _receiver: PhantomData,
        }
    }
}

impl Method<(), ()> {
    /// Declare a static method: a function with a qualified name and no
    /// receiver.
    pub fn static_fn<F, R>(owner: &str, name: &str, signature: Signature, body: F) -> Function<F>
    where
        F: Fn(&Arguments) -> Result<R>,
    {
        Function {
            name: qualified(owner, name),
            kind: CallKind::StaticMethod,
            signature,
            body,
        }
    }
}

fn qualified(owner: &str, name: &str) -> String {
    format!("{owner}.{name}")
}

struct InjectedMethodInner<F> {
    name: String,
    kind: CallKind,
    signature: Signature,
    scope: Scope,
    body: F,
}

/// An injection-aware instance or class method.
pub struct InjectedMethod<S, F> {
    inner: Arc<InjectedMethodInner<F>>,
    _receiver: PhantomData<fn(&S)>,
}

impl<S, F> Clone for InjectedMethod<S, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _receiver: PhantomData,
        }
    }
}

impl<S, F> InjectedMethod<S, F> {
    /// Resolve missing arguments and run the body on `receiver`.
    pub fn call<R>(&self, receiver: &S, args: Args) -> Result<R>
    where
        F: Fn(&S, &Arguments) -> Result<R>,
    {
        let inner = &*self.inner;
        let arguments = engine::resolve(&inner.name, &inner.signature, &inner.scope, args)?;
        (inner.body)(receiver, &arguments)
    }

    /// Qualified name, `Owner.method`
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn kind(&self) -> CallKind {
        self.inner.kind
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    #[inline]
    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }
}

impl<S, F> std::fmt::Debug for InjectedMethod<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedMethod")
            .field("name", &self.inner.name)
            .field("kind", &self.inner.kind)
            .field("params", &self.inner.signature.names())
            .field("scope", &self.inner.scope.name())
            .finish()
    }
}

impl<S, F> Wrap for Method<S, F> {
    type Output = InjectedMethod<S, F>;

    fn wrap_in(self, scope: &Scope) -> Result<InjectedMethod<S, F>> {
        #[cfg(feature = "logging")]
        debug!(
            target: "scope_injector",
            callable = %self.name,
            kind = ?self.kind,
            params = self.signature.len(),
            scope = scope.name(),
            "Wrapping method"
        );

        Ok(InjectedMethod {
            inner: Arc::new(InjectedMethodInner {
                name: self.name,
                kind: self.kind,
                signature: self.signature,
                scope: scope.clone(),
                body: self.body,
            }),
            _receiver: PhantomData,
        })
    }
}

impl<S, F> Wrap for InjectedMethod<S, F> {
    type Output = InjectedMethod<S, F>;

    fn wrap_in(self, _scope: &Scope) -> Result<InjectedMethod<S, F>> {
        #[cfg(feature = "logging")]
        trace!(
            target: "scope_injector",
            callable = %self.inner.name,
            "Method already wrapped, keeping original scope"
        );

        Ok(self)
    }
}

// =============================================================================
// Classes
// =============================================================================

impl Wrap for ClassDef {
    type Output = Class;

    fn wrap_in(self, scope: &Scope) -> Result<Class> {
        let (name, attributes) = self.into_parts();

        #[cfg(feature = "logging")]
        debug!(
            target: "scope_injector",
            class = %name,
            attributes = attributes.len(),
            scope = scope.name(),
            "Resolving class attributes"
        );

        let resolved = engine::resolve(&name, &attributes, scope, Args::new())?;
        Ok(Class::new(name, resolved, scope.clone()))
    }
}

impl Wrap for Class {
    type Output = Class;

    fn wrap_in(self, _scope: &Scope) -> Result<Class> {
        #[cfg(feature = "logging")]
        trace!(
            target: "scope_injector",
            class = self.name(),
            "Class already resolved"
        );

        Ok(self)
    }
}
