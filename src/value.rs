//! Type-erased values stored in scopes and passed to wrapped callables.

use crate::{DiError, Result};
use std::any::Any;
use std::sync::Arc;

/// A shared, type-erased value.
///
/// Everything a scope stores, a provider produces, or a caller passes as an
/// argument ends up as a `Value`. Cloning is an `Arc` clone.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Marker trait for types that can be registered and injected.
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
/// You never need to implement this manually.
///
/// # Examples
///
/// ```rust
/// use scope_injector::Scope;
///
/// struct Broker {
///     url: String,
/// }
///
/// // No impl needed - it just works!
/// let scope = Scope::local("docs_value").unwrap();
/// scope.set("broker", Broker { url: "redis://localhost".into() });
/// assert_eq!(scope.resolve::<Broker>("broker").unwrap().url, "redis://localhost");
/// ```
pub trait Injectable: Send + Sync + 'static {
    /// Returns the type name for debugging
    #[inline]
    fn type_name_of() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: Send + Sync + 'static> Injectable for T {}

/// Erase a concrete value into a [`Value`].
#[inline]
pub fn erase<T: Injectable>(value: T) -> Value {
    Arc::new(value)
}

/// Downcast a [`Value`] bound under `name` to `Arc<T>`.
///
/// Fails with [`DiError::TypeMismatch`] naming `name` when the stored value
/// has a different type.
#[inline]
pub fn downcast<T: Injectable>(name: &str, value: Value) -> Result<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::type_mismatch::<T>(name))
}
