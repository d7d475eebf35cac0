//! Error types for dependency injection

use thiserror::Error;

/// Boxed error produced by providers and wrapped bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while registering, resolving or calling
#[derive(Error, Debug)]
pub enum DiError {
    /// One or more required parameters could not be resolved.
    ///
    /// The message has the same shape as a native missing-argument error,
    /// e.g. `connect() missing 1 required argument: 'database'`.
    #[error(
        "{callable}() missing {} required {}: {}",
        count(.params),
        argument_noun(.params),
        quote_names(.params)
    )]
    MissingDependency {
        callable: String,
        params: Vec<String>,
    },

    /// A provider returned an error. `source` is the provider's own error.
    #[error("provider for '{name}' failed: {source}")]
    ProviderFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    /// A dependency descriptor was constructed with an unusable source
    #[error("invalid dependency: {reason}")]
    InvalidDependency { reason: String },

    /// Key is not bound in the scope (or its fallback)
    #[error("no value bound for key '{key}'")]
    NotFound { key: String },

    /// Value exists but has a different type than requested
    #[error("value for '{name}' is not of type {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    /// More positional values than declared parameters
    #[error("{callable}() takes {expected} arguments but {given} were given")]
    TooManyArguments {
        callable: String,
        expected: usize,
        given: usize,
    },

    /// Named value for a parameter the callable does not declare
    #[error("{callable}() got an unexpected argument '{name}'")]
    UnexpectedArgument { callable: String, name: String },

    /// Same parameter supplied positionally and by name
    #[error("{callable}() got multiple values for argument '{name}'")]
    MultipleValues { callable: String, name: String },

    /// A local scope was requested under the global scope's name
    #[error("scope name '{name}' is reserved for the global scope")]
    ReservedScopeName { name: String },

    /// Error raised by the body of a wrapped callable
    #[error("{0}")]
    Call(#[source] BoxError),
}

impl DiError {
    /// Create a MissingDependency error
    #[inline]
    pub fn missing(callable: impl Into<String>, params: Vec<String>) -> Self {
        Self::MissingDependency {
            callable: callable.into(),
            params,
        }
    }

    /// Create a TypeMismatch error for `T`
    #[inline]
    pub fn type_mismatch<T: 'static>(name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Create a NotFound error
    #[inline]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Wrap an error raised inside a wrapped body
    #[inline]
    pub fn call(err: impl Into<BoxError>) -> Self {
        Self::Call(err.into())
    }

    /// Names of the unresolved parameters, if this is a MissingDependency
    pub fn missing_params(&self) -> &[String] {
        match self {
            Self::MissingDependency { params, .. } => params.as_slice(),
            _ => &[],
        }
    }
}

fn count(names: &[String]) -> usize {
    names.len()
}

fn argument_noun(names: &[String]) -> &'static str {
    if names.len() == 1 { "argument" } else { "arguments" }
}

fn quote_names(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [first, second] => format!("{first} and {second}"),
        [head @ .., last] => format!("{}, and {last}", head.join(", ")),
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;
