use thiserror::Error;

use crate::core::ServiceKey;

/// A boxed, thread-safe error as produced by user factories and disposers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for every fallible container operation.
#[derive(Debug, Error)]
pub enum Error {
  /// `get` was called for a type that has no descriptor.
  #[error("Service is not registered: {service}")]
  NotRegistered { service: &'static str },

  /// A type was reached again while it was still being constructed.
  #[error("Circular dependency detected while resolving service {service}: {path}")]
  CircularDependency { service: &'static str, path: String },

  /// A factory or constructor reported a failure of its own.
  #[error("Failed to construct service {service}: {source}")]
  Construction {
    service: &'static str,
    #[source]
    source: BoxError,
  },

  /// A required constructor argument could not be supplied because its type
  /// is not registered and the parameter declares no default.
  #[error("Missing argument #{position} ({parameter}) for {target}")]
  MissingArgument {
    target: &'static str,
    position: usize,
    parameter: &'static str,
  },

  /// A descriptor was created with neither a factory nor an implementation.
  #[error("Registration for {service} needs a factory or an implementation type")]
  InvalidRegistration { service: &'static str },

  #[error("Internal container error: {0}")]
  Internal(String),
}

/// A specialized `Result` type for `weft_ioc` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub(crate) fn not_registered(key: ServiceKey) -> Self {
    Error::NotRegistered { service: key.name() }
  }

  /// Builds the cycle error for `key`, given the keys currently being resolved.
  pub(crate) fn circular(key: ServiceKey, chain: &[ServiceKey]) -> Self {
    let mut path: Vec<&'static str> = chain.iter().map(|k| k.name()).collect();
    path.push(key.name());
    Error::CircularDependency {
      service: key.name(),
      path: path.join(" -> "),
    }
  }

  /// Wraps an arbitrary failure raised while constructing `service`.
  ///
  /// Container errors coming back out of a factory (for example a nested
  /// `get` that hit a cycle) are returned as they are instead of being
  /// wrapped a second time.
  pub fn construction(service: &'static str, err: impl Into<BoxError>) -> Self {
    let err: BoxError = err.into();
    match err.downcast::<Error>() {
      Ok(inner) => *inner,
      Err(source) => Error::Construction { service, source },
    }
  }

  pub fn is_not_registered(&self) -> bool {
    matches!(self, Error::NotRegistered { .. })
  }

  pub fn is_circular(&self) -> bool {
    matches!(self, Error::CircularDependency { .. })
  }
}
