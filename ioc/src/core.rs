//! Core data structures shared by the container and its scopes.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::descriptor::ServiceDescriptor;
use crate::error::{Error, Result};

/// The stable identity a service is registered and resolved under.
///
/// Two keys are equal when they were created for the same type. The type name
/// is carried along only for diagnostics.
#[derive(Clone, Copy)]
pub struct ServiceKey {
  type_id: TypeId,
  type_name: &'static str,
}

impl ServiceKey {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: type_name::<T>(),
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.type_id
  }

  pub fn name(&self) -> &'static str {
    self.type_name
  }
}

impl PartialEq for ServiceKey {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id
  }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
  }
}

impl fmt::Debug for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Key({})", self.type_name)
  }
}

impl fmt::Display for ServiceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.type_name)
  }
}

/// How many instances of a service may exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
  /// One instance per `Container`, built on first resolution.
  Singleton,
  /// A new instance on every resolution.
  Transient,
  /// One instance per `ScopedContainer`.
  Scoped,
}

impl fmt::Display for Lifetime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Lifetime::Singleton => f.write_str("singleton"),
      Lifetime::Transient => f.write_str("transient"),
      Lifetime::Scoped => f.write_str("scoped"),
    }
  }
}

/// A type-erased service value. The payload is always an `Arc<S>` for the
/// service type `S` it was registered under, which lets unsized services
/// (trait objects) travel through the same maps as concrete ones.
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) fn erase<S: ?Sized + Any + Send + Sync>(value: Arc<S>) -> Instance {
  Arc::new(value)
}

pub(crate) fn downcast<S: ?Sized + Any + Send + Sync>(instance: &Instance) -> Result<Arc<S>> {
  instance.downcast_ref::<Arc<S>>().cloned().ok_or_else(|| {
    Error::Internal(format!(
      "stored instance does not match service type {}",
      type_name::<S>()
    ))
  })
}

/// Everything the container's lock protects.
#[derive(Default)]
pub(crate) struct Registry {
  pub(crate) services: HashMap<ServiceKey, Arc<ServiceDescriptor>>,
  pub(crate) instances: HashMap<ServiceKey, Instance>,
  // Ordered so a cycle error can report the path that led back to a key.
  pub(crate) resolving: Vec<ServiceKey>,
}

impl Registry {
  pub(crate) fn check_cycle(&self, key: ServiceKey) -> Result<()> {
    match self.resolving.iter().position(|k| *k == key) {
      Some(start) => Err(Error::circular(key, &self.resolving[start..])),
      None => Ok(()),
    }
  }
}

/// An RAII guard marking a service as under construction.
///
/// Pushes the key onto the resolution stack when created and pops it when
/// dropped, so the stack is restored whether construction succeeds, fails,
/// or unwinds.
pub(crate) struct ResolutionGuard<'a> {
  registry: &'a RefCell<Registry>,
  key: ServiceKey,
}

impl<'a> ResolutionGuard<'a> {
  pub(crate) fn enter(registry: &'a RefCell<Registry>, key: ServiceKey) -> Self {
    registry.borrow_mut().resolving.push(key);
    Self { registry, key }
  }
}

impl Drop for ResolutionGuard<'_> {
  fn drop(&mut self) {
    let mut registry = self.registry.borrow_mut();
    if let Some(pos) = registry.resolving.iter().rposition(|k| *k == self.key) {
      registry.resolving.remove(pos);
    }
  }
}
