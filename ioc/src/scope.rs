//! Child containers that own the instances of `Scoped` services.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::container::{run_disposer, Container};
use crate::core::{downcast, Instance, Lifetime, ServiceKey};
use crate::descriptor::Disposer;
use crate::error::{Error, Result};

struct ScopedEntry {
  instance: Instance,
  disposer: Option<Disposer>,
}

/// A unit of work derived from a [`Container`].
///
/// Services registered with [`Lifetime::Scoped`] are built once per scope and
/// cached here; everything else is delegated to the parent. Sibling scopes
/// never share scoped instances.
///
/// Only the requested service is cached per scope. Its own dependencies are
/// resolved by the parent, so a scoped service that depends on another scoped
/// service receives a fresh copy rather than the one cached in this scope.
pub struct ScopedContainer {
  parent: Container,
  instances: ReentrantMutex<RefCell<HashMap<ServiceKey, ScopedEntry>>>,
}

impl ScopedContainer {
  pub(crate) fn new(parent: Container) -> Self {
    Self {
      parent,
      instances: ReentrantMutex::new(RefCell::new(HashMap::new())),
    }
  }

  fn resolve_key(&self, key: ServiceKey) -> Result<Instance> {
    // The parent stays locked so the lifetime checked here is the one the
    // parent resolves with. Parent before scope, always.
    let _registrations = self.parent.hold();
    let instances = self.instances.lock();

    let descriptor = self
      .parent
      .descriptor_for(key)
      .ok_or_else(|| Error::not_registered(key))?;
    if descriptor.lifetime() != Lifetime::Scoped {
      return self.parent.resolve_key(key);
    }

    let cached = instances.borrow().get(&key).map(|entry| entry.instance.clone());
    if let Some(instance) = cached {
      return Ok(instance);
    }

    let instance = self.parent.resolve_key(key)?;
    instances.borrow_mut().insert(
      key,
      ScopedEntry {
        instance: instance.clone(),
        disposer: descriptor.disposer().cloned(),
      },
    );
    Ok(instance)
  }

  /// Resolves a service, caching it in this scope if its lifetime is
  /// `Scoped`.
  pub fn get<S: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<S>> {
    let instance = self.resolve_key(ServiceKey::of::<S>())?;
    downcast::<S>(&instance)
  }

  /// Like [`ScopedContainer::get`], turning every failure into `None`.
  pub fn try_get<S: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<S>> {
    match self.get::<S>() {
      Ok(service) => Some(service),
      Err(err) => {
        tracing::trace!(error = %err, "scope try_get swallowed resolution error");
        None
      }
    }
  }

  pub fn is_registered<S: ?Sized + Any>(&self) -> bool {
    self.parent.is_registered::<S>()
  }

  pub fn parent(&self) -> &Container {
    &self.parent
  }

  /// Disposes the instances owned by this scope and forgets them.
  ///
  /// The parent container and its singletons are left untouched.
  pub fn dispose(&self) {
    // Disposers run without the scope lock; they may resolve from the parent.
    let entries: Vec<(ServiceKey, ScopedEntry)> = {
      let instances = self.instances.lock();
      let drained = instances.borrow_mut().drain().collect();
      drained
    };

    for (key, entry) in &entries {
      if let Some(disposer) = &entry.disposer {
        run_disposer(*key, disposer, &entry.instance);
      }
    }
    tracing::debug!(disposed = entries.len(), "scope disposed");
  }
}
