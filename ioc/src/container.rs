//! The main `Container` struct and its associated methods.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::core::{downcast, Instance, Lifetime, Registry, ResolutionGuard, ServiceKey};
use crate::descriptor::{Disposable, Disposer, Factory, Implementation, ServiceDescriptor};
use crate::error::{Error, Result};
use crate::scope::ScopedContainer;

/// The dependency injection container.
///
/// Holds the registrations for all services together with the cache of
/// singletons built from them. A `Container` is a cheap handle: clones share
/// the same registry, which is how scopes and the process registry refer to
/// it.
///
/// Every registration and every resolution runs under one reentrant lock. A
/// top-level `get` keeps it for the whole dependency tree it builds, so
/// singletons are constructed at most once and a factory may call back into
/// the container on the same thread.
///
/// Registering a type again replaces its descriptor and drops any singleton
/// cached for it; the last registration wins.
#[derive(Clone)]
pub struct Container {
  inner: Arc<Inner>,
}

struct Inner {
  state: ReentrantMutex<RefCell<Registry>>,
}

impl Default for Container {
  fn default() -> Self {
    Self {
      inner: Arc::new(Inner {
        state: ReentrantMutex::new(RefCell::new(Registry::default())),
      }),
    }
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  fn register_internal<S: ?Sized + Any + Send + Sync>(
    &self,
    implementation: Option<Implementation<S>>,
    factory: Option<Factory<S>>,
    lifetime: Lifetime,
  ) -> Result<&Self> {
    let descriptor = ServiceDescriptor::new(implementation, factory, lifetime)?;
    Ok(self.register(descriptor))
  }

  /// Resolves `key` to a type-erased instance.
  pub(crate) fn resolve_key(&self, key: ServiceKey) -> Result<Instance> {
    let state = self.inner.state.lock();

    let descriptor = {
      let registry = state.borrow();
      registry.check_cycle(key)?;
      let descriptor = registry
        .services
        .get(&key)
        .cloned()
        .ok_or_else(|| Error::not_registered(key))?;
      if descriptor.lifetime() == Lifetime::Singleton {
        if let Some(instance) = registry.instances.get(&key).or(descriptor.instance()) {
          return Ok(instance.clone());
        }
      }
      descriptor
    };

    let instance = {
      let _resolving = ResolutionGuard::enter(&state, key);
      descriptor.activate(self)?
    };
    tracing::trace!(
      service = key.name(),
      implementation = descriptor.implementation_name(),
      lifetime = %descriptor.lifetime(),
      "constructed service"
    );

    if descriptor.lifetime() == Lifetime::Singleton {
      let mut registry = state.borrow_mut();
      // The factory may have re-registered the type while it ran.
      let current = registry
        .services
        .get(&key)
        .is_some_and(|d| Arc::ptr_eq(d, &descriptor));
      let previous = if current {
        registry.instances.insert(key, instance.clone())
      } else {
        None
      };
      drop(registry);
      drop(previous);
    }
    Ok(instance)
  }

  /// Holds the registry lock. Resolutions on the same thread still get
  /// through; registrations from other threads wait until the guard drops.
  pub(crate) fn hold(&self) -> ReentrantMutexGuard<'_, RefCell<Registry>> {
    self.inner.state.lock()
  }

  pub(crate) fn descriptor_for(&self, key: ServiceKey) -> Option<Arc<ServiceDescriptor>> {
    let state = self.inner.state.lock();
    let registry = state.borrow();
    registry.services.get(&key).cloned()
  }

  // --- PUBLIC API ---

  /// Stores a prepared descriptor, replacing any previous registration for
  /// its service type.
  pub fn register(&self, descriptor: ServiceDescriptor) -> &Self {
    let key = descriptor.service();
    let lifetime = descriptor.lifetime();
    let implementation = descriptor.implementation_name();

    let state = self.inner.state.lock();
    // Displaced values are dropped only after the borrow ends; their `Drop`
    // may call back into this container.
    let (evicted, replaced) = {
      let mut registry = state.borrow_mut();
      let evicted = match descriptor.instance() {
        Some(instance) => registry.instances.insert(key, instance.clone()),
        None => registry.instances.remove(&key),
      };
      let replaced = registry.services.insert(key, Arc::new(descriptor));
      (evicted, replaced)
    };
    drop((evicted, replaced));
    tracing::debug!(service = key.name(), implementation, %lifetime, "registered service");
    self
  }

  // --- Lifetime Registration ---
  pub fn register_singleton<S: ?Sized + Any + Send + Sync>(
    &self,
    implementation: Option<Implementation<S>>,
    factory: Option<Factory<S>>,
  ) -> Result<&Self> {
    self.register_internal(implementation, factory, Lifetime::Singleton)
  }

  pub fn register_transient<S: ?Sized + Any + Send + Sync>(
    &self,
    implementation: Option<Implementation<S>>,
    factory: Option<Factory<S>>,
  ) -> Result<&Self> {
    self.register_internal(implementation, factory, Lifetime::Transient)
  }

  pub fn register_scoped<S: ?Sized + Any + Send + Sync>(
    &self,
    implementation: Option<Implementation<S>>,
    factory: Option<Factory<S>>,
  ) -> Result<&Self> {
    self.register_internal(implementation, factory, Lifetime::Scoped)
  }

  // --- Instance Registration ---

  /// Registers an existing value as the singleton for `S`.
  ///
  /// `get::<S>()` hands out clones of this exact `Arc` and never runs a
  /// constructor.
  pub fn register_instance<S: ?Sized + Any + Send + Sync>(&self, instance: Arc<S>) -> &Self {
    self.register(ServiceDescriptor::from_instance(instance))
  }

  pub fn register_disposable_instance<S: ?Sized + Disposable + Any>(
    &self,
    instance: Arc<S>,
  ) -> &Self {
    self.register(ServiceDescriptor::from_disposable_instance(instance))
  }

  // --- Resolution ---

  /// Resolves a service from the container.
  pub fn get<S: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<S>> {
    let instance = self.resolve_key(ServiceKey::of::<S>())?;
    downcast::<S>(&instance)
  }

  /// Resolves a service, turning every kind of failure into `None`.
  ///
  /// A missing registration, a cycle and a failing constructor all look the
  /// same from here. Use [`Container::get`] to tell them apart.
  pub fn try_get<S: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<S>> {
    match self.get::<S>() {
      Ok(service) => Some(service),
      Err(err) => {
        tracing::trace!(error = %err, "try_get swallowed resolution error");
        None
      }
    }
  }

  pub fn is_registered<S: ?Sized + Any>(&self) -> bool {
    let state = self.inner.state.lock();
    let registered = state.borrow().services.contains_key(&ServiceKey::of::<S>());
    registered
  }

  /// Returns a copy of the descriptor currently registered for `S`.
  pub fn descriptor<S: ?Sized + Any>(&self) -> Option<ServiceDescriptor> {
    self
      .descriptor_for(ServiceKey::of::<S>())
      .map(|descriptor| (*descriptor).clone())
  }

  /// Creates a child scope that caches `Scoped` services on its own.
  pub fn create_scope(&self) -> ScopedContainer {
    ScopedContainer::new(self.clone())
  }

  /// Disposes every cached singleton and empties the container.
  ///
  /// Instances registered with a disposal capability have it invoked; a
  /// failing (or panicking) disposal is logged and does not stop the others.
  /// Afterwards nothing is registered, so every `get` fails.
  pub fn dispose(&self) {
    let state = self.inner.state.lock();

    let cached: Vec<(ServiceKey, Instance, Option<Disposer>)> = {
      let registry = state.borrow();
      registry
        .instances
        .iter()
        .map(|(key, instance)| {
          let disposer = registry
            .services
            .get(key)
            .and_then(|descriptor| descriptor.disposer().cloned());
          (*key, instance.clone(), disposer)
        })
        .collect()
    };

    for (key, instance, disposer) in &cached {
      if let Some(disposer) = disposer {
        run_disposer(*key, disposer, instance);
      }
    }

    let count = cached.len();
    let emptied = {
      let mut registry = state.borrow_mut();
      std::mem::take(&mut *registry)
    };
    drop(emptied);
    drop(cached);
    tracing::debug!(disposed = count, "container disposed");
  }
}

/// Runs one disposal, logging instead of propagating its failure.
pub(crate) fn run_disposer(key: ServiceKey, disposer: &Disposer, instance: &Instance) {
  match panic::catch_unwind(AssertUnwindSafe(|| disposer(instance))) {
    Ok(Ok(())) => {}
    Ok(Err(err)) => {
      tracing::warn!(service = key.name(), error = %err, "failed to dispose service");
    }
    Err(_) => {
      tracing::warn!(service = key.name(), "service disposal panicked");
    }
  }
}

