//! Registration records and the builders used to create them.

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::Container;
use crate::core::{erase, Instance, Lifetime, ServiceKey};
use crate::error::{BoxError, Error, Result};
use crate::injection::{Constructor, Injectable, Parameters};

pub(crate) type Activator = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;
pub(crate) type Disposer = Arc<dyn Fn(&Instance) -> Result<(), BoxError> + Send + Sync>;

/// Converts a shared implementation into the service type it is registered as.
///
/// Every type implements this for itself. To register a concrete type against
/// a trait object, implement it for that trait, usually through the
/// [`implements!`](crate::implements) macro.
pub trait Implements<S: ?Sized>: Send + Sync + 'static {
  fn upcast(self: Arc<Self>) -> Arc<S>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
  fn upcast(self: Arc<Self>) -> Arc<T> {
    self
  }
}

/// The disposal capability a registered service may expose.
///
/// `Container::dispose` and `ScopedContainer::dispose` call it on every cached
/// instance whose registration opted in. Errors are logged and ignored.
pub trait Disposable: Send + Sync {
  fn dispose(&self) -> Result<(), BoxError>;
}

fn disposer_for<S, F>(on_dispose: F) -> Disposer
where
  S: ?Sized + Any + Send + Sync,
  F: Fn(&S) -> Result<(), BoxError> + Send + Sync + 'static,
{
  Arc::new(move |instance: &Instance| match instance.downcast_ref::<Arc<S>>() {
    Some(service) => on_dispose(service),
    None => Ok(()),
  })
}

/// A concrete type the container constructs for service `S`.
pub struct Implementation<S: ?Sized> {
  name: &'static str,
  activator: Activator,
  disposer: Option<Disposer>,
  _service: PhantomData<fn() -> Arc<S>>,
}

impl<S: ?Sized + Any + Send + Sync> Implementation<S> {
  /// Constructs `S` by building an `I` through its `Injectable` impl.
  pub fn of<I>() -> Self
  where
    I: Injectable + Implements<S>,
  {
    let name = type_name::<I>();
    let activator: Activator = Arc::new(move |container: &Container| {
      let mut params = Parameters::new(container, name);
      let value = I::inject(&mut params)?;
      Ok(erase::<S>(<I as Implements<S>>::upcast(Arc::new(value))))
    });
    Self {
      name,
      activator,
      disposer: None,
      _service: PhantomData,
    }
  }

  pub fn on_dispose<F>(mut self, on_dispose: F) -> Self
  where
    F: Fn(&S) -> Result<(), BoxError> + Send + Sync + 'static,
  {
    self.disposer = Some(disposer_for::<S, F>(on_dispose));
    self
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl<S: ?Sized + Disposable + Any> Implementation<S> {
  /// Calls `S::dispose` when the owning container or scope is disposed.
  pub fn disposable(self) -> Self {
    self.on_dispose(|service: &S| service.dispose())
  }
}

/// A constructor function for service `S`.
///
/// Any `Fn` of up to eight parameters qualifies, provided each parameter type
/// implements [`Parameter`](crate::Parameter). Parameters are resolved in the
/// order they are declared.
pub struct Factory<S: ?Sized> {
  activator: Activator,
  disposer: Option<Disposer>,
  _service: PhantomData<fn() -> Arc<S>>,
}

impl<S: ?Sized + Any + Send + Sync> Factory<S> {
  pub fn new<F, Args, T>(factory: F) -> Self
  where
    F: Constructor<Args, Output = T>,
    Args: 'static,
    T: Implements<S>,
  {
    let name = type_name::<S>();
    let activator: Activator = Arc::new(move |container: &Container| {
      let mut params = Parameters::new(container, name);
      let value = factory.construct(&mut params)?;
      Ok(erase::<S>(<T as Implements<S>>::upcast(Arc::new(value))))
    });
    Self {
      activator,
      disposer: None,
      _service: PhantomData,
    }
  }

  /// Like [`Factory::new`], for factories that can fail.
  ///
  /// A returned `weft_ioc::Error` propagates as is; any other error becomes
  /// `Error::Construction` with the original as its source.
  pub fn try_new<F, Args, T, E>(factory: F) -> Self
  where
    F: Constructor<Args, Output = std::result::Result<T, E>>,
    Args: 'static,
    T: Implements<S>,
    E: Into<BoxError> + 'static,
  {
    let name = type_name::<S>();
    let activator: Activator = Arc::new(move |container: &Container| {
      let mut params = Parameters::new(container, name);
      let value = factory
        .construct(&mut params)?
        .map_err(|err| Error::construction(name, err))?;
      Ok(erase::<S>(<T as Implements<S>>::upcast(Arc::new(value))))
    });
    Self {
      activator,
      disposer: None,
      _service: PhantomData,
    }
  }

  pub fn on_dispose<F>(mut self, on_dispose: F) -> Self
  where
    F: Fn(&S) -> Result<(), BoxError> + Send + Sync + 'static,
  {
    self.disposer = Some(disposer_for::<S, F>(on_dispose));
    self
  }
}

impl<S: ?Sized + Disposable + Any> Factory<S> {
  /// Calls `S::dispose` when the owning container or scope is disposed.
  pub fn disposable(self) -> Self {
    self.on_dispose(|service: &S| service.dispose())
  }
}

/// An immutable registration record.
///
/// Binds a service key to the way its values are produced and to the
/// lifetime that governs how many of them may exist.
#[derive(Clone)]
pub struct ServiceDescriptor {
  service: ServiceKey,
  implementation_name: &'static str,
  implementation: Option<Activator>,
  factory: Option<Activator>,
  lifetime: Lifetime,
  instance: Option<Instance>,
  disposer: Option<Disposer>,
}

impl ServiceDescriptor {
  /// Creates a descriptor for service `S`.
  ///
  /// Fails with `Error::InvalidRegistration` when neither an implementation
  /// nor a factory is given. If both are given the factory is used.
  pub fn new<S: ?Sized + Any + Send + Sync>(
    implementation: Option<Implementation<S>>,
    factory: Option<Factory<S>>,
    lifetime: Lifetime,
  ) -> Result<Self> {
    let service = ServiceKey::of::<S>();
    if implementation.is_none() && factory.is_none() {
      return Err(Error::InvalidRegistration {
        service: service.name(),
      });
    }

    let implementation_name = implementation
      .as_ref()
      .map_or(service.name(), |implementation| implementation.name);
    let (factory, factory_disposer) = match factory {
      Some(f) => (Some(f.activator), f.disposer),
      None => (None, None),
    };
    let (implementation, implementation_disposer) = match implementation {
      Some(i) => (Some(i.activator), i.disposer),
      None => (None, None),
    };

    Ok(Self {
      service,
      implementation_name,
      implementation,
      factory,
      lifetime,
      instance: None,
      disposer: factory_disposer.or(implementation_disposer),
    })
  }

  /// Creates a singleton descriptor around an already built value.
  pub fn from_instance<S: ?Sized + Any + Send + Sync>(instance: Arc<S>) -> Self {
    Self::instance_with_disposer(instance, None)
  }

  /// Like [`ServiceDescriptor::from_instance`], disposing the value with its
  /// container.
  pub fn from_disposable_instance<S: ?Sized + Disposable + Any>(instance: Arc<S>) -> Self {
    let disposer = disposer_for::<S, _>(|service: &S| service.dispose());
    Self::instance_with_disposer(instance, Some(disposer))
  }

  fn instance_with_disposer<S: ?Sized + Any + Send + Sync>(
    instance: Arc<S>,
    disposer: Option<Disposer>,
  ) -> Self {
    let service = ServiceKey::of::<S>();
    Self {
      service,
      implementation_name: service.name(),
      implementation: None,
      factory: None,
      lifetime: Lifetime::Singleton,
      instance: Some(erase(instance)),
      disposer,
    }
  }

  pub fn service(&self) -> ServiceKey {
    self.service
  }

  pub fn implementation_name(&self) -> &'static str {
    self.implementation_name
  }

  pub fn lifetime(&self) -> Lifetime {
    self.lifetime
  }

  pub fn has_factory(&self) -> bool {
    self.factory.is_some()
  }

  pub fn has_instance(&self) -> bool {
    self.instance.is_some()
  }

  pub fn is_disposable(&self) -> bool {
    self.disposer.is_some()
  }

  pub(crate) fn instance(&self) -> Option<&Instance> {
    self.instance.as_ref()
  }

  pub(crate) fn disposer(&self) -> Option<&Disposer> {
    self.disposer.as_ref()
  }

  /// Builds a new value, preferring the factory over the implementation.
  pub(crate) fn activate(&self, container: &Container) -> Result<Instance> {
    if let Some(factory) = &self.factory {
      return factory(container);
    }
    if let Some(implementation) = &self.implementation {
      return implementation(container);
    }
    match &self.instance {
      Some(instance) => Ok(instance.clone()),
      None => Err(Error::InvalidRegistration {
        service: self.service.name(),
      }),
    }
  }
}

impl fmt::Debug for ServiceDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ServiceDescriptor")
      .field("service", &self.service)
      .field("implementation", &self.implementation_name)
      .field("lifetime", &self.lifetime)
      .field("has_factory", &self.factory.is_some())
      .field("has_instance", &self.instance.is_some())
      .finish()
  }
}
