//! Constructor injection.
//!
//! Instead of inspecting constructor signatures at runtime, every injectable
//! parameter type says how it is resolved through the [`Parameter`] trait:
//!
//! | Declared type       | Registered          | Not registered             |
//! |---------------------|---------------------|----------------------------|
//! | `Option<Arc<T>>`    | `Some(resolved)`    | `None`                     |
//! | `Arc<T>`            | resolved            | `Error::MissingArgument`   |
//! | `Defaulted<T>`      | resolved            | `T::default()`             |
//! | `Container`         | the resolving container                          |
//!
//! [`Parameters`] walks a constructor's parameters in declaration order.
//! Implementation types drive it from [`Injectable::inject`]; plain functions
//! and closures get the same behavior through [`Constructor`].

use std::any::{type_name, Any};
use std::ops::Deref;
use std::sync::Arc;

use crate::container::Container;
use crate::error::{Error, Result};

/// A type the container can build from its own dependencies.
///
/// Implement it by pulling each constructor argument, in declaration order,
/// from `params`. The [`injectable!`](crate::injectable) macro writes this
/// impl for you.
pub trait Injectable: Sized + Send + Sync + 'static {
  fn inject(params: &mut Parameters<'_>) -> Result<Self>;
}

/// A constructor parameter type the container knows how to supply.
pub trait Parameter: Sized + 'static {
  fn inject(params: &Parameters<'_>) -> Result<Self>;
}

/// A cursor over the parameters of one constructor call.
pub struct Parameters<'a> {
  container: &'a Container,
  target: &'static str,
  position: usize,
}

impl<'a> Parameters<'a> {
  pub(crate) fn new(container: &'a Container, target: &'static str) -> Self {
    Self {
      container,
      target,
      position: 0,
    }
  }

  /// Resolves the next parameter as a `P`.
  pub fn next<P: Parameter>(&mut self) -> Result<P> {
    let value = P::inject(self);
    self.position += 1;
    value
  }

  pub fn container(&self) -> &'a Container {
    self.container
  }

  /// The name of the type or factory being constructed.
  pub fn target(&self) -> &'static str {
    self.target
  }

  /// Zero-based position of the parameter currently being resolved.
  pub fn position(&self) -> usize {
    self.position
  }

  fn missing<T: ?Sized>(&self) -> Error {
    Error::MissingArgument {
      target: self.target,
      position: self.position,
      parameter: type_name::<T>(),
    }
  }
}

impl<T: ?Sized + Any + Send + Sync> Parameter for Arc<T> {
  fn inject(params: &Parameters<'_>) -> Result<Self> {
    if params.container.is_registered::<T>() {
      params.container.get::<T>()
    } else {
      Err(params.missing::<T>())
    }
  }
}

impl<T: ?Sized + Any + Send + Sync> Parameter for Option<Arc<T>> {
  fn inject(params: &Parameters<'_>) -> Result<Self> {
    if params.container.is_registered::<T>() {
      params.container.get::<T>().map(Some)
    } else {
      Ok(None)
    }
  }
}

impl Parameter for Container {
  fn inject(params: &Parameters<'_>) -> Result<Self> {
    Ok(params.container.clone())
  }
}

/// A dependency that falls back to `T::default()` when `T` is not registered.
#[derive(Debug)]
pub struct Defaulted<T>(Arc<T>);

impl<T> Defaulted<T> {
  pub fn into_inner(self) -> Arc<T> {
    self.0
  }
}

impl<T> Deref for Defaulted<T> {
  type Target = T;

  fn deref(&self) -> &T {
    &self.0
  }
}

impl<T: Default + Any + Send + Sync> Parameter for Defaulted<T> {
  fn inject(params: &Parameters<'_>) -> Result<Self> {
    if params.container.is_registered::<T>() {
      params.container.get::<T>().map(Defaulted)
    } else {
      Ok(Defaulted(Arc::new(T::default())))
    }
  }
}

/// A function whose arguments can all be injected.
///
/// Implemented for every `Fn(P1, .., Pn) -> R` with `n <= 8` where each `Pi`
/// is a [`Parameter`]. `Args` is the tuple of parameter types and only exists
/// to keep the impls apart.
pub trait Constructor<Args>: Send + Sync + 'static {
  type Output;

  fn construct(&self, params: &mut Parameters<'_>) -> Result<Self::Output>;
}

macro_rules! impl_constructor {
  ($($param:ident),*) => {
    impl<Func, Out, $($param,)*> Constructor<($($param,)*)> for Func
    where
      Func: Fn($($param),*) -> Out + Send + Sync + 'static,
      $($param: Parameter,)*
    {
      type Output = Out;

      #[allow(non_snake_case, unused_variables)]
      fn construct(&self, params: &mut Parameters<'_>) -> Result<Out> {
        $(let $param = params.next::<$param>()?;)*
        Ok((self)($($param),*))
      }
    }
  };
}

impl_constructor!();
impl_constructor!(P1);
impl_constructor!(P1, P2);
impl_constructor!(P1, P2, P3);
impl_constructor!(P1, P2, P3, P4);
impl_constructor!(P1, P2, P3, P4, P5);
impl_constructor!(P1, P2, P3, P4, P5, P6);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7);
impl_constructor!(P1, P2, P3, P4, P5, P6, P7, P8);
