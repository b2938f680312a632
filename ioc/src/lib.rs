//! # Weft IoC
//!
//! A thread-safe dependency injection container for Rust.
//!
//! Weft IoC wires the services of an application together at bootstrap. Every
//! service is registered under its type (or a trait object type) with one of
//! three lifetimes and is built on demand, with its constructor arguments
//! resolved from the same container.
//!
//! ## Core Concepts
//!
//! - **Container**: The registry of service descriptors and the singleton cache.
//! - **Lifetimes**: `Singleton` (one per container), `Transient` (one per
//!   resolution) and `Scoped` (one per [`ScopedContainer`]).
//! - **Constructor injection**: Implementation types describe their parameters
//!   through [`Injectable`]; factories are plain functions whose parameter types
//!   implement [`Parameter`]. `Option<Arc<T>>` parameters are optional.
//! - **Cycle detection**: Resolving a type that is already under construction
//!   fails with [`Error::CircularDependency`] instead of recursing forever.
//! - **Global container**: A process-wide slot for the current container,
//!   behind the `global` feature.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use weft_ioc::{implements, injectable, Container, Factory, Implementation};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct Message(String);
//!
//! struct EnglishGreeter {
//!     message: Arc<Message>,
//! }
//! injectable!(EnglishGreeter { message: Arc<Message> });
//! implements!(EnglishGreeter: dyn Greeter);
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         self.message.0.clone()
//!     }
//! }
//!
//! fn main() -> weft_ioc::Result<()> {
//!     let container = Container::new();
//!
//!     container
//!         .register_singleton::<Message>(None, Some(Factory::new(|| Message("Hello, World!".into()))))?
//!         .register_singleton::<dyn Greeter>(Some(Implementation::of::<EnglishGreeter>()), None)?;
//!
//!     let greeter = container.get::<dyn Greeter>()?;
//!     assert_eq!(greeter.greet(), "Hello, World!");
//!     Ok(())
//! }
//! ```

mod container;
mod core;
mod descriptor;
mod error;
#[cfg(feature = "global")]
mod global;
mod injection;
mod macros;
mod scope;

pub use crate::container::Container;
pub use crate::core::{Lifetime, ServiceKey};
pub use crate::descriptor::{Disposable, Factory, Implementation, Implements, ServiceDescriptor};
pub use crate::error::{BoxError, Error, Result};
#[cfg(feature = "global")]
pub use crate::global::{clear_global_container, get_global_container, set_global_container};
pub use crate::injection::{Constructor, Defaulted, Injectable, Parameter, Parameters};
pub use crate::scope::ScopedContainer;
