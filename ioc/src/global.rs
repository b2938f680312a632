//! The process-wide container registry.
//!
//! Holds the one "current" container that bootstrap code publishes for parts
//! of the application that cannot receive it as a parameter. The registry
//! starts out empty; it is filled by [`set_global_container`] and emptied by
//! [`clear_global_container`], typically in test teardown.

use crate::container::Container;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

static GLOBAL_CONTAINER: Lazy<Mutex<Option<Container>>> = Lazy::new(|| Mutex::new(None));

/// Publishes `container` as the current container, replacing any previous one.
///
/// # Examples
///
/// ```
/// use weft_ioc::{get_global_container, set_global_container, Container};
///
/// set_global_container(Container::new());
/// assert!(get_global_container().is_some());
/// ```
pub fn set_global_container(container: Container) {
  *GLOBAL_CONTAINER.lock() = Some(container);
  tracing::debug!("global container set");
}

/// Returns a handle to the current container, if one has been set.
pub fn get_global_container() -> Option<Container> {
  GLOBAL_CONTAINER.lock().clone()
}

/// Empties the registry. The container itself is not disposed.
pub fn clear_global_container() {
  GLOBAL_CONTAINER.lock().take();
  tracing::debug!("global container cleared");
}
