use weft_ioc::{injectable, Container, Error, Implementation};
use std::sync::Arc;

struct UnregisteredService;

struct NeedsUnregistered {
  _dependency: Arc<UnregisteredService>,
}
injectable!(NeedsUnregistered { _dependency: Arc<UnregisteredService> });

fn main() {
  let container = Container::new();

  // --- Using the fallible `get()` method ---
  println!("Attempting to resolve a service that was never registered...");
  match container.get::<UnregisteredService>() {
    Err(err @ Error::NotRegistered { .. }) => println!("Correctly failed: {err}"),
    Err(other) => panic!("Unexpected error: {other}"),
    Ok(_) => panic!("Should not have found the service!"),
  }

  // --- Using `try_get()`, which hides the reason ---
  assert!(container.try_get::<UnregisteredService>().is_none());
  println!("`try_get` returned `None` for the missing service.");

  // --- A registered service whose constructor needs the missing one ---
  container
    .register_transient::<NeedsUnregistered>(
      Some(Implementation::of::<NeedsUnregistered>()),
      None,
    )
    .expect("registration is valid");
  match container.get::<NeedsUnregistered>() {
    Err(err @ Error::MissingArgument { .. }) => println!("Correctly failed: {err}"),
    Err(other) => panic!("Unexpected error: {other}"),
    Ok(_) => panic!("The constructor argument cannot be supplied!"),
  }
}
