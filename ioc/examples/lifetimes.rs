use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use weft_ioc::{Container, Factory};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// Separate service types so each lifetime gets its own registration.
struct SingletonTracker(RequestTracker);
struct TransientTracker(RequestTracker);
struct ScopedTracker(RequestTracker);

static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn next_tracker() -> RequestTracker {
  RequestTracker {
    id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
  }
}

fn main() -> weft_ioc::Result<()> {
  let container = Container::new();

  // This factory will only be called ONCE per container.
  container.register_singleton::<SingletonTracker>(
    None,
    Some(Factory::new(|| {
      println!("Creating SINGLETON RequestTracker...");
      SingletonTracker(next_tracker())
    })),
  )?;

  // This factory will be called EVERY time the service is resolved.
  container.register_transient::<TransientTracker>(
    None,
    Some(Factory::new(|| {
      println!("Creating TRANSIENT RequestTracker...");
      TransientTracker(next_tracker())
    })),
  )?;

  // This factory will be called once per scope.
  container.register_scoped::<ScopedTracker>(
    None,
    Some(Factory::new(|| {
      println!("Creating SCOPED RequestTracker...");
      ScopedTracker(next_tracker())
    })),
  )?;

  println!("--- Resolving Singletons ---");
  let s1 = container.get::<SingletonTracker>()?;
  let s2 = container.get::<SingletonTracker>()?;
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.0.id, s2.0.id);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("\n--- Resolving Transients ---");
  let t1 = container.get::<TransientTracker>()?;
  let t2 = container.get::<TransientTracker>()?;
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.0.id, t2.0.id);
  assert!(!Arc::ptr_eq(&t1, &t2), "Transient instances should be different");

  println!("\n--- Resolving Scoped ---");
  let first_scope = container.create_scope();
  let second_scope = container.create_scope();
  let a1 = first_scope.get::<ScopedTracker>()?;
  let a2 = first_scope.get::<ScopedTracker>()?;
  let b1 = second_scope.get::<ScopedTracker>()?;
  println!(
    "Scope A IDs: {} and {}, Scope B ID: {}",
    a1.0.id, a2.0.id, b1.0.id
  );
  assert!(Arc::ptr_eq(&a1, &a2), "A scope shares its scoped instance");
  assert!(!Arc::ptr_eq(&a1, &b1), "Sibling scopes do not share instances");

  Ok(())
}
