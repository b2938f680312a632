use pretty_assertions::assert_eq;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use weft_ioc::{implements, Container, Error, Factory, Lifetime};

// --- Test Fixtures ---

// The trait must be Send + Sync for the container to accept it.
trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}

struct EnglishGreeter;
impl Greeter for EnglishGreeter {
  fn greet(&self) -> String {
    "Hello!".to_string()
  }
}
implements!(EnglishGreeter: dyn Greeter);

#[derive(Debug, PartialEq, Eq)]
struct SimpleService {
  id: u32,
}

// --- Basic Tests ---

#[test]
fn test_singleton_factory_returns_same_instance() {
  // Arrange
  let container = Container::new();
  container
    .register_singleton::<SimpleService>(None, Some(Factory::new(|| SimpleService { id: 101 })))
    .unwrap();

  // Act
  let r1 = container.get::<SimpleService>().unwrap();
  let r2 = container.get::<SimpleService>().unwrap();

  // Assert
  assert_eq!(r1.id, 101);
  assert!(Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_transient_factory_returns_distinct_instances() {
  // Arrange
  let container = Container::new();
  container
    .register_transient::<SimpleService>(None, Some(Factory::new(|| SimpleService { id: 303 })))
    .unwrap();

  // Act
  let r1 = container.get::<SimpleService>().unwrap();
  let r2 = container.get::<SimpleService>().unwrap();

  // Assert
  // Equal values, but two separately constructed objects.
  assert_eq!(*r1, *r2);
  assert!(!Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_register_instance_returns_exact_object() {
  // Arrange
  struct Config {
    name: &'static str,
  }
  let config = Arc::new(Config { name: "app" });
  let container = Container::new();
  container.register_instance(config.clone());

  // Act
  let r1 = container.get::<Config>().unwrap();
  let r2 = container.get::<Config>().unwrap();

  // Assert
  assert_eq!(r1.name, "app");
  assert!(Arc::ptr_eq(&config, &r1));
  assert!(Arc::ptr_eq(&config, &r2));
}

#[test]
fn test_trait_object_resolution() {
  // Arrange
  let container = Container::new();
  container
    .register_singleton::<dyn Greeter>(None, Some(Factory::new(|| EnglishGreeter)))
    .unwrap();

  // Act
  let greeter = container.get::<dyn Greeter>().unwrap();

  // Assert
  assert_eq!(greeter.greet(), "Hello!");
}

#[test]
fn test_get_unregistered_fails_and_try_get_returns_none() {
  struct Unregistered;
  let container = Container::new();

  let err = container.get::<Unregistered>().err().unwrap();
  assert!(err.is_not_registered());
  assert!(err.to_string().contains("Unregistered"));

  assert!(container.try_get::<Unregistered>().is_none());
}

#[test]
fn test_try_get_swallows_construction_errors() {
  #[derive(Debug)]
  struct Broken;
  let container = Container::new();
  container
    .register_transient::<Broken>(
      None,
      Some(Factory::try_new(|| Err::<Broken, _>("connection refused"))),
    )
    .unwrap();

  // `try_get` cannot tell a broken constructor from a missing registration.
  assert!(container.try_get::<Broken>().is_none());
  assert!(container.is_registered::<Broken>());
}

#[test]
fn test_registration_without_factory_or_implementation_fails() {
  struct Nothing;
  let container = Container::new();

  let err = container.register_singleton::<Nothing>(None, None).err().unwrap();

  assert!(matches!(err, Error::InvalidRegistration { .. }));
  assert!(!container.is_registered::<Nothing>());
}

#[test]
fn test_is_registered_has_no_side_effects() {
  static CALLS: AtomicUsize = AtomicUsize::new(0);
  struct Counted;

  let container = Container::new();
  assert!(!container.is_registered::<Counted>());

  container
    .register_singleton::<Counted>(
      None,
      Some(Factory::new(|| {
        CALLS.fetch_add(1, Ordering::SeqCst);
        Counted
      })),
    )
    .unwrap();

  assert!(container.is_registered::<Counted>());
  assert_eq!(CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn test_registrations_can_be_chained() {
  struct First;
  struct Second;
  let container = Container::new();

  container
    .register_singleton::<First>(None, Some(Factory::new(|| First)))
    .and_then(|c| c.register_transient::<Second>(None, Some(Factory::new(|| Second))))
    .unwrap();

  assert_eq!(container.descriptor::<First>().unwrap().lifetime(), Lifetime::Singleton);
  assert_eq!(container.descriptor::<Second>().unwrap().lifetime(), Lifetime::Transient);
}

#[test]
fn test_scoped_service_on_root_container_is_not_cached() {
  struct PerRequest;
  let container = Container::new();
  container
    .register_scoped::<PerRequest>(None, Some(Factory::new(|| PerRequest)))
    .unwrap();

  let r1 = container.get::<PerRequest>().unwrap();
  let r2 = container.get::<PerRequest>().unwrap();

  assert!(!Arc::ptr_eq(&r1, &r2));
}
