use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::thread;
use weft_ioc::{injectable, BoxError, Container, Disposable, Factory, Implementation};

// --- Fixtures ---

struct RequestContext {
  id: usize,
}

static NEXT_REQUEST_ID: AtomicUsize = AtomicUsize::new(0);

fn request_context_container() -> Container {
  let container = Container::new();
  container
    .register_scoped::<RequestContext>(
      None,
      Some(Factory::new(|| RequestContext {
        id: NEXT_REQUEST_ID.fetch_add(1, Ordering::SeqCst),
      })),
    )
    .unwrap();
  container
}

// --- Tests ---

#[test]
fn test_scoped_service_is_shared_within_a_scope() {
  let container = request_context_container();
  let scope = container.create_scope();

  let r1 = scope.get::<RequestContext>().unwrap();
  let r2 = scope.get::<RequestContext>().unwrap();

  assert!(Arc::ptr_eq(&r1, &r2));
}

#[test]
fn test_sibling_scopes_get_distinct_instances() {
  let container = request_context_container();
  let first = container.create_scope();
  let second = container.create_scope();

  let a = first.get::<RequestContext>().unwrap();
  let b = second.get::<RequestContext>().unwrap();

  assert!(!Arc::ptr_eq(&a, &b));
  assert_ne!(a.id, b.id);
}

#[test]
fn test_scope_delegates_singletons_and_transients_to_parent() {
  struct Settings;
  struct Job;

  let container = Container::new();
  container
    .register_singleton::<Settings>(None, Some(Factory::new(|| Settings)))
    .unwrap();
  container
    .register_transient::<Job>(None, Some(Factory::new(|| Job)))
    .unwrap();
  let scope = container.create_scope();

  let from_scope = scope.get::<Settings>().unwrap();
  let from_root = container.get::<Settings>().unwrap();
  assert!(Arc::ptr_eq(&from_scope, &from_root));

  let j1 = scope.get::<Job>().unwrap();
  let j2 = scope.get::<Job>().unwrap();
  assert!(!Arc::ptr_eq(&j1, &j2));
}

#[test]
fn test_scope_rejects_unregistered_types() {
  struct Unknown;
  let container = Container::new();
  let scope = container.create_scope();

  assert!(scope.get::<Unknown>().err().unwrap().is_not_registered());
  assert!(scope.try_get::<Unknown>().is_none());
  assert!(!scope.is_registered::<Unknown>());
}

#[test]
fn test_scoped_dependencies_resolve_with_parent_semantics() {
  // Only the requested service is cached per scope. A scoped service's own
  // scoped dependencies come from the parent and are therefore fresh.
  struct Session;
  struct Handler {
    session: Arc<Session>,
  }
  injectable!(Handler { session: Arc<Session> });

  let container = Container::new();
  container
    .register_scoped::<Session>(None, Some(Factory::new(|| Session)))
    .unwrap();
  container
    .register_scoped::<Handler>(Some(Implementation::of::<Handler>()), None)
    .unwrap();
  let scope = container.create_scope();

  let handler = scope.get::<Handler>().unwrap();
  let session = scope.get::<Session>().unwrap();

  assert!(Arc::ptr_eq(&handler, &scope.get::<Handler>().unwrap()));
  assert!(!Arc::ptr_eq(&handler.session, &session));
}

#[test]
fn test_scope_dispose_leaves_parent_untouched() {
  static DISPOSED: AtomicUsize = AtomicUsize::new(0);

  struct Transaction;
  impl Disposable for Transaction {
    fn dispose(&self) -> Result<(), BoxError> {
      DISPOSED.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }
  }
  struct Pool;

  let container = Container::new();
  container
    .register_scoped::<Transaction>(
      None,
      Some(Factory::<Transaction>::new(|| Transaction).disposable()),
    )
    .unwrap();
  container
    .register_singleton::<Pool>(None, Some(Factory::new(|| Pool)))
    .unwrap();

  let scope = container.create_scope();
  let tx = scope.get::<Transaction>().unwrap();
  let pool = scope.get::<Pool>().unwrap();

  scope.dispose();

  assert_eq!(DISPOSED.load(Ordering::SeqCst), 1);
  // The scope forgot its instance; the parent kept its singleton.
  assert!(!Arc::ptr_eq(&tx, &scope.get::<Transaction>().unwrap()));
  assert!(Arc::ptr_eq(&pool, &container.get::<Pool>().unwrap()));
  assert!(Arc::ptr_eq(scope.parent().get::<Pool>().as_ref().unwrap(), &pool));
}

#[test]
fn test_scopes_resolve_concurrently() {
  let container = request_context_container();

  let ids: Vec<usize> = thread::scope(|s| {
    let handles: Vec<_> = (0..8)
      .map(|_| {
        let container = container.clone();
        s.spawn(move || {
          let scope = container.create_scope();
          let first = scope.get::<RequestContext>().unwrap();
          let second = scope.get::<RequestContext>().unwrap();
          assert!(Arc::ptr_eq(&first, &second));
          first.id
        })
      })
      .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  let mut unique = ids.clone();
  unique.sort_unstable();
  unique.dedup();
  assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_scope_dispose_continues_past_failing_disposers() {
  struct Broken;
  struct Healthy;
  struct Exploding;

  let closed = Arc::new(AtomicUsize::new(0));
  let container = Container::new();
  container
    .register_scoped::<Broken>(
      None,
      Some(
        Factory::<Broken>::new(|| Broken)
          .on_dispose(|_: &Broken| Err::<(), BoxError>("broken handle".into())),
      ),
    )
    .unwrap();
  container
    .register_scoped::<Exploding>(
      None,
      Some(Factory::<Exploding>::new(|| Exploding).on_dispose(|_: &Exploding| {
        panic!("exploded while closing")
      })),
    )
    .unwrap();
  let counter = closed.clone();
  container
    .register_scoped::<Healthy>(
      None,
      Some(Factory::<Healthy>::new(|| Healthy).on_dispose(move |_: &Healthy| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
      })),
    )
    .unwrap();

  let scope = container.create_scope();
  let broken = scope.get::<Broken>().unwrap();
  let healthy = scope.get::<Healthy>().unwrap();
  scope.get::<Exploding>().unwrap();

  scope.dispose();

  assert_eq!(closed.load(Ordering::SeqCst), 1);
  // The cache was emptied even though two disposals failed.
  assert!(!Arc::ptr_eq(&broken, &scope.get::<Broken>().unwrap()));
  assert!(!Arc::ptr_eq(&healthy, &scope.get::<Healthy>().unwrap()));
  assert!(container.is_registered::<Healthy>());
}

#[test]
fn test_scope_try_get_swallows_construction_errors() {
  struct Flaky;

  let container = Container::new();
  container
    .register_scoped::<Flaky>(None, Some(Factory::try_new(|| Err::<Flaky, _>("offline"))))
    .unwrap();
  let scope = container.create_scope();

  assert!(scope.try_get::<Flaky>().is_none());
  assert!(matches!(
    scope.get::<Flaky>().err().unwrap(),
    weft_ioc::Error::Construction { .. }
  ));
}
