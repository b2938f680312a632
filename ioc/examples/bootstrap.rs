//! A small composition root: register every service, publish the container,
//! resolve the root object, and tear everything down again.
//!
//! Run with `RUST_LOG=weft_ioc=trace` to watch registrations and construction.

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use weft_ioc::{
  clear_global_container, implements, injectable, resolve, set_global_container, BoxError,
  Container, Disposable, Factory, Implementation,
};

// --- Domain contracts ---

trait ProjectRepository: Send + Sync {
  fn project_names(&self) -> Vec<String>;
}

trait EventBus: Send + Sync {
  fn publish(&self, event: &str);
}

// --- Infrastructure ---

struct Settings {
  data_dir: String,
}

struct FileProjectRepository {
  settings: Arc<Settings>,
}
injectable!(FileProjectRepository { settings: Arc<Settings> });
implements!(FileProjectRepository: dyn ProjectRepository);

impl ProjectRepository for FileProjectRepository {
  fn project_names(&self) -> Vec<String> {
    vec![format!("{}/novel", self.settings.data_dir)]
  }
}

impl Disposable for FileProjectRepository {
  fn dispose(&self) -> Result<(), BoxError> {
    println!("Flushing project index in {}", self.settings.data_dir);
    Ok(())
  }
}

struct StdoutEventBus;
implements!(StdoutEventBus: dyn EventBus);

impl EventBus for StdoutEventBus {
  fn publish(&self, event: &str) {
    println!("event: {event}");
  }
}

// --- Application ---

struct MainController {
  projects: Arc<dyn ProjectRepository>,
  events: Option<Arc<dyn EventBus>>,
}
injectable!(MainController {
  projects: Arc<dyn ProjectRepository>,
  events: Option<Arc<dyn EventBus>>,
});

impl MainController {
  fn start(&self) {
    for name in self.projects.project_names() {
      if let Some(events) = &self.events {
        events.publish(&format!("opened {name}"));
      }
    }
  }
}

fn register_services(container: &Container) -> weft_ioc::Result<()> {
  container.register_instance(Arc::new(Settings {
    data_dir: "/tmp/weft".to_string(),
  }));
  container
    .register_singleton::<dyn ProjectRepository>(
      Some(Implementation::of::<FileProjectRepository>()),
      None,
    )?
    .register_singleton::<dyn EventBus>(None, Some(Factory::new(|| StdoutEventBus)))?
    .register_transient::<MainController>(Some(Implementation::of::<MainController>()), None)?;
  Ok(())
}

fn main() -> weft_ioc::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let container = Container::new();
  register_services(&container)?;
  set_global_container(container.clone());

  // Code that cannot take the container as a parameter finds it globally.
  let controller = resolve!(MainController);
  controller.start();

  // The repository was registered against its trait, which is not itself
  // disposable, so attach disposal to the concrete type instead.
  container.register_singleton::<FileProjectRepository>(
    Some(Implementation::<FileProjectRepository>::of::<FileProjectRepository>().disposable()),
    None,
  )?;
  container.get::<FileProjectRepository>()?;

  clear_global_container();
  container.dispose();
  assert!(container.try_get::<MainController>().is_none());
  Ok(())
}
