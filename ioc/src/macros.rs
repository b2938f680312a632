//! Public macros for declaring injectable types and resolving services.

/// Implements [`Injectable`](crate::Injectable) for a type.
///
/// Two forms are supported. The field form builds the struct literal
/// directly, resolving each field in the order it is listed. The constructor
/// form calls an associated function with one argument per listed parameter
/// type.
///
/// ```
/// use std::sync::Arc;
/// use weft_ioc::{injectable, Container, Factory, Implementation};
///
/// struct Database;
/// struct Cache;
///
/// struct Repository {
///   db: Arc<Database>,
///   cache: Option<Arc<Cache>>,
/// }
/// injectable!(Repository { db: Arc<Database>, cache: Option<Arc<Cache>> });
///
/// let container = Container::new();
/// container.register_singleton::<Database>(None, Some(Factory::new(|| Database))).unwrap();
/// container.register_transient::<Repository>(Some(Implementation::of::<Repository>()), None).unwrap();
///
/// let repository = container.get::<Repository>().unwrap();
/// assert!(repository.cache.is_none());
/// ```
///
/// ```
/// use std::sync::Arc;
/// use weft_ioc::{injectable, Defaulted};
///
/// #[derive(Default)]
/// struct Settings { retries: u32 }
///
/// struct Client { retries: u32 }
///
/// impl Client {
///   fn new(settings: Defaulted<Settings>) -> Self {
///     Client { retries: settings.retries }
///   }
/// }
/// injectable!(Client => new(Defaulted<Settings>));
/// ```
#[macro_export]
macro_rules! injectable {
    // Field form: injectable!(MyService { a: Arc<A>, b: Option<Arc<B>> })
    ($type:ty { $($field:ident : $field_ty:ty),* $(,)? }) => {
        impl $crate::Injectable for $type {
            fn inject(params: &mut $crate::Parameters<'_>) -> $crate::Result<Self> {
                Ok(Self {
                    $($field: params.next::<$field_ty>()?,)*
                })
            }
        }
    };

    // Constructor form: injectable!(MyService => new(Arc<A>, Option<Arc<B>>))
    ($type:ty => $ctor:ident ( $($param_ty:ty),* $(,)? )) => {
        impl $crate::Injectable for $type {
            #[allow(unused_variables)]
            fn inject(params: &mut $crate::Parameters<'_>) -> $crate::Result<Self> {
                Ok(<$type>::$ctor($(params.next::<$param_ty>()?),*))
            }
        }
    };
}

/// Lets a concrete type be registered as one or more trait object services.
///
/// ```
/// use weft_ioc::{implements, Container, Factory};
///
/// trait Greeter: Send + Sync {
///   fn greet(&self) -> String;
/// }
///
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter {
///   fn greet(&self) -> String {
///     "Hello!".to_string()
///   }
/// }
/// implements!(EnglishGreeter: dyn Greeter);
///
/// let container = Container::new();
/// container
///   .register_singleton::<dyn Greeter>(None, Some(Factory::new(|| EnglishGreeter)))
///   .unwrap();
/// assert_eq!(container.get::<dyn Greeter>().unwrap().greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! implements {
    ($impl_ty:ty : $($service:ty),+ $(,)?) => {
        $(
            impl $crate::Implements<$service> for $impl_ty {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$service> {
                    self
                }
            }
        )+
    };
}

/// Resolves a service from the global container.
///
/// # Panics
///
/// Panics if no global container has been set or if the service cannot be
/// resolved. For a non-panicking version, use `get_global_container()` and
/// `Container::try_get` directly.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use weft_ioc::{resolve, set_global_container, Container};
///
/// let container = Container::new();
/// container.register_instance(Arc::new(String::from("hello")));
/// set_global_container(container);
///
/// let message = resolve!(String);
/// assert_eq!(*message, "hello");
/// ```
#[cfg(feature = "global")]
#[macro_export]
macro_rules! resolve {
    // Arm for resolving a concrete type: resolve!(MyService)
    ($type:ty) => {
        $crate::get_global_container()
            .unwrap_or_else(|| panic!("No global container has been set"))
            .get::<$type>()
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to resolve required service {}: {}",
                    std::any::type_name::<$type>(),
                    err
                )
            })
    };

    // Arm for resolving a trait object: resolve!(trait MyTrait)
    (trait $trait_ident:ident) => {
        $crate::get_global_container()
            .unwrap_or_else(|| panic!("No global container has been set"))
            .get::<dyn $trait_ident>()
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to resolve required trait service {}: {}",
                    std::any::type_name::<dyn $trait_ident>(),
                    err
                )
            })
    };
}
