use crate::container::scope::ServiceScope;
use crate::container::Container;
use crate::errors::CoreError;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Service identifier: the service type as seen by consumers.
///
/// Trait objects are valid service types, so `ServiceId::of::<dyn Greeter>()`
/// identifies every registration made for the `Greeter` interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ServiceId {
    /// Create a new service ID for a type
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// A type-erased `Arc<T>` for some service type `T`
pub type ErasedService = Arc<dyn Any + Send + Sync>;

/// Factory function for creating service instances.
///
/// The factory receives the container being resolved from so it can look up the
/// services it depends on.
pub type ServiceFactory =
    Arc<dyn Fn(&Container) -> Result<ErasedService, CoreError> + Send + Sync>;

/// How instances of a service are obtained
#[derive(Clone)]
pub enum ServiceActivation {
    /// A pre-built instance
    Instance(ErasedService),
    /// Created by a factory, cached or not depending on the lifetime
    Factory(ServiceFactory),
}

impl std::fmt::Debug for ServiceActivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceActivation::Instance(_) => write!(f, "Instance(<instance>)"),
            ServiceActivation::Factory(_) => write!(f, "Factory(<factory_fn>)"),
        }
    }
}

/// One registration: service type, factory or instance, lifetime
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Service identifier
    pub service_id: ServiceId,
    /// Service lifetime
    pub lifetime: ServiceScope,
    /// Strategy for creating instances
    pub activation: ServiceActivation,
}

impl ServiceDescriptor {
    /// Describe a pre-built singleton instance
    pub fn instance<T>(instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            service_id: ServiceId::of::<T>(),
            lifetime: ServiceScope::Singleton,
            activation: ServiceActivation::Instance(Arc::new(instance) as ErasedService),
        }
    }

    /// Describe a service created by `factory` with the given lifetime
    pub fn factory<T, F>(lifetime: ServiceScope, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        let wrapped: ServiceFactory = Arc::new(move |container: &Container| {
            let instance = factory(container)?;
            Ok(Arc::new(instance) as ErasedService)
        });

        Self {
            service_id: ServiceId::of::<T>(),
            lifetime,
            activation: ServiceActivation::Factory(wrapped),
        }
    }

    /// Describe a singleton created on first resolve
    pub fn singleton<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        Self::factory(ServiceScope::Singleton, factory)
    }

    /// Describe a service created on every resolve
    pub fn transient<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        Self::factory(ServiceScope::Transient, factory)
    }

    /// Check if this descriptor holds a pre-built instance
    pub fn is_instance(&self) -> bool {
        matches!(self.activation, ServiceActivation::Instance(_))
    }
}

/// Recover the typed service from an erased one
pub(crate) fn downcast_service<T>(erased: &ErasedService) -> Result<Arc<T>, CoreError>
where
    T: ?Sized + Send + Sync + 'static,
{
    erased.downcast_ref::<Arc<T>>().cloned().ok_or_else(|| {
        CoreError::creation_failed(
            std::any::type_name::<T>(),
            "activation produced a value of a different type",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    trait TestTrait: Send + Sync {
        fn test_method(&self) -> String;
    }

    #[derive(Debug, Default)]
    struct TestImpl;

    impl TestTrait for TestImpl {
        fn test_method(&self) -> String {
            "test".to_string()
        }
    }

    #[test]
    fn test_service_id_creation() {
        let id1 = ServiceId::of::<TestImpl>();
        let id2 = ServiceId::of::<dyn TestTrait>();

        assert_eq!(id1.type_id, TypeId::of::<TestImpl>());
        assert_ne!(id1, id2);
        assert!(id1.type_name().contains("TestImpl"));
        assert!(id2.type_name().contains("TestTrait"));
        assert_eq!(ServiceId::of::<String>().to_string(), "alloc::string::String");
    }

    #[test]
    fn test_instance_descriptor() {
        let descriptor = ServiceDescriptor::instance::<dyn TestTrait>(Arc::new(TestImpl));

        assert_eq!(descriptor.service_id, ServiceId::of::<dyn TestTrait>());
        assert_eq!(descriptor.lifetime, ServiceScope::Singleton);
        assert!(descriptor.is_instance());

        let ServiceActivation::Instance(erased) = &descriptor.activation else {
            panic!("expected an instance activation");
        };
        let service = downcast_service::<dyn TestTrait>(erased).unwrap();
        assert_eq!(service.test_method(), "test");
        assert!(downcast_service::<TestImpl>(erased).is_err());
    }

    #[test]
    fn test_factory_descriptor() {
        let descriptor = ServiceDescriptor::transient::<TestImpl, _>(|_| Ok(Arc::new(TestImpl)));

        assert_eq!(descriptor.lifetime, ServiceScope::Transient);
        assert!(!descriptor.is_instance());
        assert!(format!("{:?}", descriptor).contains("Factory(<factory_fn>)"));
    }
}
