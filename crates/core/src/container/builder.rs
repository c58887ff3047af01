use crate::container::collection::ServiceCollection;
use crate::container::descriptor::{ServiceDescriptor, ServiceId};
use crate::container::scope::ServiceScope;
use crate::container::Container;
use crate::errors::CoreError;
use std::collections::HashMap;
use std::sync::Arc;

/// Graph-style registration backend.
///
/// Modules call registration methods on the builder directly. Collections filled
/// by collection-style modules are merged in with [`populate`](Self::populate).
/// A service type can be registered once; a second registration is rejected.
#[derive(Default)]
pub struct ContainerBuilder {
    descriptors: HashMap<ServiceId, ServiceDescriptor>,
    registration_order: Vec<ServiceId>,
    populations: usize,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor
    pub fn register(&mut self, descriptor: ServiceDescriptor) -> Result<&mut Self, CoreError> {
        let service_id = descriptor.service_id;
        if self.descriptors.contains_key(&service_id) {
            return Err(CoreError::duplicate_service(service_id.type_name()));
        }

        tracing::trace!(
            "Registering {} service: {}",
            descriptor.lifetime,
            service_id.type_name()
        );
        self.descriptors.insert(service_id, descriptor);
        self.registration_order.push(service_id);
        Ok(self)
    }

    /// Register a pre-built singleton instance
    pub fn register_instance<T>(&mut self, instance: Arc<T>) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::instance(instance))
    }

    /// Register a singleton created by `factory` on first resolve
    pub fn register_factory<T, F>(&mut self, factory: F) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::factory(ServiceScope::Singleton, factory))
    }

    /// Register a service created by `factory` on every resolve
    pub fn register_transient<T, F>(&mut self, factory: F) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.register(ServiceDescriptor::factory(ServiceScope::Transient, factory))
    }

    /// Merge every registration of a collection into this builder, in order.
    ///
    /// Stops at the first registration that conflicts with one already present.
    pub fn populate(&mut self, services: ServiceCollection) -> Result<&mut Self, CoreError> {
        let count = services.len();
        for descriptor in services.into_descriptors() {
            self.register(descriptor)?;
        }

        self.populations += 1;
        tracing::debug!("Populated container builder with {} collected services", count);
        Ok(self)
    }

    /// Check if a service type is registered
    pub fn is_registered<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.descriptors.contains_key(&ServiceId::of::<T>())
    }

    /// Get the number of registrations
    pub fn registration_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of collections merged through [`populate`](Self::populate)
    pub fn population_count(&self) -> usize {
        self.populations
    }

    /// Build the container
    pub fn build(self) -> Container {
        Container::from_descriptors(self.descriptors, self.registration_order)
    }
}

impl std::fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("registration_count", &self.registration_count())
            .field("populations", &self.populations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Settings {
        retries: u32,
    }

    #[test]
    fn test_builder_chaining() -> Result<(), CoreError> {
        let mut builder = ContainerBuilder::new();
        builder
            .register_instance(Arc::new(Settings { retries: 3 }))?
            .register_transient::<String, _>(|_| Ok(Arc::new("transient".to_string())))?;

        assert!(builder.is_registered::<Settings>());
        assert!(builder.is_registered::<String>());
        assert_eq!(builder.registration_count(), 2);

        let container = builder.build();
        assert_eq!(container.resolve::<Settings>()?.retries, 3);
        assert_eq!(
            container.registered_services(),
            &[ServiceId::of::<Settings>(), ServiceId::of::<String>()]
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut builder = ContainerBuilder::new();
        builder.register_instance(Arc::new(Settings { retries: 1 })).unwrap();

        let err = builder
            .register_instance(Arc::new(Settings { retries: 2 }))
            .err()
            .unwrap();
        assert!(err.is_duplicate());
        assert_eq!(builder.registration_count(), 1);
    }

    #[test]
    fn test_populate_from_collection() -> Result<(), CoreError> {
        let mut services = ServiceCollection::new();
        services.add_singleton_instance(Arc::new(Settings { retries: 7 }))?;

        let mut builder = ContainerBuilder::new();
        builder.populate(services)?;

        assert_eq!(builder.population_count(), 1);
        assert_eq!(builder.build().resolve::<Settings>()?.retries, 7);
        Ok(())
    }

    #[test]
    fn test_populate_conflict() {
        let mut services = ServiceCollection::new();
        services
            .add_singleton_instance(Arc::new(Settings { retries: 7 }))
            .unwrap();

        let mut builder = ContainerBuilder::new();
        builder.register_instance(Arc::new(Settings { retries: 1 })).unwrap();

        assert!(builder.populate(services).is_err());
        assert_eq!(builder.population_count(), 0);
    }
}
