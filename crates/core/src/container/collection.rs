use crate::container::builder::ContainerBuilder;
use crate::container::descriptor::{ServiceDescriptor, ServiceId};
use crate::container::scope::ServiceScope;
use crate::container::Container;
use crate::errors::CoreError;
use std::collections::HashSet;
use std::sync::Arc;

/// Collection-style registration backend: an ordered list of
/// `(service, factory-or-instance, lifetime)` descriptors.
///
/// A service type can be added once; a second add is rejected.
#[derive(Debug, Default, Clone)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
    registered: HashSet<ServiceId>,
}

impl ServiceCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> Result<&mut Self, CoreError> {
        if !self.registered.insert(descriptor.service_id) {
            return Err(CoreError::duplicate_service(descriptor.service_id.type_name()));
        }

        self.descriptors.push(descriptor);
        Ok(self)
    }

    /// Add a pre-built singleton instance
    pub fn add_singleton_instance<T>(&mut self, instance: Arc<T>) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::instance(instance))
    }

    /// Add a singleton created by `factory` on first resolve
    pub fn add_singleton<T, F>(&mut self, factory: F) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::factory(ServiceScope::Singleton, factory))
    }

    /// Add a service created by `factory` on every resolve
    pub fn add_transient<T, F>(&mut self, factory: F) -> Result<&mut Self, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::factory(ServiceScope::Transient, factory))
    }

    /// Check if a service type has been added
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.registered.contains(&ServiceId::of::<T>())
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if nothing has been added
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors in insertion order
    pub fn descriptors(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.descriptors.iter()
    }

    /// Consume the collection, yielding descriptors in insertion order
    pub fn into_descriptors(self) -> Vec<ServiceDescriptor> {
        self.descriptors
    }

    /// Build a container holding exactly this collection's services
    pub fn build_container(self) -> Result<Container, CoreError> {
        let mut builder = ContainerBuilder::new();
        builder.populate(self)?;
        Ok(builder.build())
    }
}
