use crate::container::descriptor::{
    downcast_service, ErasedService, ServiceActivation, ServiceDescriptor, ServiceId,
};
use crate::errors::CoreError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Built container answering service lookups.
///
/// Produced by [`ContainerBuilder::build`](crate::container::ContainerBuilder::build).
/// The set of registrations is fixed; only the singleton cache changes after build.
pub struct Container {
    descriptors: HashMap<ServiceId, ServiceDescriptor>,
    registration_order: Vec<ServiceId>,
    singletons: RwLock<HashMap<ServiceId, ErasedService>>,
}

impl Container {
    pub(crate) fn from_descriptors(
        descriptors: HashMap<ServiceId, ServiceDescriptor>,
        registration_order: Vec<ServiceId>,
    ) -> Self {
        Self {
            descriptors,
            registration_order,
            singletons: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a service from the container
    pub fn resolve<T>(&self) -> Result<Arc<T>, CoreError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let service_id = ServiceId::of::<T>();
        let descriptor = self
            .descriptors
            .get(&service_id)
            .ok_or_else(|| CoreError::service_not_found(service_id.type_name()))?;

        let erased = match &descriptor.activation {
            ServiceActivation::Instance(instance) => instance.clone(),
            ServiceActivation::Factory(factory) if descriptor.lifetime.is_singleton() => {
                self.resolve_singleton(service_id, |container| factory(container))?
            }
            ServiceActivation::Factory(factory) => factory(self)?,
        };

        downcast_service::<T>(&erased)
    }

    /// Try to resolve a service, returning None if not found or if creation fails
    pub fn try_resolve<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>().ok()
    }

    /// Check if a service is registered
    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.descriptors.contains_key(&ServiceId::of::<T>())
    }

    /// Get the number of registered services
    pub fn service_count(&self) -> usize {
        self.descriptors.len()
    }

    /// Registered services in registration order
    pub fn registered_services(&self) -> &[ServiceId] {
        &self.registration_order
    }

    // The cache lock is never held while a factory runs, so factories may
    // resolve their own dependencies. Two threads racing on the first resolve
    // may both run the factory; the first stored instance wins.
    fn resolve_singleton<F>(&self, service_id: ServiceId, create: F) -> Result<ErasedService, CoreError>
    where
        F: FnOnce(&Container) -> Result<ErasedService, CoreError>,
    {
        {
            let singletons = self
                .singletons
                .read()
                .map_err(|_| CoreError::lock_error("singleton_cache"))?;
            if let Some(instance) = singletons.get(&service_id) {
                return Ok(instance.clone());
            }
        }

        let created = create(self)?;

        let mut singletons = self
            .singletons
            .write()
            .map_err(|_| CoreError::lock_error("singleton_cache"))?;
        Ok(singletons.entry(service_id).or_insert(created).clone())
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.service_count())
            .field("registered_services", &self.registration_order)
            .finish()
    }
}
