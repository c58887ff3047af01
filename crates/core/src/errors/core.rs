use thiserror::Error;

/// Error raised by the backend containers while registering or resolving services
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Service not found: {service_type}")]
    ServiceNotFound { service_type: String },

    #[error("Service '{service_type}' is already registered")]
    DuplicateService { service_type: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Module '{module}' cannot be loaded into a {backend} backend")]
    UnsupportedModule { module: String, backend: String },

    #[error("Service creation failed for '{service_type}': {message}")]
    ServiceCreationFailed {
        service_type: String,
        message: String,
    },
}

impl CoreError {
    /// Create a new service not found error
    pub fn service_not_found(service_type: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_type: service_type.into(),
        }
    }

    /// Create a new duplicate service error
    pub fn duplicate_service(service_type: impl Into<String>) -> Self {
        Self::DuplicateService {
            service_type: service_type.into(),
        }
    }

    /// Create a new lock error for the named resource
    pub fn lock_error(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Create a new service creation error
    pub fn creation_failed(service_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceCreationFailed {
            service_type: service_type.into(),
            message: message.into(),
        }
    }

    /// Check if the error is a missing service
    pub fn is_service_not_found(&self) -> bool {
        matches!(self, Self::ServiceNotFound { .. })
    }

    /// Check if the error is a duplicate registration
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateService { .. })
    }
}
