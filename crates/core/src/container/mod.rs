#[allow(clippy::module_inception)]
pub mod container;
pub mod builder;
pub mod collection;
pub mod descriptor;
pub mod scope;

pub use builder::ContainerBuilder;
pub use collection::ServiceCollection;
pub use container::Container;
pub use descriptor::{ErasedService, ServiceActivation, ServiceDescriptor, ServiceFactory, ServiceId};
pub use scope::ServiceScope;
