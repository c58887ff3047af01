//! Composable, allowlist-driven service registration.
//!
//! Modules register services into a backend. They are built in code through
//! [`Component`]s or resolved from a configuration tree through a
//! [`ModuleRegistry`], which is the only way a configuration string can turn
//! into a module. A [`ServiceProviderFactory`] flattens both sources and loads
//! them into a [`ServiceCollection`] or a [`ContainerBuilder`].

pub mod config;
pub mod container;
pub mod errors;
pub mod modules;
pub mod providers;

pub use config::{ConfigError, ConfigSource, Configuration, ConfigurationTree, EmptyConfiguration};
pub use container::{Container, ContainerBuilder, ServiceCollection, ServiceDescriptor, ServiceScope};
pub use errors::CoreError;
pub use modules::{
    CollectionModule, Component, ComponentBuilder, ConfiguredModule, GraphModule, Module, ModuleBase,
    ModuleConstructor, ModuleError, ModuleKind, ModuleRef, ModuleRegistry, ModuleResolver,
};
pub use providers::{LoadTarget, LoadingStats, ServiceProviderFactory};
