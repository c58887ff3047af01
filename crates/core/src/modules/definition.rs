use crate::config::{ConfigError, Configuration};
use crate::container::{ContainerBuilder, ServiceCollection};
use crate::errors::CoreError;
use std::fmt;
use std::sync::Arc;

/// Core module error type
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("Unknown module '{name}' at {path}: no module is registered under that name")]
    UnknownModule { name: String, path: String },

    #[error("Module name '{name}' is already registered to {existing}, cannot bind it to {requested}")]
    DuplicateName {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("Configuration binding failed for module '{module}' at {path}: {source}")]
    ConfigurationBinding {
        module: String,
        path: String,
        source: ConfigError,
    },

    #[error("Cyclic module graph: '{module}' is reachable from itself at {path}")]
    CyclicModuleGraph { module: String, path: String },

    #[error("Module '{module}' at position {position} failed to register with the {backend} backend: {source}")]
    BackendRegistration {
        module: String,
        position: usize,
        backend: &'static str,
        source: CoreError,
    },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("{} components failed to build", .errors.len())]
    Aggregate { errors: Vec<ModuleError> },
}

impl ModuleError {
    /// Create a configuration binding error
    pub fn binding(module: impl Into<String>, path: impl Into<String>, source: ConfigError) -> Self {
        Self::ConfigurationBinding {
            module: module.into(),
            path: path.into(),
            source,
        }
    }

    /// Check if the error names an unregistered module
    pub fn is_unknown_module(&self) -> bool {
        matches!(self, Self::UnknownModule { .. })
    }

    /// Check if the error is a registration conflict
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }

    /// Check if the error is a configuration binding failure
    pub fn is_configuration_binding(&self) -> bool {
        matches!(self, Self::ConfigurationBinding { .. })
    }

    /// Check if the error is a cycle in the module graph
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::CyclicModuleGraph { .. })
    }

    /// Check if a backend rejected a registration
    pub fn is_backend_registration(&self) -> bool {
        matches!(self, Self::BackendRegistration { .. })
    }
}

/// Shared handle to a module. Module trees are built once and never mutated.
pub type ModuleRef = Arc<dyn Module>;

/// A module that registers into a collection-style backend
pub trait CollectionModule: Send + Sync {
    /// Add this module's services to the collection
    fn load(&self, services: &mut ServiceCollection) -> Result<(), CoreError>;
}

/// A module that registers directly into a graph-style backend
pub trait GraphModule: Send + Sync {
    /// Register this module's services with the builder
    fn load(&self, builder: &mut ContainerBuilder) -> Result<(), CoreError>;
}

/// Registration capability declared by a module
#[derive(Clone, Copy)]
pub enum ModuleKind<'a> {
    Collection(&'a dyn CollectionModule),
    Graph(&'a dyn GraphModule),
}

impl ModuleKind<'_> {
    /// Short name of the registration style
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::Collection(_) => "collection",
            ModuleKind::Graph(_) => "graph",
        }
    }
}

impl fmt::Debug for ModuleKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of service registration: configuration, nested modules, and the
/// ability to apply itself to a backend.
pub trait Module: Send + Sync + 'static {
    /// Registry name when resolved from configuration; `None` for modules built in code
    fn name(&self) -> Option<&str>;

    /// Child modules in declaration order
    fn nested_modules(&self) -> &[ModuleRef];

    /// How this module registers its services
    fn kind(&self) -> ModuleKind<'_>;

    /// Rust type name of the concrete module
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Name for diagnostics: the registry name, else the type name
    fn label(&self) -> &str {
        match self.name() {
            Some(name) => name,
            None => self.type_name(),
        }
    }
}

impl fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("label", &self.label())
            .field("kind", &self.kind())
            .field("nested_modules", &self.nested_modules().len())
            .finish()
    }
}

/// State shared by every configured module: its name, its bound configuration,
/// and its nested modules.
#[derive(Debug)]
pub struct ModuleBase<C> {
    name: Option<String>,
    configuration: C,
    nested_modules: Vec<ModuleRef>,
}

impl<C: Configuration> ModuleBase<C> {
    /// Create the state for a module built in code
    pub fn new(configuration: C) -> Self {
        Self {
            name: None,
            configuration,
            nested_modules: Vec::new(),
        }
    }

    /// Create the state for a module resolved under a registry name
    pub fn named(name: impl Into<String>, configuration: C, nested_modules: Vec<ModuleRef>) -> Self {
        Self {
            name: Some(name.into()),
            configuration,
            nested_modules,
        }
    }

    /// Attach nested modules
    pub fn with_nested_modules(mut self, nested_modules: Vec<ModuleRef>) -> Self {
        self.nested_modules = nested_modules;
        self
    }

    /// Registry name, if resolved from configuration
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Bound configuration
    pub fn configuration(&self) -> &C {
        &self.configuration
    }

    /// Nested modules in declaration order
    pub fn nested_modules(&self) -> &[ModuleRef] {
        &self.nested_modules
    }
}

/// A module constructible from its bound configuration and nested modules.
///
/// Registering such a module in a [`ModuleRegistry`](crate::modules::ModuleRegistry)
/// or adding it through a [`ComponentBuilder`](crate::modules::ComponentBuilder)
/// only needs the type.
pub trait ConfiguredModule: Module + Sized {
    type Configuration: Configuration;

    /// Build the module from its state
    fn construct(base: ModuleBase<Self::Configuration>) -> Self;
}

/// Implement [`Module`] for a struct holding its state in a `base: ModuleBase<_>` field
///
/// ```
/// use std::sync::Arc;
/// use serde::Deserialize;
/// use weft_core::config::Configuration;
/// use weft_core::container::ServiceCollection;
/// use weft_core::errors::CoreError;
/// use weft_core::impl_module;
/// use weft_core::modules::{CollectionModule, ModuleBase};
///
/// #[derive(Debug, Default, Deserialize)]
/// #[serde(default)]
/// struct CacheConfig {
///     capacity: usize,
/// }
///
/// impl Configuration for CacheConfig {}
///
/// struct CacheModule {
///     base: ModuleBase<CacheConfig>,
/// }
///
/// impl CollectionModule for CacheModule {
///     fn load(&self, services: &mut ServiceCollection) -> Result<(), CoreError> {
///         services.add_singleton_instance(Arc::new(self.base.configuration().capacity))?;
///         Ok(())
///     }
/// }
///
/// impl_module!(CacheModule, collection);
/// ```
#[macro_export]
macro_rules! impl_module {
    (@impl $module:ty, $kind:ident) => {
        impl $crate::modules::Module for $module {
            fn name(&self) -> Option<&str> {
                self.base.name()
            }

            fn nested_modules(&self) -> &[$crate::modules::ModuleRef] {
                self.base.nested_modules()
            }

            fn kind(&self) -> $crate::modules::ModuleKind<'_> {
                $crate::modules::ModuleKind::$kind(self)
            }
        }
    };
    ($module:ty, collection) => {
        $crate::impl_module!(@impl $module, Collection);
    };
    ($module:ty, graph) => {
        $crate::impl_module!(@impl $module, Graph);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmptyConfiguration;

    struct Probe {
        base: ModuleBase<EmptyConfiguration>,
    }

    impl GraphModule for Probe {
        fn load(&self, _builder: &mut ContainerBuilder) -> Result<(), CoreError> {
            Ok(())
        }
    }

    crate::impl_module!(Probe, graph);

    #[test]
    fn test_label_falls_back_to_type_name() {
        let anonymous = Probe {
            base: ModuleBase::new(EmptyConfiguration::default()),
        };
        assert_eq!(anonymous.name(), None);
        assert!(anonymous.label().ends_with("Probe"));

        let named = Probe {
            base: ModuleBase::named("probe", EmptyConfiguration::default(), Vec::new()),
        };
        assert_eq!(named.label(), "probe");
        assert_eq!(named.kind().as_str(), "graph");
    }

    #[test]
    fn test_debug_for_dyn_module() {
        let child: ModuleRef = Arc::new(Probe {
            base: ModuleBase::new(EmptyConfiguration::default()),
        });
        let parent: ModuleRef = Arc::new(Probe {
            base: ModuleBase::named("parent", EmptyConfiguration::default(), vec![child]),
        });

        let rendered = format!("{:?}", parent);
        assert!(rendered.contains("parent"));
        assert!(rendered.contains("nested_modules: 1"));
    }

    #[test]
    fn test_error_display_carries_context() {
        let err = ModuleError::UnknownModule {
            name: "ghost".to_string(),
            path: "modules[2]".to_string(),
        };
        assert!(err.is_unknown_module());
        assert!(err.to_string().contains("'ghost' at modules[2]"));

        let aggregate = ModuleError::Aggregate {
            errors: vec![err, ModuleError::LockError { resource: "r".to_string() }],
        };
        assert_eq!(aggregate.to_string(), "2 components failed to build");
    }
}
