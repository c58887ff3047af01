use crate::config::Configuration;
use crate::modules::{ConfiguredModule, Module, ModuleBase, ModuleError, ModuleRef};
use std::sync::Arc;

/// A unit of code-side composition contributing top-level modules.
///
/// ```
/// use weft_core::modules::{Component, ComponentBuilder, ModuleError};
///
/// struct NoModules;
///
/// impl Component for NoModules {
///     fn build(&self, builder: ComponentBuilder) -> Result<ComponentBuilder, ModuleError> {
///         Ok(builder)
///     }
/// }
///
/// assert!(NoModules.modules().unwrap().is_empty());
/// ```
pub trait Component: Send + Sync {
    /// Append this component's modules to `builder`
    fn build(&self, builder: ComponentBuilder) -> Result<ComponentBuilder, ModuleError>;

    /// Name for diagnostics
    fn component_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Run [`build`](Self::build) against a fresh builder
    fn modules(&self) -> Result<Vec<ModuleRef>, ModuleError> {
        Ok(self.build(ComponentBuilder::new())?.into_modules())
    }
}

/// Accumulates top-level modules built in code
#[derive(Debug, Default)]
pub struct ComponentBuilder {
    modules: Vec<ModuleRef>,
}

impl ComponentBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module configured from its defaults.
    ///
    /// `mutate` adjusts the default configuration; the result is validated
    /// before the module is constructed.
    pub fn with_module<M, F>(self, mutate: F) -> Result<Self, ModuleError>
    where
        M: ConfiguredModule,
        F: FnOnce(&mut M::Configuration),
    {
        self.with_nested_module::<M, F>(mutate, Vec::new())
    }

    /// Add a module with nested modules
    pub fn with_nested_module<M, F>(self, mutate: F, nested_modules: Vec<ModuleRef>) -> Result<Self, ModuleError>
    where
        M: ConfiguredModule,
        F: FnOnce(&mut M::Configuration),
    {
        let configuration = configure::<M, _, _>(mutate)?;
        let module = M::construct(ModuleBase::new(configuration).with_nested_modules(nested_modules));
        Ok(self.push(Arc::new(module)))
    }

    /// Add a module through an explicit construction function
    pub fn with_module_using<M, C, F, G>(self, mutate: F, construct: G) -> Result<Self, ModuleError>
    where
        M: Module,
        C: Configuration,
        F: FnOnce(&mut C),
        G: FnOnce(C) -> M,
    {
        let configuration = configure::<M, _, _>(mutate)?;
        Ok(self.push(Arc::new(construct(configuration))))
    }

    /// Add a prebuilt module
    pub fn with_module_instance(self, module: ModuleRef) -> Self {
        self.push(module)
    }

    /// Number of top-level modules added so far
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if no module has been added
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Top-level modules in insertion order
    pub fn into_modules(self) -> Vec<ModuleRef> {
        self.modules
    }

    fn push(mut self, module: ModuleRef) -> Self {
        self.modules.push(module);
        self
    }
}

fn configure<M, C, F>(mutate: F) -> Result<C, ModuleError>
where
    C: Configuration,
    F: FnOnce(&mut C),
{
    let mut configuration = C::default();
    mutate(&mut configuration);
    configuration.validate().map_err(|source| {
        let module = std::any::type_name::<M>();
        ModuleError::binding(module, module, source)
    })?;
    Ok(configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, ConfigValidator, RangeValidator};
    use crate::container::ContainerBuilder;
    use crate::errors::CoreError;
    use crate::modules::{GraphModule, ModuleKind};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(default)]
    struct PoolConfig {
        size: u32,
    }

    impl Default for PoolConfig {
        fn default() -> Self {
            Self { size: 4 }
        }
    }

    impl Configuration for PoolConfig {
        fn validate(&self) -> Result<(), ConfigError> {
            RangeValidator { min: 1, max: 64 }.validate("size", &self.size)
        }
    }

    struct PoolModule {
        base: ModuleBase<PoolConfig>,
    }

    impl GraphModule for PoolModule {
        fn load(&self, builder: &mut ContainerBuilder) -> Result<(), CoreError> {
            builder.register_instance(Arc::new(self.base.configuration().size))?;
            Ok(())
        }
    }

    impl ConfiguredModule for PoolModule {
        type Configuration = PoolConfig;

        fn construct(base: ModuleBase<PoolConfig>) -> Self {
            Self { base }
        }
    }

    crate::impl_module!(PoolModule, graph);

    struct Pools;

    impl Component for Pools {
        fn build(&self, builder: ComponentBuilder) -> Result<ComponentBuilder, ModuleError> {
            builder
                .with_module::<PoolModule, _>(|config| config.size = 8)?
                .with_module::<PoolModule, _>(|_| {})
        }
    }

    #[test]
    fn test_with_module_applies_mutation() -> Result<(), ModuleError> {
        let modules = Pools.modules()?;
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name(), None);

        let mut builder = ContainerBuilder::new();
        match modules[0].kind() {
            ModuleKind::Graph(graph) => graph.load(&mut builder).unwrap(),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(*builder.build().resolve::<u32>().unwrap(), 8);
        Ok(())
    }

    #[test]
    fn test_invalid_mutation_fails_build() {
        let result = ComponentBuilder::new().with_module::<PoolModule, _>(|config| config.size = 0);

        let err = result.unwrap_err();
        assert!(err.is_configuration_binding());
        assert!(err.to_string().contains("PoolModule"));
    }

    #[test]
    fn test_with_module_using_explicit_constructor() -> Result<(), ModuleError> {
        let builder = ComponentBuilder::new().with_module_using(
            |config: &mut PoolConfig| config.size = 2,
            |configuration| PoolModule {
                base: ModuleBase::new(configuration),
            },
        )?;
        assert_eq!(builder.len(), 1);
        Ok(())
    }

    #[test]
    fn test_nested_and_prebuilt_modules() -> Result<(), ModuleError> {
        let child: ModuleRef = Arc::new(PoolModule::construct(ModuleBase::new(PoolConfig::default())));

        let modules = ComponentBuilder::new()
            .with_nested_module::<PoolModule, _>(|_| {}, vec![child.clone()])?
            .with_module_instance(child.clone())
            .into_modules();

        assert_eq!(modules.len(), 2);
        assert!(Arc::ptr_eq(&modules[0].nested_modules()[0], &child));
        assert!(Arc::ptr_eq(&modules[1], &child));
        Ok(())
    }
}
