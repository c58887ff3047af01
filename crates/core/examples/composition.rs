//! Example: composing service registrations from configuration and code
//!
//! Runs four composition patterns against the same module registry:
//!   1. modules declared in configuration only
//!   2. modules built in code through components
//!   3. both together, components first
//!   4. collection-style and graph-style modules in one container
//!
//! Set `RUST_LOG=weft_core=debug` to follow module loading.

use std::sync::Arc;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use weft_core::config::{Configuration, ConfigurationTree};
use weft_core::container::{Container, ContainerBuilder, ServiceCollection};
use weft_core::errors::CoreError;
use weft_core::impl_module;
use weft_core::modules::{
    CollectionModule, Component, ComponentBuilder, ConfiguredModule, GraphModule, ModuleBase, ModuleError,
    ModuleRegistry,
};
use weft_core::providers::ServiceProviderFactory;

type DemoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const SETTINGS: &str = r#"
modules:
  - type: greeting
    configuration:
      message: Hello from configuration!
"#;

// Services

trait GreetingService: Send + Sync {
    fn greeting(&self) -> &str;
}

struct Greeter {
    message: String,
}

impl GreetingService for Greeter {
    fn greeting(&self) -> &str {
        &self.message
    }
}

trait DataService: Send + Sync {
    fn data(&self) -> &str;
}

struct StaticData {
    data: String,
}

impl DataService for StaticData {
    fn data(&self) -> &str {
        &self.data
    }
}

// Modules

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GreetingConfig {
    message: String,
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            message: "Default greeting".to_string(),
        }
    }
}

impl Configuration for GreetingConfig {}

/// Registers the greeting service directly with the container builder
struct GreetingModule {
    base: ModuleBase<GreetingConfig>,
}

impl GraphModule for GreetingModule {
    fn load(&self, builder: &mut ContainerBuilder) -> Result<(), CoreError> {
        let greeter: Arc<dyn GreetingService> = Arc::new(Greeter {
            message: self.base.configuration().message.clone(),
        });
        builder.register_instance(greeter)?;
        Ok(())
    }
}

impl ConfiguredModule for GreetingModule {
    type Configuration = GreetingConfig;

    fn construct(base: ModuleBase<GreetingConfig>) -> Self {
        Self { base }
    }
}

impl_module!(GreetingModule, graph);

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DataConfig {
    data: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data: "Default data".to_string(),
        }
    }
}

impl Configuration for DataConfig {}

/// Registers the data service with a plain service collection
struct DataModule {
    base: ModuleBase<DataConfig>,
}

impl CollectionModule for DataModule {
    fn load(&self, services: &mut ServiceCollection) -> Result<(), CoreError> {
        let data: Arc<dyn DataService> = Arc::new(StaticData {
            data: self.base.configuration().data.clone(),
        });
        services.add_singleton_instance(data)?;
        Ok(())
    }
}

impl ConfiguredModule for DataModule {
    type Configuration = DataConfig;

    fn construct(base: ModuleBase<DataConfig>) -> Self {
        Self { base }
    }
}

impl_module!(DataModule, collection);

// Components

struct CodeGreetingComponent(String);

impl Component for CodeGreetingComponent {
    fn build(&self, builder: ComponentBuilder) -> Result<ComponentBuilder, ModuleError> {
        builder.with_module::<GreetingModule, _>(|config| config.message = self.0.clone())
    }
}

struct CodeDataComponent(String);

impl Component for CodeDataComponent {
    fn build(&self, builder: ComponentBuilder) -> Result<ComponentBuilder, ModuleError> {
        builder.with_module_using(
            |config: &mut DataConfig| config.data = self.0.clone(),
            |configuration| DataModule {
                base: ModuleBase::new(configuration),
            },
        )
    }
}

fn compose(
    registry: &ModuleRegistry,
    configuration: &ConfigurationTree,
    components: &[&dyn Component],
) -> DemoResult<Container> {
    let factory = ServiceProviderFactory::<ContainerBuilder>::new(registry, configuration, components)?;
    let mut builder = ContainerBuilder::new();
    factory.load(&mut builder)?;
    Ok(builder.build())
}

fn configuration_only(registry: &ModuleRegistry) -> DemoResult<()> {
    let settings = ConfigurationTree::from_yaml_str(SETTINGS)?;
    let container = compose(registry, &settings, &[])?;

    println!("  {}", container.resolve::<dyn GreetingService>()?.greeting());
    Ok(())
}

fn code_only(registry: &ModuleRegistry) -> DemoResult<()> {
    let component = CodeGreetingComponent("Hello from code!".to_string());
    let container = compose(registry, &ConfigurationTree::empty(), &[&component])?;

    println!("  {}", container.resolve::<dyn GreetingService>()?.greeting());
    Ok(())
}

fn hybrid(registry: &ModuleRegistry) -> DemoResult<()> {
    let settings = ConfigurationTree::from_yaml_str(SETTINGS)?;
    let component = CodeDataComponent("Data from code!".to_string());
    let container = compose(registry, &settings, &[&component])?;

    println!("  Configuration: {}", container.resolve::<dyn GreetingService>()?.greeting());
    println!("  Code: {}", container.resolve::<dyn DataService>()?.data());
    Ok(())
}

fn mixed(registry: &ModuleRegistry) -> DemoResult<()> {
    let greeting = CodeGreetingComponent("Hello from a graph-style module!".to_string());
    let data = CodeDataComponent("Data from a collection-style module!".to_string());
    let container = compose(registry, &ConfigurationTree::empty(), &[&greeting, &data])?;

    println!("  Graph-style: {}", container.resolve::<dyn GreetingService>()?.greeting());
    println!("  Collection-style: {}", container.resolve::<dyn DataService>()?.data());
    Ok(())
}

fn main() -> DemoResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Only names registered here can appear in configuration
    let registry = ModuleRegistry::new();
    registry.register_module::<GreetingModule>("greeting")?;
    registry.register_module::<DataModule>("data")?;

    println!("=== Module composition ===\n");

    println!("--- Pattern 1: modules from configuration ---");
    configuration_only(&registry)?;

    println!("\n--- Pattern 2: modules from code ---");
    code_only(&registry)?;

    println!("\n--- Pattern 3: configuration and code ---");
    hybrid(&registry)?;

    println!("\n--- Pattern 4: mixed module styles ---");
    mixed(&registry)?;

    println!("\n=== All patterns completed ===");
    Ok(())
}
