pub mod component;
pub mod definition;
pub mod flatten;
pub mod registry;
pub mod resolver;

pub use component::{Component, ComponentBuilder};
pub use definition::*;
pub use flatten::flatten;
pub use registry::{ModuleConstructor, ModuleRegistry};
pub use resolver::ModuleResolver;
