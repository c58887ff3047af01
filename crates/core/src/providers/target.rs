use crate::container::{ContainerBuilder, ServiceCollection};
use crate::errors::CoreError;
use crate::modules::{Module, ModuleKind};

/// A registration backend that modules can be loaded into.
///
/// Loading runs in two steps. [`load_module`](Self::load_module) is called for
/// every module in order, with a staging area the backend may use to defer
/// work. [`merge`](Self::merge) is then called exactly once with that staging
/// area.
pub trait LoadTarget {
    /// Per-load scratch state
    type Staging: Default;

    /// Backend name used in diagnostics
    const BACKEND: &'static str;

    /// Apply one module
    fn load_module(&mut self, staging: &mut Self::Staging, module: &dyn Module) -> Result<(), CoreError>;

    /// Fold the staging area into the backend
    fn merge(&mut self, staging: Self::Staging) -> Result<(), CoreError>;
}

impl LoadTarget for ServiceCollection {
    type Staging = ();

    const BACKEND: &'static str = "collection";

    fn load_module(&mut self, _staging: &mut (), module: &dyn Module) -> Result<(), CoreError> {
        match module.kind() {
            ModuleKind::Collection(collection_module) => collection_module.load(self),
            ModuleKind::Graph(_) => Err(CoreError::UnsupportedModule {
                module: module.label().to_string(),
                backend: Self::BACKEND.to_string(),
            }),
        }
    }

    fn merge(&mut self, _staging: ()) -> Result<(), CoreError> {
        Ok(())
    }
}

impl LoadTarget for ContainerBuilder {
    type Staging = ServiceCollection;

    const BACKEND: &'static str = "container builder";

    fn load_module(&mut self, staging: &mut ServiceCollection, module: &dyn Module) -> Result<(), CoreError> {
        match module.kind() {
            ModuleKind::Graph(graph_module) => graph_module.load(self),
            ModuleKind::Collection(collection_module) => collection_module.load(staging),
        }
    }

    fn merge(&mut self, staging: ServiceCollection) -> Result<(), CoreError> {
        self.populate(staging)?;
        Ok(())
    }
}
