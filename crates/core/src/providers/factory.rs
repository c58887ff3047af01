use crate::config::ConfigurationTree;
use crate::modules::{flatten, Component, ModuleError, ModuleKind, ModuleRef, ModuleRegistry, ModuleResolver};
use crate::providers::LoadTarget;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// Composes modules from code and configuration and loads them into a backend.
///
/// Component modules come first, then configuration modules; the combined
/// forest is flattened in pre-order once, at construction.
pub struct ServiceProviderFactory<B: LoadTarget> {
    modules: Vec<ModuleRef>,
    _backend: PhantomData<fn(&mut B)>,
}

impl<B: LoadTarget> ServiceProviderFactory<B> {
    /// Compose the modules of `components` and of the `modules` section of `configuration`.
    ///
    /// Every component is built even if an earlier one fails; a single failure
    /// is returned as is, several as [`ModuleError::Aggregate`].
    pub fn new(
        registry: &ModuleRegistry,
        configuration: &ConfigurationTree,
        components: &[&dyn Component],
    ) -> Result<Self, ModuleError> {
        let mut roots = component_modules(components)?;
        let component_count = roots.len();

        roots.extend(ModuleResolver::new(registry).resolve_tree(configuration)?);
        let configured_count = roots.len() - component_count;

        let factory = Self::from_modules(roots)?;
        tracing::info!(
            "Composed {} modules for the {} backend ({} from components, {} from the {})",
            factory.modules.len(),
            B::BACKEND,
            component_count,
            configured_count,
            configuration.source()
        );
        Ok(factory)
    }

    /// Use an already assembled module forest
    pub fn from_modules(roots: Vec<ModuleRef>) -> Result<Self, ModuleError> {
        Ok(Self {
            modules: flatten(&roots)?,
            _backend: PhantomData,
        })
    }

    /// Flattened modules in load order
    pub fn modules(&self) -> &[ModuleRef] {
        &self.modules
    }

    /// Load every module into `backend`, in order.
    ///
    /// Stops at the first module the backend rejects. Registrations already
    /// applied are left in place. Loading is not idempotent: a second pass over
    /// the same backend repeats every registration.
    pub fn load(&self, backend: &mut B) -> Result<LoadingStats, ModuleError> {
        let start_time = Instant::now();
        let mut staging = B::Staging::default();
        let mut stats = LoadingStats::default();

        for (position, module) in self.modules.iter().enumerate() {
            tracing::debug!(
                "Loading module {} ({}) at position {}",
                module.label(),
                module.kind().as_str(),
                position
            );

            backend
                .load_module(&mut staging, module.as_ref())
                .map_err(|source| ModuleError::BackendRegistration {
                    module: module.label().to_string(),
                    position,
                    backend: B::BACKEND,
                    source,
                })?;
            stats.record(module.kind());
        }

        backend
            .merge(staging)
            .map_err(|source| ModuleError::BackendRegistration {
                module: MERGED_SERVICES.to_string(),
                position: self.modules.len(),
                backend: B::BACKEND,
                source,
            })?;

        stats.total_time = start_time.elapsed();
        tracing::info!(
            "Loaded {} modules into the {} backend in {:?}",
            stats.module_count,
            B::BACKEND,
            stats.total_time
        );
        Ok(stats)
    }
}

impl<B: LoadTarget> std::fmt::Debug for ServiceProviderFactory<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProviderFactory")
            .field("backend", &B::BACKEND)
            .field("modules", &self.modules)
            .finish()
    }
}

/// Label reported when merging staged collection services fails
pub const MERGED_SERVICES: &str = "<staged collection services>";

/// Statistics for one load pass
#[derive(Debug, Clone, Default)]
pub struct LoadingStats {
    pub module_count: usize,
    pub collection_modules: usize,
    pub graph_modules: usize,
    pub total_time: Duration,
}

impl LoadingStats {
    fn record(&mut self, kind: ModuleKind<'_>) {
        self.module_count += 1;
        match kind {
            ModuleKind::Collection(_) => self.collection_modules += 1,
            ModuleKind::Graph(_) => self.graph_modules += 1,
        }
    }
}

fn component_modules(components: &[&dyn Component]) -> Result<Vec<ModuleRef>, ModuleError> {
    let mut modules = Vec::new();
    let mut errors = Vec::new();

    for component in components {
        match component.modules() {
            Ok(built) => modules.extend(built),
            Err(error) => {
                tracing::warn!("Component {} failed to build: {}", component.component_name(), error);
                errors.push(error);
            }
        }
    }

    match errors.len() {
        0 => Ok(modules),
        1 => Err(errors.remove(0)),
        _ => Err(ModuleError::Aggregate { errors }),
    }
}
