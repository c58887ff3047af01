//! Allowlist of modules that configuration may name.
//!
//! A configuration string can only ever produce a module through an entry added
//! here with an explicit [`ModuleRegistry::register`] call. Nothing is
//! discovered implicitly.

use crate::config::{ConfigError, Configuration};
use crate::modules::{ConfiguredModule, Module, ModuleBase, ModuleError, ModuleRef};
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

type BuildFn = dyn Fn(&str, &Value, Vec<ModuleRef>) -> Result<ModuleRef, ConfigError> + Send + Sync;

/// Binds configuration for a module type and constructs it.
///
/// A construction function without captured state (a function item such as
/// `M::construct`, or a non-capturing closure) is identified by its type, so
/// registering `ModuleConstructor::of::<M>()` twice is the same binding. A
/// capturing closure is only identical to clones of the same constructor,
/// since two values of one closure type can capture different state.
#[derive(Clone)]
pub struct ModuleConstructor {
    identity: Identity,
    module_type: &'static str,
    build: Arc<BuildFn>,
}

impl ModuleConstructor {
    /// Constructor for a [`ConfiguredModule`]
    pub fn of<M: ConfiguredModule>() -> Self {
        Self::from_fn(M::construct)
    }

    /// Constructor from an explicit construction function
    pub fn from_fn<M, C, F>(construct: F) -> Self
    where
        M: Module,
        C: Configuration,
        F: Fn(ModuleBase<C>) -> M + Send + Sync + 'static,
    {
        let build = move |name: &str, section: &Value, nested_modules: Vec<ModuleRef>| {
            let configuration = C::bind(section)?;
            let module = construct(ModuleBase::named(name, configuration, nested_modules));
            Ok(Arc::new(module) as ModuleRef)
        };

        let identity = if std::mem::size_of::<F>() == 0 {
            Identity::Function(TypeId::of::<F>())
        } else {
            Identity::Instance
        };

        Self {
            identity,
            module_type: std::any::type_name::<M>(),
            build: Arc::new(build),
        }
    }

    /// Type name of the module this constructor produces
    pub fn module_type(&self) -> &'static str {
        self.module_type
    }

    /// Check if two constructors are the same binding
    pub fn is_same_binding(&self, other: &ModuleConstructor) -> bool {
        match (self.identity, other.identity) {
            (Identity::Function(ours), Identity::Function(theirs)) => ours == theirs,
            _ => Arc::ptr_eq(&self.build, &other.build),
        }
    }

    /// Bind `section` and construct the module under `name`
    pub fn construct(
        &self,
        name: &str,
        section: &Value,
        nested_modules: Vec<ModuleRef>,
    ) -> Result<ModuleRef, ConfigError> {
        (self.build)(name, section, nested_modules)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Identity {
    /// Stateless construction function, identified by its type
    Function(TypeId),
    /// Capturing closure, identified by its allocation
    Instance,
}

impl std::fmt::Debug for ModuleConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleConstructor")
            .field("module_type", &self.module_type)
            .finish()
    }
}

/// Process-wide allowlist mapping module names to constructors.
///
/// The registry is an ordinary value: create it during startup, register every
/// module the application allows, then share it (typically in an `Arc`) with
/// the composition entry points. Lookups before registration fail with
/// [`ModuleError::UnknownModule`].
#[derive(Default)]
pub struct ModuleRegistry {
    constructors: RwLock<HashMap<String, ModuleConstructor>>,
    type_name_lookup: bool,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Also accept a registered module's Rust type name where a logical name is expected.
    ///
    /// Deprecated escape hatch for configuration written against type names.
    /// Only modules already in the registry can be reached this way.
    pub fn with_type_name_lookup(mut self, enabled: bool) -> Self {
        self.type_name_lookup = enabled;
        self
    }

    /// Check if the type-name escape hatch is enabled
    pub fn type_name_lookup_enabled(&self) -> bool {
        self.type_name_lookup
    }

    /// Register a module constructor under `name`.
    ///
    /// Re-registering the identical binding succeeds without change; binding the
    /// name to a different constructor fails with [`ModuleError::DuplicateName`].
    pub fn register(
        &self,
        name: impl Into<String>,
        constructor: ModuleConstructor,
    ) -> Result<(), ModuleError> {
        let name = name.into();
        let mut constructors = self.constructors.write().map_err(|_| ModuleError::LockError {
            resource: "module_registry".to_string(),
        })?;

        if let Some(existing) = constructors.get(&name) {
            if existing.is_same_binding(&constructor) {
                tracing::debug!("Module '{}' already registered, skipping", name);
                return Ok(());
            }
            return Err(ModuleError::DuplicateName {
                name,
                existing: existing.module_type().to_string(),
                requested: constructor.module_type().to_string(),
            });
        }

        tracing::debug!("Registering module '{}' as {}", name, constructor.module_type());
        constructors.insert(name, constructor);
        Ok(())
    }

    /// Register a [`ConfiguredModule`] under `name`
    pub fn register_module<M: ConfiguredModule>(&self, name: impl Into<String>) -> Result<(), ModuleError> {
        self.register(name, ModuleConstructor::of::<M>())
    }

    /// Construct the module registered under `name`.
    ///
    /// `configuration` is bound to the module's configuration type; a binding
    /// failure is reported against `name`.
    pub fn resolve(
        &self,
        name: &str,
        configuration: &Value,
        nested_modules: Vec<ModuleRef>,
    ) -> Result<ModuleRef, ModuleError> {
        self.resolve_at(name, configuration, nested_modules, name)
    }

    /// [`resolve`](Self::resolve) reporting errors against a configuration path
    pub(crate) fn resolve_at(
        &self,
        name: &str,
        configuration: &Value,
        nested_modules: Vec<ModuleRef>,
        path: &str,
    ) -> Result<ModuleRef, ModuleError> {
        let constructor = self.lookup(name)?.ok_or_else(|| ModuleError::UnknownModule {
            name: name.to_string(),
            path: path.to_string(),
        })?;

        constructor
            .construct(name, configuration, nested_modules)
            .map_err(|source| ModuleError::binding(name, path, source))
    }

    /// Fail with [`ModuleError::UnknownModule`] unless `name` resolves to a constructor.
    ///
    /// Constructs nothing; used to check a whole configuration subtree before
    /// any module in it is built.
    pub(crate) fn ensure_known(&self, name: &str, path: &str) -> Result<(), ModuleError> {
        let constructors = self.read()?;
        if self.find(&constructors, name).is_some() {
            return Ok(());
        }
        Err(ModuleError::UnknownModule {
            name: name.to_string(),
            path: path.to_string(),
        })
    }

    /// Check if a module name is registered
    pub fn contains(&self, name: &str) -> Result<bool, ModuleError> {
        Ok(self.read()?.contains_key(name))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Result<Vec<String>, ModuleError> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Number of registered names
    pub fn len(&self) -> Result<usize, ModuleError> {
        Ok(self.read()?.len())
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> Result<bool, ModuleError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, ModuleConstructor>>, ModuleError> {
        self.constructors.read().map_err(|_| ModuleError::LockError {
            resource: "module_registry".to_string(),
        })
    }

    // Clones the constructor out so the read lock is not held while it runs.
    fn lookup(&self, name: &str) -> Result<Option<ModuleConstructor>, ModuleError> {
        let constructors = self.read()?;

        let found = self.find(&constructors, name);
        if let Some((_, true)) = found {
            tracing::warn!(
                "Module '{}' resolved by type name; register and reference it by a logical name instead",
                name
            );
        }
        Ok(found.map(|(constructor, _)| constructor.clone()))
    }

    // The flag is set when `name` matched a type name rather than a registered name.
    fn find<'a>(
        &self,
        constructors: &'a HashMap<String, ModuleConstructor>,
        name: &str,
    ) -> Option<(&'a ModuleConstructor, bool)> {
        if let Some(constructor) = constructors.get(name) {
            return Some((constructor, false));
        }

        if !self.type_name_lookup {
            return None;
        }

        constructors
            .values()
            .find(|constructor| constructor.module_type() == name)
            .map(|constructor| (constructor, true))
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("names", &self.names().unwrap_or_default())
            .field("type_name_lookup", &self.type_name_lookup)
            .finish()
    }
}
