use crate::modules::{Module, ModuleError, ModuleRef};
use std::collections::HashSet;
use std::sync::Arc;

/// Flatten a module forest in pre-order.
///
/// Each tree is emitted parent first, then its children left to right. A module
/// shared by several parents is emitted once, at its first position. A module
/// reachable from itself fails with [`ModuleError::CyclicModuleGraph`].
pub fn flatten(roots: &[ModuleRef]) -> Result<Vec<ModuleRef>, ModuleError> {
    let mut walk = Walk::default();
    for (index, root) in roots.iter().enumerate() {
        walk.visit(root, format!("modules[{}]", index))?;
    }
    Ok(walk.ordered)
}

#[derive(Default)]
struct Walk {
    ordered: Vec<ModuleRef>,
    emitted: HashSet<usize>,
    on_path: HashSet<usize>,
}

impl Walk {
    fn visit(&mut self, module: &ModuleRef, path: String) -> Result<(), ModuleError> {
        let key = address(module);

        if self.on_path.contains(&key) {
            return Err(ModuleError::CyclicModuleGraph {
                module: module.label().to_string(),
                path,
            });
        }
        if !self.emitted.insert(key) {
            return Ok(());
        }

        self.ordered.push(Arc::clone(module));
        self.on_path.insert(key);
        for (index, child) in module.nested_modules().iter().enumerate() {
            self.visit(child, format!("{}.modules[{}]", path, index))?;
        }
        self.on_path.remove(&key);

        Ok(())
    }
}

// Identity of the shared allocation, ignoring the vtable half of the fat pointer.
fn address(module: &ModuleRef) -> usize {
    Arc::as_ptr(module) as *const () as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ServiceCollection;
    use crate::errors::CoreError;
    use crate::modules::{CollectionModule, ModuleKind};
    use std::sync::OnceLock;

    struct Node {
        name: &'static str,
        children: OnceLock<Vec<ModuleRef>>,
    }

    impl Node {
        fn leaf(name: &'static str) -> ModuleRef {
            Self::with(name, Vec::new())
        }

        fn with(name: &'static str, children: Vec<ModuleRef>) -> ModuleRef {
            Arc::new(Node {
                name,
                children: OnceLock::from(children),
            })
        }
    }

    impl CollectionModule for Node {
        fn load(&self, _services: &mut ServiceCollection) -> Result<(), CoreError> {
            Ok(())
        }
    }

    impl Module for Node {
        fn name(&self) -> Option<&str> {
            Some(self.name)
        }

        fn nested_modules(&self) -> &[ModuleRef] {
            self.children.get().map(Vec::as_slice).unwrap_or(&[])
        }

        fn kind(&self) -> ModuleKind<'_> {
            ModuleKind::Collection(self)
        }
    }

    fn labels(modules: &[ModuleRef]) -> Vec<&str> {
        modules.iter().map(|module| module.label()).collect()
    }

    #[test]
    fn test_pre_order() -> Result<(), ModuleError> {
        let forest = vec![
            Node::with(
                "a",
                vec![Node::with("b", vec![Node::leaf("c")]), Node::leaf("d")],
            ),
            Node::with("e", vec![Node::leaf("f")]),
        ];

        let flat = flatten(&forest)?;
        assert_eq!(labels(&flat), vec!["a", "b", "c", "d", "e", "f"]);
        Ok(())
    }

    #[test]
    fn test_flatten_is_deterministic() -> Result<(), ModuleError> {
        let forest = vec![Node::with("a", vec![Node::leaf("b"), Node::leaf("c")])];

        let first = flatten(&forest)?;
        let second = flatten(&forest)?;
        assert_eq!(first.len(), second.len());
        assert!(first.iter().zip(&second).all(|(x, y)| Arc::ptr_eq(x, y)));
        Ok(())
    }

    #[test]
    fn test_empty_forest() -> Result<(), ModuleError> {
        assert!(flatten(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_shared_child_emitted_once() -> Result<(), ModuleError> {
        let shared = Node::leaf("shared");
        let forest = vec![
            Node::with("left", vec![shared.clone()]),
            Node::with("right", vec![shared.clone(), Node::leaf("tail")]),
        ];

        let flat = flatten(&forest)?;
        assert_eq!(labels(&flat), vec!["left", "shared", "right", "tail"]);
        Ok(())
    }

    #[test]
    fn test_cycle_detected() {
        let a = Arc::new(Node {
            name: "a",
            children: OnceLock::new(),
        });
        let b = Node::with("b", vec![a.clone() as ModuleRef]);
        let _ = a.children.set(vec![b]);

        let forest = vec![a.clone() as ModuleRef];
        let err = flatten(&forest).unwrap_err();
        match &err {
            ModuleError::CyclicModuleGraph { module, path } => {
                assert_eq!(module, "a");
                assert_eq!(path, "modules[0].modules[0].modules[0]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
