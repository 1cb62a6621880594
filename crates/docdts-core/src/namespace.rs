//! Hierarchical registry of dotted namespace names.
//!
//! Namespaces live in an arena owned by [`NamespaceTree`] and refer to each
//! other by [`NamespaceId`]. Children and classes are kept in insertion order
//! so that emission is reproducible.

use indexmap::IndexMap;

use crate::model::ClassId;

/// Index of a namespace inside its [`NamespaceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(usize);

/// One node of the namespace tree.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: Option<String>,
    parent: Option<NamespaceId>,
    children: IndexMap<String, NamespaceId>,
    pub(crate) classes: IndexMap<String, ClassId>,
}

impl Namespace {
    /// Simple name; `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn parent(&self) -> Option<NamespaceId> {
        self.parent
    }

    /// Child namespaces in creation order.
    pub fn children(&self) -> &IndexMap<String, NamespaceId> {
        &self.children
    }

    /// Classes registered directly in this namespace, in registration order.
    pub fn classes(&self) -> &IndexMap<String, ClassId> {
        &self.classes
    }
}

/// The namespace tree of one generation run.
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    nodes: Vec<Namespace>,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    /// Create a tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Namespace {
                name: None,
                parent: None,
                children: IndexMap::new(),
                classes: IndexMap::new(),
            }],
        }
    }

    pub fn root(&self) -> NamespaceId {
        NamespaceId(0)
    }

    pub fn get(&self, id: NamespaceId) -> &Namespace {
        &self.nodes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: NamespaceId) -> &mut Namespace {
        &mut self.nodes[id.0]
    }

    /// Number of namespaces, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Walk `path` from the root without creating anything.
    ///
    /// Returns `None` as soon as a segment is missing. The empty path is the
    /// root.
    pub fn find(&self, path: &str) -> Option<NamespaceId> {
        let mut current = self.root();
        for segment in segments(path) {
            current = *self.get(current).children.get(segment)?;
        }
        Some(current)
    }

    /// Walk `path` from the root, creating missing segments.
    pub fn find_or_create(&mut self, path: &str) -> NamespaceId {
        let mut current = self.root();
        for segment in segments(path) {
            current = match self.get(current).children.get(segment) {
                Some(&child) => child,
                None => {
                    let child = NamespaceId(self.nodes.len());
                    self.nodes.push(Namespace {
                        name: Some(segment.to_string()),
                        parent: Some(current),
                        children: IndexMap::new(),
                        classes: IndexMap::new(),
                    });
                    self.get_mut(current)
                        .children
                        .insert(segment.to_string(), child);
                    child
                }
            };
        }
        current
    }

    /// Dot-joined names from the root down to `id`; empty for the root.
    pub fn full_name(&self, id: NamespaceId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(ns) = current {
            let node = self.get(ns);
            if let Some(name) = &node.name {
                parts.push(name.as_str());
            }
            current = node.parent;
        }
        parts.reverse();
        parts.join(".")
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_does_not_create() {
        let tree = NamespaceTree::new();
        assert_eq!(tree.find("Ember.Foo"), None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.find(""), Some(tree.root()));
    }

    #[test]
    fn test_find_or_create_builds_chain() {
        let mut tree = NamespaceTree::new();
        let foo = tree.find_or_create("Ember.Foo");
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.full_name(foo), "Ember.Foo");

        let ember = tree.find("Ember").unwrap();
        assert_eq!(tree.get(foo).parent(), Some(ember));
        assert_eq!(tree.get(ember).parent(), Some(tree.root()));
        assert_eq!(tree.get(ember).name(), Some("Ember"));

        // Second call reuses the existing nodes.
        assert_eq!(tree.find_or_create("Ember.Foo"), foo);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_partial_path_stops() {
        let mut tree = NamespaceTree::new();
        tree.find_or_create("Ember");
        assert!(tree.find("Ember").is_some());
        assert_eq!(tree.find("Ember.Missing.Deeper"), None);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = NamespaceTree::new();
        tree.find_or_create("Ember.Zeta");
        tree.find_or_create("Ember.Alpha");
        tree.find_or_create("Ember.Mid");
        let ember = tree.find("Ember").unwrap();
        let names: Vec<_> = tree.get(ember).children().keys().cloned().collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }
}
