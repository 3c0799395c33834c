//! Values stored at paths, listable by prefix.

use std::collections::BTreeMap;

use crate::Path;

/// One node per path segment. Children are kept sorted so listings and
/// [`PathTrie::entries`] come out in name order.
#[derive(Debug, Clone)]
pub(crate) struct PathTrie<T> {
    value: Option<T>,
    children: BTreeMap<String, PathTrie<T>>,
}

impl<T> Default for PathTrie<T> {
    fn default() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
        }
    }
}

impl<T> PathTrie<T> {
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &PathTrie<T>)> {
        self.children.iter().map(|(name, child)| (name.as_str(), child))
    }

    /// The node at `path`, whether or not it holds a value.
    pub fn node(&self, path: &Path) -> Option<&PathTrie<T>> {
        path.components
            .iter()
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    pub fn get(&self, path: &Path) -> Option<&T> {
        self.node(path)?.value.as_ref()
    }

    /// Store `value` at `path`, returning what was there.
    pub fn insert(&mut self, path: &Path, value: T) -> Option<T> {
        let node = path.components.iter().fold(self, |node, segment| {
            node.children.entry(segment.clone()).or_default()
        });
        node.value.replace(value)
    }

    /// Take the value at exactly `path`. Deeper values stay; branches left
    /// holding nothing are dropped.
    pub fn remove(&mut self, path: &Path) -> Option<T> {
        self.remove_at(&path.components)
    }

    fn remove_at(&mut self, segments: &[String]) -> Option<T> {
        let Some((head, rest)) = segments.split_first() else {
            return self.value.take();
        };
        let child = self.children.get_mut(head)?;
        let removed = child.remove_at(rest);
        if !child.holds_values() {
            self.children.remove(head);
        }
        removed
    }

    /// Whether this node or anything below it holds a value.
    pub fn holds_values(&self) -> bool {
        self.value.is_some() || self.children.values().any(PathTrie::holds_values)
    }

    /// Every stored value with its path, parents before children.
    pub fn entries(&self) -> Vec<(Path, &T)> {
        let mut out = Vec::new();
        self.collect(&Path::root(), &mut out);
        out
    }

    fn collect<'a>(&'a self, at: &Path, out: &mut Vec<(Path, &'a T)>) {
        if let Some(v) = &self.value {
            out.push((at.clone(), v));
        }
        for (name, child) in &self.children {
            child.collect(&at.child(name), out);
        }
    }
}
