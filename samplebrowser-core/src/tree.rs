//! Category tree built from a flat catalog.
//!
//! The tree is grouped first by language, then by the segments of each
//! entry's category paths. Nodes live in an arena owned by `CategoryTree`
//! and refer to their children by index. An entry listing several category
//! paths appears as a sample leaf under each of them; the entry itself is
//! shared, not copied.
//!
//! Sibling order is not stored. `children()` sorts by label when asked, so
//! insertion order never leaks into what is displayed.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{normalize_categories, split_category, CatalogEntry};

/// Index of a node in its `CategoryTree`.
pub type NodeId = usize;

/// Children are keyed by label for categories and by relative path for
/// samples, so a category and a sample never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ChildKey {
    Category(String),
    Sample(String),
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A grouping node; not selectable.
    Category,
    /// A selectable catalog entry; never has children.
    Sample(Arc<CatalogEntry>),
}

/// One node of a `CategoryTree`.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: String,
    pub kind: NodeKind,
    children: HashMap<ChildKey, NodeId>,
}

impl TreeNode {
    fn new(label: String, kind: NodeKind) -> Self {
        Self {
            label,
            kind,
            children: HashMap::new(),
        }
    }

    pub fn is_category(&self) -> bool {
        matches!(self.kind, NodeKind::Category)
    }

    /// The catalog entry of a sample node.
    pub fn entry(&self) -> Option<&CatalogEntry> {
        match &self.kind {
            NodeKind::Sample(entry) => Some(entry),
            NodeKind::Category => None,
        }
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Orders labels case-insensitively, falling back to a case-sensitive
/// comparison so the order is total.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Hierarchical view of a catalog.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
}

impl CategoryTree {
    /// Builds the tree for `languages`, in the order given.
    ///
    /// A language contributes a top-level node only if at least one entry
    /// is tagged with it. Entries for languages not listed are ignored.
    pub fn build(entries: &[CatalogEntry], languages: &[String]) -> Self {
        let mut tree = Self::default();
        let mut seen_languages: Vec<&str> = Vec::with_capacity(languages.len());

        for language in languages {
            if seen_languages.contains(&language.as_str()) {
                continue;
            }
            seen_languages.push(language);

            let mut language_entries = entries
                .iter()
                .filter(|entry| &entry.language == language)
                .peekable();
            if language_entries.peek().is_none() {
                continue;
            }

            let root = tree.add_node(language.clone(), NodeKind::Category);
            tree.roots.push(root);

            for entry in language_entries {
                tree.place(root, entry);
            }
        }

        tree
    }

    /// Files `entry` under every one of its category paths below `root`.
    ///
    /// Categories are normalized here and nowhere else, so a leading
    /// `Toolkit` segment is dropped exactly once.
    fn place(&mut self, root: NodeId, entry: &CatalogEntry) {
        let shared = Arc::new(entry.clone());
        for category in normalize_categories(&entry.categories) {
            let mut parent = root;
            for segment in split_category(&category) {
                parent = self.category_child(parent, segment);
            }
            self.insert_sample(parent, &shared);
        }
    }

    fn add_node(&mut self, label: String, kind: NodeKind) -> NodeId {
        self.nodes.push(TreeNode::new(label, kind));
        self.nodes.len() - 1
    }

    /// Returns the category child `label` of `parent`, creating it if needed.
    fn category_child(&mut self, parent: NodeId, label: &str) -> NodeId {
        let key = ChildKey::Category(label.to_string());
        if let Some(&id) = self.nodes[parent].children.get(&key) {
            return id;
        }
        let id = self.add_node(label.to_string(), NodeKind::Category);
        self.nodes[parent].children.insert(key, id);
        id
    }

    /// Inserts a sample leaf, replacing any leaf with the same relative path.
    fn insert_sample(&mut self, parent: NodeId, entry: &Arc<CatalogEntry>) {
        let key = ChildKey::Sample(entry.relative_path.clone());
        let label = if entry.name.is_empty() {
            entry.relative_path.clone()
        } else {
            entry.name.clone()
        };
        let leaf = TreeNode::new(label, NodeKind::Sample(Arc::clone(entry)));

        match self.nodes[parent].children.get(&key) {
            Some(&existing) => self.nodes[existing] = leaf,
            None => {
                self.nodes.push(leaf);
                let id = self.nodes.len() - 1;
                self.nodes[parent].children.insert(key, id);
            }
        }
    }

    /// Top-level language nodes, in the requested language order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Children of `id`, sorted by label.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut children: Vec<NodeId> = node.children.values().copied().collect();
        children.sort_by(|&a, &b| {
            compare_labels(&self.nodes[a].label, &self.nodes[b].label)
                .then_with(|| self.sample_key(a).cmp(&self.sample_key(b)))
        });
        children
    }

    fn sample_key(&self, id: NodeId) -> Option<&str> {
        self.nodes[id].entry().map(|e| e.relative_path.as_str())
    }

    /// Follows `labels` from the roots; returns the node reached.
    pub fn find(&self, labels: &[&str]) -> Option<NodeId> {
        let (first, rest) = labels.split_first()?;
        let mut current = *self
            .roots
            .iter()
            .find(|&&id| self.nodes[id].label == *first)?;
        for label in rest {
            current = self
                .nodes[current]
                .children
                .iter()
                .find(|(_, &id)| self.nodes[id].label == *label)
                .map(|(_, &id)| id)?;
        }
        Some(current)
    }

    /// Every sample leaf in display order, including repeated placements.
    pub fn samples(&self) -> Vec<&CatalogEntry> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if let Some(entry) = node.entry() {
                out.push(entry);
            }
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Renders the tree as an indented outline.
///
/// Categories are printed by label, samples as `- name  [relative path]`.
pub fn render_tree(tree: &CategoryTree) -> String {
    let mut out = String::new();
    for &root in tree.roots() {
        render_node(tree, root, 0, &mut out);
    }
    out
}

fn render_node(tree: &CategoryTree, id: NodeId, depth: usize, out: &mut String) {
    let Some(node) = tree.node(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    match node.entry() {
        Some(entry) => {
            out.push_str(&format!("{}- {}  [{}]\n", indent, node.label, entry.relative_path));
        }
        None => {
            out.push_str(&format!("{}{}\n", indent, node.label));
            for child in tree.children(id) {
                render_node(tree, child, depth + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn entry(path: &str, language: &str, name: &str, categories: &[&str]) -> CatalogEntry {
        CatalogEntry {
            relative_path: path.to_string(),
            language: language.to_string(),
            name: name.to_string(),
            description: format!("{} description", name),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            dependencies: Vec::new(),
            documentation_uri: String::new(),
        }
    }

    fn langs(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn labels(tree: &CategoryTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| tree.node(id).unwrap().label.clone())
            .collect()
    }

    #[test]
    fn test_language_without_entries_has_no_node() {
        let entries = vec![entry("a", "cpp", "A", &["Misc"])];
        let tree = CategoryTree::build(&entries, &langs(&["python", "cpp", "fortran"]));

        assert_eq!(labels(&tree, tree.roots()), vec!["cpp"]);
    }

    #[test]
    fn test_empty_catalog_builds_empty_tree() {
        let tree = CategoryTree::build(&[], &langs(&["cpp"]));
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(render_tree(&tree), "");
    }

    #[test]
    fn test_roots_follow_requested_language_order() {
        let entries = vec![
            entry("a", "cpp", "A", &["Misc"]),
            entry("b", "python", "B", &["Misc"]),
        ];
        let tree = CategoryTree::build(&entries, &langs(&["python", "cpp", "python"]));

        assert_eq!(labels(&tree, tree.roots()), vec!["python", "cpp"]);
    }

    #[test]
    fn test_multi_category_entry_is_placed_under_each_path() {
        let entries = vec![entry("vision", "cpp", "Vision", &["Toolkit/AI/Vision", "Misc"])];
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        let under_vision = tree.find(&["cpp", "AI", "Vision", "Vision"]).unwrap();
        assert_eq!(
            tree.node(under_vision).unwrap().entry().unwrap().relative_path,
            "vision"
        );

        let under_misc = tree.find(&["cpp", "Misc", "Vision"]).unwrap();
        assert!(tree.node(under_misc).unwrap().entry().is_some());

        assert!(tree.find(&["cpp", "Toolkit"]).is_none());
    }

    #[test]
    fn test_entry_without_categories_goes_under_other() {
        let entries = vec![entry("lonely", "cpp", "Lonely", &[])];
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        let root = tree.roots()[0];
        assert_eq!(labels(&tree, &tree.children(root)), vec!["Other"]);
        assert!(tree.find(&["cpp", "Other", "Lonely"]).is_some());
    }

    #[test]
    fn test_toolkit_stripped_only_as_first_segment() {
        let entries = vec![entry("x", "cpp", "X", &["AI/Toolkit"])];
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        assert!(tree.find(&["cpp", "AI", "Toolkit", "X"]).is_some());
    }

    #[test]
    fn test_listed_toolkit_prefix_is_stripped_once() {
        let listing = r#"[{"path": "p", "example": {"name": "P", "categories": ["Toolkit/Toolkit/AI"]}}]"#;
        let entries = crate::catalog::parse_listing(listing, "cpp").unwrap();
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        assert!(tree.find(&["cpp", "Toolkit", "AI", "P"]).is_some());
        assert!(tree.find(&["cpp", "AI"]).is_none());
        assert_eq!(render_tree(&tree), "cpp\n  Toolkit\n    AI\n      - P  [p]\n");
    }

    #[test]
    fn test_duplicate_relative_path_overwrites() {
        let entries = vec![
            entry("same", "cpp", "First", &["Misc"]),
            entry("same", "cpp", "Second", &["Misc"]),
        ];
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        let misc = tree.find(&["cpp", "Misc"]).unwrap();
        let children = tree.children(misc);
        assert_eq!(children.len(), 1);
        assert_eq!(tree.node(children[0]).unwrap().label, "Second");
    }

    #[test]
    fn test_same_name_different_paths_are_distinct_leaves() {
        let entries = vec![
            entry("one", "cpp", "Hello", &["Misc"]),
            entry("two", "cpp", "Hello", &["Misc"]),
        ];
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        let misc = tree.find(&["cpp", "Misc"]).unwrap();
        assert_eq!(tree.node(misc).unwrap().child_count(), 2);
    }

    #[test]
    fn test_category_and_sample_with_same_label_coexist() {
        let entries = vec![
            entry("Graphs", "cpp", "Graphs", &["Misc"]),
            entry("bfs", "cpp", "BFS", &["Misc/Graphs"]),
        ];
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        let misc = tree.find(&["cpp", "Misc"]).unwrap();
        let children = tree.children(misc);
        assert_eq!(children.len(), 2);
        let kinds: Vec<bool> = children
            .iter()
            .map(|&id| tree.node(id).unwrap().is_category())
            .collect();
        assert!(kinds.contains(&true) && kinds.contains(&false));
    }

    #[test]
    fn test_children_are_sorted_case_insensitively() {
        let entries = vec![
            entry("1", "cpp", "zeta", &["Misc"]),
            entry("2", "cpp", "Alpha", &["Misc"]),
            entry("3", "cpp", "beta", &["Misc"]),
            entry("4", "cpp", "x", &["Get Started"]),
            entry("5", "cpp", "y", &["AI"]),
        ];
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        let root = tree.roots()[0];
        assert_eq!(
            labels(&tree, &tree.children(root)),
            vec!["AI", "Get Started", "Misc"]
        );

        let misc = tree.find(&["cpp", "Misc"]).unwrap();
        assert_eq!(
            labels(&tree, &tree.children(misc)),
            vec!["Alpha", "beta", "zeta"]
        );
    }

    #[test]
    fn test_compare_labels_is_total() {
        assert_eq!(compare_labels("a", "B"), Ordering::Less);
        assert_eq!(compare_labels("B", "a"), Ordering::Greater);
        assert_ne!(compare_labels("a", "A"), Ordering::Equal);
        assert_eq!(compare_labels("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_samples_round_trip_relative_paths() {
        let entries = vec![
            entry("a", "cpp", "A", &["Toolkit/AI/Vision", "Misc"]),
            entry("b", "cpp", "B", &[]),
            entry("c", "python", "C", &["Get Started"]),
            entry("d", "fortran", "D", &["Misc"]),
        ];
        let tree = CategoryTree::build(&entries, &langs(&["cpp", "python"]));

        let samples = tree.samples();
        let found: BTreeSet<&str> = samples.iter().map(|e| e.relative_path.as_str()).collect();
        let expected: BTreeSet<&str> = ["a", "b", "c"].into_iter().collect();
        assert_eq!(found, expected);

        // "a" is multi-homed; nothing else repeats
        assert_eq!(samples.len(), 4);
        assert_eq!(samples.iter().filter(|e| e.relative_path == "a").count(), 2);
    }

    #[test]
    fn test_render_tree() {
        let entries = vec![
            entry("add", "cpp", "Vector Add", &["Toolkit/Get Started"]),
            entry("mm", "cpp", "Matrix Mul", &["Get Started", "Dense Linear Algebra"]),
        ];
        let tree = CategoryTree::build(&entries, &langs(&["cpp"]));

        let expected = "\
cpp
  Dense Linear Algebra
    - Matrix Mul  [mm]
  Get Started
    - Matrix Mul  [mm]
    - Vector Add  [add]
";
        assert_eq!(render_tree(&tree), expected);
    }
}
