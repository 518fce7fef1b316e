//! Nested repository tree

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// One node of the nested repository tree
///
/// Built once per scan and replaced wholesale on refresh. At every level
/// directories come before files and siblings are sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Full slash-separated path, unique within the tree
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Depth-first pre-order walk in display order
    pub fn walk(&self) -> TreeWalk<'_> {
        TreeWalk { stack: vec![self] }
    }
}

/// Depth-first iterator over a node and its descendants
pub struct TreeWalk<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for TreeWalk<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Walk a forest of top-level nodes in display order
pub fn walk_forest(nodes: &[TreeNode]) -> impl Iterator<Item = &TreeNode> {
    nodes.iter().flat_map(TreeNode::walk)
}

/// Number of file nodes in a forest
pub fn count_files(nodes: &[TreeNode]) -> usize {
    walk_forest(nodes).filter(|node| node.is_file()).count()
}

/// Look a node up by its full path
pub fn find_node<'a>(nodes: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    walk_forest(nodes).find(|node| node.path == path)
}

/// Human-readable size: `512B`, `1.5KB`, `2.0MB`
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes}B")
    } else if bytes < MB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    }
}
