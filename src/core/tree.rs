//! The immutable virtual file-tree model.
//!
//! A tree is parsed once from a project's `directory_json` payload and never
//! mutated afterwards; expansion and selection live in
//! [`ExplorerState`](super::ExplorerState), keyed by `/`-joined path strings.

use serde::{Deserialize, Serialize};

use super::error::CoreError;

/// One entry in a virtual filesystem.
///
/// The serde representation matches the stored wire format:
/// `{"type": "file", "name": ..., "content": ...}` or
/// `{"type": "directory", "name": ..., "children": [...]}`.
/// Child order is insertion order and is preserved through round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileNode {
    File {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    Directory {
        name: String,
        #[serde(default)]
        children: Vec<FileNode>,
    },
}

impl FileNode {
    /// The entry's display name (not a full path).
    pub fn name(&self) -> &str {
        match self {
            FileNode::File { name, .. } => name,
            FileNode::Directory { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FileNode::Directory { .. })
    }

    /// File content, if this is a file that has any.
    pub fn content(&self) -> Option<&str> {
        match self {
            FileNode::File { content, .. } => content.as_deref(),
            FileNode::Directory { .. } => None,
        }
    }

    /// Children in display order. Empty for files.
    pub fn children(&self) -> &[FileNode] {
        match self {
            FileNode::Directory { children, .. } => children,
            FileNode::File { .. } => &[],
        }
    }

    /// Joins a parent path prefix with this node's name.
    ///
    /// An empty prefix means this node is the root; its name alone is the
    /// path. Names are not validated against `/`, matching the stored data.
    pub fn path_under(&self, prefix: &str) -> String {
        if prefix.is_empty() {
            self.name().to_string()
        } else {
            format!("{}/{}", prefix, self.name())
        }
    }

    /// Looks up a descendant (or this node itself) by its full path.
    ///
    /// `prefix` is the path of this node's parent (empty for the root).
    pub fn node_at_path<'a>(&'a self, path: &str, prefix: &str) -> Option<&'a FileNode> {
        let own_path = self.path_under(prefix);
        if own_path == path {
            return Some(self);
        }
        // Only descend if the target lies underneath this node.
        if !path.starts_with(&format!("{own_path}/")) {
            return None;
        }
        self.children()
            .iter()
            .find_map(|child| child.node_at_path(path, &own_path))
    }
}

/// Parses a serialized directory tree.
///
/// Parse failure is recoverable: the caller renders "no tree available"
/// instead of propagating the error further.
pub fn parse_tree(json: &str) -> Result<FileNode, CoreError> {
    Ok(serde_json::from_str(json)?)
}
