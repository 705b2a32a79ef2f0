//! UI state for the tree explorer: expanded directories, the selected
//! file, the active search query, and the derived views built from them.

use std::collections::HashSet;

use serde::Serialize;

use super::search::{SearchEngine, SearchMode, SearchResult};
use super::tree::FileNode;

/// The currently opened file, cached so renders don't re-walk the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub path: String,
    pub name: String,
    pub content: String,
}

/// One visible row of the plain tree view, in render order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeRow {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub is_directory: bool,
    pub is_expanded: bool,
}

/// Mutable explorer state for one loaded tree.
///
/// All transitions are plain synchronous set/field updates driven by single
/// UI events; the tree itself stays immutable and is passed into the query
/// methods explicitly.
#[derive(Debug, Clone)]
pub struct ExplorerState {
    expanded: HashSet<String>,
    selection: Option<Selection>,
    term: String,
    mode: SearchMode,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            expanded: HashSet::new(),
            selection: None,
            term: String::new(),
            mode: SearchMode::Both,
        }
    }
}

impl ExplorerState {
    /// Fresh state with the given directories pre-expanded.
    pub fn with_expanded<I: IntoIterator<Item = String>>(paths: I) -> Self {
        Self {
            expanded: paths.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// True while a search term is active, i.e. the result list should be
    /// rendered instead of the plain tree.
    pub fn is_searching(&self) -> bool {
        !self.term.trim().is_empty()
    }

    /// Flips the expansion state of one directory path.
    ///
    /// Collapsing a directory hides its subtree but keeps descendants'
    /// recorded expansion, so re-expanding restores their prior state.
    pub fn toggle_directory(&mut self, path: &str) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
    }

    /// Replaces the selection wholesale. Content is read-only display, so
    /// an existing selection is silently dropped.
    pub fn select_file(&mut self, path: String, content: String, name: String) {
        self.selection = Some(Selection {
            path,
            name,
            content,
        });
    }

    pub fn close_selection(&mut self) {
        self.selection = None;
    }

    pub fn set_term(&mut self, term: String) {
        self.term = term;
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.mode = mode;
    }

    /// Runs the current query against `tree`. Empty when not searching.
    pub fn search(&self, tree: &FileNode) -> Vec<SearchResult> {
        if !self.is_searching() {
            return Vec::new();
        }
        SearchEngine::search_files(tree, &self.term, self.mode, "")
    }

    /// The expansion set used for rendering while a search is active.
    ///
    /// Starts from the user's manual set and adds every proper ancestor of
    /// each result path, so matches are visible without persisting the
    /// auto-expansion back into the manual state. With no active search the
    /// manual set is returned unchanged. Pure in its inputs: identical
    /// `(expanded, term, results)` always produce equal sets.
    pub fn effective_expansion(&self, results: &[SearchResult]) -> HashSet<String> {
        if !self.is_searching() {
            return self.expanded.clone();
        }

        let mut effective = self.expanded.clone();
        for result in results {
            let parts: Vec<&str> = result.path.split('/').collect();
            let mut current = String::new();
            // Every prefix except the result's own full path.
            for part in &parts[..parts.len().saturating_sub(1)] {
                if current.is_empty() {
                    current = (*part).to_string();
                } else {
                    current = format!("{current}/{part}");
                }
                effective.insert(current.clone());
            }
        }
        effective
    }

    /// Flattens the tree into the ordered list of visible rows.
    ///
    /// A node is listed only if it (or a descendant) matches the current
    /// query; children are walked only under directories present in
    /// `expanded`. Depth starts at 0 for the root.
    pub fn visible_rows(&self, tree: &FileNode, expanded: &HashSet<String>) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.push_rows(tree, "", 0, expanded, &mut rows);
        rows
    }

    fn push_rows(
        &self,
        node: &FileNode,
        prefix: &str,
        depth: usize,
        expanded: &HashSet<String>,
        rows: &mut Vec<TreeRow>,
    ) {
        if !SearchEngine::node_matches(node, &self.term, self.mode) {
            return;
        }

        let path = node.path_under(prefix);
        let is_expanded = node.is_directory() && expanded.contains(&path);
        rows.push(TreeRow {
            path: path.clone(),
            name: node.name().to_string(),
            depth,
            is_directory: node.is_directory(),
            is_expanded,
        });

        if is_expanded {
            for child in node.children() {
                self.push_rows(child, &path, depth + 1, expanded, rows);
            }
        }
    }
}
