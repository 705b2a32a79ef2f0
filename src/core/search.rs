//! Search over a virtual file tree: name matching, per-line content scans,
//! and the flattened pre-order result list.

use serde::{Deserialize, Serialize};

use super::tree::FileNode;

/// Which fields of a node a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Name,
    Content,
    Both,
}

impl SearchMode {
    fn includes_name(self) -> bool {
        matches!(self, SearchMode::Name | SearchMode::Both)
    }

    fn includes_content(self) -> bool {
        matches!(self, SearchMode::Content | SearchMode::Both)
    }
}

/// How a [`SearchResult`] matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Name,
    Content,
    Both,
}

/// One occurrence of the term inside a file's content.
///
/// Offsets are byte positions into the case-folded line. The scan resumes
/// one character after each hit, so overlapping occurrences are reported
/// separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentMatch {
    /// 1-based line number.
    pub line_number: usize,
    pub line_content: String,
    pub match_start: usize,
    pub match_end: usize,
}

/// One entry in the flattened search-result list.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// `/`-joined path from the root token down to this node.
    pub path: String,
    pub name: String,
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub match_kind: MatchKind,
    pub matches: Vec<ContentMatch>,
}

/// A utility struct for searching virtual file trees.
///
/// This struct is stateless and provides methods as associated functions.
pub struct SearchEngine;

impl SearchEngine {
    /// The visibility predicate for the plain tree view.
    ///
    /// True if the node itself matches the term under `mode`, or, for
    /// directories, if any descendant does. An empty term matches
    /// everything. Directories on the path to a deep match stay visible
    /// because the child check recurses before giving up.
    pub fn node_matches(node: &FileNode, term: &str, mode: SearchMode) -> bool {
        if term.is_empty() {
            return true;
        }

        if mode.includes_name() && contains_ci(node.name(), term) {
            return true;
        }

        if mode.includes_content() {
            if let Some(content) = node.content() {
                if !content.is_empty() && !Self::search_in_content(content, term).is_empty() {
                    return true;
                }
            }
        }

        node.is_directory()
            && node
                .children()
                .iter()
                .any(|child| Self::node_matches(child, term, mode))
    }

    /// Finds every case-insensitive occurrence of `term` in `content`,
    /// line by line. Line numbering is 1-based.
    pub fn search_in_content(content: &str, term: &str) -> Vec<ContentMatch> {
        if term.is_empty() {
            return Vec::new();
        }

        let term_lower = term.to_lowercase();
        let mut matches = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line_lower = line.to_lowercase();
            let mut start = 0;

            while let Some(found) = line_lower[start..].find(&term_lower) {
                let match_start = start + found;
                matches.push(ContentMatch {
                    line_number: index + 1,
                    line_content: line.to_string(),
                    match_start,
                    match_end: match_start + term_lower.len(),
                });

                // Resume one character later so overlapping hits are kept.
                start = match_start
                    + line_lower[match_start..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
            }
        }

        matches
    }

    /// Collects search results in a depth-first pre-order walk: parent
    /// before children, siblings in insertion order.
    ///
    /// A node that matches by both name and content yields a single result
    /// with `MatchKind::Both` and the content matches attached.
    pub fn search_files(
        node: &FileNode,
        term: &str,
        mode: SearchMode,
        path_prefix: &str,
    ) -> Vec<SearchResult> {
        let mut results = Vec::new();
        if term.is_empty() {
            return results;
        }
        Self::collect_results(node, term, mode, path_prefix, &mut results);
        results
    }

    fn collect_results(
        node: &FileNode,
        term: &str,
        mode: SearchMode,
        path_prefix: &str,
        results: &mut Vec<SearchResult>,
    ) {
        let full_path = node.path_under(path_prefix);

        let name_matched = mode.includes_name() && contains_ci(node.name(), term);
        if name_matched {
            results.push(SearchResult {
                path: full_path.clone(),
                name: node.name().to_string(),
                is_directory: node.is_directory(),
                content: node.content().map(str::to_string),
                match_kind: MatchKind::Name,
                matches: Vec::new(),
            });
        }

        if mode.includes_content() {
            if let Some(content) = node.content() {
                if !content.is_empty() {
                    let content_matches = Self::search_in_content(content, term);
                    if !content_matches.is_empty() {
                        if name_matched {
                            // Name result for this path was just pushed;
                            // upgrade it instead of emitting a duplicate.
                            let existing = results
                                .iter_mut()
                                .rfind(|r| r.path == full_path)
                                .expect("name match pushed above");
                            existing.match_kind = MatchKind::Both;
                            existing.matches = content_matches;
                        } else {
                            results.push(SearchResult {
                                path: full_path.clone(),
                                name: node.name().to_string(),
                                is_directory: false,
                                content: node.content().map(str::to_string),
                                match_kind: MatchKind::Content,
                                matches: content_matches,
                            });
                        }
                    }
                }
            }
        }

        for child in node.children() {
            Self::collect_results(child, term, mode, &full_path, results);
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
