//! Defines the central, mutable state of the application.

use crate::config::AppConfig;
use crate::core::{parse_tree, ExplorerState, FileNode, SearchResult};
use crate::storage::ProjectRecord;

/// A project opened in the explorer view.
pub struct LoadedProject {
    pub record: ProjectRecord,
    /// Parsed directory tree; `None` when `directory_json` was malformed
    /// and the view falls back to "no tree available".
    pub tree: Option<FileNode>,
}

/// Holds the complete, mutable state of the application.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` to allow for safe, shared access
/// from the main event loop, IPC handlers, and async fetch tasks.
pub struct AppState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// All project records, shown as the showcase grid.
    pub projects: Vec<ProjectRecord>,
    /// The project currently opened in the explorer, if any.
    pub current: Option<LoadedProject>,
    /// Expansion, selection, and search query for the opened tree.
    pub explorer: ExplorerState,
    /// Cached results of the active search; recomputed by
    /// [`filtering::apply_search`](super::filtering::apply_search) whenever
    /// the term, mode, or tree changes.
    pub search_results: Vec<SearchResult>,
    /// `true` while a store fetch is in flight.
    pub is_loading: bool,
    /// Human-readable status line for the UI.
    pub status_message: String,
    /// Display-only error state; never fatal.
    pub last_error: Option<String>,
    /// Monotonic counter identifying the latest project fetch. Responses
    /// carrying an older token are stale and must be discarded.
    fetch_generation: u64,
}

impl Default for AppState {
    /// Creates a default `AppState` instance, loading the configuration from disk.
    fn default() -> Self {
        Self {
            config: AppConfig::load().unwrap_or_default(),
            projects: Vec::new(),
            current: None,
            explorer: ExplorerState::default(),
            search_results: Vec::new(),
            is_loading: false,
            status_message: "Ready.".to_string(),
            last_error: None,
            fetch_generation: 0,
        }
    }
}

impl AppState {
    /// Registers a new in-flight fetch and returns its token.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_generation += 1;
        self.is_loading = true;
        self.last_error = None;
        self.fetch_generation
    }

    /// `true` if `token` belongs to the most recent fetch.
    pub fn is_current_fetch(&self, token: u64) -> bool {
        self.fetch_generation == token
    }

    /// Installs a fetched record as the opened project.
    ///
    /// The tree is parsed once here and treated as immutable afterwards. A
    /// malformed payload is logged and degraded to "no tree"; it never
    /// propagates as an error.
    pub fn load_record(&mut self, record: ProjectRecord) {
        let tree = match parse_tree(&record.directory_json) {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::warn!("Project '{}' has a malformed tree: {}", record.slug, e);
                None
            }
        };

        // Fresh explorer state with the root directory shown open.
        self.explorer = match &tree {
            Some(root) if root.is_directory() => {
                ExplorerState::with_expanded([root.name().to_string()])
            }
            _ => ExplorerState::default(),
        };
        self.search_results.clear();
        self.status_message = format!("Opened project '{}'.", record.title);
        self.config.last_project = Some(record.slug.clone());
        self.current = Some(LoadedProject { record, tree });
        self.is_loading = false;
    }

    /// Leaves the explorer view and returns to the showcase.
    pub fn close_project(&mut self) {
        self.current = None;
        self.explorer = ExplorerState::default();
        self.search_results.clear();
        self.status_message = "Ready.".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ImagePayload;
    use chrono::Utc;

    fn record(slug: &str, directory_json: &str) -> ProjectRecord {
        ProjectRecord {
            id: 1,
            title: "Demo".to_string(),
            description: String::new(),
            image: ImagePayload::default(),
            link: String::new(),
            slug: slug.to_string(),
            directory_json: directory_json.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn load_record_parses_tree_and_expands_root() {
        let mut state = AppState::default();
        state.load_record(record(
            "demo",
            r#"{"type":"directory","name":"root","children":[]}"#,
        ));
        assert!(state.current.as_ref().unwrap().tree.is_some());
        assert!(state.explorer.expanded().contains("root"));
        assert!(!state.is_loading);
    }

    #[test]
    fn malformed_tree_degrades_to_none() {
        let mut state = AppState::default();
        state.load_record(record("demo", "{not json"));
        let loaded = state.current.as_ref().unwrap();
        assert!(loaded.tree.is_none());
        assert_eq!(loaded.record.slug, "demo");
    }

    #[test]
    fn only_latest_fetch_token_is_current() {
        let mut state = AppState::default();
        let first = state.begin_fetch();
        let second = state.begin_fetch();
        assert!(!state.is_current_fetch(first));
        assert!(state.is_current_fetch(second));
    }
}
