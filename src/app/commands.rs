//! Contains all the command handlers that are callable from the frontend via IPC.
//!
//! Each function in this module corresponds to a specific `IpcMessage::command`.
//! These handlers are responsible for interacting with the `AppState`, the `core`
//! logic, and the project store, and for sending `UserEvent`s back to the UI.

use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::filtering::apply_search;
use super::helpers::with_state_and_notify;
use super::proxy::EventProxy;
use super::state::AppState;
use super::tasks;
use super::view_model::generate_ui_state;
use crate::core::SearchMode;
use crate::storage::{NewProject, ProjectStore};

/// Loads the project list and, if configured, re-opens the last project.
pub fn initialize<P: EventProxy>(
    store: Arc<dyn ProjectStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let last_project = {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.config.last_project.clone()
    };

    tasks::load_projects(store.clone(), proxy.clone(), state.clone());

    if let Some(slug) = last_project {
        tasks::open_project(slug, store, proxy, state);
    }
}

/// Opens the project with the given slug in the explorer view.
pub fn open_project<P: EventProxy>(
    payload: serde_json::Value,
    store: Arc<dyn ProjectStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let Some(slug) = payload.as_str().map(str::to_string) else {
        tracing::warn!("openProject called without a slug payload");
        return;
    };
    tasks::open_project(slug, store, proxy, state);
}

/// Returns from the explorer to the showcase grid.
pub fn close_project<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        s.close_project();
        s.config.last_project = None;
        if let Err(e) = crate::config::settings::save_config(&s.config) {
            tracing::warn!("Failed to save config after closing project: {}", e);
        }
    });
}

/// Flips the expansion state of one directory in the opened tree.
pub fn toggle_directory<P: EventProxy>(
    payload: serde_json::Value,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    if let Some(path) = payload.as_str() {
        with_state_and_notify(&state, &proxy, |s| {
            s.explorer.toggle_directory(path);
        });
    }
}

/// Opens a file of the current tree in the viewer panel.
///
/// The node is looked up once and its content cached on the selection, so
/// later renders don't walk the tree again. Directories are ignored.
pub fn select_file<P: EventProxy>(
    payload: serde_json::Value,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let Some(path) = payload.as_str().map(str::to_string) else {
        return;
    };

    with_state_and_notify(&state, &proxy, |s| {
        let node = s
            .current
            .as_ref()
            .and_then(|loaded| loaded.tree.as_ref())
            .and_then(|tree| tree.node_at_path(&path, ""));

        match node {
            Some(node) if !node.is_directory() => {
                let content = node.content().unwrap_or_default().to_string();
                let name = node.name().to_string();
                s.explorer.select_file(path.clone(), content, name);
            }
            Some(_) => {}
            None => tracing::warn!("selectFile for unknown path '{}'", path),
        }
    });
}

/// Closes the file viewer panel.
pub fn close_selection<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    with_state_and_notify(&state, &proxy, |s| {
        s.explorer.close_selection();
    });
}

/// Updates the search term and recomputes the result list.
pub fn set_search_term<P: EventProxy>(
    payload: serde_json::Value,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    if let Some(term) = payload.as_str() {
        with_state_and_notify(&state, &proxy, |s| {
            s.explorer.set_term(term.to_string());
            apply_search(s);
        });
    }
}

/// Switches between name, content, and combined search.
pub fn set_search_mode<P: EventProxy>(
    payload: serde_json::Value,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    match serde_json::from_value::<SearchMode>(payload) {
        Ok(mode) => {
            with_state_and_notify(&state, &proxy, |s| {
                s.explorer.set_mode(mode);
                apply_search(s);
            });
        }
        Err(e) => tracing::warn!("setSearchMode with invalid payload: {}", e),
    }
}

/// Persists a new project record from the add-project form.
pub fn add_project<P: EventProxy>(
    payload: serde_json::Value,
    store: Arc<dyn ProjectStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let project = match serde_json::from_value::<NewProject>(payload) {
        Ok(project) => project,
        Err(e) => {
            proxy.send_event(UserEvent::ShowError(format!("Invalid project data: {e}")));
            return;
        }
    };

    tokio::spawn(async move {
        match store.insert(project).await {
            Ok(record) => {
                with_state_and_notify(&state, &proxy, |s| {
                    s.status_message = format!("Saved project '{}'.", record.title);
                    s.projects.push(record);
                });
            }
            Err(e) => {
                tracing::error!("Failed to save project: {}", e);
                proxy.send_event(UserEvent::ShowError(format!("Could not save project: {e}")));
            }
        }
    });
}

/// Removes a project record by id.
pub fn delete_project<P: EventProxy>(
    payload: serde_json::Value,
    store: Arc<dyn ProjectStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let Some(id) = payload.as_u64() else {
        tracing::warn!("deleteProject called without a numeric id");
        return;
    };

    tokio::spawn(async move {
        match store.delete(id).await {
            Ok(()) => {
                with_state_and_notify(&state, &proxy, |s| {
                    s.projects.retain(|p| p.id != id);
                    if s.current.as_ref().map(|c| c.record.id) == Some(id) {
                        s.close_project();
                    }
                    s.status_message = "Project deleted.".to_string();
                });
            }
            Err(e) => {
                tracing::error!("Failed to delete project {}: {}", id, e);
                proxy.send_event(UserEvent::ShowError(format!(
                    "Could not delete project: {e}"
                )));
            }
        }
    });
}

/// Re-sends the current state, e.g. after the webview finished loading.
pub fn request_state<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) {
    let state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    let ui_state = generate_ui_state(&state_guard);
    proxy.send_event(UserEvent::StateUpdate(Box::new(ui_state)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::view_model::UiState;
    use crate::core::ImagePayload;
    use crate::storage::{ProjectRecord, StorageError};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::mpsc;

    // A mock EventProxy for capturing events sent to the UI.
    #[derive(Clone)]
    struct TestEventProxy {
        sender: mpsc::UnboundedSender<UserEvent>,
    }

    impl EventProxy for TestEventProxy {
        fn send_event(&self, event: UserEvent) {
            self.sender.send(event).expect("Test receiver dropped");
        }
    }

    /// An in-memory store, optionally delayed to provoke fetch races.
    struct MockStore {
        records: Vec<ProjectRecord>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ProjectStore for MockStore {
        async fn list(&self) -> Result<Vec<ProjectRecord>, StorageError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.records.clone())
        }

        async fn get_by_slug(&self, slug: &str) -> Result<ProjectRecord, StorageError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.records
                .iter()
                .find(|r| r.slug == slug)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(slug.to_string()))
        }

        async fn insert(&self, project: NewProject) -> Result<ProjectRecord, StorageError> {
            Ok(record_from(&project.title, "inserted"))
        }

        async fn update(&self, _id: u64, project: NewProject) -> Result<ProjectRecord, StorageError> {
            Ok(record_from(&project.title, "updated"))
        }

        async fn delete(&self, id: u64) -> Result<(), StorageError> {
            if self.records.iter().any(|r| r.id == id) {
                Ok(())
            } else {
                Err(StorageError::NotFound(format!("id {id}")))
            }
        }
    }

    const TREE: &str = r#"{
        "type": "directory", "name": "root", "children": [
            {"type": "file", "name": "App.js", "content": "function App() {}"}
        ]
    }"#;

    fn record_from(title: &str, slug: &str) -> ProjectRecord {
        ProjectRecord {
            id: 1,
            title: title.to_string(),
            description: String::new(),
            image: ImagePayload::default(),
            link: String::new(),
            slug: slug.to_string(),
            directory_json: TREE.to_string(),
            created_at: Utc::now(),
        }
    }

    struct TestHarness {
        state: Arc<Mutex<AppState>>,
        proxy: TestEventProxy,
        event_rx: mpsc::UnboundedReceiver<UserEvent>,
    }

    impl TestHarness {
        fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                state: Arc::new(Mutex::new(AppState::default())),
                proxy: TestEventProxy { sender: tx },
                event_rx: rx,
            }
        }

        fn store(records: Vec<ProjectRecord>) -> Arc<dyn ProjectStore> {
            Arc::new(MockStore {
                records,
                delay: None,
            })
        }

        fn open(&self, record: ProjectRecord) {
            let mut state = self.state.lock().unwrap();
            state.load_record(record);
        }

        async fn last_state_update(&mut self) -> Option<Box<UiState>> {
            let mut last = None;
            let timeout = tokio::time::sleep(Duration::from_millis(500));
            tokio::pin!(timeout);
            loop {
                tokio::select! {
                    event = self.event_rx.recv() => {
                        match event {
                            Some(UserEvent::StateUpdate(ui_state)) => last = Some(ui_state),
                            Some(_) => {}
                            None => break,
                        }
                    },
                    _ = &mut timeout => break,
                }
            }
            last
        }
    }

    #[tokio::test]
    async fn toggle_directory_flips_expansion() {
        let mut harness = TestHarness::new();
        harness.open(record_from("Demo", "demo"));

        toggle_directory(json!("root"), harness.proxy.clone(), harness.state.clone());
        let ui = harness.last_state_update().await.unwrap();
        let root = &ui.explorer.unwrap().rows[0];
        assert!(!root.is_expanded);

        toggle_directory(json!("root"), harness.proxy.clone(), harness.state.clone());
        let ui = harness.last_state_update().await.unwrap();
        assert!(ui.explorer.unwrap().rows[0].is_expanded);
    }

    #[tokio::test]
    async fn select_file_caches_content_and_ignores_directories() {
        let mut harness = TestHarness::new();
        harness.open(record_from("Demo", "demo"));

        select_file(
            json!("root/App.js"),
            harness.proxy.clone(),
            harness.state.clone(),
        );
        let ui = harness.last_state_update().await.unwrap();
        let selection = ui.explorer.unwrap().selection.unwrap();
        assert_eq!(selection.name, "App.js");
        assert_eq!(selection.content, "function App() {}");

        select_file(json!("root"), harness.proxy.clone(), harness.state.clone());
        let ui = harness.last_state_update().await.unwrap();
        // Directory click leaves the file selection untouched.
        assert!(ui.explorer.unwrap().selection.is_some());

        close_selection(harness.proxy.clone(), harness.state.clone());
        let ui = harness.last_state_update().await.unwrap();
        assert!(ui.explorer.unwrap().selection.is_none());
    }

    #[tokio::test]
    async fn search_term_drives_result_list() {
        let mut harness = TestHarness::new();
        harness.open(record_from("Demo", "demo"));

        set_search_term(json!("app"), harness.proxy.clone(), harness.state.clone());
        let ui = harness.last_state_update().await.unwrap();
        let explorer = ui.explorer.unwrap();
        assert!(explorer.searching);
        assert_eq!(explorer.results.len(), 1);
        assert_eq!(explorer.results[0].path, "root/App.js");

        set_search_term(json!(""), harness.proxy.clone(), harness.state.clone());
        let ui = harness.last_state_update().await.unwrap();
        let explorer = ui.explorer.unwrap();
        assert!(!explorer.searching);
        assert!(explorer.results.is_empty());
    }

    #[tokio::test]
    async fn search_mode_switch_recomputes_results() {
        let mut harness = TestHarness::new();
        harness.open(record_from("Demo", "demo"));

        set_search_term(
            json!("function"),
            harness.proxy.clone(),
            harness.state.clone(),
        );
        set_search_mode(json!("name"), harness.proxy.clone(), harness.state.clone());
        let ui = harness.last_state_update().await.unwrap();
        assert!(ui.explorer.as_ref().unwrap().results.is_empty());

        set_search_mode(
            json!("content"),
            harness.proxy.clone(),
            harness.state.clone(),
        );
        let ui = harness.last_state_update().await.unwrap();
        assert_eq!(ui.explorer.unwrap().results.len(), 1);
    }

    #[tokio::test]
    async fn open_project_loads_record_and_tree() {
        let mut harness = TestHarness::new();
        let store = TestHarness::store(vec![record_from("Demo", "demo")]);

        open_project(
            json!("demo"),
            store,
            harness.proxy.clone(),
            harness.state.clone(),
        );
        let ui = harness.last_state_update().await.unwrap();
        let explorer = ui.explorer.unwrap();
        assert_eq!(explorer.slug, "demo");
        assert!(explorer.tree_available);
        assert!(!ui.is_loading);
    }

    #[tokio::test]
    async fn open_project_with_unknown_slug_surfaces_error() {
        let mut harness = TestHarness::new();
        let store = TestHarness::store(vec![]);

        open_project(
            json!("missing"),
            store,
            harness.proxy.clone(),
            harness.state.clone(),
        );

        let mut saw_error = false;
        let timeout = tokio::time::sleep(Duration::from_millis(500));
        tokio::pin!(timeout);
        loop {
            tokio::select! {
                event = harness.event_rx.recv() => {
                    if let Some(UserEvent::ShowError(msg)) = event {
                        assert!(msg.contains("missing"));
                        saw_error = true;
                        break;
                    }
                },
                _ = &mut timeout => break,
            }
        }
        assert!(saw_error);
        let state = harness.state.lock().unwrap();
        assert!(state.current.is_none());
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn stale_fetch_is_discarded() {
        let mut harness = TestHarness::new();
        let slow: Arc<dyn ProjectStore> = Arc::new(MockStore {
            records: vec![record_from("Slow", "slow")],
            delay: Some(Duration::from_millis(200)),
        });
        let fast = TestHarness::store(vec![record_from("Fast", "fast")]);

        open_project(
            json!("slow"),
            slow,
            harness.proxy.clone(),
            harness.state.clone(),
        );
        open_project(
            json!("fast"),
            fast,
            harness.proxy.clone(),
            harness.state.clone(),
        );

        // Give the slow response time to arrive after the fast one.
        tokio::time::sleep(Duration::from_millis(400)).await;
        let ui = harness.last_state_update().await.unwrap();
        assert_eq!(ui.explorer.unwrap().slug, "fast");
        let state = harness.state.lock().unwrap();
        assert_eq!(state.current.as_ref().unwrap().record.slug, "fast");
    }

    #[tokio::test]
    async fn add_and_delete_update_the_showcase() {
        let mut harness = TestHarness::new();
        let store = TestHarness::store(vec![record_from("Demo", "demo")]);

        add_project(
            json!({
                "title": "Fresh",
                "description": "new one",
                "directory_json": TREE,
            }),
            store.clone(),
            harness.proxy.clone(),
            harness.state.clone(),
        );
        let ui = harness.last_state_update().await.unwrap();
        assert_eq!(ui.projects.len(), 1);
        assert_eq!(ui.projects[0].title, "Fresh");

        delete_project(
            json!(1),
            store,
            harness.proxy.clone(),
            harness.state.clone(),
        );
        let ui = harness.last_state_update().await.unwrap();
        assert!(ui.projects.is_empty());
    }
}
