//! Async store fetches. Each fetch is a one-shot task; project fetches carry
//! a generation token so responses that lost a race against a newer
//! navigation are discarded instead of rendering the wrong project.

use std::sync::{Arc, Mutex};

use crate::storage::ProjectStore;

use super::events::UserEvent;
use super::filtering::apply_search;
use super::helpers::with_state_and_notify;
use super::proxy::EventProxy;
use super::state::AppState;
use super::view_model::generate_ui_state;

/// Fetches the full project list for the showcase grid.
pub fn load_projects<P: EventProxy>(
    store: Arc<dyn ProjectStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    with_state_and_notify(&state, &proxy, |s| {
        s.is_loading = true;
        s.status_message = "Loading projects...".to_string();
    });

    tokio::spawn(async move {
        let result = store.list().await;
        match result {
            Ok(projects) => {
                with_state_and_notify(&state, &proxy, |s| {
                    s.status_message = format!("{} project(s) loaded.", projects.len());
                    s.projects = projects;
                    s.is_loading = false;
                });
            }
            Err(e) => {
                tracing::error!("Failed to load project list: {}", e);
                proxy.send_event(UserEvent::ShowError(format!(
                    "Could not load projects: {e}"
                )));
                with_state_and_notify(&state, &proxy, |s| {
                    s.is_loading = false;
                    s.last_error = Some(e.to_string());
                    s.status_message = "Failed to load projects.".to_string();
                });
            }
        }
    });
}

/// Fetches one project by slug and opens it in the explorer.
///
/// The generation token is captured before the await; if another fetch
/// started in the meantime, this response is stale and dropped.
pub fn open_project<P: EventProxy>(
    slug: String,
    store: Arc<dyn ProjectStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let token = {
        let mut state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        let token = state_guard.begin_fetch();
        state_guard.status_message = format!("Loading project '{slug}'...");
        proxy.send_event(UserEvent::StateUpdate(Box::new(generate_ui_state(
            &state_guard,
        ))));
        token
    };

    tokio::spawn(async move {
        let result = store.get_by_slug(&slug).await;

        let mut state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        if !state_guard.is_current_fetch(token) {
            tracing::warn!("Discarding stale fetch result for project '{}'", slug);
            return;
        }

        match result {
            Ok(record) => {
                state_guard.load_record(record);
                apply_search(&mut state_guard);
                if let Err(e) = crate::config::settings::save_config(&state_guard.config) {
                    tracing::warn!("Failed to save config after opening project: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to fetch project '{}': {}", slug, e);
                state_guard.is_loading = false;
                state_guard.last_error = Some(e.to_string());
                state_guard.status_message = format!("Could not open project '{slug}'.");
                proxy.send_event(UserEvent::ShowError(format!("Could not open '{slug}': {e}")));
            }
        }

        let ui_state = generate_ui_state(&state_guard);
        proxy.send_event(UserEvent::StateUpdate(Box::new(ui_state)));
    });
}
