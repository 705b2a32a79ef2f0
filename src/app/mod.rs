//! The application layer: shared state, IPC dispatch, and UI event delivery.
//!
//! The webview frontend talks to this layer exclusively through JSON
//! `IpcMessage`s; the backend answers with `UserEvent`s that the event loop
//! turns into `window.*` calls in the webview.

pub mod commands;
pub mod events;
pub mod filtering;
pub mod helpers;
pub mod proxy;
pub mod state;
pub mod tasks;
pub mod view_model;

use std::sync::{Arc, Mutex};

use events::{IpcMessage, UserEvent};
use proxy::EventProxy;
use state::AppState;

use crate::storage::ProjectStore;

/// Parses a raw IPC string from the webview and dispatches it to the
/// matching command handler.
pub fn handle_ipc_message<P: EventProxy>(
    message: String,
    store: Arc<dyn ProjectStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let message: IpcMessage = match serde_json::from_str(&message) {
        Ok(message) => message,
        Err(e) => {
            tracing::error!("Failed to parse IPC message: {}", e);
            return;
        }
    };

    tracing::debug!("IPC command received: {}", message.command);

    match message.command.as_str() {
        "initialize" => commands::initialize(store, proxy, state),
        "openProject" => commands::open_project(message.payload, store, proxy, state),
        "closeProject" => commands::close_project(proxy, state),
        "toggleDirectory" => commands::toggle_directory(message.payload, proxy, state),
        "selectFile" => commands::select_file(message.payload, proxy, state),
        "closeSelection" => commands::close_selection(proxy, state),
        "setSearchTerm" => commands::set_search_term(message.payload, proxy, state),
        "setSearchMode" => commands::set_search_mode(message.payload, proxy, state),
        "addProject" => commands::add_project(message.payload, store, proxy, state),
        "deleteProject" => commands::delete_project(message.payload, store, proxy, state),
        "requestState" => commands::request_state(proxy, state),
        unknown => tracing::warn!("Unknown IPC command: {}", unknown),
    }
}

/// Delivers a backend event to the webview by invoking the corresponding
/// `window.*` function with a JSON argument.
pub fn handle_user_event(event: UserEvent, webview: &wry::WebView) {
    let script = match event {
        UserEvent::StateUpdate(ui_state) => match serde_json::to_string(&ui_state) {
            Ok(json) => format!("window.render({json})"),
            Err(e) => {
                tracing::error!("Failed to serialize UI state: {}", e);
                return;
            }
        },
        UserEvent::ShowError(message) => match serde_json::to_string(&message) {
            Ok(json) => format!("window.showError({json})"),
            Err(e) => {
                tracing::error!("Failed to serialize error message: {}", e);
                return;
            }
        },
    };

    if let Err(e) = webview.evaluate_script(&script) {
        tracing::error!("Failed to evaluate script in webview: {}", e);
    }
}
