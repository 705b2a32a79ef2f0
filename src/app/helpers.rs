//! Shared plumbing for the command handlers.

use std::sync::{Arc, Mutex};

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::AppState;
use super::view_model::generate_ui_state;

/// Locks the `AppState`, applies `update_fn`, and pushes the resulting
/// `UiState` to the webview as a `StateUpdate`.
///
/// Nearly every command handler follows this lock-mutate-notify cycle;
/// only the async fetch completions in `tasks` manage the lock themselves
/// because they need the generation-token check between lock and mutate.
pub fn with_state_and_notify<F, P: EventProxy>(
    state: &Arc<Mutex<AppState>>,
    proxy: &P,
    update_fn: F,
) where
    F: FnOnce(&mut AppState),
{
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");

    update_fn(&mut state_guard);

    let ui_state = generate_ui_state(&state_guard);
    proxy.send_event(UserEvent::StateUpdate(Box::new(ui_state)));
}
