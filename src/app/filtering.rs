//! Recomputes the cached search-result list from the application state.
//!
//! The result list is a pure function of the opened tree, the search term,
//! and the search mode; this module re-derives it after every mutation that
//! touches one of those inputs, so the view model never searches during
//! rendering.

use crate::app::state::AppState;

/// Re-runs the active search against the opened project's tree.
pub fn apply_search(state: &mut AppState) {
    state.search_results = match state.current.as_ref().and_then(|p| p.tree.as_ref()) {
        Some(tree) => state.explorer.search(tree),
        None => Vec::new(),
    };
}
