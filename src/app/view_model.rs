//! Responsible for transforming the `AppState` into a `UiState` view model.
//!
//! This module acts as a presentation layer, preparing data specifically for
//! consumption by the UI: normalized project cards, the flat tree-row list
//! (or the search-result list while a search is active), and the selected
//! file, all serialized to the webview on every update.

use serde::Serialize;

use crate::core::{image, SearchMode, SearchResult, Selection};

use super::state::AppState;

/// A serializable representation of the application state for the UI.
#[derive(Serialize, Clone, Debug)]
pub struct UiState {
    pub projects: Vec<ProjectCard>,
    pub explorer: Option<ExplorerView>,
    pub is_loading: bool,
    pub status_message: String,
    pub error: Option<String>,
}

/// One project in the showcase grid. `image_src` is always renderable.
#[derive(Serialize, Clone, Debug)]
pub struct ProjectCard {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub image_src: String,
    pub link: String,
    pub slug: String,
    pub created_at: String,
}

/// The opened project's explorer panel.
#[derive(Serialize, Clone, Debug)]
pub struct ExplorerView {
    pub slug: String,
    pub title: String,
    pub search_term: String,
    pub search_mode: SearchMode,
    /// `true` when the result list should replace the plain tree.
    pub searching: bool,
    /// `false` when the stored tree was malformed.
    pub tree_available: bool,
    pub rows: Vec<TreeRowView>,
    pub results: Vec<SearchResult>,
    pub selection: Option<Selection>,
}

/// A serializable representation of a single visible tree row for the UI.
#[derive(Serialize, Clone, Debug)]
pub struct TreeRowView {
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub is_directory: bool,
    pub is_expanded: bool,
    pub is_selected: bool,
    pub is_match: bool,
}

/// Creates the complete `UiState` from the current `AppState`.
pub fn generate_ui_state(state: &AppState) -> UiState {
    let projects = state
        .projects
        .iter()
        .map(|record| ProjectCard {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            image_src: image::normalize(&record.image, &state.config.placeholder_image),
            link: record.link.clone(),
            slug: record.slug.clone(),
            created_at: record.created_at.to_rfc3339(),
        })
        .collect();

    let explorer = state.current.as_ref().map(|loaded| {
        let searching = state.explorer.is_searching();
        let rows = match &loaded.tree {
            Some(tree) => {
                let expanded = state.explorer.effective_expansion(&state.search_results);
                build_row_views(state, tree, &expanded)
            }
            None => Vec::new(),
        };

        ExplorerView {
            slug: loaded.record.slug.clone(),
            title: loaded.record.title.clone(),
            search_term: state.explorer.term().to_string(),
            search_mode: state.explorer.mode(),
            searching,
            tree_available: loaded.tree.is_some(),
            rows,
            results: if searching {
                state.search_results.clone()
            } else {
                Vec::new()
            },
            selection: state.explorer.selection().cloned(),
        }
    });

    UiState {
        projects,
        explorer,
        is_loading: state.is_loading,
        status_message: state.status_message.clone(),
        error: state.last_error.clone(),
    }
}

fn build_row_views(
    state: &AppState,
    tree: &crate::core::FileNode,
    expanded: &std::collections::HashSet<String>,
) -> Vec<TreeRowView> {
    let term = state.explorer.term().trim().to_lowercase();
    let selected_path = state.explorer.selection().map(|s| s.path.clone());

    state
        .explorer
        .visible_rows(tree, expanded)
        .into_iter()
        .map(|row| {
            let is_match = !term.is_empty() && row.name.to_lowercase().contains(&term);
            TreeRowView {
                is_selected: selected_path.as_deref() == Some(row.path.as_str()),
                is_match,
                name: row.name,
                path: row.path,
                depth: row.depth,
                is_directory: row.is_directory,
                is_expanded: row.is_expanded,
            }
        })
        .collect()
}
