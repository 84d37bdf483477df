//! Host collaborator traits
//!
//! The navigator never touches the page directly. Rendering, analytics and
//! query execution belong to the host and are reached through these traits,
//! the same way the search engine reaches its document source.

use serde::{Deserialize, Serialize};

use crate::partition::FolderListing;
use crate::query::NavigationMode;

/// Renders the folder scaffold and tiles.
pub trait FolderRenderer {
    /// Insert the folder container ahead of the result list (idempotent).
    fn create_scaffold(&mut self);

    /// Tear the folder container down, if present.
    fn remove_scaffold(&mut self);

    /// Replace the rendered tiles with `listing`.
    ///
    /// An empty non-root listing should be shown as an empty folder.
    fn render_folders(&mut self, listing: &FolderListing);

    /// Reflect the active mode on the indicator or toggle.
    fn show_mode(&mut self, _mode: NavigationMode) {}

    /// Hide (folder view) or restore (search view) the host's no-results message.
    fn set_no_results_hidden(&mut self, _hidden: bool) {}
}

/// Receives folder navigation analytics events.
pub trait AnalyticsSink {
    /// Record one navigation event.
    fn log_navigation(&mut self, event: &NavigationEvent);
}

/// Issues a new query through the host's query controller.
pub trait QueryExecutor {
    /// Execute the query built from the current host state.
    fn execute_query(&mut self);
}

/// Direction of a navigation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationEventKind {
    /// The user moved into folder navigation (toggle on, folder click)
    Entered,
    /// The user left folder navigation (toggle off)
    Exited,
}

/// What triggered a navigation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationCause {
    /// A facet value (folder) selection
    FacetSelect,
    /// An explicit query trigger
    TriggerQuery,
}

/// Analytics event fired on toggle and on folder clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    /// Entered or exited
    pub kind: NavigationEventKind,
    /// Trigger
    pub cause: NavigationCause,
    /// Whether folder view is active after the event
    pub folder_view_search: bool,
}

impl NavigationEvent {
    /// Folder navigation entered.
    #[must_use]
    pub const fn entered(cause: NavigationCause) -> Self {
        Self {
            kind: NavigationEventKind::Entered,
            cause,
            folder_view_search: true,
        }
    }

    /// Folder navigation exited.
    #[must_use]
    pub const fn exited(cause: NavigationCause) -> Self {
        Self {
            kind: NavigationEventKind::Exited,
            cause,
            folder_view_search: false,
        }
    }

    /// Stable event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.kind {
            NavigationEventKind::Entered => "folder_navigation_entered",
            NavigationEventKind::Exited => "folder_navigation_exited",
        }
    }
}

/// One call observed by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum RenderCall {
    /// `create_scaffold`
    CreateScaffold,
    /// `remove_scaffold`
    RemoveScaffold,
    /// `render_folders`
    RenderFolders {
        /// Listing that was rendered
        listing: FolderListing,
    },
    /// `show_mode`
    ShowMode {
        /// Mode shown
        mode: NavigationMode,
    },
    /// `set_no_results_hidden`
    NoResultsHidden {
        /// Whether the message was hidden
        hidden: bool,
    },
}

/// Renderer that records every call; used by headless hosts and the CLI.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    /// Calls, oldest first
    pub calls: Vec<RenderCall>,
    scaffold: bool,
}

impl RecordingRenderer {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the scaffold is currently present.
    #[must_use]
    pub const fn has_scaffold(&self) -> bool {
        self.scaffold
    }

    /// Most recently rendered listing.
    #[must_use]
    pub fn last_listing(&self) -> Option<&FolderListing> {
        self.calls.iter().rev().find_map(|call| match call {
            RenderCall::RenderFolders { listing } => Some(listing),
            _ => None,
        })
    }

    /// Drain recorded calls.
    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }
}

impl FolderRenderer for RecordingRenderer {
    fn create_scaffold(&mut self) {
        self.scaffold = true;
        self.calls.push(RenderCall::CreateScaffold);
    }

    fn remove_scaffold(&mut self) {
        self.scaffold = false;
        self.calls.push(RenderCall::RemoveScaffold);
    }

    fn render_folders(&mut self, listing: &FolderListing) {
        self.calls.push(RenderCall::RenderFolders {
            listing: listing.clone(),
        });
    }

    fn show_mode(&mut self, mode: NavigationMode) {
        self.calls.push(RenderCall::ShowMode { mode });
    }

    fn set_no_results_hidden(&mut self, hidden: bool) {
        self.calls.push(RenderCall::NoResultsHidden { hidden });
    }
}

/// Analytics sink that records events.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnalytics {
    /// Events, oldest first
    pub events: Vec<NavigationEvent>,
}

impl AnalyticsSink for RecordingAnalytics {
    fn log_navigation(&mut self, event: &NavigationEvent) {
        self.events.push(*event);
    }
}

/// Query executor that counts executions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingExecutor {
    /// Number of `execute_query` calls
    pub executions: usize,
}

impl QueryExecutor for CountingExecutor {
    fn execute_query(&mut self) {
        self.executions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::FolderLevel;

    #[test]
    fn event_names_and_flags() {
        let entered = NavigationEvent::entered(NavigationCause::TriggerQuery);
        assert_eq!(entered.name(), "folder_navigation_entered");
        assert!(entered.folder_view_search);

        let exited = NavigationEvent::exited(NavigationCause::FacetSelect);
        assert_eq!(exited.name(), "folder_navigation_exited");
        assert!(!exited.folder_view_search);
    }

    #[test]
    fn event_serializes_camel_case() {
        let json = serde_json::to_value(NavigationEvent::entered(NavigationCause::FacetSelect))
            .unwrap();
        assert_eq!(json["kind"], "entered");
        assert_eq!(json["cause"], "facetSelect");
        assert_eq!(json["folderViewSearch"], true);
    }

    #[test]
    fn recording_renderer_tracks_scaffold() {
        let mut renderer = RecordingRenderer::new();
        renderer.create_scaffold();
        assert!(renderer.has_scaffold());
        renderer.render_folders(&FolderListing {
            level: FolderLevel::ROOT,
            tiles: Vec::new(),
        });
        renderer.remove_scaffold();
        assert!(!renderer.has_scaffold());
        assert!(renderer.last_listing().is_some());
        assert_eq!(renderer.take_calls().len(), 3);
        assert!(renderer.calls.is_empty());
    }
}
