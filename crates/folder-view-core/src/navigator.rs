//! Folder navigation state machine
//!
//! [`FolderNavigator`] decides, once per query cycle, whether the interface
//! shows folders or a flat result list. The host drives it through three
//! hooks that must run in order for every query:
//!
//! 1. [`FolderNavigator::on_query_build`]: recompute level/path, classify
//!    the state, shape the query, and capture a [`RequestContext`];
//! 2. [`FolderNavigator::on_query_built`]: reapply the shaping after other
//!    components have touched the builder;
//! 3. [`FolderNavigator::on_results_ready`]: partition the payload using the
//!    context captured in step 1.
//!
//! Every context carries a navigation generation. Toggles, folder clicks and
//! new builds advance it; a response whose context is older is discarded.

use serde::{Deserialize, Serialize};

use crate::classifier::is_vanilla;
use crate::config::{FolderViewOptions, QueryStrategy};
use crate::error::{FolderViewError, FolderViewResult};
use crate::host::{
    AnalyticsSink, FolderRenderer, NavigationCause, NavigationEvent, QueryExecutor,
};
use crate::partition::{FolderListing, FolderTile, child_folders, filter_by_level, partition};
use crate::query::{FolderQuery, FolderQueryKind, NavigationMode, QueryBuilder, shape_query};
use crate::results::{ResultItem, ResultPayload};
use crate::state::QueryStateSnapshot;
use crate::tracker::{FolderLevel, FolderPath, compute_level_and_path};

/// Immutable capture of what a request was shaped for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Navigation generation at shape time
    pub generation: u64,
    /// Mode the query was shaped for
    pub mode: NavigationMode,
    /// Folder level at shape time
    pub level: FolderLevel,
    /// Folder path at shape time
    pub path: FolderPath,
    /// Dedicated folder listing query, when that strategy is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_query: Option<FolderQuery>,
}

/// What the host should show for one completed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Folder tiles plus the results stored at the current level
    Folders {
        /// Child folders; `None` when they arrive through the dedicated query
        listing: Option<FolderListing>,
        /// Same-level results, engine order
        results: Vec<ResultItem>,
    },
    /// Flat result list, unmodified
    Search {
        /// Results as returned by the engine
        results: Vec<ResultItem>,
        /// Whether folder view was requested but could not be built
        degraded: bool,
    },
    /// The response belongs to a superseded navigation and was ignored
    Stale {
        /// Generation of the response
        issued: u64,
        /// Generation of the navigator
        current: u64,
    },
}

/// What the host should show for a dedicated folder sub-query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FolderQueryOutcome {
    /// Child folders of the current level
    Folders {
        /// Listing that was rendered
        listing: FolderListing,
    },
    /// Items stored directly in the current folder
    Items {
        /// Items at the current level
        results: Vec<ResultItem>,
        /// Whether the folder holds no items at all
        empty_folder: bool,
    },
    /// The sub-query came back without the folder facet; search view kept
    Unavailable,
    /// The response belongs to a superseded navigation and was ignored
    Stale {
        /// Generation of the response
        issued: u64,
        /// Generation of the navigator
        current: u64,
    },
}

/// The folder view state machine.
#[derive(Debug)]
pub struct FolderNavigator<R, A> {
    options: FolderViewOptions,
    mode: NavigationMode,
    generation: u64,
    level: FolderLevel,
    path: FolderPath,
    pending: Option<RequestContext>,
    renderer: R,
    analytics: A,
}

impl<R: FolderRenderer, A: AnalyticsSink> FolderNavigator<R, A> {
    /// Create a navigator.
    ///
    /// Toggle-enabled navigators start in the configured default mode; the
    /// others start in search view and follow the classifier from the first
    /// cycle on.
    pub fn new(options: FolderViewOptions, renderer: R, analytics: A) -> FolderViewResult<Self> {
        options.validate()?;
        let mode = if options.use_toggle_button && options.use_folder_view_by_default {
            NavigationMode::FolderView
        } else {
            NavigationMode::SearchView
        };
        Ok(Self {
            options,
            mode,
            generation: 0,
            level: FolderLevel::ROOT,
            path: FolderPath::root(),
            pending: None,
            renderer,
            analytics,
        })
    }

    /// Active options.
    #[must_use]
    pub const fn options(&self) -> &FolderViewOptions {
        &self.options
    }

    /// Active mode.
    #[must_use]
    pub const fn mode(&self) -> NavigationMode {
        self.mode
    }

    /// Folder level as of the last build.
    #[must_use]
    pub const fn level(&self) -> FolderLevel {
        self.level
    }

    /// Folder path as of the last build.
    #[must_use]
    pub const fn path(&self) -> &FolderPath {
        &self.path
    }

    /// Current navigation generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Context of the query being built, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&RequestContext> {
        self.pending.as_ref()
    }

    /// Renderer collaborator.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Analytics collaborator.
    #[must_use]
    pub const fn analytics(&self) -> &A {
        &self.analytics
    }

    /// Consume the navigator, returning its collaborators.
    pub fn into_parts(self) -> (R, A) {
        (self.renderer, self.analytics)
    }

    // ── Lifecycle hooks ─────────────────────────────────────────────────

    /// Build phase: classify the state and shape the outgoing query.
    ///
    /// Returns the context the host must hand back with the response.
    pub fn on_query_build<B: QueryBuilder + ?Sized>(
        &mut self,
        state: &QueryStateSnapshot,
        builder: &mut B,
    ) -> RequestContext {
        let (level, path) = compute_level_and_path(state, &self.options.facet_field);
        self.level = level;
        self.path = path;

        let vanilla = is_vanilla(state, &self.options.facet_field);
        let previous = self.mode;
        if self.options.use_toggle_button {
            if !vanilla {
                self.mode = NavigationMode::SearchView;
            }
        } else {
            self.mode = NavigationMode::from_vanilla(vanilla);
        }
        if self.mode != previous {
            tracing::debug!(from = %previous, to = %self.mode, vanilla, "navigation mode changed");
        }
        self.renderer.show_mode(self.mode);

        self.generation += 1;
        let folder_query = (self.mode.is_folder_view()
            && self.options.strategy == QueryStrategy::DedicatedQuery)
            .then(|| FolderQuery::facets(&self.options, self.level, &self.path));

        shape_query(
            builder,
            self.mode,
            self.level,
            &self.options.item_level_field,
        );

        let ctx = RequestContext {
            generation: self.generation,
            mode: self.mode,
            level: self.level,
            path: self.path.clone(),
            folder_query,
        };
        tracing::debug!(
            generation = ctx.generation,
            mode = %ctx.mode,
            level = ctx.level.get(),
            "query build captured"
        );
        self.pending = Some(ctx.clone());
        ctx
    }

    /// Done-building phase: reapply the shaping for the pending request.
    ///
    /// # Errors
    /// Returns [`FolderViewError::InvalidState`] when no build phase ran first.
    pub fn on_query_built<B: QueryBuilder + ?Sized>(&self, builder: &mut B) -> FolderViewResult<()> {
        let ctx = self.pending.as_ref().ok_or_else(|| {
            FolderViewError::InvalidState("no pending query build to reapply".to_string())
        })?;
        shape_query(builder, ctx.mode, ctx.level, &self.options.item_level_field);
        Ok(())
    }

    /// Result-ready phase: transform the payload for display.
    pub fn on_results_ready(&mut self, ctx: &RequestContext, payload: ResultPayload) -> CycleOutcome {
        if let Some(stale) = self.stale(ctx) {
            return stale;
        }
        if ctx.pending_matches(self.pending.as_ref()) {
            self.pending = None;
        }

        if !ctx.mode.is_folder_view() {
            self.show_search_view();
            return CycleOutcome::Search {
                results: payload.results,
                degraded: false,
            };
        }

        match self.options.strategy {
            QueryStrategy::PostFilter => match partition(
                &payload,
                &self.options.facet_field,
                &self.options.item_level_field,
                ctx.level,
                &ctx.path,
            ) {
                Ok(part) => {
                    self.show_folder_view();
                    self.renderer.render_folders(&part.listing);
                    CycleOutcome::Folders {
                        listing: Some(part.listing),
                        results: part.results,
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        generation = ctx.generation,
                        "folder view unavailable for this cycle; falling back to search view"
                    );
                    self.show_search_view();
                    CycleOutcome::Search {
                        results: payload.results,
                        degraded: true,
                    }
                }
            },
            QueryStrategy::DedicatedQuery => {
                self.show_folder_view();
                CycleOutcome::Folders {
                    listing: None,
                    results: filter_by_level(
                        &payload.results,
                        &self.options.item_level_field,
                        ctx.level,
                    ),
                }
            }
        }
    }

    /// Handle the response to a dedicated folder sub-query.
    pub fn on_folder_query_results(
        &mut self,
        ctx: &RequestContext,
        kind: FolderQueryKind,
        payload: &ResultPayload,
    ) -> FolderQueryOutcome {
        if let Some(CycleOutcome::Stale { issued, current }) = self.stale(ctx) {
            return FolderQueryOutcome::Stale { issued, current };
        }

        match kind {
            FolderQueryKind::Facets => {
                let Some(facet) = payload.facet(&self.options.facet_field) else {
                    tracing::warn!(
                        field = self.options.facet_field_name(),
                        generation = ctx.generation,
                        "folder sub-query returned no folder facet; keeping search view"
                    );
                    self.show_search_view();
                    return FolderQueryOutcome::Unavailable;
                };
                let listing = child_folders(facet, ctx.level, &ctx.path);
                self.renderer.render_folders(&listing);
                FolderQueryOutcome::Folders { listing }
            }
            FolderQueryKind::Results => {
                let results =
                    filter_by_level(&payload.results, &self.options.item_level_field, ctx.level);
                let empty_folder = results.is_empty();
                if empty_folder {
                    tracing::debug!(level = ctx.level.get(), "folder holds no items");
                }
                FolderQueryOutcome::Items {
                    results,
                    empty_folder,
                }
            }
        }
    }

    // ── User actions ────────────────────────────────────────────────────

    /// Flip the mode and re-run the query from a clean state.
    ///
    /// Clears the free-text query and every facet filter except the folder
    /// facet's, logs the navigation event, then asks the host to execute.
    ///
    /// # Errors
    /// Returns [`FolderViewError::ToggleDisabled`] when the options disable the toggle.
    pub fn toggle<E: QueryExecutor + ?Sized>(
        &mut self,
        state: &mut QueryStateSnapshot,
        executor: &mut E,
    ) -> FolderViewResult<NavigationMode> {
        if !self.options.use_toggle_button {
            return Err(FolderViewError::ToggleDisabled);
        }

        let cleared = state.reset_filters_except(&self.options.facet_field);
        self.mode = self.mode.flipped();
        self.generation += 1;
        self.renderer.show_mode(self.mode);

        let event = if self.mode.is_folder_view() {
            NavigationEvent::entered(NavigationCause::TriggerQuery)
        } else {
            NavigationEvent::exited(NavigationCause::FacetSelect)
        };
        self.analytics.log_navigation(&event);
        tracing::info!(mode = %self.mode, cleared_facets = cleared, "folder view toggled");

        executor.execute_query();
        Ok(self.mode)
    }

    /// Navigate into a folder tile.
    ///
    /// Selects the tile's path on the folder facet and re-runs the query.
    pub fn navigate_to<E: QueryExecutor + ?Sized>(
        &mut self,
        tile: &FolderTile,
        state: &mut QueryStateSnapshot,
        executor: &mut E,
    ) {
        state.set_facet(&self.options.facet_field, tile.path.segments().to_vec());
        self.generation += 1;
        self.analytics
            .log_navigation(&NavigationEvent::entered(NavigationCause::FacetSelect));
        tracing::info!(
            folder = %tile.value,
            depth = tile.path.len(),
            "navigating into folder"
        );
        executor.execute_query();
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn stale(&self, ctx: &RequestContext) -> Option<CycleOutcome> {
        if ctx.generation == self.generation {
            return None;
        }
        tracing::debug!(
            issued = ctx.generation,
            current = self.generation,
            "discarding response from superseded navigation"
        );
        Some(CycleOutcome::Stale {
            issued: ctx.generation,
            current: self.generation,
        })
    }

    fn show_folder_view(&mut self) {
        self.renderer.create_scaffold();
        self.renderer.set_no_results_hidden(true);
    }

    fn show_search_view(&mut self) {
        self.renderer.remove_scaffold();
        self.renderer.set_no_results_hidden(false);
    }
}

impl RequestContext {
    /// Build a dedicated sub-query of `kind` for this context.
    #[must_use]
    pub fn folder_query_of(&self, kind: FolderQueryKind, options: &FolderViewOptions) -> FolderQuery {
        FolderQuery::build(kind, options, self.level, &self.path)
    }

    fn pending_matches(&self, pending: Option<&Self>) -> bool {
        pending.is_some_and(|p| p.generation == self.generation)
    }
}
