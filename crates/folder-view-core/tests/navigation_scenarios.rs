//! End-to-end navigation scenarios driven through the public API.
//!
//! Each test plays the host: it owns the query state, runs the three
//! lifecycle hooks in order, and feeds back engine payloads.

use folder_view_core::{
    CountingExecutor, CycleOutcome, FacetEntry, FacetValueNode, FolderLevel, FolderNavigator,
    FolderQueryKind, FolderQueryOutcome, FolderViewOptions, NavigationCause, NavigationEventKind,
    NavigationMode, OutgoingQuery, QueryStateSnapshot, QueryStrategy, RecordingAnalytics,
    RecordingRenderer, RenderCall, RequestContext, ResultItem, ResultPayload,
};

// ═══════════════════════════════════════════════════════════════════════
// Host harness
// ═══════════════════════════════════════════════════════════════════════

const FOLDER: &str = "@dtdam_parentfolder_facet";
const LEVEL: &str = "@dtdam_item_level";

type Nav = FolderNavigator<RecordingRenderer, RecordingAnalytics>;

fn navigator(options: FolderViewOptions) -> Nav {
    FolderNavigator::new(options, RecordingRenderer::new(), RecordingAnalytics::default())
        .expect("valid options")
}

fn default_navigator() -> Nav {
    navigator(FolderViewOptions::new(FOLDER, LEVEL))
}

/// Run build + built and return the shaped query with its context.
fn build(nav: &mut Nav, state: &QueryStateSnapshot) -> (OutgoingQuery, RequestContext) {
    let mut query = OutgoingQuery::new(state.query());
    let ctx = nav.on_query_build(state, &mut query);
    nav.on_query_built(&mut query).expect("build ran first");
    (query, ctx)
}

fn item(title: &str, level: u32) -> ResultItem {
    ResultItem::new(title).with_raw(LEVEL, level)
}

fn payload(values: Vec<FacetValueNode>, results: Vec<ResultItem>) -> ResultPayload {
    let total_count = results.len() as u64;
    ResultPayload {
        results,
        facets: vec![FacetEntry::new("dtdam_parentfolder_facet", values)],
        total_count,
    }
}

fn titles(results: &[ResultItem]) -> Vec<&str> {
    results.iter().map(|r| r.title.as_str()).collect()
}

fn expect_folders(outcome: CycleOutcome) -> (Vec<String>, Vec<ResultItem>) {
    match outcome {
        CycleOutcome::Folders {
            listing: Some(listing),
            results,
        } => (
            listing.tiles.into_iter().map(|t| t.value).collect(),
            results,
        ),
        other => panic!("expected folder view, got {other:?}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Browsing
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn root_state_lists_top_level_folders_and_root_items() {
    let mut nav = default_navigator();
    let state = QueryStateSnapshot::new();
    let (query, ctx) = build(&mut nav, &state);

    assert_eq!(query.vanilla_state(), Some(true));
    assert_eq!(query.sort_criteria.as_deref(), Some("@dtdam_item_level ascending"));
    assert_eq!(ctx.level, FolderLevel::ROOT);

    let response = payload(
        vec![FacetValueNode::new("Docs"), FacetValueNode::new("Media")],
        vec![item("readme", 1), item("spec", 2), item("logo", 1)],
    );
    let (folders, results) = expect_folders(nav.on_results_ready(&ctx, response));
    assert_eq!(folders, ["Docs", "Media"]);
    assert_eq!(titles(&results), ["readme", "logo"]);

    let calls = &nav.renderer().calls;
    assert!(calls.contains(&RenderCall::CreateScaffold));
    assert!(calls.contains(&RenderCall::NoResultsHidden { hidden: true }));
}

#[test]
fn clicking_a_folder_descends_one_level() {
    let mut nav = default_navigator();
    let mut state = QueryStateSnapshot::new();
    let (_, ctx) = build(&mut nav, &state);
    let response = payload(
        vec![FacetValueNode::new("Docs"), FacetValueNode::new("Media")],
        vec![item("readme", 1)],
    );
    let listing = match nav.on_results_ready(&ctx, response) {
        CycleOutcome::Folders {
            listing: Some(listing),
            ..
        } => listing,
        other => panic!("expected folder view, got {other:?}"),
    };

    let mut executor = CountingExecutor::default();
    nav.navigate_to(&listing.tiles[0], &mut state, &mut executor);
    assert_eq!(executor.executions, 1);
    assert_eq!(state.facet_values(FOLDER), ["Docs".to_string()]);

    let (query, ctx) = build(&mut nav, &state);
    assert_eq!(query.vanilla_state(), Some(true));
    assert_eq!(query.sort_criteria.as_deref(), Some("@dtdam_item_level ascending"));
    assert_eq!(ctx.level.get(), 2);

    let response = payload(
        vec![
            FacetValueNode::new("Docs")
                .selected()
                .with_children(vec![FacetValueNode::new("Specs"), FacetValueNode::new("Notes")]),
        ],
        vec![item("spec", 2), item("draft", 3)],
    );
    let (folders, results) = expect_folders(nav.on_results_ready(&ctx, response));
    assert_eq!(folders, ["Specs", "Notes"]);
    assert_eq!(titles(&results), ["spec"]);

    let event = nav.analytics().events[0];
    assert_eq!(event.kind, NavigationEventKind::Entered);
    assert_eq!(event.cause, NavigationCause::FacetSelect);
    assert!(event.folder_view_search);
}

#[test]
fn free_text_inside_a_folder_switches_to_search_view() {
    let mut nav = default_navigator();
    let folder_state = QueryStateSnapshot::new().with_facet(FOLDER, ["Docs"]);
    let (_, ctx) = build(&mut nav, &folder_state);
    nav.on_results_ready(
        &ctx,
        payload(vec![FacetValueNode::new("Docs").selected()], vec![]),
    );
    assert!(nav.renderer().has_scaffold());

    let searching = folder_state.with_query("budget");
    let (query, ctx) = build(&mut nav, &searching);
    assert_eq!(nav.mode(), NavigationMode::SearchView);
    assert_eq!(query.vanilla_state(), Some(false));
    assert!(query.sort_criteria.is_none());

    let response = payload(vec![], vec![item("budget-2024", 3), item("budget-2023", 1)]);
    match nav.on_results_ready(&ctx, response) {
        CycleOutcome::Search { results, degraded } => {
            assert!(!degraded);
            assert_eq!(titles(&results), ["budget-2024", "budget-2023"]);
        }
        other => panic!("expected search view, got {other:?}"),
    }
    assert!(!nav.renderer().has_scaffold());
    assert_eq!(
        nav.renderer().calls.last(),
        Some(&RenderCall::NoResultsHidden { hidden: false })
    );
}

#[test]
fn other_facet_filter_is_not_vanilla() {
    let mut nav = default_navigator();
    let state = QueryStateSnapshot::new()
        .with_facet(FOLDER, ["Docs"])
        .with_facet("@author", ["ada"]);
    let (query, ctx) = build(&mut nav, &state);
    assert_eq!(ctx.mode, NavigationMode::SearchView);
    assert_eq!(query.vanilla_state(), Some(false));
}

// ═══════════════════════════════════════════════════════════════════════
// Toggle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn toggle_from_folder_view_clears_filters_and_requeries() {
    let mut nav = default_navigator();
    let mut state = QueryStateSnapshot::new()
        .with_facet(FOLDER, ["Docs"])
        .with_facet("@author", ["ada"])
        .with_query("draft");
    let mut executor = CountingExecutor::default();

    assert_eq!(nav.mode(), NavigationMode::FolderView);
    let mode = nav.toggle(&mut state, &mut executor).unwrap();

    assert_eq!(mode, NavigationMode::SearchView);
    assert_eq!(executor.executions, 1);
    assert_eq!(state.query(), "");
    assert!(state.facet_values("@author").is_empty());
    assert_eq!(state.facet_values(FOLDER), ["Docs".to_string()]);

    let event = nav.analytics().events[0];
    assert_eq!(event.kind, NavigationEventKind::Exited);
    assert_eq!(event.cause, NavigationCause::FacetSelect);
    assert!(!event.folder_view_search);

    let (query, ctx) = build(&mut nav, &state);
    assert_eq!(ctx.mode, NavigationMode::SearchView);
    assert_eq!(query.vanilla_state(), Some(false));
}

#[test]
fn host_state_keyed_by_field_reference_keeps_folder_on_toggle() {
    let mut nav = default_navigator();
    let mut state: QueryStateSnapshot = serde_json::from_str(
        r#"{"q": "", "f:@dtdam_parentfolder_facet": ["Docs"], "f:@author": []}"#,
    )
    .expect("host state");

    let (query, ctx) = build(&mut nav, &state);
    assert_eq!(query.vanilla_state(), Some(true));
    assert_eq!(ctx.mode, NavigationMode::FolderView);
    assert_eq!(ctx.level.get(), 2);

    state.set_facet("@author", vec!["ada".to_string()]);
    nav.toggle(&mut state, &mut CountingExecutor::default())
        .unwrap();
    assert_eq!(state.facet_values(FOLDER), ["Docs".to_string()]);
    assert!(state.facet_values("@author").is_empty());
}

#[test]
fn toggle_back_enters_folder_view() {
    let mut nav = default_navigator();
    let mut state = QueryStateSnapshot::new();
    let mut executor = CountingExecutor::default();

    nav.toggle(&mut state, &mut executor).unwrap();
    let mode = nav.toggle(&mut state, &mut executor).unwrap();
    assert_eq!(mode, NavigationMode::FolderView);
    assert_eq!(executor.executions, 2);

    let last = nav.analytics().events[1];
    assert_eq!(last.kind, NavigationEventKind::Entered);
    assert_eq!(last.cause, NavigationCause::TriggerQuery);

    let (query, _) = build(&mut nav, &state);
    assert_eq!(query.vanilla_state(), Some(true));
}

// ═══════════════════════════════════════════════════════════════════════
// Degraded paths
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn response_from_before_a_toggle_is_stale() {
    let mut nav = default_navigator();
    let mut state = QueryStateSnapshot::new();
    let (_, ctx) = build(&mut nav, &state);

    nav.toggle(&mut state, &mut CountingExecutor::default())
        .unwrap();
    let outcome = nav.on_results_ready(
        &ctx,
        payload(vec![FacetValueNode::new("Docs")], vec![item("readme", 1)]),
    );
    assert!(matches!(outcome, CycleOutcome::Stale { issued: 1, current: 2 }));
    assert!(nav.renderer().last_listing().is_none());
}

#[test]
fn missing_folder_facet_falls_back_for_one_cycle() {
    let mut nav = default_navigator();
    let state = QueryStateSnapshot::new();
    let (_, ctx) = build(&mut nav, &state);

    let bare = ResultPayload {
        results: vec![item("readme", 1), item("spec", 2)],
        facets: Vec::new(),
        total_count: 2,
    };
    match nav.on_results_ready(&ctx, bare) {
        CycleOutcome::Search { results, degraded } => {
            assert!(degraded);
            assert_eq!(results.len(), 2);
        }
        other => panic!("expected degraded search view, got {other:?}"),
    }
    assert_eq!(nav.mode(), NavigationMode::FolderView);

    let (_, ctx) = build(&mut nav, &state);
    let (folders, _) = expect_folders(
        nav.on_results_ready(&ctx, payload(vec![FacetValueNode::new("Docs")], vec![])),
    );
    assert_eq!(folders, ["Docs"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Dedicated folder query
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn dedicated_query_flow_reports_empty_folder() {
    let options =
        FolderViewOptions::new(FOLDER, LEVEL).with_strategy(QueryStrategy::DedicatedQuery);
    let mut nav = navigator(options);
    let state = QueryStateSnapshot::new().with_facet(FOLDER, ["Media", "Video"]);
    let (_, ctx) = build(&mut nav, &state);

    let facets_query = ctx.folder_query.as_ref().expect("dedicated facet query");
    assert_eq!(facets_query.number_of_results, 1000);
    assert_eq!(facets_query.q, "");
    assert_eq!(
        facets_query.aq,
        "@dtdam_parentfolder_facet=\"Media|Video\" @dtdam_item_level==3"
    );
    assert_eq!(facets_query.facets[0].facet_id, "FolderNavigatorFacetRequest");

    let results_query = ctx.folder_query_of(FolderQueryKind::Results, nav.options());
    assert_eq!(results_query.q, "@uri");

    let folders = payload(
        vec![FacetValueNode::new("Media").with_children(vec![
            FacetValueNode::new("Video").selected(),
        ])],
        vec![],
    );
    match nav.on_folder_query_results(&ctx, FolderQueryKind::Facets, &folders) {
        FolderQueryOutcome::Folders { listing } => assert!(listing.is_empty_folder()),
        other => panic!("expected folders, got {other:?}"),
    }
    let rendered = nav.renderer().last_listing().expect("listing rendered");
    assert!(rendered.is_empty_folder());
    assert_eq!(rendered.level.get(), 3);

    let items = payload(vec![], vec![item("shallow", 2)]);
    assert_eq!(
        nav.on_folder_query_results(&ctx, FolderQueryKind::Results, &items),
        FolderQueryOutcome::Items {
            results: Vec::new(),
            empty_folder: true,
        }
    );
}

#[test]
fn dedicated_query_without_facet_is_unavailable() {
    let options =
        FolderViewOptions::new(FOLDER, LEVEL).with_strategy(QueryStrategy::DedicatedQuery);
    let mut nav = navigator(options);
    let (_, ctx) = build(&mut nav, &QueryStateSnapshot::new());
    let outcome =
        nav.on_folder_query_results(&ctx, FolderQueryKind::Facets, &ResultPayload::default());
    assert_eq!(outcome, FolderQueryOutcome::Unavailable);
}

// ═══════════════════════════════════════════════════════════════════════
// Without toggle button
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn navigator_without_toggle_follows_classifier_each_cycle() {
    let mut nav = navigator(FolderViewOptions::new(FOLDER, LEVEL).with_toggle_button(false));
    let (_, ctx) = build(&mut nav, &QueryStateSnapshot::new());
    assert_eq!(ctx.mode, NavigationMode::FolderView);

    let (_, ctx) = build(&mut nav, &QueryStateSnapshot::new().with_query("x"));
    assert_eq!(ctx.mode, NavigationMode::SearchView);

    let (_, ctx) = build(&mut nav, &QueryStateSnapshot::new().with_query(""));
    assert_eq!(ctx.mode, NavigationMode::FolderView);
}
