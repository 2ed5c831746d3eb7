use std::time::{Duration, Instant};

use graph_explorer::explorer::columns::{project_columns, CellValue};
use graph_explorer::explorer::filters::{ColumnFilter, FilterMode};
use graph_explorer::explorer::panels::{BreadcrumbEntry, PanelKind};
use graph_explorer::explorer::{Action, BulkOperation, Explorer, ExplorerEvent};
use graph_explorer::graph_utils::graph::{related, Edge, GraphData, Node, PropertyValue};
use graph_explorer::persistence::export::{export_panel, ExportFormat};
use graph_explorer::persistence::persist::{self, PersistedState};
use graph_explorer::persistence::settings::ExplorerSettings;

fn person_org_graph() -> GraphData {
    GraphData::new(
        vec![
            Node::new("p1", "Alice", "Person"),
            Node::new("o1", "Acme", "Org"),
        ],
        vec![Edge::new("p1", "o1", "WORKS_FOR")],
    )
}

// a -> b -> c -> d chain plus a few side branches off a
fn chain_graph() -> GraphData {
    GraphData::new(
        vec![
            Node::new("a", "A", "T"),
            Node::new("b", "B", "T"),
            Node::new("c", "C", "T"),
            Node::new("d", "D", "T"),
            Node::new("e", "E", "T"),
            Node::new("f", "F", "T"),
        ],
        vec![
            Edge::new("a", "b", "R"),
            Edge::new("b", "c", "R"),
            Edge::new("c", "d", "R"),
            Edge::new("a", "e", "R"),
            Edge::new("f", "a", "R"),
        ],
    )
}

fn explorer_with(graph: GraphData) -> Explorer {
    Explorer::with_graph(&ExplorerSettings::default(), graph)
}

fn expand(e: &mut Explorer, panel: usize, row: &str, multi_select: bool) -> Vec<ExplorerEvent> {
    e.apply(Action::Expand { panel, row: row.to_string(), multi_select })
}

fn keys(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.key.as_str()).collect()
}

#[test]
fn end_to_end_expand_person_to_org() {
    let mut e = explorer_with(person_org_graph());
    let events = expand(&mut e, 0, "p1", false);
    assert_eq!(events, vec![ExplorerEvent::PanelCreated { index: 1 }]);
    assert_eq!(e.panel_count(), 2);

    let panel = e.panel(1).expect("expansion panel");
    assert_eq!(panel.kind(), PanelKind::Expansion);
    assert_eq!(keys(panel.nodes()), vec!["o1"]);
    assert_eq!(panel.relation_types().get("o1"), Some(&vec!["WORKS_FOR".to_string()]));
    assert_eq!(
        panel.breadcrumb(),
        &[BreadcrumbEntry { key: "p1".into(), name: "Alice".into(), node_type: "Person".into() }]
    );
    assert_eq!(e.view(1).and_then(|v| v.parent_panel_index), Some(0));
}

#[test]
fn related_dedupes_labels_and_skips_loops_and_dangling() {
    let nodes = vec![Node::new("x", "X", "T"), Node::new("y", "Y", "T"), Node::new("z", "Z", "T")];
    let edges = vec![
        Edge::new("x", "y", "KNOWS"),
        Edge::new("z", "x", "LIKES"),
        Edge::new("y", "x", "KNOWS"),
        Edge::new("x", "y", "LIKES"),
        Edge::new("x", "x", "SELF"),
        Edge::new("x", "ghost", "KNOWS"),
    ];
    let r = related("x", &nodes, &edges);
    assert_eq!(keys(&r.neighbors), vec!["y", "z"]);
    assert_eq!(r.relation_types["y"], vec!["KNOWS".to_string(), "LIKES".to_string()]);
    assert_eq!(r.relation_types["z"], vec!["LIKES".to_string()]);
    assert!(related("lonely", &nodes, &edges).is_empty());
}

#[test]
fn expand_without_neighbors_is_noop() {
    let graph = GraphData::new(vec![Node::new("solo", "Solo", "T")], vec![]);
    let mut e = explorer_with(graph);
    assert!(expand(&mut e, 0, "solo", false).is_empty());
    assert_eq!(e.panel_count(), 1);
}

#[test]
fn idempotent_multi_select_expansion() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", true);
    assert!(expand(&mut e, 0, "a", true).is_empty());
    assert_eq!(e.panel_count(), 2);
    // A different row of the same panel opens alongside
    expand(&mut e, 0, "b", true);
    assert_eq!(e.panel_count(), 3);
}

#[test]
fn exclusive_drill_down_truncates_after_source_panel() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", true);
    expand(&mut e, 0, "b", true);
    expand(&mut e, 0, "c", true);
    assert_eq!(e.panel_count(), 4);

    expand(&mut e, 0, "d", false);
    assert_eq!(e.panel_count(), 2);
    assert_eq!(e.panel(1).map(|p| p.parent_row_key()), Some(Some("d")));
}

#[test]
fn breadcrumb_follows_three_hop_chain() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    expand(&mut e, 1, "b", false);
    expand(&mut e, 2, "c", false);
    assert_eq!(e.panel_count(), 4);

    let trail: Vec<&str> = e.panel(2).map(|p| p.breadcrumb().iter().map(|b| b.key.as_str()).collect()).unwrap_or_default();
    assert_eq!(trail, vec!["a", "b"]);
    let trail: Vec<&str> = e.panel(3).map(|p| p.breadcrumb().iter().map(|b| b.key.as_str()).collect()).unwrap_or_default();
    assert_eq!(trail, vec!["a", "b", "c"]);
}

#[test]
fn root_collapse_cascades() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    expand(&mut e, 1, "b", false);
    expand(&mut e, 2, "c", false);
    e.apply(Action::Collapse { panel: 0 });
    assert_eq!(e.panel_count(), 1);
    assert_eq!(e.panel(0).map(|p| p.kind()), Some(PanelKind::Root));
}

#[test]
fn non_root_collapse_is_local_and_leaves_orphans() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    expand(&mut e, 1, "b", false);
    expand(&mut e, 2, "c", false);
    e.apply(Action::Collapse { panel: 2 });
    assert_eq!(e.panel_count(), 3);
    let orphan = e.view(2).expect("orphaned panel stays");
    assert_eq!(orphan.parent_row_key.as_deref(), Some("c"));
    assert_eq!(orphan.parent_panel_index, None);
}

#[test]
fn stale_indices_are_noops() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    assert!(e.apply(Action::Collapse { panel: 9 }).is_empty());
    assert!(expand(&mut e, 5, "a", false).is_empty());
    assert!(e.apply(Action::ClickRow { panel: 7, row: "a".into() }).is_empty());
    e.apply(Action::SetFilter { panel: 4, column: "name".into(), filter: ColumnFilter::include([CellValue::from("A")]) });
    assert_eq!(e.panel_count(), 2);
    assert!(e.view(4).is_none());
}

#[test]
fn sequential_filter_narrowing_scopes_unique_values() {
    let graph = GraphData::new(
        vec![
            Node::new("A", "A", "T").with_property("x", 1i64).with_property("y", 1i64),
            Node::new("B", "B", "T").with_property("x", 1i64).with_property("y", 2i64),
            Node::new("C", "C", "T").with_property("x", 2i64).with_property("y", 3i64),
        ],
        vec![],
    );
    let mut e = explorer_with(graph);
    e.apply(Action::SetFilter { panel: 0, column: "x".into(), filter: ColumnFilter::include([CellValue::from(1i64)]) });

    assert_eq!(e.unique_values(0, "y"), vec![CellValue::from(1i64), CellValue::from(2i64)]);
    // The column under edit still offers every value left by the other filters
    assert_eq!(e.unique_values(0, "x"), vec![CellValue::from(1i64), CellValue::from(2i64)]);
    assert_eq!(keys(&e.filtered_rows(0)), vec!["A", "B"]);
}

#[test]
fn exclude_hides_values_that_only_co_occur_with_excluded() {
    let graph = GraphData::new(
        vec![
            Node::new("1", "one", "T").with_property("color", "red").with_property("size", "S"),
            Node::new("2", "two", "T").with_property("color", "red").with_property("size", "M"),
            Node::new("3", "three", "T").with_property("color", "blue").with_property("size", "M"),
            Node::new("4", "four", "T").with_property("color", "green"),
        ],
        vec![],
    );
    let mut e = explorer_with(graph);
    e.apply(Action::ToggleFilterValue {
        panel: 0,
        column: "color".into(),
        value: CellValue::from("red"),
        mode: FilterMode::Exclude,
    });
    // "S" only appears on a red row, missing sizes show up as Empty at the end
    assert_eq!(e.unique_values(0, "size"), vec![CellValue::from("M"), CellValue::Empty]);

    e.apply(Action::SetFilter { panel: 0, column: "size".into(), filter: ColumnFilter::exclude([CellValue::Empty]) });
    assert_eq!(keys(&e.filtered_rows(0)), vec!["3"]);
    assert_eq!(e.unique_values(0, "color"), vec![CellValue::from("blue"), CellValue::from("red")]);

    e.apply(Action::SetFilterMode { panel: 0, column: "color".into(), mode: FilterMode::Include });
    assert_eq!(keys(&e.filtered_rows(0)), vec!["1", "2"]);
    e.apply(Action::ClearPanelFilters { panel: 0 });
    assert_eq!(e.filtered_rows(0).len(), 4);
}

#[test]
fn pagination_clamps_when_filter_shrinks_set() {
    let nodes: Vec<Node> = (0..6)
        .map(|i| Node::new(format!("n{}", i), format!("N{}", i), "T").with_property("keep", i < 3))
        .collect();
    let mut e = explorer_with(GraphData::new(nodes, vec![]));
    e.apply(Action::SetPageSize { panel: 0, page_size: 2 });
    e.apply(Action::SetPage { panel: 0, page: 3 });
    assert_eq!(e.pagination(0).map(|p| p.current_page), Some(3));

    e.apply(Action::SetFilter { panel: 0, column: "keep".into(), filter: ColumnFilter::include([CellValue::from(true)]) });
    let view = e.view(0).expect("root view");
    assert_eq!(view.page.total_pages, 2);
    assert_eq!(view.page.current_page, 2);
    assert_eq!(keys(&view.rows), vec!["n2"]);
}

#[test]
fn page_size_change_resets_page_and_view_all_shows_everything() {
    let nodes: Vec<Node> = (0..25).map(|i| Node::new(format!("n{:02}", i), "N", "T")).collect();
    let mut e = explorer_with(GraphData::new(nodes, vec![]));
    e.apply(Action::SetPage { panel: 0, page: 3 });
    assert_eq!(e.view(0).map(|v| v.rows.len()), Some(5));
    e.apply(Action::SetPageSize { panel: 0, page_size: 20 });
    assert_eq!(e.pagination(0).map(|p| p.current_page), Some(1));
    e.apply(Action::SetViewAll { panel: 0, view_all: true });
    assert_eq!(e.view(0).map(|v| v.rows.len()), Some(25));
}

#[test]
fn row_and_checkbox_selection_are_independent() {
    let mut e = explorer_with(chain_graph());
    let events = e.apply(Action::ToggleCheckbox { row: "a".into() });
    assert!(matches!(&events[..], [ExplorerEvent::CheckboxSelectionChanged(k)] if k.contains("a")));
    assert!(e.selection().selected_row_keys().is_empty());

    e.apply(Action::ClickRow { panel: 0, row: "b".into() });
    assert_eq!(e.selection().checkbox_selected_keys().len(), 1);
    assert!(e.selection().selected_row_keys().contains("b"));

    // Clicking again toggles off
    e.apply(Action::ClickRow { panel: 0, row: "b".into() });
    assert!(e.selection().selected_row_keys().is_empty());
    assert!(e.selection().checkbox_selected_keys().contains("a"));
}

#[test]
fn row_click_drives_breadcrumb_highlight() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    expand(&mut e, 1, "b", false);
    e.apply(Action::ClickRow { panel: 2, row: "c".into() });
    let hl: Vec<&str> = e.selection().breadcrumb_highlighted_keys().iter().map(String::as_str).collect();
    assert_eq!(hl, vec!["a", "b"]);

    e.apply(Action::ClickRow { panel: 0, row: "a".into() });
    assert!(e.selection().breadcrumb_highlighted_keys().is_empty());
}

#[test]
fn breadcrumb_click_highlight_expires() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    expand(&mut e, 1, "b", false);
    expand(&mut e, 2, "c", false);

    let t0 = Instant::now();
    e.apply_at(Action::ClickBreadcrumb { panel: 3, segment: Some(1) }, t0);
    let hl = e.highlighted_keys(t0 + Duration::from_millis(100));
    assert_eq!(hl.into_iter().collect::<Vec<_>>(), vec!["a".to_string(), "b".to_string()]);

    e.apply_at(Action::ClickBreadcrumb { panel: 3, segment: None }, t0);
    assert_eq!(e.highlighted_keys(t0).len(), 3);

    e.apply_at(Action::Tick, t0 + Duration::from_secs(2));
    assert!(e.highlighted_keys(t0 + Duration::from_millis(500)).is_empty());
}

#[test]
fn header_checkbox_selects_visible_page_only() {
    let nodes: Vec<Node> = (0..15).map(|i| Node::new(format!("n{:02}", i), "N", "T")).collect();
    let mut e = explorer_with(GraphData::new(nodes, vec![]));
    e.apply(Action::ToggleAllCheckboxes { panel: 0 });
    assert_eq!(e.selection().checkbox_selected_keys().len(), 10);
    e.apply(Action::ToggleAllCheckboxes { panel: 0 });
    assert!(e.selection().checkbox_selected_keys().is_empty());
}

#[test]
fn bulk_operations_respect_minimum_batch() {
    let mut e = explorer_with(chain_graph());
    e.apply(Action::ToggleCheckbox { row: "a".into() });
    assert!(e.apply(Action::RequestBulkOperation(BulkOperation::Merge)).is_empty());
    let ev = e.apply(Action::RequestBulkOperation(BulkOperation::Delete));
    assert!(matches!(&ev[..], [ExplorerEvent::BulkOperationRequested { kind: BulkOperation::Delete, nodes }] if nodes.len() == 1));

    e.apply(Action::ToggleCheckbox { row: "b".into() });
    let ev = e.apply(Action::RequestBulkOperation(BulkOperation::Merge));
    assert!(matches!(&ev[..], [ExplorerEvent::BulkOperationRequested { nodes, .. }] if keys(nodes) == vec!["a", "b"]));

    e.apply(Action::ClearCheckboxes);
    assert_eq!(e.apply(Action::RequestBulkOperation(BulkOperation::Add)).len(), 1);
}

#[test]
fn panel_selection_gathers_rows_and_ancestors() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    expand(&mut e, 1, "b", false);
    e.apply(Action::SetResultNodes(Some(vec![Node::new("d", "D", "T")])));
    assert_eq!(e.panel_count(), 4);

    e.apply(Action::TogglePanelSelection { panel: 2 });
    e.apply(Action::TogglePanelSelection { panel: 3 });
    assert_eq!(e.selected_panel_indices().into_iter().collect::<Vec<_>>(), vec![2]);

    let ev = e.apply(Action::QuerySelectedPanels);
    match &ev[..] {
        [ExplorerEvent::QueryNodes(nodes)] => assert_eq!(keys(nodes), vec!["a", "c", "b"]),
        other => panic!("unexpected events {:?}", other),
    }

    let ev = e.apply(Action::QueryRow { panel: 0, row: "f".into() });
    assert!(matches!(&ev[..], [ExplorerEvent::QueryNodes(n)] if keys(n) == vec!["f"]));
}

#[test]
fn result_panel_stays_last_and_is_replaced() {
    let mut e = explorer_with(chain_graph());
    e.apply(Action::SetResultNodes(Some(vec![Node::new("c", "C", "T")])));
    assert_eq!(e.panels().result_index(), Some(1));

    expand(&mut e, 0, "a", true);
    assert_eq!(e.panels().result_index(), Some(2));
    assert_eq!(e.panel(2).map(|p| p.kind()), Some(PanelKind::Result));

    e.apply(Action::SetResultNodes(Some(vec![Node::new("d", "D", "T"), Node::new("e", "E", "T")])));
    assert_eq!(e.panel(2).map(|p| p.nodes().len()), Some(2));
    assert_eq!(e.panels().iter().filter(|p| p.kind() == PanelKind::Result).count(), 1);

    e.apply(Action::SetResultNodes(None));
    assert_eq!(e.panel_count(), 2);
    assert!(e.panels().result().is_none());
}

#[test]
fn resync_same_keys_keeps_expansions() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    expand(&mut e, 1, "b", false);

    let mut nodes = chain_graph().nodes().to_vec();
    nodes[0] = nodes[0].clone().with_property("score", 9i64);
    nodes.reverse();
    e.apply(Action::SetGraph(GraphData::new(nodes, chain_graph().edges().to_vec())));
    assert_eq!(e.panel_count(), 3);
    assert!(e.panel(0).map(|p| p.columns().contains(&"score".to_string())).unwrap_or(false));
}

#[test]
fn resync_changed_keys_resets_to_root() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    e.apply(Action::TogglePanelSelection { panel: 1 });

    let mut nodes = chain_graph().nodes().to_vec();
    nodes.push(Node::new("g", "G", "T"));
    e.apply(Action::SetGraph(GraphData::new(nodes, chain_graph().edges().to_vec())));
    assert_eq!(e.panel_count(), 1);
    assert_eq!(e.panel(0).map(|p| p.nodes().len()), Some(7));
    assert!(e.selected_panel_indices().is_empty());
}

#[test]
fn resync_can_preserve_surviving_expansions() {
    let settings = ExplorerSettings { preserve_expansions_on_resync: true, ..Default::default() };
    let mut e = Explorer::with_graph(&settings, chain_graph());
    expand(&mut e, 0, "a", true);
    expand(&mut e, 0, "f", true);

    let nodes: Vec<Node> = chain_graph().nodes().iter().filter(|n| n.key != "f").cloned().collect();
    let edges: Vec<Edge> = chain_graph().edges().iter().filter(|ed| ed.source != "f").cloned().collect();
    e.apply(Action::SetGraph(GraphData::new(nodes, edges)));
    assert_eq!(e.panel_count(), 2);
    assert_eq!(e.panel(1).map(|p| keys(p.nodes())), Some(vec!["b", "e"]));
}

#[test]
fn column_projection_prefers_display_fields() {
    let nodes = vec![
        Node::new("k1", "One", "T").with_property("zeta", 1i64).with_property("alpha", "x"),
        Node::new("k2", "Two", "T")
            .with_property("description", "d")
            .with_property("name", "shadowed")
            .with_property("nested", PropertyValue::from(serde_json::json!({"a": [1, 2]}))),
    ];
    assert_eq!(
        project_columns(&nodes),
        vec!["name", "type", "key", "description", "alpha", "nested", "zeta"]
    );
    assert!(project_columns(&[]).is_empty());
}

#[test]
fn filter_menu_and_search_terms_live_in_state() {
    let mut e = explorer_with(person_org_graph());
    expand(&mut e, 0, "p1", false);
    e.apply(Action::OpenFilterMenu { panel: 1, column: "type".into() });
    assert_eq!(e.open_filter_menu(), Some((1, "type")));
    e.apply(Action::Collapse { panel: 1 });
    assert_eq!(e.open_filter_menu(), None);

    e.apply(Action::SetSearchTerms(vec!["ac".into()]));
    let segs = e.highlight_cell("Acme");
    assert!(segs[0].highlighted);
    assert_eq!(segs[0].text, "Ac");
    // Search terms never filter rows
    assert_eq!(e.filtered_rows(0).len(), 2);
}

#[test]
fn state_change_is_debounced_and_reflects_latest_state() {
    let mut e = explorer_with(chain_graph());
    let t0 = Instant::now();
    e.apply_at(Action::Expand { panel: 0, row: "a".into(), multi_select: false }, t0);
    e.apply_at(Action::SetPageSize { panel: 1, page_size: 5 }, t0 + Duration::from_millis(100));
    assert!(e.poll_state_change(t0 + Duration::from_millis(300)).is_none());

    let state = e.poll_state_change(t0 + Duration::from_millis(700)).expect("debounced write");
    assert_eq!(state.panels.len(), 2);
    assert_eq!(state.pagination_state.len(), 1);
    assert!(e.poll_state_change(t0 + Duration::from_secs(5)).is_none());

    e.apply_at(Action::Collapse { panel: 1 }, t0 + Duration::from_secs(6));
    e.teardown();
    assert!(e.poll_state_change(t0 + Duration::from_secs(60)).is_none());
    assert!(e.apply(Action::Expand { panel: 0, row: "a".into(), multi_select: false }).is_empty());
}

#[test]
fn persisted_state_round_trips_through_host_blob() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    expand(&mut e, 1, "b", false);
    e.apply(Action::SetFilter { panel: 1, column: "name".into(), filter: ColumnFilter::exclude([CellValue::from("E")]) });
    e.apply(Action::SetPageSize { panel: 2, page_size: 3 });
    e.apply(Action::TogglePanelSelection { panel: 1 });

    let blob = e.snapshot().to_value().expect("serialize");
    let mut restored = Explorer::restore(&ExplorerSettings::default(), chain_graph(), None, Some(&blob));
    assert_eq!(restored.panel_count(), 3);
    assert_eq!(restored.session_id(), e.session_id());
    assert_eq!(restored.panel(2).map(|p| p.breadcrumb().len()), Some(2));
    assert_eq!(restored.view(2).and_then(|v| v.parent_panel_index), Some(1));
    assert_eq!(keys(&restored.filtered_rows(1)), vec!["b", "f"]);
    assert_eq!(restored.pagination(2).map(|p| p.page_size), Some(3));
    assert_eq!(restored.selected_panel_indices().into_iter().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn garbage_blob_falls_back_to_fresh_root() {
    let blob = serde_json::json!({"panels": [{"type": "Expansion"}], "columnFilters": 3});
    let e = Explorer::restore(&ExplorerSettings::default(), chain_graph(), None, Some(&blob));
    assert_eq!(e.panel_count(), 1);
    let e = Explorer::restore(&ExplorerSettings::default(), chain_graph(), None, Some(&serde_json::json!("nope")));
    assert_eq!(e.panel(0).map(|p| p.nodes().len()), Some(6));
}

#[test]
fn checkpoint_files_and_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut e = explorer_with(person_org_graph());
    expand(&mut e, 0, "p1", false);

    let state = e.snapshot();
    let path = persist::save_active_in(dir.path(), &state).expect("save");
    let loaded: PersistedState = persist::load_from_path(&path).expect("load");
    assert_eq!(loaded, state);
    persist::save_versioned_in(dir.path(), &state).expect("save version");
    assert_eq!(persist::list_versions_in(dir.path()).expect("list").len(), 1);

    let csv_path = dir.path().join("root.csv");
    assert_eq!(export_panel(&mut e, 0, &csv_path, ExportFormat::Csv).expect("csv"), 2);
    let text = std::fs::read_to_string(&csv_path).expect("read csv");
    assert!(text.starts_with("name,type,key"));
    assert!(text.contains("Alice,Person,p1"));

    let json_path = dir.path().join("exp.json");
    assert_eq!(export_panel(&mut e, 1, &json_path, ExportFormat::from_path(&json_path)).expect("json"), 1);
    assert!(export_panel(&mut e, 9, &json_path, ExportFormat::Json).is_err());
}

#[test]
fn graph_data_parses_host_json() {
    let graph: GraphData = serde_json::from_str(
        r#"{
            "nodes": [
                {"key": "p1", "name": "Alice", "type": "Person", "properties": {"age": 41, "tags": ["a"], "note": null}},
                {"key": "o1", "name": "Acme", "type": "Org"}
            ],
            "edges": [{"source": "p1", "target": "o1", "relationType": "WORKS_FOR"}]
        }"#,
    )
    .expect("graph json");
    let alice = graph.get_node("p1").expect("alice");
    assert_eq!(alice.properties["age"], PropertyValue::Number(41.0));
    assert_eq!(alice.properties["tags"], PropertyValue::Nested("[\"a\"]".into()));
    assert!(alice.properties["note"].is_null());
    assert_eq!(graph.related("o1").neighbors.len(), 1);
}

fn numbered_nodes(count: usize) -> Vec<Node> {
    (0..count).map(|i| Node::new(format!("n{}", i), format!("N{}", i), "T")).collect()
}

#[test]
fn shrinking_root_clamps_page_in_checkpoint() {
    let mut e = explorer_with(GraphData::new(numbered_nodes(25), vec![]));
    let t0 = Instant::now();
    e.apply_at(Action::SetPage { panel: 0, page: 3 }, t0);
    assert_eq!(e.pagination(0).map(|p| p.current_page), Some(3));

    e.apply_at(Action::SetGraph(GraphData::new(numbered_nodes(3), vec![])), t0 + Duration::from_millis(10));
    assert_eq!(e.pagination(0).map(|p| p.current_page), Some(1));

    let state = e.poll_state_change(t0 + Duration::from_secs(2)).expect("debounced write");
    let root_paging: Vec<usize> = state
        .pagination_state
        .iter()
        .filter(|p| p.panel_index == 0)
        .map(|p| p.state.current_page)
        .collect();
    assert_eq!(root_paging, vec![1]);
}

#[test]
fn restore_skips_repeated_and_unanchored_expansions() {
    let mut e = explorer_with(chain_graph());
    expand(&mut e, 0, "a", false);
    let mut blob = e.snapshot().to_value().expect("serialize");

    let panels = blob["panels"].as_array_mut().expect("panel list");
    let expansion = panels[1].clone();
    let mut unanchored = expansion.clone();
    unanchored["parentRowKey"] = serde_json::Value::Null;
    panels.push(expansion);
    panels.push(unanchored);
    assert_eq!(panels.len(), 4);

    let restored = Explorer::restore(&ExplorerSettings::default(), chain_graph(), None, Some(&blob));
    assert_eq!(restored.panel_count(), 2);
    assert_eq!(restored.panel(1).map(|p| p.parent_row_key()), Some(Some("a")));
}

// Every node carries x plus a handful of facet columns
fn faceted_graph() -> GraphData {
    let nodes = (0..6i64)
        .map(|i| {
            let mut n = Node::new(format!("n{}", i), format!("N{}", i), "T")
                .with_property("x", i % 2)
                .with_property("y", i % 3);
            for c in 0..6 {
                n = n.with_property(format!("c{}", c), i + c);
            }
            n
        })
        .collect();
    GraphData::new(nodes, vec![])
}

#[test]
fn filter_cache_stays_within_capacity() {
    let settings = ExplorerSettings { filter_cache_capacity: 4, ..ExplorerSettings::default() };
    let mut e = Explorer::with_graph(&settings, faceted_graph());
    for i in 0..10i64 {
        e.apply(Action::SetFilter { panel: 0, column: "x".into(), filter: ColumnFilter::include([CellValue::from(i % 2)]) });
        e.filtered_rows(0);
        assert!(e.filter_engine().cache().len() <= 4);
    }
    for c in 0..6 {
        e.unique_values(0, &format!("c{}", c));
        assert!(e.filter_engine().cache().len() <= 4);
    }
    assert_eq!(e.filter_engine().cache().len(), e.filter_engine().cache().capacity());
}

#[test]
fn repeated_facet_lookup_is_served_from_cache() {
    let mut e = explorer_with(faceted_graph());
    e.apply(Action::SetFilter { panel: 0, column: "x".into(), filter: ColumnFilter::include([CellValue::from(1i64)]) });
    let before = e.filter_engine().cache().len();

    let first = e.unique_values(0, "y");
    // Only the facet entry is new; the x-filtered rows were already cached
    assert_eq!(e.filter_engine().cache().len(), before + 1);
    let second = e.unique_values(0, "y");
    assert_eq!(e.filter_engine().cache().len(), before + 1);
    assert_eq!(first, second);
    assert_eq!(first, vec![CellValue::from(0i64), CellValue::from(1i64), CellValue::from(2i64)]);
}

#[test]
fn editing_later_column_reuses_earlier_prefix() {
    let mut e = explorer_with(faceted_graph());
    e.apply(Action::SetFilter { panel: 0, column: "x".into(), filter: ColumnFilter::include([CellValue::from(0i64)]) });
    e.apply(Action::SetFilter { panel: 0, column: "y".into(), filter: ColumnFilter::exclude([CellValue::from(0i64)]) });
    assert_eq!(keys(&e.filtered_rows(0)), vec!["n2", "n4"]);
    // x then x+y prefixes
    assert_eq!(e.filter_engine().cache().len(), 2);

    // The y menu narrows by x alone, which is the cached first prefix
    e.apply(Action::OpenFilterMenu { panel: 0, column: "y".into() });
    let facets = e.unique_values(0, "y");
    assert_eq!(facets, vec![CellValue::from(0i64), CellValue::from(1i64), CellValue::from(2i64)]);
    assert_eq!(e.filter_engine().cache().len(), 3);
}
