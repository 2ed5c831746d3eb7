// graph-explorer: replay an action script against a graph and print the resulting panels
// Build with: cargo build --features cli --bin graph-explorer

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Arg, ArgAction, Command};

use graph_explorer::explorer::{Action, Explorer, ExplorerEvent, PanelView};
use graph_explorer::explorer::columns::cell_text;
use graph_explorer::graph_utils::graph::GraphData;
use graph_explorer::persistence::export::{self, ExportFormat};
use graph_explorer::persistence::persist;
use graph_explorer::persistence::settings::ExplorerSettings;

fn read_graph(path: &Path) -> anyhow::Result<GraphData> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading graph {}", path.display()))?;
    let graph: GraphData = serde_json::from_str(&text).with_context(|| format!("parsing graph {}", path.display()))?;
    Ok(graph)
}

fn read_script(path: &Path) -> anyhow::Result<Vec<Action>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
    let actions: Vec<Action> = ron::from_str(&text).with_context(|| format!("parsing script {}", path.display()))?;
    Ok(actions)
}

fn describe_event(ev: &ExplorerEvent) -> String {
    match ev {
        ExplorerEvent::SelectionChanged(keys) => format!("selection -> {:?}", keys),
        ExplorerEvent::CheckboxSelectionChanged(keys) => format!("checked -> {:?}", keys),
        ExplorerEvent::BulkOperationRequested { kind, nodes } => format!("bulk {:?} on {} nodes", kind, nodes.len()),
        ExplorerEvent::QueryNodes(nodes) => {
            let keys: Vec<&str> = nodes.iter().map(|n| n.key.as_str()).collect();
            format!("query {:?}", keys)
        }
        ExplorerEvent::PanelCreated { index } => format!("panel {} opened", index),
    }
}

fn print_view(view: &PanelView) {
    let trail: Vec<&str> = view.breadcrumb.iter().map(|b| b.name.as_str()).collect();
    println!(
        "[{}] {:?} rows {}/{} page {}/{}{}",
        view.index,
        view.kind,
        view.page.total_rows,
        view.unfiltered_rows,
        view.page.current_page,
        view.page.total_pages,
        if trail.is_empty() { String::new() } else { format!(" via {}", trail.join(" > ")) },
    );
    println!("    {}", view.columns.join(" | "));
    for row in &view.rows {
        let cells: Vec<String> = view.columns.iter().map(|c| cell_text(row, c)).collect();
        let rel = view.relation_types.get(&row.key).map(|r| format!("  ({})", r.join(", "))).unwrap_or_default();
        println!("    {}{}", cells.join(" | "), rel);
    }
}

fn run() -> anyhow::Result<()> {
    let matches = Command::new("graph-explorer")
        .about("Replay explorer actions over a graph and print the linked tables")
        .arg(Arg::new("graph").long("graph").short('g').required(true).help("Graph JSON file with nodes and edges"))
        .arg(Arg::new("script").long("script").short('s').help("RON file holding a list of actions"))
        .arg(Arg::new("restore").long("restore").help("JSON checkpoint to restore before replaying"))
        .arg(Arg::new("settings").long("settings").help("Settings JSON (defaults to the user config dir)"))
        .arg(Arg::new("export-panel").long("export-panel").value_parser(clap::value_parser!(usize)).help("Panel index to export"))
        .arg(Arg::new("export").long("export").help("Export path (.csv or .json)"))
        .arg(Arg::new("checkpoint").long("checkpoint").action(ArgAction::SetTrue).help("Write the final state to the autosave directory"))
        .arg(Arg::new("dump-state").long("dump-state").action(ArgAction::SetTrue).help("Print the final state blob as JSON"))
        .get_matches();

    let settings = match matches.get_one::<String>("settings") {
        Some(p) => ExplorerSettings::load_from(Path::new(p))?,
        None => ExplorerSettings::load().unwrap_or_default(),
    };
    persist::set_settings_override(settings.clone());

    let graph = read_graph(Path::new(matches.get_one::<String>("graph").map(String::as_str).unwrap_or_default()))?;
    let blob = match matches.get_one::<String>("restore") {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading checkpoint {}", p))?;
            Some(serde_json::from_str::<serde_json::Value>(&text)?)
        }
        None => None,
    };
    let mut explorer = Explorer::restore(&settings, graph, None, blob.as_ref());

    if let Some(script) = matches.get_one::<String>("script") {
        for action in read_script(Path::new(script))? {
            for ev in explorer.apply(action) {
                println!("- {}", describe_event(&ev));
            }
        }
    }

    for view in explorer.views() {
        print_view(&view);
    }

    if let Some(panel) = matches.get_one::<usize>("export-panel").copied() {
        let path = match matches.get_one::<String>("export") {
            Some(p) => PathBuf::from(p),
            None => export::default_export_path(&settings.export_dir(), panel, ExportFormat::Json),
        };
        let n = export::export_panel(&mut explorer, panel, &path, ExportFormat::from_path(&path))?;
        println!("exported {} rows to {}", n, path.display());
    }

    let state = explorer.snapshot();
    if matches.get_flag("checkpoint") {
        let path = persist::save_active(&state)?;
        println!("checkpoint saved to {}", path.display());
    }
    if matches.get_flag("dump-state") {
        println!("{}", serde_json::to_string_pretty(&state.to_value()?)?);
    }
    explorer.teardown();
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("[graph-explorer] {:#}", e);
        std::process::exit(1);
    }
}
