use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::explorer::columns::cell_text;
use crate::explorer::state::Explorer;
use crate::graph_utils::graph::{Node, PropertyValue};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Rows as JSON objects, one per node.
pub fn export_nodes_json(nodes: &[Node], path: &Path) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct NodeOut<'a> {
        key: &'a str,
        name: &'a str,
        #[serde(rename = "type")]
        node_type: &'a str,
        properties: &'a HashMap<String, PropertyValue>,
    }
    let out: Vec<NodeOut> = nodes
        .iter()
        .map(|n| NodeOut { key: &n.key, name: &n.name, node_type: &n.node_type, properties: &n.properties })
        .collect();
    if let Some(parent) = path.parent() { std::fs::create_dir_all(parent)?; }
    let mut f = File::create(path)?;
    serde_json::to_writer_pretty(&mut f, &out)?;
    // ensure newline at end
    f.write_all(b"\n")?;
    Ok(())
}

/// Rows as CSV with one column per display column, in display order.
pub fn export_nodes_csv(nodes: &[Node], columns: &[String], path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() { std::fs::create_dir_all(parent)?; }
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(columns)?;
    for n in nodes {
        wtr.write_record(columns.iter().map(|c| cell_text(n, c)))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export the filtered rows of one panel (all pages). Returns the number of rows written.
pub fn export_panel(explorer: &mut Explorer, panel: usize, path: &Path, format: ExportFormat) -> anyhow::Result<usize> {
    let Some(columns) = explorer.panel(panel).map(|p| p.columns().to_vec()) else {
        anyhow::bail!("no panel at index {}", panel);
    };
    let rows = explorer.filtered_rows(panel);
    match format {
        ExportFormat::Json => export_nodes_json(&rows, path)?,
        ExportFormat::Csv => export_nodes_csv(&rows, &columns, path)?,
    }
    log::info!("exported {} rows of panel {} to {}", rows.len(), panel, path.display());
    Ok(rows.len())
}

/// Default export target for a panel inside the configured export directory.
pub fn default_export_path(dir: &Path, panel: usize, format: ExportFormat) -> PathBuf {
    let ext = match format {
        ExportFormat::Json => "json",
        ExportFormat::Csv => "csv",
    };
    dir.join(format!("panel_{}.{}", panel, ext))
}
