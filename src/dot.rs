//! Graphviz DOT emission for the resolved graph.
//!
//! Two flavors: a detailed digraph with record-shaped nodes listing each
//! table's primary key and columns, and a simplified digraph with plain box
//! nodes. Both draw one cluster per group. Arrows run from the referenced
//! table to the referencing one, labeled `targetColumn -> sourceColumn` in
//! the detailed view; consumers depend on that direction convention.

use crate::graph::SchemaGraph;
use crate::model::{SchemaModel, Table};
use std::fmt::Write;

/// Which diagram flavor to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DotView {
    #[default]
    Detailed,
    Simplified,
}

impl DotView {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "detailed" => Some(Self::Detailed),
            "simplified" => Some(Self::Simplified),
            _ => None,
        }
    }
}

/// Node fill colors cycled per group in the simplified view.
const GROUP_COLORS: [&str; 4] = ["lightblue", "lightgreen", "lightyellow", "lightpink"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DotRenderer;

impl DotRenderer {
    pub fn render(&self, view: DotView, model: &SchemaModel, graph: &SchemaGraph) -> String {
        match view {
            DotView::Detailed => self.render_detailed(model, graph),
            DotView::Simplified => self.render_simplified(graph),
        }
    }

    /// Record-shaped nodes listing the primary key and columns.
    pub fn render_detailed(&self, model: &SchemaModel, graph: &SchemaGraph) -> String {
        let mut out = String::new();
        writeln!(&mut out, "digraph schema {{").unwrap();
        writeln!(
            &mut out,
            "  node [shape=record, style=filled, fillcolor=lightblue];"
        )
        .unwrap();

        for group in &graph.groups {
            writeln!(&mut out, "  subgraph \"cluster_{}\" {{", group.name).unwrap();
            writeln!(&mut out, "    label=\"{}\";", group.name).unwrap();
            writeln!(&mut out, "    style=filled;").unwrap();
            writeln!(&mut out, "    color=lightgrey;").unwrap();
            for table in &group.tables {
                if let Some(t) = model.get(table) {
                    writeln!(&mut out, "    \"{}\" [label=\"{}\"];", table, record_label(t))
                        .unwrap();
                }
            }
            writeln!(&mut out, "  }}").unwrap();
        }

        for edge in &graph.edges {
            writeln!(
                &mut out,
                "  \"{}\" -> \"{}\" [label=\"{} -> {}\"];",
                edge.to_table, edge.from_table, edge.to_column, edge.from_column
            )
            .unwrap();
        }

        writeln!(&mut out, "}}").unwrap();
        out
    }

    /// Table names and arrows only.
    pub fn render_simplified(&self, graph: &SchemaGraph) -> String {
        let mut out = String::new();
        writeln!(&mut out, "digraph schema {{").unwrap();

        for (i, group) in graph.groups.iter().enumerate() {
            let color = GROUP_COLORS[i % GROUP_COLORS.len()];
            writeln!(&mut out, "  subgraph \"cluster_{}\" {{", group.name).unwrap();
            writeln!(&mut out, "    label=\"{}\";", group.name).unwrap();
            writeln!(&mut out, "    style=filled;").unwrap();
            writeln!(&mut out, "    color=lightgrey;").unwrap();
            for table in &group.tables {
                writeln!(
                    &mut out,
                    "    \"{}\" [shape=box, style=filled, fillcolor={}];",
                    table, color
                )
                .unwrap();
            }
            writeln!(&mut out, "  }}").unwrap();
        }

        for edge in &graph.edges {
            writeln!(&mut out, "  \"{}\" -> \"{}\";", edge.to_table, edge.from_table).unwrap();
        }

        writeln!(&mut out, "}}").unwrap();
        out
    }
}

/// `{table|pk (PK)\l col1\l ...}` record label; tables without a primary
/// key list only their columns.
fn record_label(table: &Table) -> String {
    let mut label = format!("{{{}|", table.name);
    if let Some(pk) = &table.primary_key {
        write!(&mut label, "{} (PK)\\l", pk).unwrap();
    }
    for col in &table.columns {
        if table.primary_key.as_deref() == Some(col.as_str()) {
            continue;
        }
        write!(&mut label, "{}\\l", col).unwrap();
    }
    label.push('}');
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::SchemaExtractor;
    use crate::graph::{GroupingPolicy, Resolver};

    const RSVP: &str = "CREATE TABLE rsvp_master_event (\n id INTEGER PRIMARY KEY,\n name\n);\nCREATE TABLE rsvp_detail_guest (\n id INTEGER PRIMARY KEY,\n event_id,\n FOREIGN KEY (event_id) REFERENCES rsvp_master_event(id)\n);";

    fn rsvp_graph() -> (SchemaModel, SchemaGraph) {
        let out = SchemaExtractor::new().extract(RSVP);
        let policy = GroupingPolicy::master_detail("rsvp_master_");
        let mut diagnostics = out.diagnostics;
        let graph = Resolver::new(&out.model, &policy)
            .resolve(&out.references, &mut diagnostics)
            .unwrap();
        (out.model, graph)
    }

    #[test]
    fn test_detailed_record_labels() {
        let (model, graph) = rsvp_graph();
        let dot = DotRenderer::default().render_detailed(&model, &graph);
        assert!(dot.contains(r#""rsvp_master_event" [label="{rsvp_master_event|id (PK)\lname\l}"]"#));
        assert!(dot.contains(r#""rsvp_detail_guest" [label="{rsvp_detail_guest|id (PK)\levent_id\l}"]"#));
    }

    #[test]
    fn test_detailed_edge_direction_and_label() {
        let (model, graph) = rsvp_graph();
        let dot = DotRenderer::default().render_detailed(&model, &graph);
        // Referenced table at the tail, referencing table at the head.
        assert!(dot.contains(
            r#""rsvp_master_event" -> "rsvp_detail_guest" [label="id -> event_id"]"#
        ));
    }

    #[test]
    fn test_clusters_per_group() {
        let (model, graph) = rsvp_graph();
        let dot = DotRenderer::default().render_detailed(&model, &graph);
        assert!(dot.contains("subgraph \"cluster_master\""));
        assert!(dot.contains("subgraph \"cluster_detail\""));
    }

    #[test]
    fn test_simplified_has_unlabeled_edges() {
        let (_, graph) = rsvp_graph();
        let dot = DotRenderer::default().render_simplified(&graph);
        assert!(dot.contains(r#""rsvp_master_event" -> "rsvp_detail_guest";"#));
        assert!(!dot.contains("label=\"id -> event_id\""));
        assert!(dot.contains("shape=box"));
    }

    #[test]
    fn test_simplified_cycles_group_colors() {
        let (_, graph) = rsvp_graph();
        let dot = DotRenderer::default().render_simplified(&graph);
        assert!(dot.contains("fillcolor=lightblue"));
        assert!(dot.contains("fillcolor=lightgreen"));
    }

    #[test]
    fn test_no_primary_key_omits_pk_row() {
        let out = SchemaExtractor::new().extract("CREATE TABLE t (\n a,\n b\n);");
        let policy = GroupingPolicy::new().fallback("all");
        let mut diagnostics = out.diagnostics;
        let graph = Resolver::new(&out.model, &policy)
            .resolve(&out.references, &mut diagnostics)
            .unwrap();
        let dot = DotRenderer::default().render_detailed(&out.model, &graph);
        assert!(dot.contains(r#"[label="{t|a\lb\l}"]"#));
        assert!(!dot.contains("(PK)"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let (model, graph) = rsvp_graph();
        let renderer = DotRenderer::default();
        assert_eq!(
            renderer.render(DotView::Detailed, &model, &graph),
            renderer.render(DotView::Detailed, &model, &graph)
        );
        assert_eq!(
            renderer.render(DotView::Simplified, &model, &graph),
            renderer.render(DotView::Simplified, &model, &graph)
        );
    }
}
