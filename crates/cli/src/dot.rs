//! Graphviz DOT rendering of an ancestor graph.
//!
//! Positions are pinned from the graph's coordinates (use `neato -n` or
//! `fdp`), so no further layout work happens here. Nodes are named by
//! occurrence index; individual ids only appear in labels.

use std::fmt::Write;

use ancestry_core::{AncestorGraph, Gender, Individual, RecordSource};

/// Points per layout unit when pinning positions.
const SCALE: f64 = 120.0;

/// Escape special characters for DOT labels.
pub fn escape_label(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn fill_for(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "lightblue",
        Gender::Female => "pink",
        Gender::Unknown => "lightgray",
    }
}

fn label_for(id: &str, individual: Option<&Individual>) -> String {
    match individual {
        Some(ind) if ind.display_name() != id => format!("{}\n{}", ind.display_name(), id),
        _ => id.to_string(),
    }
}

pub fn render<S: RecordSource + ?Sized>(graph: &AncestorGraph, source: &S) -> String {
    let mut out = String::with_capacity(4096);
    let _ = writeln!(out, "digraph \"{}\" {{", escape_label(graph.root()));
    let _ = writeln!(out, "  node [shape=box, style=filled];");

    for (idx, o) in graph.occurrences().iter().enumerate() {
        let individual = match source.individual(&o.id) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Could not resolve '{}' for DOT output: {}", o.id, e);
                None
            }
        };
        let gender = individual.map(|ind| ind.gender).unwrap_or(Gender::Unknown);
        let _ = writeln!(
            out,
            "  n{} [label=\"{}\", fillcolor={}, pos=\"{:.1},{:.1}!\"];",
            idx,
            escape_label(&label_for(&o.id, individual)),
            fill_for(gender),
            o.coordinate.x * SCALE,
            o.coordinate.y * SCALE
        );
    }

    for (idx, o) in graph.occurrences().iter().enumerate() {
        if let Some(child) = o.child {
            let _ = writeln!(out, "  n{} -> n{};", idx, child);
        }
    }

    // A repeat reach is drawn from the single occurrence of its individual.
    for link in graph.links() {
        if let Some(first) = graph.occurrence_index(&link.id) {
            let _ = writeln!(
                out,
                "  n{} -> n{} [style=dashed, color=red, label=\"{}\"];",
                first, link.child, link.path
            );
        }
    }

    out.push_str("}\n");
    out
}
