use crate::error::Result;
use crate::records::RecordSource;

use super::config::TraversalConfig;
use super::graph::{AncestorGraph, CollapseLink, LineagePath, Occurrence};
use super::layout::LayoutAssigner;
use super::registry::{CollapseRegistry, RegistryOutcome};

/// Walk the ancestors of `config.root` breadth-first, one generation at a
/// time.
///
/// Within a generation, parents are visited in the order of the previous
/// generation's occurrences and, per family, father before mother. An
/// individual reached a second time gets a [`CollapseLink`] back to its
/// first occurrence instead of a new node, and is not expanded again.
///
/// The walk ends when `max_generations` is exhausted or every branch has
/// reached a founder. If a new occurrence would exceed `capacity`, the walk
/// stops there and the graph is marked truncated.
///
/// # Errors
/// Returns `InvalidConfig` for a bad config, `UnknownIndividual` if the root
/// is absent, and propagates any error raised by `source`. No partial graph
/// is returned on error.
pub fn build_ancestry<S: RecordSource + ?Sized>(
    source: &S,
    config: &TraversalConfig,
) -> Result<AncestorGraph> {
    config.validate()?;
    let root = source.lookup(&config.root)?;

    let mut graph = AncestorGraph::new(&root.id, config.max_generations, config.capacity);
    let mut registry = CollapseRegistry::new();
    let mut layout = LayoutAssigner::new(config.layout);

    let coordinate = layout.place(0);
    registry.register(&root.id, coordinate);
    let root_idx = graph.push_occurrence(Occurrence {
        id: root.id.clone(),
        generation: 0,
        coordinate,
        path: LineagePath::root(),
        child: None,
    });

    // Indices of the previous generation's occurrences, in traversal order.
    let mut frontier = vec![root_idx];

    'generations: for generation in 1..=config.max_generations {
        if frontier.is_empty() {
            break;
        }
        let mut next = Vec::with_capacity(frontier.len() * 2);
        let mut collapses = 0usize;

        for &child_idx in &frontier {
            let child = &graph.occurrences()[child_idx];
            let (child_id, child_path) = (child.id.clone(), child.path.clone());

            for family in source.parent_families(&child_id)? {
                for (slot, parent_id) in family.parent_slots() {
                    if source.individual(parent_id)?.is_none() {
                        log::warn!(
                            "Family '{}' names parent '{}' who is not in the record store; skipping",
                            family.id,
                            parent_id
                        );
                        continue;
                    }

                    if graph.len() >= config.capacity && !registry.contains(parent_id) {
                        log::warn!(
                            "Ancestry of '{}' truncated at {} occurrences (generation {})",
                            config.root,
                            config.capacity,
                            generation
                        );
                        graph.mark_truncated();
                        break 'generations;
                    }

                    let path = child_path.extend(slot);
                    let candidate = layout.place(generation);
                    match registry.register(parent_id, candidate) {
                        RegistryOutcome::FirstSeen(coordinate) => {
                            let idx = graph.push_occurrence(Occurrence {
                                id: parent_id.to_string(),
                                generation,
                                coordinate,
                                path,
                                child: Some(child_idx),
                            });
                            next.push(idx);
                        }
                        RegistryOutcome::Collapsed(first) => {
                            log::debug!(
                                "Pedigree collapse: '{}' reached again via {} (generation {})",
                                parent_id,
                                path,
                                generation
                            );
                            collapses += 1;
                            graph.push_link(CollapseLink {
                                id: parent_id.to_string(),
                                first,
                                repeat: candidate,
                                generation,
                                path,
                                child: child_idx,
                            });
                        }
                    }
                }
            }
        }

        log::debug!(
            "Generation {}: {} new occurrences, {} collapses",
            generation,
            next.len(),
            collapses
        );
        frontier = next;
    }

    log::info!(
        "Ancestry of '{}': {} occurrences, {} collapse links, truncated={}",
        graph.root(),
        graph.len(),
        graph.links().len(),
        graph.is_truncated()
    );
    Ok(graph)
}
