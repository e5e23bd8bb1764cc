use std::fmt;

use serde::{Serialize, Serializer};

use crate::records::{Individual, ParentSlot, RecordSource};

use super::layout::Coordinate;

/// Sequence of parent slots taken from the root, e.g. `FM` for the
/// father's mother. The root's path is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineagePath(Vec<ParentSlot>);

impl LineagePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// This path extended by one more parent step.
    pub fn extend(&self, slot: ParentSlot) -> Self {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(slot);
        Self(steps)
    }

    pub fn steps(&self) -> &[ParentSlot] {
        &self.0
    }

    /// Number of parent hops, equal to the generation reached.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LineagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.0 {
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

impl Serialize for LineagePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One appearance of an individual in the ancestor graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub id: String,
    pub generation: usize,
    pub coordinate: Coordinate,
    pub path: LineagePath,
    /// Index of the occurrence this one is a parent of; `None` for the root.
    pub child: Option<usize>,
}

/// A repeat reach of an already placed individual.
///
/// `repeat` is where the repeat would have been drawn; `first` is the
/// coordinate of the individual's single occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollapseLink {
    pub id: String,
    pub first: Coordinate,
    pub repeat: Coordinate,
    /// Generation at which the repeat reach happened.
    pub generation: usize,
    pub path: LineagePath,
    /// Index of the occurrence whose parent was reached again.
    pub child: usize,
}

/// The bounded ancestor graph for one root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AncestorGraph {
    root: String,
    max_generations: usize,
    capacity: usize,
    occurrences: Vec<Occurrence>,
    links: Vec<CollapseLink>,
    truncated: bool,
}

impl AncestorGraph {
    pub(crate) fn new(root: &str, max_generations: usize, capacity: usize) -> Self {
        Self {
            root: root.to_string(),
            max_generations,
            capacity,
            occurrences: Vec::new(),
            links: Vec::new(),
            truncated: false,
        }
    }

    pub(crate) fn push_occurrence(&mut self, occurrence: Occurrence) -> usize {
        self.occurrences.push(occurrence);
        self.occurrences.len() - 1
    }

    pub(crate) fn push_link(&mut self, link: CollapseLink) {
        self.links.push(link);
    }

    pub(crate) fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn max_generations(&self) -> usize {
        self.max_generations
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Occurrences in traversal order: by generation, then path.
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn links(&self) -> &[CollapseLink] {
        &self.links
    }

    /// Whether the node cap cut the traversal short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn occurrences_at(&self, generation: usize) -> impl Iterator<Item = &Occurrence> {
        self.occurrences
            .iter()
            .filter(move |o| o.generation == generation)
    }

    /// Deepest generation that produced an occurrence.
    pub fn max_generation(&self) -> usize {
        self.occurrences
            .iter()
            .map(|o| o.generation)
            .max()
            .unwrap_or(0)
    }

    /// Occurrence count per generation, indexed by generation.
    pub fn generation_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.max_generation() + 1];
        for o in &self.occurrences {
            counts[o.generation] += 1;
        }
        counts
    }

    pub fn occurrence(&self, id: &str) -> Option<&Occurrence> {
        self.occurrences.iter().find(|o| o.id == id)
    }

    /// Position of the single occurrence of `id` in [`AncestorGraph::occurrences`].
    pub fn occurrence_index(&self, id: &str) -> Option<usize> {
        self.occurrences.iter().position(|o| o.id == id)
    }

    pub fn links_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a CollapseLink> + 'a {
        self.links.iter().filter(move |l| l.id == id)
    }

    /// Individuals reached by more than one path, in first-link order.
    pub fn collapsed_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for link in &self.links {
            if !ids.contains(&link.id.as_str()) {
                ids.push(&link.id);
            }
        }
        ids
    }

    /// Render a plain-text report, resolving names through `source`.
    pub fn summary<S: RecordSource + ?Sized>(&self, source: &S) -> String {
        let mut s = String::new();

        s.push_str(&format!(
            "=== Ancestry of {} ===\n\n",
            describe_person(source, &self.root)
        ));
        s.push_str(&format!(
            "Generations: {} of {} requested   Occurrences: {} (cap {})   Collapse links: {}\n",
            self.max_generation(),
            self.max_generations,
            self.occurrences.len(),
            self.capacity,
            self.links.len()
        ));
        if self.truncated {
            s.push_str("WARNING: traversal truncated at the occurrence cap\n");
        }

        for (generation, count) in self.generation_counts().iter().enumerate() {
            let possible = 1u128.checked_shl(generation as u32);
            s.push_str(&format!("\n--- Generation {} ", generation));
            match possible {
                Some(p) => s.push_str(&format!("({} of {}) ---\n", count, p)),
                None => s.push_str(&format!("({}) ---\n", count)),
            }
            for o in self.occurrences_at(generation) {
                let path = if o.path.is_empty() {
                    "root".to_string()
                } else {
                    o.path.to_string()
                };
                s.push_str(&format!(
                    "  {:<12} {}{}\n",
                    path,
                    describe_person(source, &o.id),
                    describe_events(source, &o.id)
                ));
            }
        }

        if !self.links.is_empty() {
            s.push_str("\n--- Pedigree Collapse ---\n");
            for id in self.collapsed_ids() {
                let first = self.occurrence(id);
                let repeats: Vec<String> = self
                    .links_for(id)
                    .map(|l| format!("{} (gen {})", l.path, l.generation))
                    .collect();
                s.push_str(&format!(
                    "  {}: first via {} (gen {}), also via {}\n",
                    describe_person(source, id),
                    first.map(|o| o.path.to_string()).unwrap_or_default(),
                    first.map(|o| o.generation).unwrap_or(0),
                    repeats.join(", ")
                ));
            }
        }

        s
    }
}

/// Resolve `id` for display; a failing source degrades to the bare id.
fn resolve<'s, S: RecordSource + ?Sized>(source: &'s S, id: &str) -> Option<&'s Individual> {
    match source.individual(id) {
        Ok(found) => found,
        Err(e) => {
            log::warn!("Could not resolve '{}' for the report: {}", id, e);
            None
        }
    }
}

fn describe_person<S: RecordSource + ?Sized>(source: &S, id: &str) -> String {
    match resolve(source, id) {
        Some(ind) => format!("{} [{}] ({})", ind.display_name(), ind.gender.code(), ind.id),
        None => id.to_string(),
    }
}

fn describe_events<S: RecordSource + ?Sized>(source: &S, id: &str) -> String {
    let Some(ind) = resolve(source, id) else {
        return String::new();
    };
    let mut out = String::new();
    if let Some(b) = ind.birth.as_ref().and_then(|e| e.describe()) {
        out.push_str(&format!("  b. {}", b));
    }
    if let Some(d) = ind.death.as_ref().and_then(|e| e.describe()) {
        out.push_str(&format!("  d. {}", d));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LineageError, Result};
    use crate::records::Family;

    struct Unreachable;

    impl RecordSource for Unreachable {
        fn individual(&self, _id: &str) -> Result<Option<&Individual>> {
            Err(LineageError::Source("backend down".to_string()))
        }

        fn family(&self, _id: &str) -> Result<Option<&Family>> {
            Err(LineageError::Source("backend down".to_string()))
        }
    }

    #[test]
    fn test_lineage_path_display() {
        let p = LineagePath::root()
            .extend(ParentSlot::Father)
            .extend(ParentSlot::Mother);
        assert_eq!(p.to_string(), "FM");
        assert_eq!(p.len(), 2);
        assert!(LineagePath::root().is_empty());
    }

    #[test]
    fn test_lineage_path_order_father_first() {
        let f = LineagePath::root().extend(ParentSlot::Father);
        let m = LineagePath::root().extend(ParentSlot::Mother);
        assert!(f < m);
        assert!(f.extend(ParentSlot::Mother) < m.extend(ParentSlot::Father));
    }

    #[test]
    fn test_lineage_path_serializes_as_string() {
        let p = LineagePath::root().extend(ParentSlot::Mother);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"M\"");
    }

    #[test]
    fn test_counts_and_collapsed_ids() {
        let mut g = AncestorGraph::new("R", 2, 100);
        let occ = |id: &str, generation: usize, x: f64| Occurrence {
            id: id.to_string(),
            generation,
            coordinate: Coordinate::new(x, -(generation as f64)),
            path: LineagePath::root(),
            child: None,
        };
        g.push_occurrence(occ("R", 0, 0.0));
        g.push_occurrence(occ("A", 1, 0.0));
        g.push_occurrence(occ("B", 1, 1.0));
        g.push_link(CollapseLink {
            id: "A".to_string(),
            first: Coordinate::new(0.0, -1.0),
            repeat: Coordinate::new(2.0, -2.0),
            generation: 2,
            path: LineagePath::root(),
            child: 2,
        });
        g.push_link(CollapseLink {
            id: "A".to_string(),
            first: Coordinate::new(0.0, -1.0),
            repeat: Coordinate::new(3.0, -2.0),
            generation: 2,
            path: LineagePath::root(),
            child: 2,
        });

        assert_eq!(g.generation_counts(), vec![1, 2]);
        assert_eq!(g.max_generation(), 1);
        assert_eq!(g.collapsed_ids(), vec!["A"]);
        assert_eq!(g.links_for("A").count(), 2);
        assert_eq!(g.occurrences_at(1).count(), 2);
        assert!(g.occurrence("B").is_some());
        assert!(g.occurrence("Z").is_none());
        assert_eq!(g.occurrence_index("B"), Some(2));
        assert_eq!(g.occurrence_index("Z"), None);
    }

    #[test]
    fn test_summary_falls_back_to_ids_when_source_fails() {
        let mut g = AncestorGraph::new("R", 1, 100);
        g.push_occurrence(Occurrence {
            id: "R".to_string(),
            generation: 0,
            coordinate: Coordinate::new(0.0, 0.0),
            path: LineagePath::root(),
            child: None,
        });
        let text = g.summary(&Unreachable);
        assert!(text.starts_with("=== Ancestry of R ==="), "{}", text);
        assert!(text.contains("  root         R\n"), "{}", text);
    }
}
