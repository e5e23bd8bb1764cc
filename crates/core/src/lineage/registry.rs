use std::collections::HashMap;

use super::layout::Coordinate;

/// Result of registering a reach of an individual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegistryOutcome {
    /// First time this individual was reached; the candidate coordinate is kept.
    FirstSeen(Coordinate),
    /// Seen before; carries the coordinate of the first occurrence.
    Collapsed(Coordinate),
}

/// First-seen coordinate per individual for a single traversal.
///
/// Populated in traversal order, so identical traversals always elect the
/// same first occurrence.
#[derive(Debug, Default)]
pub struct CollapseRegistry {
    first_seen: HashMap<String, Coordinate>,
}

impl CollapseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, candidate: Coordinate) -> RegistryOutcome {
        if let Some(&prior) = self.first_seen.get(id) {
            return RegistryOutcome::Collapsed(prior);
        }
        self.first_seen.insert(id.to_string(), candidate);
        RegistryOutcome::FirstSeen(candidate)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.first_seen.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_then_collapsed() {
        let mut reg = CollapseRegistry::new();
        let a = Coordinate::new(0.0, -2.0);
        let b = Coordinate::new(3.0, -2.0);

        assert_eq!(reg.register("G", a), RegistryOutcome::FirstSeen(a));
        assert_eq!(reg.register("G", b), RegistryOutcome::Collapsed(a));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_every_repeat_points_at_first() {
        let mut reg = CollapseRegistry::new();
        let first = Coordinate::new(1.0, -1.0);
        reg.register("X", first);
        for i in 0..4 {
            let outcome = reg.register("X", Coordinate::new(i as f64, -3.0));
            assert_eq!(outcome, RegistryOutcome::Collapsed(first));
        }
    }

    #[test]
    fn test_distinct_ids_independent() {
        let mut reg = CollapseRegistry::new();
        assert!(reg.is_empty());
        reg.register("A", Coordinate::new(0.0, 0.0));
        assert!(reg.contains("A"));
        assert!(!reg.contains("B"));
        assert!(matches!(
            reg.register("B", Coordinate::new(1.0, 0.0)),
            RegistryOutcome::FirstSeen(_)
        ));
        assert_eq!(reg.len(), 2);
    }
}
