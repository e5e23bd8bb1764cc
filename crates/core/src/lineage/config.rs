use crate::error::{LineageError, Result};

use super::layout::LayoutConfig;

/// Default cap on the number of occurrences in one graph.
pub const DEFAULT_CAPACITY: usize = 100;

/// Parameters of a single ancestry traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalConfig {
    /// Identifier of the individual whose ancestors are walked.
    pub root: String,
    /// Number of parent hops to expand; 0 yields just the root.
    pub max_generations: usize,
    /// Hard cap on occurrences; must be positive.
    pub capacity: usize,
    pub layout: LayoutConfig,
}

impl TraversalConfig {
    /// Create a config for `root` with no generations and the default cap.
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            max_generations: 0,
            capacity: DEFAULT_CAPACITY,
            layout: LayoutConfig::default(),
        }
    }

    /// Set the number of generations to expand.
    pub fn generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Set the occurrence cap (default: 100).
    pub fn capacity(mut self, n: usize) -> Self {
        self.capacity = n;
        self
    }

    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// # Errors
    /// Returns `InvalidConfig` for an empty root id, a zero capacity, or
    /// an invalid layout.
    pub fn validate(&self) -> Result<()> {
        if self.root.trim().is_empty() {
            return Err(LineageError::InvalidConfig(
                "root identifier must not be empty".to_string(),
            ));
        }
        if self.capacity == 0 {
            return Err(LineageError::InvalidConfig(
                "capacity must be positive".to_string(),
            ));
        }
        self.layout.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = TraversalConfig::new("I1");
        assert_eq!(cfg.max_generations, 0);
        assert_eq!(cfg.capacity, DEFAULT_CAPACITY);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let cfg = TraversalConfig::new("I1").generations(4).capacity(20);
        assert_eq!(cfg.max_generations, 4);
        assert_eq!(cfg.capacity, 20);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = TraversalConfig::new("I1").capacity(0).validate().unwrap_err();
        assert!(format!("{}", err).contains("capacity"), "Error was: {}", err);
    }

    #[test]
    fn test_empty_root_rejected() {
        assert!(TraversalConfig::new("  ").validate().is_err());
    }
}
