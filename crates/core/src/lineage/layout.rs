use serde::Serialize;

use crate::error::{LineageError, Result};

/// A 2-D position for one occurrence or collapse endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Spacing between neighbouring slots (x) and generations (y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutConfig {
    pub x_spacing: f64,
    pub y_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_spacing: 1.0,
            y_spacing: 1.0,
        }
    }
}

impl LayoutConfig {
    /// # Errors
    /// Returns `InvalidConfig` if either spacing is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("x_spacing", self.x_spacing), ("y_spacing", self.y_spacing)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LineageError::InvalidConfig(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Hands out coordinates in traversal order.
///
/// Within a generation, slots are numbered left to right in the order they
/// are requested, so feeding it father-before-mother breadth-first order
/// keeps each father-side subtree left of its mother-side subtree. The
/// generation maps to `y = -generation * y_spacing`.
#[derive(Debug, Clone)]
pub struct LayoutAssigner {
    config: LayoutConfig,
    /// Next free slot per generation.
    next_slot: Vec<usize>,
}

impl LayoutAssigner {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            next_slot: Vec::new(),
        }
    }

    /// Claim the next slot in `generation`.
    pub fn place(&mut self, generation: usize) -> Coordinate {
        if self.next_slot.len() <= generation {
            self.next_slot.resize(generation + 1, 0);
        }
        let slot = self.next_slot[generation];
        self.next_slot[generation] += 1;

        Coordinate {
            x: slot as f64 * self.config.x_spacing,
            y: 0.0 - generation as f64 * self.config.y_spacing,
        }
    }
}

/// Assign coordinates to a sequence of generation numbers, ordered by
/// generation then path.
///
/// Pure: the same sequence always yields the same coordinates.
pub fn assign<I>(config: LayoutConfig, generations: I) -> Vec<Coordinate>
where
    I: IntoIterator<Item = usize>,
{
    let mut assigner = LayoutAssigner::new(config);
    generations.into_iter().map(|g| assigner.place(g)).collect()
}
