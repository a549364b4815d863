//! Narration lookup over the catalog
//!
//! Calls-to-action are waypoints: they are never played, so every lookup
//! here skips them.

use crate::story::SectionCatalog;

/// Search direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Direction of travel from `current` to `target`.
    ///
    /// Forward only when the target lies strictly after the current index.
    pub fn toward(target: usize, current: usize) -> Self {
        if target > current {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

/// Finds playable sections in a catalog
#[derive(Debug, Clone, Copy)]
pub struct SectionNavigator<'a> {
    catalog: &'a SectionCatalog,
}

impl<'a> SectionNavigator<'a> {
    pub fn new(catalog: &'a SectionCatalog) -> Self {
        Self { catalog }
    }

    /// First narration strictly after `index`; `None` at the end of the story
    pub fn next_narration_after(&self, index: usize) -> Option<usize> {
        (index.saturating_add(1)..self.catalog.len()).find(|&i| self.catalog.is_narration(i))
    }

    /// Nearest narration starting at `target` and walking in `direction`.
    ///
    /// A narration target resolves to itself. `None` when the walk runs off
    /// the catalog (or `target` is out of range).
    pub fn nearest_narration_to(&self, target: usize, direction: Direction) -> Option<usize> {
        if target >= self.catalog.len() {
            return None;
        }
        match direction {
            Direction::Forward => (target..self.catalog.len()).find(|&i| self.catalog.is_narration(i)),
            Direction::Backward => (0..=target).rev().find(|&i| self.catalog.is_narration(i)),
        }
    }

    /// Resolve an explicit jump from `current` to `target`.
    ///
    /// Calls-to-action resolve in the direction of travel; `None` means the
    /// jump is a no-op.
    pub fn resolve_seek(&self, target: usize, current: usize) -> Option<usize> {
        self.nearest_narration_to(target, Direction::toward(target, current))
    }

    /// Where the story starts (and restarts on replay)
    pub fn first_narration(&self) -> Option<usize> {
        self.nearest_narration_to(0, Direction::Forward)
    }
}
