//! Ordered, immutable story catalog

use super::section::{Section, SectionKind};
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Fixed ordered sequence of story sections
///
/// Guaranteed non-empty, with unique ids and at least one narration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SectionCatalog {
    sections: Vec<Section>,
}

impl SectionCatalog {
    /// Validate and build a catalog
    pub fn new(sections: Vec<Section>) -> Result<Self> {
        if sections.is_empty() {
            return Err(Error::Catalog("catalog has no sections".to_string()));
        }

        let mut seen = HashSet::new();
        for section in &sections {
            if section.id.is_empty() {
                return Err(Error::Catalog("section with empty id".to_string()));
            }
            if !seen.insert(section.id.as_str()) {
                return Err(Error::Catalog(format!("duplicate section id '{}'", section.id)));
            }
        }

        if !sections.iter().any(Section::is_narration) {
            return Err(Error::Catalog("catalog has no narration section".to_string()));
        }

        Ok(Self { sections })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false for a constructed catalog; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn kind_at(&self, index: usize) -> Option<SectionKind> {
        self.get(index).map(Section::kind)
    }

    pub fn is_narration(&self, index: usize) -> bool {
        self.kind_at(index) == Some(SectionKind::Narration)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn narration_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_narration()).count()
    }

    /// Member view: the same story with every call-to-action removed
    pub fn without_calls_to_action(&self) -> Self {
        Self {
            sections: self
                .sections
                .iter()
                .filter(|s| s.is_narration())
                .cloned()
                .collect(),
        }
    }
}
