//! Story content: sections and the ordered catalog

pub mod catalog;
pub mod content;
pub mod section;

pub use catalog::SectionCatalog;
pub use content::{greeting, hum_story, StoryAudience, StoryOptions};
pub use section::{Section, SectionBody, SectionKind};
