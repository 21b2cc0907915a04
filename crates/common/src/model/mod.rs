//! Record models for Copydesk
//!
//! Provides:
//! - Article and Editor aggregate roots with positional row (de)serialization
//! - The Author value object embedded in Article
//! - Enum tables gating partial updates

pub mod article;
pub mod editor;
pub mod enums;

pub use article::{Article, ArticlePatch, AssignedEditor, Author};
pub use editor::{Editor, EditorPatch};
