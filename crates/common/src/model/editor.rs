//! Editor aggregate root
//!
//! Editors live in the logins table keyed by email. There is no delete
//! path; records are only created and updated.

use serde::{Deserialize, Serialize};

// Positional row layout for the logins table
const COL_NAME: usize = 0;
pub const COL_EMAIL: usize = 1;
const COL_LEVEL: usize = 2;
const COL_SUBJECTS: usize = 3;

/// Number of columns in an editor row
pub const ROW_WIDTH: usize = 4;

/// An editor record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editor {
    pub name: String,
    /// Natural key for lookups; never changed by a patch
    pub email: String,
    pub level: Option<String>,
    pub subjects: Option<String>,
}

/// Partial editor used for updates. The email key is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorPatch {
    pub name: Option<String>,
    pub level: Option<String>,
    pub subjects: Option<String>,
}

impl EditorPatch {
    /// Names of the fields carried by this patch, in row order
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.name.is_some() { names.push("name"); }
        if self.level.is_some() { names.push("level"); }
        if self.subjects.is_some() { names.push("subjects"); }
        names
    }
}

fn cell(row: &[String], index: usize) -> Option<String> {
    row.get(index)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(String::from)
}

impl Editor {
    /// Construct an editor from a positional storage row; never fails
    pub fn from_row(row: &[String]) -> Self {
        Self {
            name: cell(row, COL_NAME).unwrap_or_default(),
            email: cell(row, COL_EMAIL).unwrap_or_default(),
            level: cell(row, COL_LEVEL),
            subjects: cell(row, COL_SUBJECTS),
        }
    }

    /// Convert this editor into a positional storage row
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![String::new(); ROW_WIDTH];
        row[COL_NAME] = self.name.clone();
        row[COL_EMAIL] = self.email.clone();
        if let Some(level) = &self.level {
            row[COL_LEVEL] = level.clone();
        }
        if let Some(subjects) = &self.subjects {
            row[COL_SUBJECTS] = subjects.clone();
        }
        row
    }

    /// Apply a partial update; returns the subset actually applied
    pub fn apply_patch(&mut self, patch: &EditorPatch) -> EditorPatch {
        let mut applied = EditorPatch::default();

        if let Some(name) = &patch.name {
            self.name = name.clone();
            applied.name = Some(name.clone());
        }
        if let Some(level) = &patch.level {
            self.level = Some(level.clone());
            applied.level = Some(level.clone());
        }
        if let Some(subjects) = &patch.subjects {
            self.subjects = Some(subjects.clone());
            applied.subjects = Some(subjects.clone());
        }

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip() {
        let row = vec![
            "Ed Editor".to_string(),
            "ed@example.com".to_string(),
            "Senior".to_string(),
            "Physics, Chemistry".to_string(),
        ];
        let editor = Editor::from_row(&row);
        assert_eq!(editor.to_row(), row);
    }

    #[test]
    fn test_from_row_defaults() {
        let editor = Editor::from_row(&[]);
        assert_eq!(editor.name, "");
        assert_eq!(editor.email, "");
        assert_eq!(editor.level, None);
    }

    #[test]
    fn test_patch_leaves_email_untouched() {
        let mut editor = Editor {
            name: "Ed".into(),
            email: "ed@example.com".into(),
            level: None,
            subjects: None,
        };

        let applied = editor.apply_patch(&EditorPatch {
            name: Some("Edwina".into()),
            level: Some("Senior".into()),
            subjects: None,
        });

        assert_eq!(editor.email, "ed@example.com");
        assert_eq!(editor.name, "Edwina");
        assert_eq!(applied.field_names(), vec!["name", "level"]);
    }
}
