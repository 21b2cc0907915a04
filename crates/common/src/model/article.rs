//! Article aggregate root
//!
//! An article is stored as a fixed 16-column positional row. `from_row`
//! tolerates missing or blank cells and never fails; `to_row` is its exact
//! inverse for every field it defines. The `link` field is derived from the
//! immutable `id` and recomputed on construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums;

/// Date format used for the deadline column
const DEADLINE_FORMAT: &str = "%Y-%m-%d";

// Positional row layout, fixed for storage compatibility
const COL_DATE: usize = 0;
const COL_TITLE: usize = 1;
const COL_SUBJECT: usize = 2;
const COL_TYPE: usize = 3;
const COL_AUTHOR_NAME: usize = 4;
const COL_AUTHOR_SCHOOL: usize = 5;
const COL_AUTHOR_EMAIL: usize = 6;
const COL_STATUS: usize = 7;
pub const COL_ID: usize = 8;
const COL_EDITOR_NAME: usize = 9;
const COL_EDITOR_EMAIL: usize = 10;
const COL_DEADLINE: usize = 11;
const COL_NOTES: usize = 12;
const COL_FOLDER_ID: usize = 13;
const COL_MARKING_GRID: usize = 14;
const COL_COPYRIGHT: usize = 15;

/// Number of columns in an article row
pub const ROW_WIDTH: usize = 16;

/// Author of an article; owned entirely by its article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub email: Option<String>,
    pub name: Option<String>,
    pub school: Option<String>,
}

/// The editor assigned to an article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedEditor {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// An article record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    id: String,
    pub link: String,
    pub date: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub notes: Option<String>,
    pub folder_id: Option<String>,
    pub marking_grid: Option<String>,
    pub copyright: Option<String>,
    pub author: Author,
    pub editor: AssignedEditor,
}

/// Partial article used for updates.
///
/// `id` and `link` are not representable here: the id is fixed at
/// construction and the link is always derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticlePatch {
    pub date: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub notes: Option<String>,
    pub folder_id: Option<String>,
    pub marking_grid: Option<String>,
    pub copyright: Option<String>,
}

impl ArticlePatch {
    /// Names of the fields carried by this patch, in row order
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.date.is_some() { names.push("date"); }
        if self.title.is_some() { names.push("title"); }
        if self.subject.is_some() { names.push("subject"); }
        if self.kind.is_some() { names.push("type"); }
        if self.status.is_some() { names.push("status"); }
        if self.deadline.is_some() { names.push("deadline"); }
        if self.notes.is_some() { names.push("notes"); }
        if self.folder_id.is_some() { names.push("folderId"); }
        if self.marking_grid.is_some() { names.push("markingGrid"); }
        if self.copyright.is_some() { names.push("copyright"); }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }
}

fn cell(row: &[String], index: usize) -> Option<String> {
    row.get(index)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(String::from)
}

impl Article {
    /// Construct an article from a positional storage row.
    ///
    /// Missing or blank cells become `None`. A deadline cell that does not
    /// parse as a date is treated as absent.
    pub fn from_row(row: &[String]) -> Self {
        let id = cell(row, COL_ID).unwrap_or_default();

        Self {
            link: Self::link_for(&id),
            id,
            date: cell(row, COL_DATE),
            title: cell(row, COL_TITLE),
            subject: cell(row, COL_SUBJECT),
            kind: cell(row, COL_TYPE),
            status: cell(row, COL_STATUS),
            deadline: cell(row, COL_DEADLINE)
                .and_then(|d| NaiveDate::parse_from_str(&d, DEADLINE_FORMAT).ok()),
            notes: cell(row, COL_NOTES),
            folder_id: cell(row, COL_FOLDER_ID),
            marking_grid: cell(row, COL_MARKING_GRID),
            copyright: cell(row, COL_COPYRIGHT),
            author: Author {
                name: cell(row, COL_AUTHOR_NAME),
                school: cell(row, COL_AUTHOR_SCHOOL),
                email: cell(row, COL_AUTHOR_EMAIL),
            },
            editor: AssignedEditor {
                name: cell(row, COL_EDITOR_NAME),
                email: cell(row, COL_EDITOR_EMAIL),
            },
        }
    }

    /// Construct a fresh submission: generates the id, stamps the date and
    /// enters the article at the first stage of the review pipeline.
    pub fn submission(
        title: String,
        subject: String,
        kind: String,
        notes: Option<String>,
        copyright: Option<String>,
        author: Author,
    ) -> Self {
        let id = Uuid::new_v4().simple().to_string();

        Self {
            link: Self::link_for(&id),
            id,
            date: Some(chrono::Utc::now().to_rfc3339()),
            title: Some(title),
            subject: Some(subject),
            kind: Some(kind),
            status: Some(enums::STATUSES[0].to_string()),
            deadline: None,
            notes,
            folder_id: None,
            marking_grid: None,
            copyright,
            author,
            editor: AssignedEditor::default(),
        }
    }

    /// The immutable article id
    pub fn id(&self) -> &str {
        &self.id
    }

    fn link_for(id: &str) -> String {
        format!("https://docs.google.com/document/d/{}/edit", id)
    }

    /// Convert this article into a positional storage row
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![String::new(); ROW_WIDTH];
        let set = |row: &mut Vec<String>, index: usize, value: &Option<String>| {
            if let Some(v) = value {
                row[index] = v.clone();
            }
        };

        set(&mut row, COL_DATE, &self.date);
        set(&mut row, COL_TITLE, &self.title);
        set(&mut row, COL_SUBJECT, &self.subject);
        set(&mut row, COL_TYPE, &self.kind);
        set(&mut row, COL_AUTHOR_NAME, &self.author.name);
        set(&mut row, COL_AUTHOR_SCHOOL, &self.author.school);
        set(&mut row, COL_AUTHOR_EMAIL, &self.author.email);
        set(&mut row, COL_STATUS, &self.status);
        row[COL_ID] = self.id.clone();
        set(&mut row, COL_EDITOR_NAME, &self.editor.name);
        set(&mut row, COL_EDITOR_EMAIL, &self.editor.email);
        if let Some(deadline) = self.deadline {
            row[COL_DEADLINE] = deadline.format(DEADLINE_FORMAT).to_string();
        }
        set(&mut row, COL_NOTES, &self.notes);
        set(&mut row, COL_FOLDER_ID, &self.folder_id);
        set(&mut row, COL_MARKING_GRID, &self.marking_grid);
        set(&mut row, COL_COPYRIGHT, &self.copyright);

        row
    }

    /// Apply a partial update, keeping only enum-valid values.
    ///
    /// A field whose value falls outside its enum table is dropped from the
    /// update without affecting the other fields. Returns the subset that
    /// was actually applied, which callers use for notification payloads.
    pub fn apply_patch(&mut self, patch: &ArticlePatch) -> ArticlePatch {
        let mut applied = ArticlePatch::default();

        if let Some(date) = &patch.date {
            self.date = Some(date.clone());
            applied.date = Some(date.clone());
        }
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
            applied.title = Some(title.clone());
        }
        if let Some(subject) = &patch.subject {
            if enums::is_allowed("subject", subject) {
                self.subject = Some(subject.clone());
                applied.subject = Some(subject.clone());
            }
        }
        if let Some(kind) = &patch.kind {
            if enums::is_allowed("type", kind) {
                self.kind = Some(kind.clone());
                applied.kind = Some(kind.clone());
            }
        }
        if let Some(status) = &patch.status {
            if enums::is_allowed("status", status) {
                self.status = Some(status.clone());
                applied.status = Some(status.clone());
            }
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
            applied.deadline = Some(deadline);
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
            applied.notes = Some(notes.clone());
        }
        if let Some(folder_id) = &patch.folder_id {
            self.folder_id = Some(folder_id.clone());
            applied.folder_id = Some(folder_id.clone());
        }
        if let Some(marking_grid) = &patch.marking_grid {
            self.marking_grid = Some(marking_grid.clone());
            applied.marking_grid = Some(marking_grid.clone());
        }
        if let Some(copyright) = &patch.copyright {
            self.copyright = Some(copyright.clone());
            applied.copyright = Some(copyright.clone());
        }

        applied
    }
}
