//! Action layer for the article-management service
//!
//! Each action validates its input, talks to the row store, fires any
//! notifications and returns a response envelope. Validation failures are
//! answered before storage is touched; collaborator failures surface
//! immediately with no retries.

use crate::errors::{AppError, Result};
use crate::model::article::COL_ID;
use crate::model::editor::COL_EMAIL;
use crate::model::{Article, ArticlePatch, Author, Editor, EditorPatch};
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::query::{filter_records, Query};
use crate::store::{tables, RowMatch, RowStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Success envelope returned by every action. Null fields are stripped
/// before transmission.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub message: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiResponse {
    /// Envelope with just a message
    pub fn of(message: impl Serialize) -> Result<Self> {
        Ok(Self {
            message: strip_nulls(serde_json::to_value(message)?),
            reason: None,
        })
    }

    /// Envelope with a message and a reason
    pub fn with_reason(reason: &str, message: impl Serialize) -> Result<Self> {
        Ok(Self {
            message: strip_nulls(serde_json::to_value(message)?),
            reason: Some(reason.to_string()),
        })
    }
}

/// Drop null fields recursively; nothing transmits an empty cell
fn strip_nulls(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(strip_nulls).collect())
        }
        other => other,
    }
}

/// The article part of a submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleSubmission {
    pub title: Option<String>,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
    pub copyright: Option<String>,
}

/// Body of `article/create`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateArticleRequest {
    pub article: Option<ArticleSubmission>,
    pub author: Option<Author>,
    /// Opaque reference to the submitted document
    pub data: Option<serde_json::Value>,
}

/// Body of `article/update`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateArticleRequest {
    pub id: Option<String>,
    pub properties: Option<ArticlePatch>,
}

/// Body of `article/delete`; may be a partial article, only `id` is used
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteArticleRequest {
    pub id: Option<String>,
}

/// Body of `editor/create`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEditorRequest {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub level: Option<String>,
    pub subjects: Option<String>,
}

/// Body of `editor/update`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateEditorRequest {
    pub email: Option<String>,
    pub properties: Option<EditorPatch>,
}

/// The action layer. Collaborators are injected at construction; there is
/// no process-wide storage handle.
pub struct Ams {
    store: Arc<dyn RowStore>,
    notifier: Arc<dyn Notifier>,
}

impl Ams {
    pub fn new(store: Arc<dyn RowStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Hand a notification to the sender, logging failures without
    /// propagating them
    async fn notify(&self, to: &str, kind: NotificationKind, data: serde_json::Value) {
        let notification = Notification {
            to: to.to_string(),
            kind,
            data,
        };
        if let Err(e) = self.notifier.send(notification).await {
            tracing::warn!(to = %to, kind = ?kind, error = %e, "Notification failed");
        }
    }

    async fn find_article(&self, id: &str) -> Result<Option<Article>> {
        let rows = self.store.get_all_rows(tables::ARTICLES).await?;
        Ok(rows
            .iter()
            .find(|row| row.get(COL_ID).map(String::as_str) == Some(id))
            .map(|row| Article::from_row(row)))
    }

    /// Handle the submission of a new article
    pub async fn create_article(&self, request: CreateArticleRequest) -> Result<ApiResponse> {
        let article = request
            .article
            .ok_or_else(|| AppError::MissingField { field: "article".into() })?;
        let author = request
            .author
            .ok_or_else(|| AppError::MissingField { field: "author".into() })?;
        if request.data.is_none() {
            return Err(AppError::MissingField { field: "data".into() });
        }

        let missing = [
            ("title", article.title.is_none()),
            ("subject", article.subject.is_none()),
            ("type", article.kind.is_none()),
            ("author.name", author.name.is_none()),
            ("author.email", author.email.is_none()),
        ]
        .into_iter()
        .find_map(|(field, is_missing)| is_missing.then_some(field));

        if let Some(field) = missing {
            return Err(AppError::Validation {
                message: "Missing properties".into(),
                field: Some(field.to_string()),
            });
        }

        let subject = article.subject.unwrap();
        let kind = article.kind.unwrap();
        for (field, value) in [("subject", &subject), ("type", &kind)] {
            if !crate::model::enums::is_allowed(field, value) {
                return Err(AppError::Validation {
                    message: format!("Unknown {}: {}", field, value),
                    field: Some(field.to_string()),
                });
            }
        }

        let author_email = author.email.clone().unwrap();
        let created = Article::submission(
            article.title.unwrap(),
            subject,
            kind,
            article.notes,
            article.copyright,
            author,
        );

        self.store
            .append_row(tables::ARTICLES, created.to_row())
            .await?;

        tracing::info!(
            id = %created.id(),
            title = created.title.as_deref().unwrap_or(""),
            "Article submitted"
        );
        crate::metrics::record_action("createArticle");

        self.notify(
            &author_email,
            NotificationKind::ArticleSubmitted,
            json!({ "article": &created }),
        )
        .await;

        ApiResponse::with_reason("createArticle", created)
    }

    /// Apply a partial update to an existing article
    pub async fn update_article(&self, request: UpdateArticleRequest) -> Result<ApiResponse> {
        let id = request
            .id
            .ok_or_else(|| AppError::MissingField { field: "id".into() })?;
        let properties = request
            .properties
            .ok_or_else(|| AppError::MissingField { field: "properties".into() })?;

        let mut article = self
            .find_article(&id)
            .await?
            .ok_or_else(|| AppError::ArticleNotFound { id: id.clone() })?;

        let applied = article.apply_patch(&properties);

        self.store
            .update_row(
                tables::ARTICLES,
                &RowMatch::new(COL_ID, id.clone()),
                article.to_row(),
            )
            .await?;

        tracing::info!(
            id = %id,
            modified = ?applied.field_names(),
            "Article updated"
        );
        crate::metrics::record_action("updateArticle");

        if let Some(author_email) = article.author.email.clone() {
            self.notify(
                &author_email,
                NotificationKind::ArticleUpdated,
                json!({ "article": &article, "modified": applied.field_names() }),
            )
            .await;
        }

        ApiResponse::with_reason("Successful Update", article)
    }

    /// Remove an article from storage
    pub async fn delete_article(&self, request: DeleteArticleRequest) -> Result<ApiResponse> {
        let id = request
            .id
            .ok_or_else(|| AppError::MissingField { field: "id".into() })?;

        self.store
            .delete_row(tables::ARTICLES, &RowMatch::new(COL_ID, id.clone()))
            .await?;

        tracing::info!(id = %id, "Article deleted");

        ApiResponse::with_reason("deleteArticle", json!({ "id": id }))
    }

    /// Create an editor; editor emails are unique
    pub async fn create_editor(&self, request: CreateEditorRequest) -> Result<ApiResponse> {
        let (Some(name), Some(email)) = (request.name.clone(), request.email.clone()) else {
            return Err(AppError::Validation {
                message: "Editors must have an email and a name".into(),
                field: None,
            });
        };

        request.validate().map_err(|e| AppError::Validation {
            message: e.to_string(),
            field: Some("email".into()),
        })?;

        let rows = self.store.get_all_rows(tables::EDITORS).await?;
        let exists = rows
            .iter()
            .any(|row| row.get(COL_EMAIL).map(String::as_str) == Some(email.as_str()));
        if exists {
            return Err(AppError::DuplicateEmail { email });
        }

        let editor = Editor {
            name,
            email: email.clone(),
            level: request.level,
            subjects: request.subjects,
        };

        self.store
            .append_row(tables::EDITORS, editor.to_row())
            .await?;

        tracing::info!(email = %email, "Editor created");
        crate::metrics::record_action("createEditor");

        self.notify(
            &email,
            NotificationKind::EditorCreated,
            json!({ "editor": &editor }),
        )
        .await;

        ApiResponse::with_reason("createEditor", editor)
    }

    /// Apply a partial update to an existing editor
    pub async fn update_editor(&self, request: UpdateEditorRequest) -> Result<ApiResponse> {
        let (Some(email), Some(properties)) = (request.email, request.properties) else {
            return Err(AppError::Validation {
                message: "You must specify a partial Editor object and properties to update it with."
                    .into(),
                field: None,
            });
        };

        let mut editor = self.get_editor_by_email(&email).await?;

        editor.apply_patch(&properties);

        self.store
            .update_row(
                tables::EDITORS,
                &RowMatch::new(COL_EMAIL, editor.email.clone()),
                editor.to_row(),
            )
            .await?;

        tracing::info!(email = %email, "Editor updated");

        ApiResponse::with_reason("updatedEditor", editor)
    }

    /// Fetch all articles, optionally filtered by a search query
    pub async fn get_all_articles(&self, query: Option<&str>) -> Result<Vec<Article>> {
        let rows = self.store.get_all_rows(tables::ARTICLES).await?;
        let articles: Vec<Article> = rows.iter().map(|row| Article::from_row(row)).collect();

        Ok(match query {
            Some(q) => filter_records(articles, &Query::parse(q), true),
            None => articles,
        })
    }

    /// Fetch all editors, optionally filtered by a search query
    pub async fn get_all_editors(&self, query: Option<&str>) -> Result<Vec<Editor>> {
        let rows = self.store.get_all_rows(tables::EDITORS).await?;
        let editors: Vec<Editor> = rows.iter().map(|row| Editor::from_row(row)).collect();

        Ok(match query {
            Some(q) => filter_records(editors, &Query::parse(q), true),
            None => editors,
        })
    }

    /// Look up a single editor by email
    pub async fn get_editor_by_email(&self, email: &str) -> Result<Editor> {
        let query = format!("email:{}", email);
        let mut editors = self.get_all_editors(Some(&query)).await?;

        if editors.is_empty() {
            return Err(AppError::EditorNotFound {
                email: email.to_string(),
            });
        }
        Ok(editors.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use crate::store::MemoryStore;

    fn harness() -> (Arc<MemoryStore>, Arc<MemoryNotifier>, Ams) {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let ams = Ams::new(store.clone(), notifier.clone());
        (store, notifier, ams)
    }

    fn submission() -> CreateArticleRequest {
        CreateArticleRequest {
            article: Some(ArticleSubmission {
                title: Some("Gene Editing in Wheat".into()),
                subject: Some("Biology".into()),
                kind: Some("Original Research".into()),
                notes: None,
                copyright: None,
            }),
            author: Some(Author {
                email: Some("ann@example.com".into()),
                name: Some("Ann Author".into()),
                school: Some("Hillcrest High".into()),
            }),
            data: Some(json!({"document": "ref"})),
        }
    }

    #[tokio::test]
    async fn test_create_article_persists_and_notifies() {
        let (store, notifier, ams) = harness();

        let response = ams.create_article(submission()).await.unwrap();

        assert_eq!(response.reason.as_deref(), Some("createArticle"));
        assert_eq!(store.row_count(tables::ARTICLES).await, 1);

        let sent = notifier.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ann@example.com");
        assert_eq!(sent[0].kind, NotificationKind::ArticleSubmitted);
    }

    #[tokio::test]
    async fn test_create_article_missing_title_is_rejected() {
        let (store, _, ams) = harness();

        let mut request = submission();
        request.article.as_mut().unwrap().title = None;

        let err = ams.create_article(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(store.row_count(tables::ARTICLES).await, 0);
    }

    #[tokio::test]
    async fn test_create_article_unknown_subject_is_rejected() {
        let (store, _, ams) = harness();

        let mut request = submission();
        request.article.as_mut().unwrap().subject = Some("Astrology".into());

        let err = ams.create_article(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(store.row_count(tables::ARTICLES).await, 0);
    }

    #[tokio::test]
    async fn test_update_article_applies_patch() {
        let (_store, notifier, ams) = harness();
        ams.create_article(submission()).await.unwrap();
        let articles = ams.get_all_articles(None).await.unwrap();
        let id = articles[0].id().to_string();

        let response = ams
            .update_article(UpdateArticleRequest {
                id: Some(id.clone()),
                properties: Some(ArticlePatch {
                    status: Some("Technical Review".into()),
                    ..Default::default()
                }),
            })
            .await
            .unwrap();

        assert_eq!(response.reason.as_deref(), Some("Successful Update"));

        let updated = ams.get_all_articles(None).await.unwrap();
        assert_eq!(updated[0].status.as_deref(), Some("Technical Review"));
        assert_eq!(updated[0].id(), id);

        // Author is told which fields changed
        let sent = notifier.sent().await;
        let update = sent.last().unwrap();
        assert_eq!(update.kind, NotificationKind::ArticleUpdated);
        assert_eq!(update.data["modified"], json!(["status"]));
    }

    #[tokio::test]
    async fn test_update_article_not_found_leaves_storage_alone() {
        let (store, _, ams) = harness();
        ams.create_article(submission()).await.unwrap();
        let before = store.get_all_rows(tables::ARTICLES).await.unwrap();

        let err = ams
            .update_article(UpdateArticleRequest {
                id: Some("no-such-id".into()),
                properties: Some(ArticlePatch::default()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ArticleNotFound { .. }));
        assert_eq!(store.get_all_rows(tables::ARTICLES).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_article_requires_id_and_properties() {
        let (_, _, ams) = harness();

        let err = ams
            .update_article(UpdateArticleRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MissingField { .. }));
    }

    #[tokio::test]
    async fn test_delete_article() {
        let (store, _, ams) = harness();
        ams.create_article(submission()).await.unwrap();
        let id = ams.get_all_articles(None).await.unwrap()[0].id().to_string();

        let response = ams
            .delete_article(DeleteArticleRequest { id: Some(id.clone()) })
            .await
            .unwrap();

        assert_eq!(response.reason.as_deref(), Some("deleteArticle"));
        assert_eq!(response.message["id"], json!(id));
        assert_eq!(store.row_count(tables::ARTICLES).await, 0);
    }

    #[tokio::test]
    async fn test_create_editor_and_duplicate_guard() {
        let (store, notifier, ams) = harness();

        let request = CreateEditorRequest {
            name: Some("Ed Editor".into()),
            email: Some("ed@example.com".into()),
            level: Some("Senior".into()),
            subjects: None,
        };

        ams.create_editor(request.clone()).await.unwrap();
        assert_eq!(store.row_count(tables::EDITORS).await, 1);
        assert_eq!(notifier.sent().await.len(), 1);

        let err = ams.create_editor(request).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail { .. }));
        // No second write
        assert_eq!(store.row_count(tables::EDITORS).await, 1);
    }

    #[tokio::test]
    async fn test_create_editor_requires_name_and_email() {
        let (_, _, ams) = harness();

        let err = ams
            .create_editor(CreateEditorRequest {
                name: None,
                email: Some("ed@example.com".into()),
                level: None,
                subjects: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_editor_rejects_bad_email() {
        let (store, _, ams) = harness();

        let err = ams
            .create_editor(CreateEditorRequest {
                name: Some("Ed".into()),
                email: Some("not-an-email".into()),
                level: None,
                subjects: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(store.row_count(tables::EDITORS).await, 0);
    }

    #[tokio::test]
    async fn test_update_editor() {
        let (_, _, ams) = harness();
        ams.create_editor(CreateEditorRequest {
            name: Some("Ed".into()),
            email: Some("ed@example.com".into()),
            level: None,
            subjects: None,
        })
        .await
        .unwrap();

        let response = ams
            .update_editor(UpdateEditorRequest {
                email: Some("ed@example.com".into()),
                properties: Some(EditorPatch {
                    level: Some("Senior".into()),
                    ..Default::default()
                }),
            })
            .await
            .unwrap();

        assert_eq!(response.reason.as_deref(), Some("updatedEditor"));

        let editor = ams.get_editor_by_email("ed@example.com").await.unwrap();
        assert_eq!(editor.level.as_deref(), Some("Senior"));
    }

    #[tokio::test]
    async fn test_update_editor_not_found() {
        let (_, _, ams) = harness();

        let err = ams
            .update_editor(UpdateEditorRequest {
                email: Some("ghost@example.com".into()),
                properties: Some(EditorPatch::default()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EditorNotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_all_articles_with_query() {
        let (_, _, ams) = harness();
        ams.create_article(submission()).await.unwrap();

        let mut other = submission();
        other.article.as_mut().unwrap().title = Some("Dark Matter Survey".into());
        other.article.as_mut().unwrap().subject = Some("Physics".into());
        ams.create_article(other).await.unwrap();

        let all = ams.get_all_articles(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let structured = ams.get_all_articles(Some("subject:Physics")).await.unwrap();
        assert_eq!(structured.len(), 1);
        assert_eq!(structured[0].title.as_deref(), Some("Dark Matter Survey"));

        let free_text = ams.get_all_articles(Some("Wheat")).await.unwrap();
        assert_eq!(free_text.len(), 1);
        assert_eq!(free_text[0].subject.as_deref(), Some("Biology"));
    }

    #[test]
    fn test_response_strips_null_fields() {
        let response = ApiResponse::of(json!({
            "id": "abc",
            "deadline": null,
            "author": { "name": "Ann", "school": null }
        }))
        .unwrap();

        assert_eq!(
            response.message,
            json!({ "id": "abc", "author": { "name": "Ann" } })
        );
    }

    #[tokio::test]
    async fn test_get_editor_by_email_awaits_lookup() {
        let (_, _, ams) = harness();
        ams.create_editor(CreateEditorRequest {
            name: Some("Ed".into()),
            email: Some("ed@example.com".into()),
            level: None,
            subjects: None,
        })
        .await
        .unwrap();

        let editor = ams.get_editor_by_email("ed@example.com").await.unwrap();
        assert_eq!(editor.name, "Ed");

        let err = ams.get_editor_by_email("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::EditorNotFound { .. }));
    }
}
