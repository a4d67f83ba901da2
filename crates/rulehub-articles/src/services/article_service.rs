use rulehub_database::DbConnection;
use rulehub_entities::{articles, media, users};
use rulehub_storage::{ObjectStore, StorageError};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionTrait,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::media_store::MediaRecordStore;
use super::types::{
    ArticleView, CreateArticle, MediaSpec, MediaView, ReconcileReport, UpdateArticle,
};
use crate::error::ArticleError;

/// Progress of one create/update request, logged at each transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validated,
    ArticlePersisted,
    MediaKeysIssued,
    MediaPersisted,
    ResponseBuilt,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validated => "validated",
            Stage::ArticlePersisted => "article_persisted",
            Stage::MediaKeysIssued => "media_keys_issued",
            Stage::MediaPersisted => "media_persisted",
            Stage::ResponseBuilt => "response_built",
        };
        f.write_str(name)
    }
}

/// Tracks the last stage reached so a failure can be reported against it
struct Progress {
    operation: &'static str,
    stage: Option<Stage>,
}

impl Progress {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            stage: None,
        }
    }

    fn reach(&mut self, stage: Stage, article_id: Option<Uuid>) {
        self.stage = Some(stage);
        match article_id {
            Some(id) => debug!("{} article {}: {}", self.operation, id, stage),
            None => debug!("{} article: {}", self.operation, stage),
        }
    }

    fn fail(&self, error: ArticleError) -> ArticleError {
        let stage = self
            .stage
            .map(|s| s.to_string())
            .unwrap_or_else(|| "start".to_string());
        warn!("{} article failed after {}: {}", self.operation, stage, error);
        error
    }
}

/// Coordinates article writes with the media objects they reference.
///
/// Upload policy: clients obtain a temporary key from the media endpoint,
/// PUT the bytes, then reference the key here. Keys are promoted to permanent
/// only once the owning rows are committed.
pub struct ArticleService {
    db: Arc<DbConnection>,
    object_store: Arc<dyn ObjectStore>,
}

impl ArticleService {
    pub fn new(db: Arc<DbConnection>, object_store: Arc<dyn ObjectStore>) -> Self {
        Self { db, object_store }
    }

    pub async fn create_article(
        &self,
        user_id: Uuid,
        input: CreateArticle,
    ) -> Result<ArticleView, ArticleError> {
        let mut progress = Progress::new("create");
        let result = self.create_inner(user_id, input, &mut progress).await;
        result.map_err(|e| progress.fail(e))
    }

    async fn create_inner(
        &self,
        user_id: Uuid,
        input: CreateArticle,
        progress: &mut Progress,
    ) -> Result<ArticleView, ArticleError> {
        input.validate()?;

        let author = users::Entity::find_by_id(user_id)
            .filter(users::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await?
            .ok_or(ArticleError::Unauthorized)?;
        progress.reach(Stage::Validated, None);

        let txn = self.db.begin().await?;

        let article = articles::ActiveModel {
            title: Set(input.title),
            content: Set(input.content),
            author_id: Set(author.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        progress.reach(Stage::ArticlePersisted, Some(article.id));

        let specs = match MediaSpec::from_references(&input.media) {
            Ok(specs) => specs,
            Err(e) => {
                txn.rollback().await?;
                return Err(e.into());
            }
        };
        progress.reach(Stage::MediaKeysIssued, Some(article.id));

        let rows = MediaRecordStore::replace_media_set(&txn, article.id, &specs).await?;
        txn.commit().await?;
        progress.reach(Stage::MediaPersisted, Some(article.id));

        let rows = self.promote_rows(rows).await?;
        let view = self.build_view(article, &author, rows).await?;
        progress.reach(Stage::ResponseBuilt, Some(view.id));

        info!(
            "User {} created article {} with {} media",
            author.id,
            view.id,
            view.media.len()
        );
        Ok(view)
    }

    pub async fn get_article(&self, article_id: Uuid) -> Result<ArticleView, ArticleError> {
        let article = articles::Entity::find_by_id(article_id)
            .filter(articles::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await?
            .ok_or(ArticleError::NotFound(article_id))?;

        let author = self.load_author(&article).await?;
        let rows = MediaRecordStore::list_media(self.db.as_ref(), article.id).await?;
        self.build_view(article, &author, rows).await
    }

    pub async fn update_article(
        &self,
        article_id: Uuid,
        input: UpdateArticle,
    ) -> Result<ArticleView, ArticleError> {
        let mut progress = Progress::new("update");
        let result = self.update_inner(article_id, input, &mut progress).await;
        result.map_err(|e| progress.fail(e))
    }

    async fn update_inner(
        &self,
        article_id: Uuid,
        input: UpdateArticle,
        progress: &mut Progress,
    ) -> Result<ArticleView, ArticleError> {
        input.validate()?;
        progress.reach(Stage::Validated, Some(article_id));

        let txn = self.db.begin().await?;

        // Claim the row with a write before reading it. On Postgres this takes
        // the row lock; on SQLite it takes the write lock up front, since a
        // deferred transaction that reads first cannot wait to upgrade.
        let claimed = articles::Entity::update_many()
            .col_expr(articles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(articles::Column::Id.eq(article_id))
            .filter(articles::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            txn.rollback().await?;
            return Err(ArticleError::NotFound(article_id));
        }

        let article = articles::Entity::find_by_id(article_id)
            .one(&txn)
            .await?
            .ok_or(ArticleError::NotFound(article_id))?;

        let mut active = article.into_active_model();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        let article = active.update(&txn).await?;
        progress.reach(Stage::ArticlePersisted, Some(article.id));

        let new_rows = match input.media.as_deref() {
            Some(references) => {
                let specs = match MediaSpec::from_references(references) {
                    Ok(specs) => specs,
                    Err(e) => {
                        txn.rollback().await?;
                        return Err(e.into());
                    }
                };
                progress.reach(Stage::MediaKeysIssued, Some(article.id));
                Some(MediaRecordStore::replace_media_set(&txn, article.id, &specs).await?)
            }
            None => None,
        };
        txn.commit().await?;
        progress.reach(Stage::MediaPersisted, Some(article.id));

        let rows = match new_rows {
            Some(rows) => self.promote_rows(rows).await?,
            None => MediaRecordStore::list_media(self.db.as_ref(), article.id).await?,
        };

        let author = self.load_author(&article).await?;
        let view = self.build_view(article, &author, rows).await?;
        progress.reach(Stage::ResponseBuilt, Some(view.id));

        info!("Updated article {}", view.id);
        Ok(view)
    }

    /// Promote the objects behind pending rows of live articles, oldest first
    pub async fn reconcile_pending_media(&self, limit: u64) -> Result<ReconcileReport, ArticleError> {
        let pending = MediaRecordStore::list_pending(self.db.as_ref(), limit).await?;
        let mut report = ReconcileReport {
            scanned: pending.len(),
            ..Default::default()
        };

        for row in pending {
            match self.object_store.promote_to_permanent(&row.storage_key).await {
                Ok(()) => {
                    MediaRecordStore::mark_permanent(self.db.as_ref(), row.id).await?;
                    report.promoted += 1;
                }
                Err(StorageError::ObjectNotFound(_)) => report.missing += 1,
                Err(e) => {
                    warn!(
                        "Could not promote {} for article {}: {}",
                        row.storage_key, row.article_id, e
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            "Media reconcile: scanned {}, promoted {}, missing {}, failed {}",
            report.scanned, report.promoted, report.missing, report.failed
        );
        Ok(report)
    }

    /// Promote each committed row's object and mark the row permanent.
    ///
    /// A missing object leaves the row pending. Any other storage failure
    /// aborts; rows not yet promoted stay pending for a later sweep.
    async fn promote_rows(&self, rows: Vec<media::Model>) -> Result<Vec<media::Model>, ArticleError> {
        let mut promoted = Vec::with_capacity(rows.len());
        for row in rows {
            match self.object_store.promote_to_permanent(&row.storage_key).await {
                Ok(()) => {
                    promoted.push(MediaRecordStore::mark_permanent(self.db.as_ref(), row.id).await?);
                }
                Err(StorageError::ObjectNotFound(key)) => {
                    warn!(
                        "Object {} for article {} not uploaded yet; left pending",
                        key, row.article_id
                    );
                    promoted.push(row);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(promoted)
    }

    async fn load_author(&self, article: &articles::Model) -> Result<users::Model, ArticleError> {
        users::Entity::find_by_id(article.author_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ArticleError::Internal(format!(
                    "author {} of article {} is missing",
                    article.author_id, article.id
                ))
            })
    }

    async fn build_view(
        &self,
        article: articles::Model,
        author: &users::Model,
        rows: Vec<media::Model>,
    ) -> Result<ArticleView, ArticleError> {
        let mut media = Vec::with_capacity(rows.len());
        for row in rows {
            let url = self.object_store.resolve_download_url(&row.storage_key).await?;
            media.push(MediaView {
                file_name: row.file_name,
                url,
                status: row.status,
            });
        }

        Ok(ArticleView {
            id: article.id,
            title: article.title,
            content: article.content,
            author: author.username.clone(),
            media,
            created_at: article.created_at,
            updated_at: article.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Validated.to_string(), "validated");
        assert_eq!(Stage::ResponseBuilt.to_string(), "response_built");
    }

    #[test]
    fn test_failure_reports_last_stage() {
        let mut progress = Progress::new("create");
        progress.reach(Stage::ArticlePersisted, None);
        assert_eq!(progress.stage, Some(Stage::ArticlePersisted));
        let err = progress.fail(ArticleError::Unauthorized);
        assert!(matches!(err, ArticleError::Unauthorized));
    }
}
