//! Media rows scoped by owning article
//!
//! Every function takes any [`ConnectionTrait`] so callers decide the
//! transaction scope. [`MediaRecordStore::replace_media_set`] must run inside
//! the caller's transaction to be atomic with the article write.

use rulehub_entities::{articles, media, types::MediaStatus};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::debug;
use uuid::Uuid;

use super::types::MediaSpec;

pub struct MediaRecordStore;

impl MediaRecordStore {
    /// Soft-delete the article's live media rows and insert `specs` as the new
    /// set, numbered by position. Rows are inserted `pending`.
    pub async fn replace_media_set<C>(
        db: &C,
        article_id: Uuid,
        specs: &[MediaSpec],
    ) -> Result<Vec<media::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();
        let removed = media::Entity::update_many()
            .col_expr(media::Column::DeletedAt, Expr::value(now))
            .col_expr(media::Column::UpdatedAt, Expr::value(now))
            .filter(media::Column::ArticleId.eq(article_id))
            .filter(media::Column::DeletedAt.is_null())
            .exec(db)
            .await?;

        let mut inserted = Vec::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            let row = media::ActiveModel {
                article_id: Set(article_id),
                file_name: Set(spec.file_name.clone()),
                storage_key: Set(spec.storage_key.clone()),
                position: Set(position as i32),
                status: Set(MediaStatus::Pending),
                ..Default::default()
            }
            .insert(db)
            .await?;
            inserted.push(row);
        }

        debug!(
            "Replaced media set of article {}: {} removed, {} inserted",
            article_id,
            removed.rows_affected,
            inserted.len()
        );
        Ok(inserted)
    }

    /// Live media rows of an article in display order
    pub async fn list_media<C>(db: &C, article_id: Uuid) -> Result<Vec<media::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        media::Entity::find()
            .filter(media::Column::ArticleId.eq(article_id))
            .filter(media::Column::DeletedAt.is_null())
            .order_by_asc(media::Column::Position)
            .order_by_asc(media::Column::CreatedAt)
            .all(db)
            .await
    }

    pub async fn mark_permanent<C>(db: &C, media_id: Uuid) -> Result<media::Model, DbErr>
    where
        C: ConnectionTrait,
    {
        media::ActiveModel {
            id: Set(media_id),
            status: Set(MediaStatus::Permanent),
            ..Default::default()
        }
        .update(db)
        .await
    }

    /// Oldest pending rows belonging to live articles
    pub async fn list_pending<C>(db: &C, limit: u64) -> Result<Vec<media::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        media::Entity::find()
            .inner_join(articles::Entity)
            .filter(media::Column::Status.eq(MediaStatus::Pending))
            .filter(media::Column::DeletedAt.is_null())
            .filter(articles::Column::DeletedAt.is_null())
            .order_by_asc(media::Column::CreatedAt)
            .limit(limit)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulehub_database::test_utils::TestDatabase;
    use rulehub_entities::users;
    use sea_orm::TransactionTrait;

    async fn seed_article(db: &TestDatabase) -> anyhow::Result<Uuid> {
        let user = users::ActiveModel {
            username: Set("writer".to_string()),
            password_hash: Set("hash".to_string()),
            ..Default::default()
        }
        .insert(db.connection())
        .await?;
        let article = articles::ActiveModel {
            title: Set("Title".to_string()),
            content: Set("Body".to_string()),
            author_id: Set(user.id),
            ..Default::default()
        }
        .insert(db.connection())
        .await?;
        Ok(article.id)
    }

    fn specs(names: &[&str]) -> Vec<MediaSpec> {
        names
            .iter()
            .map(|n| MediaSpec::from_reference(n).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_replace_keeps_order_and_hides_old_rows() -> anyhow::Result<()> {
        let db = TestDatabase::new().await?;
        let article_id = seed_article(&db).await?;

        MediaRecordStore::replace_media_set(
            db.connection(),
            article_id,
            &specs(&["file1.jpg", "file2.png"]),
        )
        .await?;
        let replaced =
            MediaRecordStore::replace_media_set(db.connection(), article_id, &specs(&["file3.gif"]))
                .await?;
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].position, 0);

        let live = MediaRecordStore::list_media(db.connection(), article_id).await?;
        let names: Vec<_> = live.iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(names, vec!["file3.gif"]);

        // Old rows are soft-deleted, not removed
        let all = media::Entity::find()
            .filter(media::Column::ArticleId.eq(article_id))
            .all(db.connection())
            .await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all.iter().filter(|m| m.deleted_at.is_some()).count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_rolled_back_replacement_leaves_previous_set() -> anyhow::Result<()> {
        let db = TestDatabase::new().await?;
        let article_id = seed_article(&db).await?;
        MediaRecordStore::replace_media_set(db.connection(), article_id, &specs(&["a.png"]))
            .await?;

        let txn = db.connection().begin().await?;
        MediaRecordStore::replace_media_set(&txn, article_id, &specs(&["b.png", "c.png"]))
            .await?;
        txn.rollback().await?;

        let live = MediaRecordStore::list_media(db.connection(), article_id).await?;
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].file_name, "a.png");
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_rows_until_marked() -> anyhow::Result<()> {
        let db = TestDatabase::new().await?;
        let article_id = seed_article(&db).await?;
        let rows = MediaRecordStore::replace_media_set(
            db.connection(),
            article_id,
            &specs(&["a.png", "b.png"]),
        )
        .await?;
        assert!(rows.iter().all(|m| m.status == MediaStatus::Pending));

        MediaRecordStore::mark_permanent(db.connection(), rows[0].id).await?;

        let pending = MediaRecordStore::list_pending(db.connection(), 10).await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].storage_key, "b.png");
        assert!(MediaRecordStore::list_pending(db.connection(), 0)
            .await?
            .is_empty());
        Ok(())
    }
}
