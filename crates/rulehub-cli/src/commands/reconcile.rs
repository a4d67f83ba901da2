//! `reconcile-media`: promote objects uploaded after their article was saved

use clap::Args;
use rulehub_articles::ArticleService;
use rulehub_storage::{ObjectStore, S3ObjectStore};
use std::sync::Arc;
use tracing::info;

use super::args::{DatabaseArgs, StorageArgs};

#[derive(Args)]
pub struct ReconcileMediaCommand {
    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Maximum number of pending media rows to process
    #[arg(long, default_value_t = 500)]
    pub limit: u64,
}

impl ReconcileMediaCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let storage_config = self.storage.to_config();
        storage_config.validate()?;

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let db = rulehub_database::establish_connection(&self.database.to_config()).await?;
            let object_store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(&storage_config)?);
            let service = ArticleService::new(db, object_store);

            let report = service.reconcile_pending_media(self.limit).await?;
            info!(
                "Reconciled media: {} scanned, {} promoted, {} still missing, {} failed",
                report.scanned, report.promoted, report.missing, report.failed
            );

            if report.failed > 0 {
                anyhow::bail!("{} media rows could not be promoted", report.failed);
            }
            Ok::<(), anyhow::Error>(())
        })
    }
}
