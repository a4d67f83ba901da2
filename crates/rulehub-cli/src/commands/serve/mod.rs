mod api;
mod shutdown;

use clap::Args;
use rulehub_core::{AppConfig, AuthConfig, HttpConfig};
use tokio::net::TcpListener;
use tracing::{debug, info};

use super::args::{DatabaseArgs, StorageArgs};
pub use api::build_application;
use shutdown::shutdown_signal;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0:1324", env = "RULEHUB_ADDRESS")]
    pub address: String,

    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Secret for signing access tokens
    #[arg(long, env = "PASSWORD_JWT_ACCESS_SECRET", hide_env_values = true)]
    pub jwt_access_secret: String,

    /// Secret for signing refresh tokens
    #[arg(long, env = "PASSWORD_JWT_REFRESH_SECRET", hide_env_values = true)]
    pub jwt_refresh_secret: String,

    /// Comma separated CORS origins; any origin when empty
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Production mode: refresh cookies are marked Secure
    #[arg(long, env = "RUNTIME_PRODUCTION", default_value_t = false)]
    pub production: bool,
}

impl ServeCommand {
    fn to_config(&self) -> AppConfig {
        let mut auth = AuthConfig::new(
            self.jwt_access_secret.clone(),
            self.jwt_refresh_secret.clone(),
        );
        auth.secure_cookies = self.production;

        AppConfig {
            http: HttpConfig {
                address: self.address.clone(),
                allowed_origins: self
                    .allowed_origins
                    .iter()
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect(),
            },
            database: self.database.to_config(),
            storage: self.storage.to_config(),
            auth,
        }
    }

    pub fn execute(self) -> anyhow::Result<()> {
        let config = self.to_config();
        config.validate()?;

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(serve(config))
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    debug!("Initializing database connection...");
    let db = rulehub_database::establish_connection(&config.database).await?;

    let app = build_application(db, &config).await?;

    let listener = TcpListener::bind(&config.http.address).await?;
    info!("Rulehub API listening on {}", config.http.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Rulehub API server exited");
    Ok(())
}
