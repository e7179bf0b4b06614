use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

/// Connect the pool and sync the schema of every entity in `crate::entity`.
///
/// Pool acquisition is bounded by the per-operation timeout, so an exhausted
/// pool surfaces as `TIMEOUT` rather than hanging the request.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(config.op_timeout())
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("contest_hub::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}
