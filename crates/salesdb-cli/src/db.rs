//! `db` command handlers.

use salesdb_core::AppConfig;

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = salesdb_db::PoolConfig::from_app_config(config);
    let pool = salesdb_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

pub(crate) async fn run_db_ping(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    salesdb_db::ping(&pool).await?;
    println!("database ok");
    Ok(())
}

pub(crate) async fn run_db_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    let applied = salesdb_db::run_migrations(&pool).await?;
    println!("applied {applied} migrations");
    Ok(())
}

/// Upsert every location in the locations file.
pub(crate) async fn run_db_seed(config: &AppConfig) -> anyhow::Result<()> {
    let file = salesdb_core::load_locations(&config.locations_path)?;
    let pool = connect(config).await?;
    let count = salesdb_db::seed_locations(&pool, &file.locations).await?;
    tracing::info!(
        count,
        path = %config.locations_path.display(),
        "locations seeded"
    );
    println!("seeded {count} locations");
    Ok(())
}
