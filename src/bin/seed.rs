use otaku_valley_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    seed::seed_sample_data,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 1).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let state = AppState::new(pool, config.admin.clone());
    let report = seed_sample_data(&state).await?;

    println!(
        "Seed completed: {} items, {} orders inserted",
        report.items, report.orders
    );
    Ok(())
}
