mod common;

use axum::extract::State;
use otaku_valley_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let state = common::empty_state().await?;
    let response = health_check(State(state)).await?;
    assert_eq!(response.0.status, "ok");
    assert_eq!(response.0.database, "ok");
    Ok(())
}
