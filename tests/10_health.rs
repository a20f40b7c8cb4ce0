mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = reqwest::get(server.url("/api/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let body = reqwest::get(server.url("/"))
        .await?
        .json::<serde_json::Value>()
        .await?;

    assert_eq!(body["message"], "CipherStudio Backend API");
    assert_eq!(body["endpoints"]["projects"], "/api/projects");
    Ok(())
}
