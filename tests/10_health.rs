mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    // OK with a database behind it, SERVICE_UNAVAILABLE without one; both
    // prove the server is up
    let status = res.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        status
    );

    let body = res.json::<serde_json::Value>().await?;
    if status == StatusCode::OK {
        assert_eq!(body["data"]["status"], "ok", "body: {}", body);
        assert_eq!(body["data"]["database"], "connected", "body: {}", body);
    } else {
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE", "body: {}", body);
        assert_eq!(body["statusCode"], 503, "body: {}", body);
        assert!(body["error"].is_string(), "body: {}", body);
    }

    Ok(())
}

#[tokio::test]
async fn root_reports_service_identity() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["name"], "Orchard API", "body: {}", body);
    assert!(body["data"]["version"].is_string(), "body: {}", body);
    assert!(body["data"]["endpoints"].is_object(), "body: {}", body);

    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/nope", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
