mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use orchard_api::database::models::user::UserRole;

// Handlers validate request bodies before opening a database connection, so
// these 400s come back even when DATABASE_URL points nowhere.

async fn expect_validation_error(
    res: reqwest::Response,
    field: &str,
) -> Result<serde_json::Value> {
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR", "body: {}", body);
    assert_eq!(body["statusCode"], 400, "body: {}", body);
    assert!(
        body["fields"][field].is_array(),
        "expected a violation on '{}': {}",
        field,
        body
    );
    Ok(body)
}

#[tokio::test]
async fn register_rejects_bad_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({
            "email": "not-an-email",
            "password": "long-enough-pass",
            "name": "Shopper",
        }))
        .send()
        .await?;
    expect_validation_error(res, "email").await?;

    Ok(())
}

#[tokio::test]
async fn register_rejects_empty_name() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({
            "email": "shopper@example.com",
            "password": "long-enough-pass",
            "name": "",
        }))
        .send()
        .await?;
    expect_validation_error(res, "name").await?;

    Ok(())
}

#[tokio::test]
async fn login_rejects_empty_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({
            "email": "shopper@example.com",
            "password": "",
        }))
        .send()
        .await?;
    expect_validation_error(res, "password").await?;

    Ok(())
}

#[tokio::test]
async fn refresh_rejects_empty_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/refresh", server.base_url))
        .json(&json!({ "refresh_token": "" }))
        .send()
        .await?;
    expect_validation_error(res, "refresh_token").await?;

    Ok(())
}

#[tokio::test]
async fn review_rating_must_be_1_to_5() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::mint_access_token(UserRole::Customer);

    let res = client
        .post(format!(
            "{}/api/products/{}/reviews",
            server.base_url,
            uuid::Uuid::new_v4()
        ))
        .bearer_auth(&token)
        .json(&json!({ "rating": 9 }))
        .send()
        .await?;
    expect_validation_error(res, "rating").await?;

    Ok(())
}

#[tokio::test]
async fn cart_quantity_must_be_positive() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::mint_access_token(UserRole::Customer);

    let res = client
        .post(format!("{}/api/cart/items", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "product_id": uuid::Uuid::new_v4(),
            "quantity": 0,
        }))
        .send()
        .await?;
    expect_validation_error(res, "quantity").await?;

    Ok(())
}

#[tokio::test]
async fn checkout_requires_idempotency_key() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::mint_access_token(UserRole::Customer);

    let res = client
        .post(format!("{}/api/checkout", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "idempotency_key": "" }))
        .send()
        .await?;
    expect_validation_error(res, "idempotency_key").await?;

    Ok(())
}

#[tokio::test]
async fn address_country_must_be_two_letters() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::mint_access_token(UserRole::Customer);

    let res = client
        .post(format!("{}/api/addresses", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "line1": "1 Orchard Way",
            "city": "Appleton",
            "postal_code": "54911",
            "country": "USA",
        }))
        .send()
        .await?;
    expect_validation_error(res, "country").await?;

    Ok(())
}

#[tokio::test]
async fn admin_product_create_rejects_blank_sku() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::mint_access_token(UserRole::Admin);

    let res = client
        .post(format!("{}/api/admin/products", server.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Honeycrisp Apple",
            "sku": "",
            "price": "2.50",
        }))
        .send()
        .await?;
    expect_validation_error(res, "sku").await?;

    Ok(())
}
