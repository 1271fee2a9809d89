mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

// End-to-end catalog lifecycle against a live database. Run with:
//   DATABASE_URL=postgres://... cargo test -- --ignored

/// Log in, registering the account on first use. The bootstrap admin email
/// comes back with the admin role.
async fn session(client: &reqwest::Client, base_url: &str, email: &str) -> Result<String> {
    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&json!({ "email": email, "password": common::TEST_PASSWORD }))
        .send()
        .await?;

    let body: Value = if res.status() == StatusCode::OK {
        res.json().await?
    } else {
        let res = client
            .post(format!("{}/auth/register", base_url))
            .json(&json!({
                "email": email,
                "password": common::TEST_PASSWORD,
                "name": "Flow Tester",
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED, "register failed");
        res.json().await?
    };

    body["data"]["access_token"]
        .as_str()
        .map(str::to_string)
        .context("no access_token in auth response")
}

fn nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn catalog_crud_and_storefront_visibility() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let base = &server.base_url;
    let admin = session(&client, base, common::ADMIN_EMAIL).await?;
    let tag = nonce();

    // Category
    let res = client
        .post(format!("{}/api/admin/categories", base))
        .bearer_auth(&admin)
        .json(&json!({ "name": format!("Stone Fruit {}", tag) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let category = res.json::<Value>().await?["data"].clone();
    let category_id = category["id"].as_str().context("category id")?.to_string();
    let category_slug = category["slug"].as_str().context("category slug")?.to_string();

    // Product, active with opening stock
    let res = client
        .post(format!("{}/api/admin/products", base))
        .bearer_auth(&admin)
        .json(&json!({
            "name": format!("Santa Rosa Plum {}", tag),
            "sku": format!("PLM-{}", tag),
            "price": "3.25",
            "status": "active",
            "category_id": category_id,
            "initial_quantity": 12,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let product = res.json::<Value>().await?["data"].clone();
    let product_id = product["id"].as_str().context("product id")?.to_string();
    let slug = product["slug"].as_str().context("product slug")?.to_string();
    assert_eq!(product["inventory"]["quantity"], 12);

    // Storefront search finds it, with stock and price on the card
    let res = client
        .get(format!("{}/api/products?q={}", base, tag))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let listing = res.json::<Value>().await?;
    let items = listing["data"].as_array().context("listing data")?;
    assert_eq!(items.len(), 1, "listing: {}", listing);
    assert_eq!(items[0]["id"].as_str(), Some(product_id.as_str()));
    assert_eq!(items[0]["price"], "3.25");
    assert_eq!(items[0]["quantity"], 12);
    assert_eq!(listing["meta"]["pagination"]["total"], 1);

    // Category filter
    let res = client
        .get(format!("{}/api/products?category={}", base, category_slug))
        .send()
        .await?;
    let by_category = res.json::<Value>().await?;
    assert!(
        by_category["data"]
            .as_array()
            .context("category data")?
            .iter()
            .any(|p| p["id"].as_str() == Some(product_id.as_str())),
        "product missing from category listing"
    );

    // Detail works by slug as well as by id
    let res = client
        .get(format!("{}/api/products/{}", base, slug))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let detail = res.json::<Value>().await?["data"].clone();
    assert_eq!(detail["id"].as_str(), Some(product_id.as_str()));
    assert_eq!(detail["inventory"]["quantity"], 12);

    // Price update
    let res = client
        .put(format!("{}/api/admin/products/{}", base, product_id))
        .bearer_auth(&admin)
        .json(&json!({ "price": "3.95" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["data"]["price"], "3.95");

    // Draft products stay off the storefront
    let res = client
        .post(format!("{}/api/admin/products", base))
        .bearer_auth(&admin)
        .json(&json!({
            "name": format!("Unreleased Pear {}", tag),
            "sku": format!("PEA-{}", tag),
            "price": "2.00",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let draft_slug = res.json::<Value>().await?["data"]["slug"]
        .as_str()
        .context("draft slug")?
        .to_string();

    let res = client
        .get(format!("{}/api/products/{}", base, draft_slug))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Duplicate SKU is a tagged conflict
    let res = client
        .post(format!("{}/api/admin/products", base))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Imposter Plum",
            "sku": format!("PLM-{}", tag),
            "price": "1.00",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(res.json::<Value>().await?["code"], "SKU_TAKEN");

    // Soft delete hides it from the storefront; restore brings it back
    let res = client
        .delete(format!("{}/api/admin/products/{}", base, product_id))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/api/products/{}", base, product_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/api/admin/products/{}/restore", base, product_id))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/products/{}", base, product_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn image_upload_sniffs_bytes_and_tracks_primary() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let base = &server.base_url;
    let admin = session(&client, base, common::ADMIN_EMAIL).await?;
    let tag = nonce();

    let res = client
        .post(format!("{}/api/admin/products", base))
        .bearer_auth(&admin)
        .json(&json!({
            "name": format!("Gala Apple {}", tag),
            "sku": format!("APL-{}", tag),
            "price": "1.80",
            "status": "active",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let product_id = res.json::<Value>().await?["data"]["id"]
        .as_str()
        .context("product id")?
        .to_string();

    // A PNG signature is what makes this an image; the declared content type
    // is ignored
    let png: Vec<u8> = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
        .iter()
        .copied()
        .chain([0u8; 32])
        .collect();
    let form = reqwest::multipart::Form::new()
        .part(
            "file",
            reqwest::multipart::Part::bytes(png.clone())
                .file_name("apple.png")
                .mime_str("application/octet-stream")?,
        )
        .text("alt_text", "A red apple");

    let res = client
        .post(format!("{}/api/admin/products/{}/images", base, product_id))
        .bearer_auth(&admin)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let image = res.json::<Value>().await?["data"].clone();
    assert_eq!(image["content_type"], "image/png");
    assert_eq!(image["is_primary"], true);
    assert_eq!(image["position"], 0);
    assert_eq!(image["alt_text"], "A red apple");

    // Bytes that are not an image are refused by sniffing
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"<!DOCTYPE html><p>hi</p>".to_vec())
            .file_name("sneaky.png")
            .mime_str("image/png")?,
    );
    let res = client
        .post(format!("{}/api/admin/products/{}/images", base, product_id))
        .bearer_auth(&admin)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    // Image list is public
    let res = client
        .get(format!("{}/api/products/{}/images", base, product_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let images = res.json::<Value>().await?;
    assert_eq!(images["data"].as_array().context("images")?.len(), 1);

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn category_tree_refuses_cycles() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let base = &server.base_url;
    let admin = session(&client, base, common::ADMIN_EMAIL).await?;
    let tag = nonce();

    let res = client
        .post(format!("{}/api/admin/categories", base))
        .bearer_auth(&admin)
        .json(&json!({ "name": format!("Trees {}", tag) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let root_id = res.json::<Value>().await?["data"]["id"]
        .as_str()
        .context("root id")?
        .to_string();

    let res = client
        .post(format!("{}/api/admin/categories", base))
        .bearer_auth(&admin)
        .json(&json!({
            "name": format!("Dwarf Trees {}", tag),
            "parent_id": root_id,
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let child_id = res.json::<Value>().await?["data"]["id"]
        .as_str()
        .context("child id")?
        .to_string();

    // Moving the root under its own child closes a loop
    let res = client
        .put(format!("{}/api/admin/categories/{}", base, root_id))
        .bearer_auth(&admin)
        .json(&json!({ "parent_id": child_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json::<Value>().await?["code"], "CATEGORY_CYCLE");

    // A parent with live children cannot be deleted
    let res = client
        .delete(format!("{}/api/admin/categories/{}", base, root_id))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(res.json::<Value>().await?["code"], "CATEGORY_IN_USE");

    // Bottom-up removal works
    let res = client
        .delete(format!("{}/api/admin/categories/{}", base, child_id))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(format!("{}/api/admin/categories/{}", base, root_id))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    Ok(())
}
