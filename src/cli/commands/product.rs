use clap::Subcommand;
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::{utils, OutputFormat};

#[derive(Subcommand)]
pub enum ProductCommands {
    #[command(about = "List products")]
    List {
        #[arg(long, help = "Page number")]
        page: Option<i64>,
        #[arg(long, help = "Items per page")]
        per_page: Option<i64>,
        #[arg(long, help = "Filter by status (admin listing: draft, active, archived)")]
        status: Option<String>,
        #[arg(long, help = "Filter by category id or slug")]
        category: Option<String>,
        #[arg(long, help = "Search name and description")]
        search: Option<String>,
    },

    #[command(about = "Show one product by id or slug")]
    Get {
        #[arg(help = "Product id or slug")]
        id: String,
    },

    #[command(about = "Create a product from a JSON file (admin)")]
    Create {
        #[arg(long, help = "Path to a JSON file with the product body")]
        file: String,
    },

    #[command(about = "Soft-delete a product (admin)")]
    Delete {
        #[arg(help = "Product id")]
        id: String,
    },
}

fn push_param(params: &mut Vec<String>, key: &str, value: Option<String>) {
    if let Some(v) = value {
        let encoded: String = url::form_urlencoded::byte_serialize(v.as_bytes()).collect();
        params.push(format!("{}={}", key, encoded));
    }
}

fn product_rows(items: &[Value]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|item| {
            let price = item
                .get("price")
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "-".to_string());
            let stock = item
                .get("quantity")
                .and_then(|v| v.as_i64())
                .map(|q| q.to_string())
                .unwrap_or_else(|| "-".to_string());
            vec![
                utils::field_str(item, "id"),
                utils::field_str(item, "sku"),
                utils::field_str(item, "name"),
                price,
                utils::field_str(item, "status"),
                stock,
            ]
        })
        .collect()
}

pub async fn handle(cmd: ProductCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ProductCommands::List {
            page,
            per_page,
            status,
            category,
            search,
        } => {
            // The storefront listing only shows active products; a status
            // filter needs the admin endpoint and a login.
            let admin = status.is_some();

            let mut params: Vec<String> = Vec::new();
            push_param(&mut params, "page", page.map(|p| p.to_string()));
            push_param(&mut params, "per_page", per_page.map(|p| p.to_string()));
            push_param(&mut params, "status", status);
            push_param(&mut params, "category", category);
            push_param(&mut params, "q", search);

            let base = if admin {
                "/api/admin/products"
            } else {
                "/api/products"
            };
            let path = if params.is_empty() {
                base.to_string()
            } else {
                format!("{}?{}", base, params.join("&"))
            };

            let client = if admin {
                ApiClient::authenticated()?
            } else {
                ApiClient::from_current()?
            };
            let outcome = client.get(&path).await?;

            if !outcome.is_success() {
                utils::exit_api_error(&output_format, &outcome);
            }

            match output_format {
                OutputFormat::Json => utils::output_json(&outcome.body),
                OutputFormat::Text => {
                    let items = outcome.data().as_array().cloned().unwrap_or_default();
                    if items.is_empty() {
                        println!("No products found");
                        return Ok(());
                    }

                    let rows = product_rows(&items);
                    utils::print_table(
                        &["ID", "SKU", "NAME", "PRICE", "STATUS", "STOCK"],
                        &rows,
                    );

                    if let Some(pagination) =
                        outcome.meta().and_then(|m| m.get("pagination"))
                    {
                        let page = pagination.get("page").and_then(|v| v.as_i64()).unwrap_or(1);
                        let pages = pagination
                            .get("total_pages")
                            .and_then(|v| v.as_i64())
                            .unwrap_or(1);
                        let total = pagination
                            .get("total")
                            .and_then(|v| v.as_i64())
                            .unwrap_or(items.len() as i64);
                        println!();
                        println!("Page {} of {} ({} total)", page, pages, total);
                    }
                    Ok(())
                }
            }
        }
        ProductCommands::Get { id } => {
            let client = ApiClient::from_current()?;
            let outcome = client.get(&format!("/api/products/{}", id)).await?;

            if !outcome.is_success() {
                utils::exit_api_error(&output_format, &outcome);
            }

            match output_format {
                OutputFormat::Json => utils::output_json(&outcome.body),
                OutputFormat::Text => {
                    let product = outcome.data();
                    println!("Name:   {}", utils::field_str(product, "name"));
                    println!("SKU:    {}", utils::field_str(product, "sku"));
                    println!("Slug:   {}", utils::field_str(product, "slug"));
                    println!(
                        "Price:  {}",
                        product
                            .get("price")
                            .map(|v| match v {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .unwrap_or_else(|| "-".to_string())
                    );
                    println!("Status: {}", utils::field_str(product, "status"));
                    if let Some(description) =
                        product.get("description").and_then(|v| v.as_str())
                    {
                        println!();
                        println!("{}", description);
                    }
                    if let Some(images) = product.get("images").and_then(|v| v.as_array()) {
                        if !images.is_empty() {
                            println!();
                            println!("Images:");
                            for image in images {
                                let marker = if image
                                    .get("is_primary")
                                    .and_then(|v| v.as_bool())
                                    .unwrap_or(false)
                                {
                                    "*"
                                } else {
                                    " "
                                };
                                println!("  {} {}", marker, utils::field_str(image, "url"));
                            }
                        }
                    }
                    Ok(())
                }
            }
        }
        ProductCommands::Create { file } => {
            let content = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("Could not read {}: {}", file, e))?;
            let body: Value = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {}", file, e))?;

            let client = ApiClient::authenticated()?;
            let outcome = client.post("/api/admin/products", Some(body)).await?;

            if !outcome.is_success() {
                utils::exit_api_error(&output_format, &outcome);
            }

            match output_format {
                OutputFormat::Json => utils::output_json(&outcome.body),
                OutputFormat::Text => {
                    let product = outcome.data();
                    utils::output_success(
                        &output_format,
                        &format!(
                            "Product '{}' created ({})",
                            utils::field_str(product, "name"),
                            utils::field_str(product, "id")
                        ),
                        None,
                    )
                }
            }
        }
        ProductCommands::Delete { id } => {
            let client = ApiClient::authenticated()?;
            let outcome = client
                .delete(&format!("/api/admin/products/{}", id))
                .await?;

            if !outcome.is_success() {
                utils::exit_api_error(&output_format, &outcome);
            }

            utils::output_success(&output_format, &format!("Product {} deleted", id), None)
        }
    }
}
