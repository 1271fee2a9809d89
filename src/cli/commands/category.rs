use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::{utils, OutputFormat};

#[derive(Subcommand)]
pub enum CategoryCommands {
    #[command(about = "List categories")]
    List,
}

pub async fn handle(cmd: CategoryCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CategoryCommands::List => {
            let client = ApiClient::from_current()?;
            let outcome = client.get("/api/categories").await?;

            if !outcome.is_success() {
                utils::exit_api_error(&output_format, &outcome);
            }

            match output_format {
                OutputFormat::Json => utils::output_json(&outcome.body),
                OutputFormat::Text => {
                    let items = outcome.data().as_array().cloned().unwrap_or_default();
                    if items.is_empty() {
                        println!("No categories found");
                        return Ok(());
                    }

                    let rows: Vec<Vec<String>> = items
                        .iter()
                        .map(|item| {
                            let count = item
                                .get("product_count")
                                .and_then(|v| v.as_i64())
                                .map(|c| c.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            vec![
                                utils::field_str(item, "id"),
                                utils::field_str(item, "slug"),
                                utils::field_str(item, "name"),
                                count,
                            ]
                        })
                        .collect();

                    utils::print_table(&["ID", "SLUG", "NAME", "PRODUCTS"], &rows);
                    Ok(())
                }
            }
        }
    }
}
