use crate::cli::client::ApiClient;
use crate::cli::{utils, OutputFormat};

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::from_current()?;
    let outcome = client.get("/health").await?;

    if !outcome.is_success() {
        utils::exit_api_error(&output_format, &outcome);
    }

    match output_format {
        OutputFormat::Json => utils::output_json(&outcome.body),
        OutputFormat::Text => {
            let data = outcome.data();
            println!("Status:   {}", utils::field_str(data, "status"));
            println!("Database: {}", utils::field_str(data, "database"));
            Ok(())
        }
    }
}
