use clap::{Parser, Subcommand};
use serde_json::Value;

use ralali_proxy::http::SearchRequest;

#[derive(Parser)]
#[command(name = "search-cli")]
#[command(about = "Command-line client for the Ralali search proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search sellers by keyword
    Sellers { keyword: String },
    /// Search products by keyword
    Products { keyword: String },
    /// Check the proxy is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Sellers { keyword } => {
            client
                .post(format!("{}/search/v3/sellers", cli.url))
                .json(&SearchRequest::new(keyword))
                .send()
                .await?
        }
        Commands::Products { keyword } => {
            client
                .post(format!("{}/search/v3/items", cli.url))
                .json(&SearchRequest::new(keyword))
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    if !status.is_success() {
        eprintln!("Proxy returned status {}", status);
    }
    Ok(())
}
