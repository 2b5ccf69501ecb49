use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "health-cli")]
#[command(about = "Query the admin backend's health surface", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    /// Exit non-zero when the database is reported disconnected
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show database connectivity, uptime and timestamp
    Health,
    /// Show the server banner
    Info,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let path = match cli.command {
        Commands::Health => "/health",
        Commands::Info => "/",
    };

    let res = client.get(format!("{}{}", base, path)).send().await?;
    let json = print_response(res).await?;

    if cli.strict {
        if let Some(db) = json.as_ref().and_then(|v| v.get("database")).and_then(Value::as_str) {
            if db != "Connected" {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(Some(json))
}
