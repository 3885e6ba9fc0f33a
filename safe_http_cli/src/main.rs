mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use safe_http::Method;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "safe-http")]
#[command(about = "Send an HTTP request and report failures as normalized errors")]
struct Cli {
    /// Output format: text or json
    #[arg(long, default_value = "text", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get(commands::request::RequestArgs),
    /// Send a POST request
    Post(commands::request::RequestArgs),
    /// Send a PUT request
    Put(commands::request::RequestArgs),
    /// Send a PATCH request
    Patch(commands::request::RequestArgs),
    /// Send a DELETE request
    Delete(commands::request::RequestArgs),
    /// Send a HEAD request
    Head(commands::request::RequestArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("safe_http=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Text,
    };

    let (method, args) = match &cli.command {
        Commands::Get(args) => (Method::GET, args),
        Commands::Post(args) => (Method::POST, args),
        Commands::Put(args) => (Method::PUT, args),
        Commands::Patch(args) => (Method::PATCH, args),
        Commands::Delete(args) => (Method::DELETE, args),
        Commands::Head(args) => (Method::HEAD, args),
    };
    commands::request::run(method, args, &format, &mut std::io::stdout()).await?;

    Ok(())
}
