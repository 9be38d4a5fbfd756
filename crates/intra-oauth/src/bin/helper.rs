use clap::Parser;
use intra_oauth::{DEFAULT_API_URL, OAuthConfig, StdinPrompt, TokenStore, start_auth_flow};

/// OAuth 2.0 helper tool for 42 intra API authentication
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// OAuth client ID
    #[arg(long, required = true)]
    client_id: String,

    /// OAuth client secret
    #[arg(long, required = true)]
    client_secret: String,

    /// Optional comma separated scopes
    #[arg(long, value_delimiter = ',')]
    scopes: Vec<String>,

    /// Path to save the OAuth token file
    #[arg(long, required = true)]
    token_path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let api_url = std::env::var("INTRA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let config = OAuthConfig::new(args.client_id, args.client_secret)
        .with_api_url(&api_url)
        .with_scopes(args.scopes);

    let http = reqwest::Client::new();
    let token = start_auth_flow(&http, &config, &mut StdinPrompt).await?;

    TokenStore::new(&args.token_path).save(&token)?;

    eprintln!("\nOAuth token saved to: {}", args.token_path);
    eprintln!("You can now use this token with correction-slot");

    Ok(())
}
