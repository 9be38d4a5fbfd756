mod config;

use chrono::Utc;
use clap::Parser;
use config::{Args, Config};
use intra_client::{IntraClient, list_correction_projects, list_slots, select_slot};
use intra_oauth::{StdinPrompt, TokenStore, ensure_token};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_args(Args::parse(), std::env::var("INTRA_API_URL").ok());

    let http = reqwest::Client::new();
    let store = TokenStore::new(&config.token_path);
    let token = ensure_token(&http, &config.oauth(), &store, &mut StdinPrompt).await?;
    let client = IntraClient::new(http, &config.api_url, token.access_token);

    let projects = list_correction_projects(&client).await?;
    println!("Projects awaiting correction: {:?}", projects);

    let Some(&project_id) = projects.first() else {
        warn!("No project awaiting correction");
        return Ok(());
    };

    let now = Utc::now();
    let slots = list_slots(&client, project_id, now).await?;
    info!(project_id, count = slots.len(), "Fetched slots");

    println!("Slots for project {}:", project_id);
    for slot in &slots {
        println!("  {}", slot);
    }

    match select_slot(&slots, now, config.window) {
        Some(slot) => println!("Selected {}", slot),
        None => {
            println!("No slot found");
            warn!(project_id, "No slot found");
        }
    }

    Ok(())
}
