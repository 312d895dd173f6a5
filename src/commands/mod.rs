use crate::{Config, cache::CacheManager, service::HubspotService};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Print a HubSpot authorization URL for a user and organization
    ///
    /// The state is written to the configured store, so with a shared Redis
    /// backend the running server can complete the callback.
    AuthorizeUrl {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        org_id: String,
    },
}

pub async fn handle_command(
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::AuthorizeUrl { user_id, org_id } => {
            let url = authorize_url(config, &user_id, &org_id).await?;
            println!("{url}");
            Ok(())
        }
    }
}

async fn authorize_url(
    config: &Config,
    user_id: &str,
    org_id: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let cache = CacheManager::new_from_config(&config.cache).await?;
    let service = HubspotService::new(config.hubspot.clone(), &cache)?;
    let response = service.authorize(user_id, org_id, None).await?;
    Ok(response.url)
}
