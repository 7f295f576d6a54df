use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hrgate::services::{NavigationService, UserService};
use hrgate::{AccessGuard, AppConfig, Decision, PermissionService};

#[derive(Parser)]
#[command(name = "hrgate", about = "Inspect effective menu permissions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the navigation tree a user can see, as JSON
    Tree {
        #[arg(long)]
        user: String,
    },
    /// Evaluate a single authorization check
    Check {
        #[arg(long)]
        user: String,
        /// Menu code, e.g. `USER_MASTER`
        #[arg(long)]
        menu: String,
        #[arg(long)]
        action: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hrgate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting hrgate in {} environment", config.environment);
    let db = config.connect().await.context("database connection failed")?;

    let user_service = UserService::new(db.clone());

    match cli.command {
        Command::Tree { user } => {
            let found = user_service.find_by_username(&user).await?;
            let navigation = NavigationService::new(db.clone());
            let tree = navigation.menu_tree(found.id).await?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Command::Check { user, menu, action } => {
            let user_id = match user_service.find_by_username(&user).await {
                Ok(found) => Some(found.id),
                Err(hrgate::AccessError::NotFound { .. }) => None,
                Err(err) => return Err(err.into()),
            };
            let guard = AccessGuard::new(PermissionService::new(db.clone()));
            match guard.authorize_by_code(user_id, &menu, &action).await? {
                Decision::Allow => println!("allow"),
                Decision::Deny(reason) => {
                    println!("deny: {reason}");
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}
