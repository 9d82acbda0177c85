use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forgefeed_api::ForgeClient;
use forgefeed_core::feed::FeedRow;
use forgefeed_core::models::FeedItem;
use forgefeed_core::providers::RestGateway;
use forgefeed_core::screens::{HomeScreen, LandingScreen, RepoDetailsScreen, SettingsScreen};
use forgefeed_core::{AuthManager, Config, Gateway, ToggleOutcome};

#[derive(Parser)]
#[command(name = "forgefeed")]
#[command(version, about = "Terminal client for your forge's home feed", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show the home feed
    Feed {
        /// How many pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show repository details
    Repo {
        /// Repository name (owner/repo)
        name: String,
    },
    /// Toggle your star on a repository
    Star {
        /// Repository name (owner/repo)
        name: String,
    },
    /// Print the OAuth sign-in URL
    Login,
    /// List accounts, or switch with --switch
    Accounts {
        /// Account id to make current
        #[arg(long)]
        switch: Option<String>,
    },
    /// Sign out of the current account
    Signout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forgefeed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("failed to load config")?;
    let auth = Arc::new(AuthManager::load().context("failed to load session")?);

    tracing::debug!(base_url = %config.api.base_url, "gateway configured");
    let client = ForgeClient::with_base_url(auth.auth_token(), config.api.base_url.clone());
    let gateway: Arc<dyn Gateway> = Arc::new(RestGateway::new(client, config.feed.page_size));

    match cli.command {
        Commands::Feed { pages } => {
            let screen = HomeScreen::new(gateway);
            screen.refresh().await;
            for _ in 1..pages {
                screen.load_more().await;
            }

            let snap = screen.snapshot();
            if snap.has_error {
                eprintln!("warning: some pages failed to load; showing what arrived");
            }
            if snap.rows.is_empty() {
                println!("Feed is empty.");
            }
            for row in &snap.rows {
                println!("{}", describe(row));
            }
        }
        Commands::Repo { name } => {
            let (owner, name) = split_repo_name(&name)?;
            let screen = RepoDetailsScreen::new(gateway, owner, name);
            screen.load_details().await?;

            let snap = screen.snapshot();
            if snap.has_error {
                bail!("could not load repository details");
            }
            let details = snap.details.context("no details returned")?;
            println!("{}/{}", details.owner, details.name);
            if let Some(description) = &details.description {
                println!("  {}", description);
            }
            if let Some(parent) = &details.parent_name_with_owner {
                println!("  forked from {}", parent);
            }
            let star_marker = if snap.starred { "★" } else { "☆" };
            println!("  {} {} stars, {} forks", star_marker, snap.star_count, details.fork_count);
            if let Some(license) = &details.license {
                println!("  license: {}", license);
            }
            if !details.languages.is_empty() {
                let names: Vec<_> = details.languages.iter().map(|l| l.name.as_str()).collect();
                println!("  languages: {}", names.join(", "));
            }
            if !details.contributors.is_empty() {
                println!("  {} contributors", details.contributors.len());
            }
        }
        Commands::Star { name } => {
            let (owner, name) = split_repo_name(&name)?;
            let screen = RepoDetailsScreen::new(gateway, owner, name);
            screen.load_details().await?;
            if screen.snapshot().details.is_none() {
                bail!("could not load repository details");
            }

            match screen.toggle_star().await {
                ToggleOutcome::Confirmed => {
                    let snap = screen.snapshot();
                    let verb = if snap.starred { "Starred" } else { "Unstarred" };
                    println!("{} ({} stars)", verb, snap.star_count);
                }
                ToggleOutcome::RolledBack => println!("The forge refused; nothing changed."),
                ToggleOutcome::Rejected => println!("A star change is already in flight."),
                ToggleOutcome::Discarded => {}
            }
        }
        Commands::Login => {
            let screen = LandingScreen::new(auth, &config);
            println!("Open this URL to sign in:");
            println!("{}", screen.login_url());
        }
        Commands::Accounts { switch } => {
            if let Some(id) = switch {
                auth.switch_account(&id)?;
            }
            let accounts = auth.accounts();
            if accounts.is_empty() {
                println!("No accounts. Run `forgefeed login` first.");
            }
            for account in accounts {
                let marker = if account.is_current { "*" } else { " " };
                println!("{} {} ({})", marker, account.login, account.id);
            }
        }
        Commands::Signout => {
            let screen = SettingsScreen::new(gateway, auth);
            screen.sign_out().await?;
            println!("Signed out.");
        }
    }

    Ok(())
}

fn split_repo_name(name: &str) -> anyhow::Result<(String, String)> {
    match name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => bail!("expected owner/repo, got '{}'", name),
    }
}

fn describe(row: &FeedRow) -> String {
    let rel = &row.relationship;
    let marker = match (rel.pending, rel.active) {
        (true, _) => "…",
        (false, true) => "★",
        (false, false) => " ",
    };

    let line = match &row.item {
        FeedItem::CreatedRepo { repo } => {
            format!("{} created {}", repo.owner, repo.name_with_owner())
        }
        FeedItem::NewRelease { repo, tag_name, release_name, .. } => {
            let title = release_name.clone().unwrap_or_else(|| tag_name.clone());
            format!("{} released {}", repo.name_with_owner(), title)
        }
        FeedItem::FollowedUser { follower, followee } => {
            format!("{} followed {}", follower.login, followee.login)
        }
        FeedItem::StarredRepo { actor, repo } => {
            format!("{} starred {}", actor.login, repo.name_with_owner())
        }
        FeedItem::RecommendedRepo { repo } => {
            format!("recommended: {}", repo.name_with_owner())
        }
        FeedItem::ForkedRepo { repo, parent_name_with_owner } => match parent_name_with_owner {
            Some(parent) => format!("{} forked from {}", repo.name_with_owner(), parent),
            None => format!("{} was forked", repo.name_with_owner()),
        },
        FeedItem::FollowRecommendation { actor } => {
            format!("you might like {}", actor.login)
        }
    };

    format!("{} {}", marker, line)
}
