// Draft tracker entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, keep the terminal for status lines)
// 2. Load config
// 3. Load the player catalog (disk cache, else fetch and cache)
// 4. Build the identity index
// 5. Load the ranking list
// 6. Fetch draft metadata and build the resolution context
// 7. Spawn the refresh driver
// 8. Log published snapshots until Ctrl+C

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use draft_tracker::app::{RefreshDriver, SnapshotReceiver};
use draft_tracker::catalog::{CatalogCache, PlayerCatalog};
use draft_tracker::config;
use draft_tracker::draft::ownership::ResolutionContext;
use draft_tracker::identity::IdentityIndex;
use draft_tracker::rankings;
use draft_tracker::sleeper::{LiveDraftSource, SleeperClient, DEFAULT_BASE_URL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file)
    init_tracing()?;
    info!("Draft tracker starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, season={}, refresh every {:?}",
        config.league.league_id, config.league.season, config.refresh_interval
    );

    let client = SleeperClient::with_base_url(
        config.sleeper_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
        config.sleeper_timeout,
    );

    // 3. Player catalog: disk cache first, live fetch on miss
    let cache_dir = config
        .cache_dir
        .clone()
        .or_else(CatalogCache::default_dir)
        .context("no usable cache directory")?;
    let cache = CatalogCache::new(&cache_dir);

    let catalog = match cache.load_if_fresh(config.cache_max_age_hours) {
        Some(catalog) => catalog,
        None => {
            info!("Fetching player catalog from Sleeper...");
            let payloads = client
                .get_players()
                .await
                .context("failed to fetch player catalog")?;
            let catalog = PlayerCatalog::from_payloads(&payloads);
            if let Err(e) = cache.save(&catalog) {
                warn!("Failed to cache player catalog: {e}");
            }
            catalog
        }
    };
    info!("Player catalog ready: {} players", catalog.len());

    // 4. Identity index
    let index = Arc::new(IdentityIndex::build(&catalog));

    // 5. Ranking list
    let ranking_entries = rankings::load_from_path(&config.rankings_path)
        .context("failed to load ranking list")?;
    info!("Loaded {} ranking entries", ranking_entries.len());

    // 6. Draft metadata and resolution context
    let draft_id = match &config.league.draft_id {
        Some(id) => id.clone(),
        None => {
            let league = client
                .get_league(&config.league.league_id)
                .await
                .context("failed to fetch league")?
                .context("league not found")?;
            league
                .draft_id
                .context("league has no draft to track")?
        }
    };
    let draft = client
        .get_draft(&draft_id)
        .await
        .context("failed to fetch draft metadata")?
        .context("draft not found")?;
    let traded = client
        .get_traded_picks(&draft_id)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to fetch traded picks at startup: {e}");
            Vec::new()
        });
    let ctx = ResolutionContext::from_draft(&draft, &traded)
        .context("draft is not trackable")?;
    info!(
        "Tracking draft {} ({} teams, {:?})",
        draft_id, ctx.team_count, ctx.draft_type
    );

    // Display names for the status output; resolution itself only needs ids.
    let display_names: HashMap<String, String> = client
        .get_league_users(&config.league.league_id)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to fetch league users: {e}");
            Vec::new()
        })
        .into_iter()
        .filter_map(|u| u.display_name.map(|name| (u.user_id, name)))
        .collect();

    // 7. Refresh driver
    let source = LiveDraftSource::new(client, draft_id, config.league.league_id.clone());
    let (driver, snapshot_rx) = RefreshDriver::new(source, ctx, index, ranking_entries);
    let driver = Arc::new(driver);
    let refresh_handle = tokio::spawn(Arc::clone(&driver).run(config.refresh_interval));

    // 8. Log snapshots until Ctrl+C
    let log_handle = tokio::spawn(log_snapshots(snapshot_rx, display_names));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Shutting down");

    refresh_handle.abort();
    log_handle.abort();
    Ok(())
}

/// Log a one-line summary every time the driver publishes a new snapshot.
async fn log_snapshots(mut rx: SnapshotReceiver, display_names: HashMap<String, String>) {
    loop {
        if rx.changed().await.is_err() {
            return;
        }
        let snapshot = match rx.borrow_and_update().clone() {
            Some(s) => s,
            None => continue,
        };
        let leader = snapshot
            .leaderboard
            .first()
            .map(|row| {
                let who = row
                    .user_id
                    .as_ref()
                    .map(|id| display_names.get(id).cloned().unwrap_or_else(|| id.clone()))
                    .unwrap_or_else(|| format!("roster {}", row.roster_id));
                format!("{who} ({:.1})", row.total_value)
            })
            .unwrap_or_else(|| "n/a".to_string());
        info!(
            "Snapshot #{}: {} picks, {} owners, {} available, leader: {}",
            snapshot.sequence,
            snapshot.picks.len(),
            snapshot.owners.len(),
            snapshot.available.len(),
            leader
        );
    }
}

/// Initialize tracing to log to a file (the terminal stays free for the
/// status output).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("drafttrack.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draft_tracker=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))?;

    Ok(())
}
