// Refresh driver: the periodic cycle that turns raw draft data into
// published snapshots.
//
// Each cycle fetches the latest picks, traded picks, and rosters, re-runs
// ownership resolution and roster aggregation, and publishes an immutable
// snapshot. Cycles are serialized by an in-flight latch (fast polling over a
// slow network must not interleave recomputations) and stamped with a
// monotonic sequence number so a late-arriving result can never overwrite a
// newer one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::draft::ownership::{resolve_picks, ResolutionContext, TradedPick};
use crate::draft::roster::{aggregate, RosterSnapshot};
use crate::identity::IdentityIndex;
use crate::pool::{
    apply_values, claimed_ids, drafted_names, filter_available, leaderboard, PlayerValues,
};
use crate::rankings::RankingEntry;
use crate::sleeper::DraftSource;
use crate::snapshot::TrackerSnapshot;

/// Receiver side of the published snapshot stream.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<TrackerSnapshot>>>;

/// What a single refresh attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cycle completed and its snapshot is now current.
    Published(u64),
    /// Another cycle was already in flight; this trigger was dropped.
    RejectedOverlap,
    /// The cycle completed but a newer cycle had already published.
    StaleDiscarded(u64),
    /// The pick fetch failed; the previous snapshot stays visible.
    FetchFailed,
}

pub struct RefreshDriver<S: DraftSource> {
    source: S,
    base_ctx: ResolutionContext,
    index: Arc<IdentityIndex>,
    rankings: Vec<RankingEntry>,
    /// Ranking values are a pure function of the rankings and the index,
    /// both fixed for the driver's lifetime.
    values: PlayerValues,
    in_flight: AtomicBool,
    next_sequence: AtomicU64,
    snapshot_tx: watch::Sender<Option<Arc<TrackerSnapshot>>>,
}

impl<S: DraftSource> RefreshDriver<S> {
    pub fn new(
        source: S,
        base_ctx: ResolutionContext,
        index: Arc<IdentityIndex>,
        rankings: Vec<RankingEntry>,
    ) -> (Self, SnapshotReceiver) {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let values = PlayerValues::build(&rankings, &index);
        let driver = RefreshDriver {
            source,
            base_ctx,
            index,
            rankings,
            values,
            in_flight: AtomicBool::new(false),
            next_sequence: AtomicU64::new(0),
            snapshot_tx,
        };
        (driver, snapshot_rx)
    }

    /// Run one refresh cycle, unless one is already in flight.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("refresh already in flight; rejecting overlapping trigger");
            return RefreshOutcome::RejectedOverlap;
        }

        let sequence = self.next_sequence.fetch_add(1, Ordering::AcqRel) + 1;
        let outcome = self.run_cycle(sequence).await;
        self.in_flight.store(false, Ordering::Release);
        outcome
    }

    async fn run_cycle(&self, sequence: u64) -> RefreshOutcome {
        // Picks are the cycle's reason to exist: without them there is
        // nothing to recompute, so keep the last snapshot visible.
        let pick_payloads = match self.source.fetch_picks().await {
            Ok(picks) => picks,
            Err(e) => {
                warn!(sequence, "pick fetch failed, keeping stale snapshot: {e}");
                return RefreshOutcome::FetchFailed;
            }
        };

        // Traded picks and rosters degrade to empty sets: resolution
        // proceeds with reduced accuracy rather than failing the cycle.
        let traded = match self.source.fetch_traded_picks().await {
            Ok(traded) => traded,
            Err(e) => {
                warn!(sequence, "traded-pick fetch failed, assuming none: {e}");
                Vec::new()
            }
        };
        let roster_payloads = match self.source.fetch_rosters().await {
            Ok(rosters) => rosters,
            Err(e) => {
                warn!(sequence, "roster fetch failed, assuming empty league: {e}");
                Vec::new()
            }
        };

        let mut ctx = self.base_ctx.clone();
        ctx.traded_picks = traded.iter().map(TradedPick::from).collect();

        let picks = resolve_picks(&pick_payloads, &ctx);
        let rosters: Vec<RosterSnapshot> = roster_payloads
            .iter()
            .map(RosterSnapshot::from_payload)
            .collect();

        let mut owners = aggregate(&picks, &rosters, &self.index);
        apply_values(&mut owners, &self.values);
        let standings = leaderboard(&owners);

        let claimed = claimed_ids(&picks, &rosters);
        let drafted = drafted_names(&picks);
        let available = filter_available(&self.rankings, &claimed, &self.index, &drafted);

        let snapshot = TrackerSnapshot {
            sequence,
            generated_at: Utc::now(),
            picks,
            owners,
            leaderboard: standings,
            available,
        };

        if self.publish(snapshot) {
            debug!(sequence, "refresh cycle published");
            RefreshOutcome::Published(sequence)
        } else {
            info!(sequence, "refresh result superseded by a newer cycle; discarded");
            RefreshOutcome::StaleDiscarded(sequence)
        }
    }

    /// Publish a snapshot unless a later-sequenced one is already current.
    /// Last-writer-wins by sequence number, not by arrival time.
    fn publish(&self, snapshot: TrackerSnapshot) -> bool {
        let candidate = Arc::new(snapshot);
        let mut published = false;
        self.snapshot_tx.send_if_modified(|current| {
            let newer = current
                .as_ref()
                .map_or(true, |existing| existing.sequence < candidate.sequence);
            if newer {
                *current = Some(Arc::clone(&candidate));
                published = true;
            }
            newer
        });
        published
    }

    /// Drive refresh cycles on a fixed interval until the task is aborted.
    /// A tick that lands while a cycle is still running is rejected by the
    /// in-flight latch and simply waits for the next one.
    pub async fn run(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.refresh().await {
                RefreshOutcome::Published(sequence) => {
                    debug!(sequence, "scheduled refresh complete");
                }
                RefreshOutcome::RejectedOverlap => {}
                RefreshOutcome::StaleDiscarded(sequence) => {
                    debug!(sequence, "scheduled refresh discarded as stale");
                }
                RefreshOutcome::FetchFailed => {}
            }
        }
    }
}
