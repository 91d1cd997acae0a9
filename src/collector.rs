use crate::bot::telegram::Alerter;
use crate::feeds::{FeedCatalog, FeedKind, MirrorStore};
use anyhow::Context;
use chrono::{Days, NaiveDate};
use livescore_api::client::ScoresApi;
use livescore_api::{MergePolicy, Schedule, SnapshotKey, SnapshotStore, merge};
use log::{error, info, warn};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub key: String,
    pub stages: usize,
    pub events: usize,
    pub feeds_saved: usize,
    pub feeds_failed: usize,
}

/// One collection run: mirror the auxiliary feeds, then fetch yesterday and
/// today, merge them and store the result under today's key.
pub struct Collector {
    api: ScoresApi,
    store: Arc<dyn SnapshotStore>,
    mirror: MirrorStore,
    catalog: FeedCatalog,
    policy: MergePolicy,
    season: String,
    alerter: Option<Alerter>,
}

impl Collector {
    pub fn new(
        api: ScoresApi,
        store: Arc<dyn SnapshotStore>,
        mirror: MirrorStore,
        catalog: FeedCatalog,
        policy: MergePolicy,
        season: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            mirror,
            catalog,
            policy,
            season: season.into(),
            alerter: None,
        }
    }

    pub fn with_alerter(mut self, alerter: Option<Alerter>) -> Self {
        self.alerter = alerter;
        self
    }

    /// Full run for `today`. Feed mirroring and the two fetches degrade on
    /// failure; only a failed snapshot write fails the run, and it is
    /// reported to the alert channel first.
    pub async fn run(&self, today: NaiveDate) -> anyhow::Result<RunSummary> {
        info!("starting collection for {today}");
        let (feeds_saved, feeds_failed) = self.mirror_feeds().await;

        match self.collect_schedule(today).await {
            Ok(mut summary) => {
                summary.feeds_saved = feeds_saved;
                summary.feeds_failed = feeds_failed;
                info!(
                    "collection for {} done: {} stages, {} events, {} feeds mirrored ({} failed)",
                    summary.key, summary.stages, summary.events, feeds_saved, feeds_failed
                );
                Ok(summary)
            }
            Err(e) => {
                error!("collection for {today} failed: {e:#}");
                if let Some(alerter) = &self.alerter {
                    alerter.alert(&format!("collection for {today} failed:\n{e:#}")).await;
                }
                Err(e)
            }
        }
    }

    async fn collect_schedule(&self, today: NaiveDate) -> anyhow::Result<RunSummary> {
        let yesterday = today
            .checked_sub_days(Days::new(1))
            .with_context(|| format!("no calendar day before {today}"))?;

        let (previous, current) = tokio::join!(self.fetch_or_empty(yesterday), self.fetch_or_empty(today));
        let merged = merge(previous, current, self.policy);

        let key = SnapshotKey::from_date(today);
        self.store
            .save(&key, &merged)
            .with_context(|| format!("could not store snapshot {key}"))?;

        Ok(RunSummary {
            key: key.to_string(),
            stages: merged.stages.len(),
            events: merged.event_count(),
            ..RunSummary::default()
        })
    }

    async fn fetch_or_empty(&self, date: NaiveDate) -> Schedule {
        match self.api.fetch_schedule(date).await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("schedule for {date} unavailable, using an empty day: {e}");
                Schedule::default()
            }
        }
    }

    /// Best-effort mirror of every catalog entry. Returns (saved, failed).
    async fn mirror_feeds(&self) -> (usize, usize) {
        let mut saved = 0;
        let mut failed = 0;
        let mut tally = |name: &str, result: anyhow::Result<()>| match result {
            Ok(()) => saved += 1,
            Err(e) => {
                failed += 1;
                warn!("could not mirror feed {name}: {e:#}");
            }
        };

        for (league, &league_id) in &self.catalog.standings {
            let result = self.mirror_standings(league, league_id).await;
            tally(league, result);
        }
        for (team, url) in &self.catalog.team_fixtures {
            let result = self.mirror_document(FeedKind::SeasonFixtures, team, url).await;
            tally(team, result);
        }
        for (league, url) in &self.catalog.league_fixtures {
            let result = self.mirror_document(FeedKind::LeagueFixtures, league, url).await;
            tally(league, result);
        }
        (saved, failed)
    }

    async fn mirror_standings(&self, league: &str, league_id: u32) -> anyhow::Result<()> {
        let rows = self.api.fetch_standings(league_id, &self.season).await?;
        self.mirror.save(FeedKind::Standings, league, &rows)
    }

    async fn mirror_document(&self, kind: FeedKind, name: &str, url: &str) -> anyhow::Result<()> {
        let document = self.api.fetch_json(url).await?;
        self.mirror.save(kind, name, &document)
    }
}
