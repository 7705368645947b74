//! SHINJU DATE Worker - YouTube sync
//!
//! Periodically refreshes channel details and scrapes recent uploads into the
//! database the API reads from.

mod config;
mod db;
mod guard;
mod scraper;
pub mod youtube;

pub use config::Config;
pub use scraper::VideoUpsert;
pub use youtube::{VideoSource, YouTubeClient};

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use db::WorkerDb;
use guard::RunGuard;
use shinju_core::models::Channel;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use youtube::YouTubeChannel;

const VIDEOS_UPDATE_KEY: &str = "videos:update";
const CHANNELS_UPDATE_KEY: &str = "channels:update";

/// Result of one scheduled update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Another run happened too recently
    Skipped,
    /// Number of rows written
    Completed(usize),
}

/// The sync jobs over one database and one video source
pub struct Worker<S> {
    db: WorkerDb,
    source: Arc<S>,
    config: Config,
    guard: RunGuard,
}

impl<S: VideoSource> Worker<S> {
    pub fn new(pool: PgPool, source: S, config: Config) -> Self {
        let guard = RunGuard::new(Duration::from_secs(config.min_run_interval_secs));
        Self {
            db: WorkerDb::new(pool),
            source: Arc::new(source),
            config,
            guard,
        }
    }

    async fn fetch_youtube_channels(&self, saved: &[Channel]) -> Result<Vec<YouTubeChannel>> {
        let ids: Vec<String> = saved.iter().map(|channel| channel.slug.clone()).collect();
        self.source
            .channels(&ids)
            .await
            .context("Failed to fetch YouTube channels")
    }

    /// Scrape every channel's recent uploads
    ///
    /// A channel that fails is logged and does not stop the others.
    pub async fn update_videos(&self) -> Result<UpdateOutcome> {
        if !self.guard.try_acquire(VIDEOS_UPDATE_KEY).await {
            warn!("There has been no interval since the last run.");
            return Ok(UpdateOutcome::Skipped);
        }

        let saved_channels = self.db.list_active_channels().await?;
        let youtube_channels = self.fetch_youtube_channels(&saved_channels).await?;
        if youtube_channels.is_empty() {
            bail!("There are no channels.");
        }

        let semaphore = Arc::new(Semaphore::new(self.config.scrape_concurrency.max(1)));
        let mut spacing =
            tokio::time::interval(Duration::from_millis(self.config.scrape_interval_ms.max(1)));
        spacing.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tasks = JoinSet::new();
        for channel in saved_channels {
            let Some(youtube_channel) = youtube_channels
                .iter()
                .find(|item| item.id == channel.slug)
                .cloned()
            else {
                error!(channel = %channel.slug, "Channel does not exist.");
                continue;
            };

            spacing.tick().await;
            let permit = Arc::clone(&semaphore).acquire_owned().await?;
            let db = self.db.clone();
            let source = Arc::clone(&self.source);

            tasks.spawn(async move {
                let _permit = permit;
                let result =
                    scraper::scrape_channel(&db, source.as_ref(), &channel, &youtube_channel).await;
                (channel.slug, result)
            });
        }

        let mut saved = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(videos))) => {
                    for video in &videos {
                        info!(
                            id = %video.slug,
                            title = %video.title,
                            duration = ?video.duration,
                            published_at = %video.published_at,
                            "The video has been saved."
                        );
                    }
                    saved += videos.len();
                }
                Ok((slug, Err(e))) => error!(channel = %slug, "Failed to scrape channel: {:#}", e),
                Err(e) => error!("Scrape task failed to complete: {}", e),
            }
        }

        Ok(UpdateOutcome::Completed(saved))
    }

    /// Refresh channel names and URLs from YouTube
    pub async fn update_channels(&self) -> Result<UpdateOutcome> {
        if !self.guard.try_acquire(CHANNELS_UPDATE_KEY).await {
            warn!("There has been no interval since the last run.");
            return Ok(UpdateOutcome::Skipped);
        }

        let saved_channels = self.db.list_active_channels().await?;
        let youtube_channels = self.fetch_youtube_channels(&saved_channels).await?;

        let mut updated = 0;
        for item in &youtube_channels {
            let Some(channel) = saved_channels.iter().find(|c| c.slug == item.id) else {
                error!(channel = %item.id, "A channel does not exist.");
                continue;
            };

            let url = item.url();
            if item.snippet.title == channel.name && url == channel.url {
                continue;
            }

            match self.db.update_channel(&item.id, &item.snippet.title, &url).await {
                Ok(new_channel) => {
                    let name_change = (channel.name != new_channel.name)
                        .then(|| format!("{} -> {}", channel.name, new_channel.name));
                    let url_change = (channel.url != new_channel.url)
                        .then(|| format!("{} -> {}", channel.url, new_channel.url));

                    info!(
                        channel = %new_channel.slug,
                        name = ?name_change,
                        url = ?url_change,
                        "Channel information has been updated."
                    );
                    updated += 1;
                }
                Err(e) => error!(channel = %item.id, "Failed to update channel: {}", e),
            }
        }

        Ok(UpdateOutcome::Completed(updated))
    }

    /// Run both updates on their intervals until cancelled
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut videos_tick =
            tokio::time::interval(Duration::from_secs(self.config.videos_interval_secs.max(1)));
        let mut channels_tick =
            tokio::time::interval(Duration::from_secs(self.config.channels_interval_secs.max(1)));
        videos_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        channels_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Worker received shutdown signal");
                    break;
                }
                _ = channels_tick.tick() => {
                    match self.update_channels().await {
                        Ok(UpdateOutcome::Completed(count)) => {
                            info!("Channels update finished: {} updated", count)
                        }
                        Ok(UpdateOutcome::Skipped) => {}
                        Err(e) => error!("Channels update failed: {:#}", e),
                    }
                }
                _ = videos_tick.tick() => {
                    match self.update_videos().await {
                        Ok(UpdateOutcome::Completed(count)) => {
                            info!("Videos update finished: {} saved", count)
                        }
                        Ok(UpdateOutcome::Skipped) => {}
                        Err(e) => error!("Videos update failed: {:#}", e),
                    }
                }
            }
        }
    }
}

/// Run the sync worker
///
/// This function runs the update loop until cancelled.
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `source` - Where channels and videos are fetched from
/// * `config` - Worker configuration
/// * `shutdown` - Optional cancellation token for graceful shutdown
pub async fn run_worker<S: VideoSource>(
    pool: PgPool,
    source: S,
    config: Config,
    shutdown: Option<CancellationToken>,
) -> Result<()> {
    info!(
        "Starting worker: videos every {}s, channels every {}s, concurrency={}",
        config.videos_interval_secs, config.channels_interval_secs, config.scrape_concurrency
    );

    let worker = Worker::new(pool, source, config);
    worker.run(shutdown.unwrap_or_default()).await;

    Ok(())
}
