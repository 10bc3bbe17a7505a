//! Periodic subject seeding while the server runs.
//!
//! Wraps `tokio-cron-scheduler::JobScheduler` with a single repeated job that
//! calls [`SubjectSeeder::run`](tutorly_core::taxonomy::seeder::SubjectSeeder::run).
//! A run that is still in progress when the next tick fires makes that tick
//! a no-op.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::state::ConcreteSeeder;

/// Running seeding scheduler. Call [`stop`](Self::stop) on shutdown.
pub struct SeedingScheduler {
    inner: JobScheduler,
}

impl SeedingScheduler {
    /// Start a scheduler running `seeder` every `interval_minutes`.
    pub async fn start(seeder: Arc<ConcreteSeeder>, interval_minutes: u32) -> anyhow::Result<Self> {
        let interval = Duration::from_secs(u64::from(interval_minutes.max(1)) * 60);
        let scheduler = JobScheduler::new()
            .await
            .context("failed to create seeding scheduler")?;

        let running = Arc::new(Mutex::new(()));
        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let seeder = Arc::clone(&seeder);
            let running = Arc::clone(&running);
            Box::pin(async move {
                run_once(&seeder, &running).await;
            })
        })
        .context("failed to create seeding job")?;

        scheduler
            .add(job)
            .await
            .context("failed to register seeding job")?;
        scheduler
            .start()
            .await
            .context("failed to start seeding scheduler")?;

        tracing::info!(interval_minutes, "seeding scheduler started");
        Ok(Self { inner: scheduler })
    }

    pub async fn stop(mut self) {
        match self.inner.shutdown().await {
            Ok(()) => tracing::info!("seeding scheduler stopped"),
            Err(e) => tracing::warn!(error = %e, "seeding scheduler shutdown failed"),
        }
    }
}

/// One scheduled tick. Skipped while a previous run holds `running`.
async fn run_once(seeder: &ConcreteSeeder, running: &Mutex<()>) {
    let Ok(_running) = running.try_lock() else {
        tracing::debug!("previous seeding run still in progress, skipping tick");
        return;
    };
    match seeder.run().await {
        Ok(outcomes) => {
            let failed = outcomes.iter().filter(|o| !o.success).count();
            tracing::info!(seeded = outcomes.len() - failed, failed, "seeding run finished");
        }
        Err(e) => tracing::warn!(error = %e, "seeding run failed"),
    }
}
