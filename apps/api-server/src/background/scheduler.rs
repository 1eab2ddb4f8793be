//! Cron-style job scheduler using tokio-cron-scheduler.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::sessions::FeedSessions;

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    pub async fn new() -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner })
    }

    /// Add a cron job. `schedule` has six fields, seconds first.
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

/// Periodically unmount feed sessions nobody has touched within their TTL.
pub async fn start_session_sweeper(
    sessions: Arc<FeedSessions>,
    schedule: &str,
) -> Result<Scheduler, JobSchedulerError> {
    let scheduler = Scheduler::new().await?;

    scheduler
        .add_cron(schedule, move || {
            let sessions = sessions.clone();
            async move {
                sessions.sweep_idle().await;
            }
        })
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}
