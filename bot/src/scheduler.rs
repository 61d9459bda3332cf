use crate::sentry::Sentry;
use anyhow::Result;
use log::error;
use std::future::Future;
use tokio_cron_scheduler::{Job, JobScheduler};

const PASS_SCHEDULE: &str = "every 10 minutes";

pub(crate) struct Scheduler {
    sentry: Sentry,
    scheduler: JobScheduler,
}

impl Scheduler {
    pub(crate) async fn new(sentry: Sentry) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Scheduler { sentry, scheduler })
    }

    async fn schedule_task<F, Fut>(&self, schedule: &str, task: F) -> Result<()>
    where
        F: Fn(Sentry) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let sentry_clone = self.sentry.clone();

        self.scheduler
            .add(Job::new_async(schedule, move |_uuid, _l| {
                let sentry = sentry_clone.clone();
                let fut = task(sentry);
                Box::pin(async move {
                    if let Err(e) = fut.await {
                        error!("Error executing scheduled task: {e:?}");
                    }
                })
            })?)
            .await?;

        Ok(())
    }

    pub(crate) async fn start(self) -> Result<()> {
        self.schedule_task(PASS_SCHEDULE, |sentry| async move {
            sentry.block_and_cancel().await
        })
        .await?;

        Ok(self.scheduler.start().await?)
    }
}
