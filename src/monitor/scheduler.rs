use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{error, info};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::log_tick;

use super::service::StatsService;

/// Owns the periodic tick and aggregation tasks.
pub struct MonitorScheduler {
    tick_handle: Option<JoinHandle<()>>,
    aggregation_handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Default for MonitorScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorScheduler {
    pub fn new() -> Self {
        Self {
            tick_handle: None,
            aggregation_handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel_token.is_some()
    }

    pub fn start(
        &mut self,
        service: StatsService,
        tick_interval: Duration,
        aggregation_interval: Duration,
    ) -> Result<()> {
        if self.is_running() {
            bail!("monitor already running");
        }
        // Each tick credits its interval to the day, so it must be whole seconds.
        if tick_interval.as_secs() == 0 || tick_interval.subsec_nanos() != 0 {
            bail!(
                "tick interval must be a whole number of seconds, got {}ms",
                tick_interval.as_millis()
            );
        }

        let cancel_token = CancellationToken::new();
        self.tick_handle = Some(tokio::spawn(tick_loop(
            service.clone(),
            tick_interval,
            cancel_token.clone(),
        )));
        self.aggregation_handle = Some(tokio::spawn(aggregation_loop(
            service,
            aggregation_interval,
            cancel_token.clone(),
        )));
        self.cancel_token = Some(cancel_token);

        info!(
            "Monitor started (tick every {}s, aggregation every {}s)",
            tick_interval.as_secs(),
            aggregation_interval.as_secs()
        );
        Ok(())
    }

    /// Cancel both tasks and wait for them to finish.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        for handle in [self.tick_handle.take(), self.aggregation_handle.take()]
            .into_iter()
            .flatten()
        {
            handle.await.context("monitor task failed to join")?;
        }

        info!("Monitor stopped");
        Ok(())
    }
}

async fn tick_loop(service: StatsService, every: Duration, cancel_token: CancellationToken) {
    let secs = every.as_secs();
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; no time has elapsed yet.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match service.tick(secs).await {
                    Ok(stats) => log_tick!(
                        "day {} walking={}s resting={}s",
                        stats.date,
                        stats.walking_secs,
                        stats.resting_secs
                    ),
                    Err(err) => error!("tick failed: {err:?}"),
                }
            }
            _ = cancel_token.cancelled() => {
                info!("tick loop shutting down");
                break;
            }
        }
    }
}

async fn aggregation_loop(
    service: StatsService,
    every: Duration,
    cancel_token: CancellationToken,
) {
    loop {
        let wait = until_next_aggregation(&service, every);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                if let Err(err) = service.refresh_current_rollups().await {
                    error!("rollup refresh failed: {err:?}");
                }
            }
            _ = cancel_token.cancelled() => {
                info!("aggregation loop shutting down");
                break;
            }
        }
    }
}

/// The earlier of `every` and the next local midnight.
fn until_next_aggregation(service: &StatsService, every: Duration) -> Duration {
    let now = service.now();
    let midnight = service.config().zone.next_midnight(now);
    let to_midnight = (midnight - now).to_std().unwrap_or(Duration::ZERO);
    every.min(to_midnight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{LocalZone, ManualClock};
    use crate::db::Database;
    use crate::monitor::service::{ServiceConfig, StatsUpdate};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn service_at(clock: &ManualClock) -> StatsService {
        let config = ServiceConfig {
            zone: LocalZone::utc(),
            ..ServiceConfig::default()
        };
        StatsService::new(
            Database::open_in_memory().unwrap(),
            Arc::new(clock.clone()),
            config,
        )
    }

    #[tokio::test]
    async fn each_tick_credits_its_interval_until_stopped() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 5, 10, 0, 0).unwrap());
        let service = service_at(&clock);
        let mut updates = service.subscribe();
        let mut scheduler = MonitorScheduler::new();

        scheduler
            .start(
                service.clone(),
                Duration::from_secs(2),
                Duration::from_secs(3600),
            )
            .unwrap();
        assert!(scheduler
            .start(
                service.clone(),
                Duration::from_secs(2),
                Duration::from_secs(1)
            )
            .is_err());

        match updates.recv().await.unwrap() {
            StatsUpdate::Daily { stats } => assert_eq!(stats.resting_secs, 2),
            other => panic!("unexpected update {other:?}"),
        }
        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());

        let today = service.today();
        let after_stop = service.get_daily_stats(today).await.unwrap().resting_secs;
        assert!(after_stop >= 2);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            service.get_daily_stats(today).await.unwrap().resting_secs,
            after_stop
        );
    }

    #[tokio::test]
    async fn sub_second_tick_interval_is_rejected() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 5, 10, 0, 0).unwrap());
        let service = service_at(&clock);
        let mut scheduler = MonitorScheduler::new();

        for interval in [Duration::from_millis(250), Duration::from_millis(1500)] {
            assert!(scheduler
                .start(service.clone(), interval, Duration::from_secs(3600))
                .is_err());
            assert!(!scheduler.is_running());
        }
    }

    #[test]
    fn aggregation_wakes_at_midnight_when_sooner() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 5, 23, 30, 0).unwrap());
        let service = service_at(&clock);

        assert_eq!(
            until_next_aggregation(&service, Duration::from_secs(3600)),
            Duration::from_secs(30 * 60)
        );
        clock.set(Utc.with_ymd_and_hms(2024, 2, 5, 12, 0, 0).unwrap());
        assert_eq!(
            until_next_aggregation(&service, Duration::from_secs(3600)),
            Duration::from_secs(3600)
        );
    }
}
