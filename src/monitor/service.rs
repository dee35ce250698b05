use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::{
    clock::{Clock, LocalZone},
    correlator::{CodeOutcome, CorrelationState, StrayStopPolicy},
    db::{
        models::month_start, DailyStats, Database, PeriodRollup, PeriodType, SessionStatus,
        WalkingSession, WeekStart,
    },
    log_tick,
    models::{ActivityMode, CompletedEvent, PostureCode},
    settings::MonitorSettings,
    stats::{summarize_events, PeriodChart, PostureExposure},
};

const UPDATE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceConfig {
    pub week_start: WeekStart,
    pub zone: LocalZone,
    pub stray_stop_policy: StrayStopPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from(&MonitorSettings::default())
    }
}

impl From<&MonitorSettings> for ServiceConfig {
    fn from(settings: &MonitorSettings) -> Self {
        Self {
            week_start: settings.week_start,
            zone: settings.zone(),
            stray_stop_policy: settings.stray_stop_policy,
        }
    }
}

/// Published after every successful write.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatsUpdate {
    Daily { stats: DailyStats },
    Rollup { rollup: PeriodRollup },
    EventCompleted { id: i64, event: CompletedEvent },
}

/// Collaborator-facing entry point: activity and posture signals in, stats out.
#[derive(Clone)]
pub struct StatsService {
    db: Database,
    state: Arc<Mutex<CorrelationState>>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
    updates: broadcast::Sender<StatsUpdate>,
}

impl StatsService {
    pub fn new(db: Database, clock: Arc<dyn Clock>, config: ServiceConfig) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            db,
            state: Arc::new(Mutex::new(CorrelationState::new())),
            clock,
            config,
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatsUpdate> {
        self.updates.subscribe()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.config.zone.date_of(self.clock.now())
    }

    pub async fn current_mode(&self) -> ActivityMode {
        self.state.lock().await.mode
    }

    /// Count one elapsed second in `mode` against today.
    pub async fn record_tick(&self, mode: ActivityMode) -> Result<DailyStats> {
        self.record_elapsed(mode, 1).await
    }

    /// Count `secs` elapsed seconds in `mode` against today.
    pub async fn record_elapsed(&self, mode: ActivityMode, secs: u64) -> Result<DailyStats> {
        let date = self.today();
        let stats = self
            .db
            .record_activity(date, mode, secs, self.config.week_start)
            .await
            .with_context(|| format!("failed to record {} tick for {date}", mode.as_str()))?;

        log_tick!("tick {} +{secs}s on {date}", mode.as_str());
        self.publish(StatsUpdate::Daily {
            stats: stats.clone(),
        });
        Ok(stats)
    }

    /// One scheduler tick of `secs` seconds in whatever mode is current.
    pub async fn tick(&self, secs: u64) -> Result<DailyStats> {
        let mode = self.current_mode().await;
        self.record_elapsed(mode, secs).await
    }

    /// Feed one raw code. Unrecognised codes return `None` and change nothing.
    pub async fn ingest_posture_code(
        &self,
        raw: &str,
        mode: ActivityMode,
    ) -> Result<Option<CodeOutcome>> {
        let Some(code) = PostureCode::parse(raw) else {
            debug!("Ignoring unrecognised posture code {raw:?}");
            return Ok(None);
        };

        let now = self.clock.now();
        let outcome = self
            .state
            .lock()
            .await
            .apply(code, mode, now, self.config.stray_stop_policy);

        match &outcome {
            CodeOutcome::Opened(direction) => {
                debug!("{} event opened while {}", direction.as_str(), mode.as_str())
            }
            CodeOutcome::AlreadyOpen(direction) => {
                debug!("Duplicate start for {} ignored", direction.as_str())
            }
            CodeOutcome::StrayStop(direction) => {
                warn!("Stop for {} with no open event dropped", direction.as_str())
            }
            CodeOutcome::Closed(event) => {
                if event.synthesized {
                    warn!(
                        "Stop for {} with no open event; recording zero-length event",
                        event.direction.as_str()
                    );
                }
                self.record_completed(event).await?;
            }
        }

        Ok(Some(outcome))
    }

    /// Transport callback. Uses the current activity mode and never fails.
    pub async fn on_data_received(&self, raw: &str) {
        let mode = self.current_mode().await;
        if let Err(err) = self.ingest_posture_code(raw, mode).await {
            error!("Failed to ingest posture code {raw:?}: {err:?}");
        }
    }

    /// Activity sensor callback. Storage failures are logged, not returned.
    pub async fn on_walking_detected(&self, is_walking: bool) {
        if let Err(err) = self.set_activity_mode(ActivityMode::from_walking(is_walking)).await {
            error!("Failed to apply activity change: {err:?}");
        }
    }

    pub async fn on_step_counted(&self, count: u64) {
        self.state.lock().await.step_count = count;
    }

    /// Switch activity mode. Starting to walk opens a walking session; stopping
    /// closes every open event and then the session.
    pub async fn set_activity_mode(&self, mode: ActivityMode) -> Result<()> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        if state.mode == mode {
            return Ok(());
        }

        match mode {
            ActivityMode::Walking => {
                let session = WalkingSession {
                    id: Uuid::new_v4().to_string(),
                    started_at: now,
                    ended_at: None,
                    duration_secs: None,
                    status: SessionStatus::Active,
                };
                // Persist before any event can reference it.
                self.db.insert_walking_session(&session).await?;
                info!("Walking session {} started", session.id);
                state.mode = mode;
                state.walking_session_id = Some(session.id);
                Ok(())
            }
            ActivityMode::Resting => {
                state.mode = mode;
                let swept = state.force_close_all(now);
                let session_id = state.walking_session_id.take();
                drop(state);

                self.record_swept(swept).await;
                if let Some(session_id) = session_id {
                    let session = self.db.complete_walking_session(&session_id, now).await?;
                    info!(
                        "Walking session {} ended after {}s",
                        session.id,
                        session.duration_secs.unwrap_or_default()
                    );
                }
                Ok(())
            }
        }
    }

    /// Close every open event at the current time and record it.
    pub async fn force_close_open_events(&self) -> usize {
        let now = self.clock.now();
        let swept = self.state.lock().await.force_close_all(now);
        self.record_swept(swept).await
    }

    /// Teardown: sweep open events and end the walking session, if any.
    pub async fn shutdown(&self) -> Result<()> {
        let closed = self.force_close_open_events().await;
        let session_id = self.state.lock().await.walking_session_id.take();
        if let Some(session_id) = session_id {
            self.db
                .complete_walking_session(&session_id, self.clock.now())
                .await?;
        }
        info!("Stats service stopped ({closed} open events closed)");
        Ok(())
    }

    pub async fn get_daily_stats(&self, date: NaiveDate) -> Result<DailyStats> {
        self.db.get_daily_stats(date).await
    }

    /// Any date within the week is accepted; the rollup is keyed by the
    /// configured first day of that week.
    pub async fn get_weekly_rollup(&self, week: NaiveDate) -> Result<PeriodRollup> {
        let week_start = PeriodType::Week.start_containing(week, self.config.week_start);
        self.db.get_rollup(PeriodType::Week, week_start).await
    }

    /// Any date within the month is accepted; the rollup is keyed by day 1.
    pub async fn get_monthly_rollup(&self, month: NaiveDate) -> Result<PeriodRollup> {
        self.db.get_rollup(PeriodType::Month, month_start(month)).await
    }

    pub async fn get_weekly_chart(&self, week: NaiveDate) -> Result<PeriodChart> {
        let week_start = PeriodType::Week.start_containing(week, self.config.week_start);
        self.db.get_chart(PeriodType::Week, week_start).await
    }

    pub async fn get_monthly_chart(&self, month: NaiveDate) -> Result<PeriodChart> {
        self.db.get_chart(PeriodType::Month, month_start(month)).await
    }

    pub async fn get_posture_exposure(&self, date: NaiveDate) -> Result<PostureExposure> {
        let events = self.db.get_events_for_day(date).await?;
        Ok(summarize_events(date, &events))
    }

    /// Recompute the week and month containing today and publish both.
    pub async fn refresh_current_rollups(&self) -> Result<(PeriodRollup, PeriodRollup)> {
        let today = self.today();
        let week_start = PeriodType::Week.start_containing(today, self.config.week_start);
        let week = self.db.recompute_rollup(PeriodType::Week, week_start).await?;
        let month = self
            .db
            .recompute_rollup(PeriodType::Month, month_start(today))
            .await?;

        info!(
            "Rollups refreshed: week of {} at {:.1}%, month of {} at {:.1}%",
            week.period_start,
            week.bad_posture_percentage(),
            month.period_start,
            month.bad_posture_percentage()
        );
        self.publish(StatsUpdate::Rollup {
            rollup: week.clone(),
        });
        self.publish(StatsUpdate::Rollup {
            rollup: month.clone(),
        });
        Ok((week, month))
    }

    /// One-line summary for notification text.
    pub async fn status_text(&self) -> String {
        let state = self.state.lock().await;
        let open = state
            .open_directions()
            .iter()
            .map(|direction| direction.as_str())
            .collect::<Vec<_>>();
        let open = if open.is_empty() {
            "-".to_string()
        } else {
            open.join(",")
        };
        format!(
            "Status: {} | Steps: {} | Open: {open}",
            state.mode.as_str(),
            state.step_count
        )
    }

    async fn record_completed(&self, event: &CompletedEvent) -> Result<i64> {
        let day = self.config.zone.date_of(event.started_at);
        let (id, stats) = self
            .db
            .record_completed_event(event, day, self.config.week_start)
            .await
            .with_context(|| {
                format!("failed to record {} posture event", event.direction.as_str())
            })?;

        info!(
            "{} event closed after {}s while {} (day {day})",
            event.direction.as_str(),
            event.duration_secs,
            event.mode.as_str()
        );
        self.publish(StatsUpdate::EventCompleted {
            id,
            event: event.clone(),
        });
        self.publish(StatsUpdate::Daily { stats });
        Ok(id)
    }

    async fn record_swept(&self, events: Vec<CompletedEvent>) -> usize {
        let mut recorded = 0;
        for event in &events {
            match self.record_completed(event).await {
                Ok(_) => recorded += 1,
                Err(err) => error!("Failed to record swept event: {err:?}"),
            }
        }
        if !events.is_empty() {
            info!("Force-closed {} open posture events", events.len());
        }
        recorded
    }

    fn publish(&self, update: StatsUpdate) {
        // No subscribers is fine.
        let _ = self.updates.send(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Direction;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 12, 8, 0, 0).unwrap()
    }

    fn service_with(policy: StrayStopPolicy) -> (StatsService, ManualClock) {
        let clock = ManualClock::new(start());
        let config = ServiceConfig {
            week_start: WeekStart::Monday,
            zone: LocalZone::utc(),
            stray_stop_policy: policy,
        };
        let db = Database::open_in_memory().unwrap();
        (StatsService::new(db, Arc::new(clock.clone()), config), clock)
    }

    fn service() -> (StatsService, ManualClock) {
        service_with(StrayStopPolicy::Synthesize)
    }

    fn today() -> NaiveDate {
        start().date_naive()
    }

    #[tokio::test]
    async fn walking_ticks_then_left_event() {
        let (service, clock) = service();
        for _ in 0..600 {
            service.record_tick(ActivityMode::Walking).await.unwrap();
            clock.advance_secs(1);
        }

        clock.set(start() + Duration::seconds(601));
        service
            .ingest_posture_code("L", ActivityMode::Walking)
            .await
            .unwrap();
        clock.set(start() + Duration::seconds(615));
        service
            .ingest_posture_code("SL", ActivityMode::Walking)
            .await
            .unwrap();

        let stats = service.get_daily_stats(today()).await.unwrap();
        assert_eq!(stats.walking_secs, 600);
        assert_eq!(stats.left_events, 1);
        assert_eq!(stats.walking_bad_posture_secs, 14);
        assert_eq!(stats.resting_bad_posture_secs, 0);
    }

    #[tokio::test]
    async fn overlapping_events_are_attributed_separately() {
        let (service, clock) = service();
        let mode = ActivityMode::Resting;

        service.ingest_posture_code("L", mode).await.unwrap();
        clock.set(start() + Duration::seconds(2));
        service.ingest_posture_code("F", mode).await.unwrap();
        clock.set(start() + Duration::seconds(10));
        service.ingest_posture_code("SL", mode).await.unwrap();
        clock.set(start() + Duration::seconds(12));
        service.ingest_posture_code("SF", mode).await.unwrap();

        let events = service.db.get_events_for_day(today()).await.unwrap();
        let durations: Vec<u64> = events.iter().map(|e| e.duration_secs).collect();
        assert_eq!(durations, vec![10, 10]);

        let stats = service.get_daily_stats(today()).await.unwrap();
        assert_eq!(stats.left_events, 1);
        assert_eq!(stats.front_events, 1);
        assert_eq!(stats.resting_bad_posture_secs, 20);

        let exposure = service.get_posture_exposure(today()).await.unwrap();
        assert_eq!(exposure.merged_bad_posture_secs, 12);
        assert_eq!(exposure.summed_event_secs, 20);
    }

    #[tokio::test]
    async fn duplicate_start_is_a_no_op() {
        let (service, clock) = service();
        service
            .ingest_posture_code("R", ActivityMode::Walking)
            .await
            .unwrap();
        clock.advance_secs(3);
        let outcome = service
            .ingest_posture_code("R", ActivityMode::Walking)
            .await
            .unwrap();
        assert_eq!(outcome, Some(CodeOutcome::AlreadyOpen(Direction::Right)));

        clock.advance_secs(4);
        service
            .ingest_posture_code("SR", ActivityMode::Walking)
            .await
            .unwrap();

        let stats = service.get_daily_stats(today()).await.unwrap();
        assert_eq!(stats.right_events, 1);
        assert_eq!(stats.walking_bad_posture_secs, 7);
    }

    #[tokio::test]
    async fn unknown_codes_change_nothing() {
        let (service, _clock) = service();
        for raw in ["", "X", "SX", "LL", "hello"] {
            let outcome = service
                .ingest_posture_code(raw, ActivityMode::Walking)
                .await
                .unwrap();
            assert_eq!(outcome, None);
        }
        assert_eq!(
            service.get_daily_stats(today()).await.unwrap(),
            DailyStats::zeroed(today())
        );
        assert_eq!(service.status_text().await, "Status: Resting | Steps: 0 | Open: -");
    }

    #[tokio::test]
    async fn stray_stop_follows_policy() {
        let (synthesize, _) = service_with(StrayStopPolicy::Synthesize);
        synthesize
            .ingest_posture_code("SF", ActivityMode::Walking)
            .await
            .unwrap();
        let stats = synthesize.get_daily_stats(today()).await.unwrap();
        assert_eq!(stats.front_events, 1);
        assert_eq!(stats.walking_bad_posture_secs, 0);
        let events = synthesize.db.get_events_for_day(today()).await.unwrap();
        assert!(events[0].synthesized);

        let (ignore, _) = service_with(StrayStopPolicy::Ignore);
        let outcome = ignore
            .ingest_posture_code("SF", ActivityMode::Walking)
            .await
            .unwrap();
        assert_eq!(outcome, Some(CodeOutcome::StrayStop(Direction::Front)));
        assert_eq!(
            ignore.get_daily_stats(today()).await.unwrap(),
            DailyStats::zeroed(today())
        );
    }

    #[tokio::test]
    async fn mode_at_open_time_wins() {
        let (service, clock) = service();
        service.on_data_received("L").await;
        service.on_walking_detected(true).await;
        clock.advance_secs(9);
        service.on_data_received("SL").await;

        let stats = service.get_daily_stats(today()).await.unwrap();
        assert_eq!(stats.resting_bad_posture_secs, 9);
        assert_eq!(stats.walking_bad_posture_secs, 0);
    }

    #[tokio::test]
    async fn walking_end_sweeps_open_events_into_session() {
        let (service, clock) = service();
        service.on_walking_detected(true).await;
        service.on_step_counted(42).await;
        service.on_data_received("L").await;
        clock.advance_secs(1);
        service.on_data_received("F").await;
        assert_eq!(
            service.status_text().await,
            "Status: Walking | Steps: 42 | Open: L,F"
        );

        clock.advance_secs(5);
        service.on_walking_detected(false).await;

        let stats = service.get_daily_stats(today()).await.unwrap();
        assert_eq!(stats.left_events, 1);
        assert_eq!(stats.front_events, 1);
        assert_eq!(stats.walking_bad_posture_secs, 6 + 5);

        let events = service.db.get_events_for_day(today()).await.unwrap();
        let session_id = events[0].session_id.clone().unwrap();
        let session = service
            .db
            .get_walking_session(&session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.duration_secs, Some(6));
        assert_eq!(
            service.db.get_events_for_session(&session_id).await.unwrap().len(),
            2
        );
        assert_eq!(service.current_mode().await, ActivityMode::Resting);
    }

    #[tokio::test]
    async fn resting_to_walking_keeps_events_open() {
        let (service, clock) = service();
        service.on_data_received("R").await;
        service.on_walking_detected(true).await;
        clock.advance_secs(3);

        assert_eq!(service.status_text().await, "Status: Walking | Steps: 0 | Open: R");
        assert_eq!(service.force_close_open_events().await, 1);
        assert_eq!(service.force_close_open_events().await, 0);
    }

    #[tokio::test]
    async fn shutdown_closes_everything() {
        let (service, clock) = service();
        service.on_walking_detected(true).await;
        service.on_data_received("F").await;
        clock.advance_secs(4);
        service.shutdown().await.unwrap();

        let stats = service.get_daily_stats(today()).await.unwrap();
        assert_eq!(stats.front_events, 1);
        assert_eq!(stats.walking_bad_posture_secs, 4);
        assert_eq!(service.status_text().await, "Status: Walking | Steps: 0 | Open: -");
    }

    #[tokio::test]
    async fn listeners_see_daily_and_event_updates() {
        let (service, clock) = service();
        let mut updates = service.subscribe();

        let stats = service.record_tick(ActivityMode::Resting).await.unwrap();
        assert_eq!(updates.recv().await.unwrap(), StatsUpdate::Daily { stats });

        service.on_data_received("L").await;
        clock.advance_secs(2);
        service.on_data_received("SL").await;

        match updates.recv().await.unwrap() {
            StatsUpdate::EventCompleted { event, .. } => {
                assert_eq!(event.direction, Direction::Left);
                assert_eq!(event.duration_secs, 2);
            }
            other => panic!("unexpected update {other:?}"),
        }
        match updates.recv().await.unwrap() {
            StatsUpdate::Daily { stats } => assert_eq!(stats.left_events, 1),
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[tokio::test]
    async fn monthly_reads_normalize_to_first_day() {
        let (service, _clock) = service();
        service.record_tick(ActivityMode::Walking).await.unwrap();

        let month = service
            .get_monthly_rollup(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())
            .await
            .unwrap();
        assert_eq!(month.period_start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(month.walking_secs, 1);

        let week = service
            .get_weekly_rollup(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap())
            .await
            .unwrap();
        assert_eq!(week.walking_secs, 1);

        let chart = service
            .get_weekly_chart(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap())
            .await
            .unwrap();
        assert_eq!(chart.days.len(), 7);
        assert_eq!(chart.days[1].walking_secs, 1);
    }

    #[tokio::test]
    async fn weekly_reads_accept_any_day_of_the_week() {
        let (service, clock) = service();
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        clock.set(Utc.with_ymd_and_hms(2024, 3, 13, 9, 0, 0).unwrap());

        let before = service.get_weekly_rollup(wednesday).await.unwrap();
        assert_eq!(before.period_start, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(before.walking_secs, 0);

        for _ in 0..5 {
            service.record_tick(ActivityMode::Walking).await.unwrap();
        }

        let after = service.get_weekly_rollup(wednesday).await.unwrap();
        assert_eq!(after.period_start, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(after.walking_secs, 5);

        let chart = service.get_weekly_chart(wednesday).await.unwrap();
        assert_eq!(chart.days[0].date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(chart.days[2].walking_secs, 5);
    }

    #[tokio::test]
    async fn event_across_midnight_counts_on_its_start_day() {
        let (service, clock) = service();
        let first_day = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        let second_day = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();

        clock.set(Utc.with_ymd_and_hms(2024, 3, 12, 23, 59, 50).unwrap());
        service.on_data_received("L").await;
        clock.set(Utc.with_ymd_and_hms(2024, 3, 13, 0, 0, 10).unwrap());
        service.on_data_received("SL").await;

        let first = service.get_daily_stats(first_day).await.unwrap();
        assert_eq!(first.left_events, 1);
        assert_eq!(first.resting_bad_posture_secs, 20);
        assert_eq!(first.walking_bad_posture_secs, 0);
        assert_eq!(
            service.get_daily_stats(second_day).await.unwrap(),
            DailyStats::zeroed(second_day)
        );

        let week = service.get_weekly_rollup(first_day).await.unwrap();
        assert_eq!(week.resting_bad_posture_secs, 20);
        assert_eq!(week.left_events, 1);
    }

    #[tokio::test]
    async fn failed_session_insert_keeps_resting_mode() {
        let (service, _clock) = service();
        service
            .db
            .execute(|conn| {
                conn.execute_batch("DROP TABLE walking_sessions")?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(service.set_activity_mode(ActivityMode::Walking).await.is_err());
        assert_eq!(service.current_mode().await, ActivityMode::Resting);
        assert_eq!(service.state.lock().await.walking_session_id, None);

        let stats = service.tick(1).await.unwrap();
        assert_eq!(stats.resting_secs, 1);
        assert_eq!(stats.walking_secs, 0);
    }

    #[tokio::test]
    async fn tick_credits_the_given_seconds_to_the_current_mode() {
        let (service, _clock) = service();
        service.set_activity_mode(ActivityMode::Walking).await.unwrap();

        let stats = service.tick(5).await.unwrap();
        assert_eq!(stats.walking_secs, 5);
        assert_eq!(stats.resting_secs, 0);
    }

    #[tokio::test]
    async fn refresh_publishes_both_rollups() {
        let (service, _clock) = service();
        service.record_tick(ActivityMode::Walking).await.unwrap();
        let mut updates = service.subscribe();

        let (week, month) = service.refresh_current_rollups().await.unwrap();
        assert_eq!(week.period_type, PeriodType::Week);
        assert_eq!(month.period_type, PeriodType::Month);
        assert_eq!(updates.recv().await.unwrap(), StatsUpdate::Rollup { rollup: week });
        assert_eq!(updates.recv().await.unwrap(), StatsUpdate::Rollup { rollup: month });
    }
}
