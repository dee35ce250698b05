use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ActivityMode, CompletedEvent, Direction, PostureCode};

/// What to do with a stop code whose direction has no open event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum StrayStopPolicy {
    /// Record a zero-length event at the stop instant so the signal still counts.
    #[default]
    Synthesize,
    Ignore,
}

/// A deviation that has started and not yet stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenEvent {
    pub started_at: DateTime<Utc>,
    /// Mode in effect when the deviation began; it is never updated afterwards.
    pub mode: ActivityMode,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CodeOutcome {
    Opened(Direction),
    Closed(CompletedEvent),
    /// Start code for a direction that is already open.
    AlreadyOpen(Direction),
    /// Stop code with no open event, dropped under `StrayStopPolicy::Ignore`.
    StrayStop(Direction),
}

/// Process-local correlation state. Rebuilt empty on restart.
#[derive(Debug, Clone, Default)]
pub struct CorrelationState {
    open: [Option<OpenEvent>; 3],
    pub mode: ActivityMode,
    pub walking_session_id: Option<String>,
    pub step_count: u64,
}

impl CorrelationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, direction: Direction) -> bool {
        self.open[direction.index()].is_some()
    }

    pub fn open_event(&self, direction: Direction) -> Option<&OpenEvent> {
        self.open[direction.index()].as_ref()
    }

    pub fn open_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|direction| self.is_open(*direction))
            .collect()
    }

    /// Feed one decoded code, attributing any newly opened event to `mode`.
    pub fn apply(
        &mut self,
        code: PostureCode,
        mode: ActivityMode,
        now: DateTime<Utc>,
        policy: StrayStopPolicy,
    ) -> CodeOutcome {
        match code {
            PostureCode::Start(direction) => {
                let slot = &mut self.open[direction.index()];
                if slot.is_some() {
                    return CodeOutcome::AlreadyOpen(direction);
                }
                *slot = Some(OpenEvent {
                    started_at: now,
                    mode,
                    session_id: self.walking_session_id.clone(),
                });
                CodeOutcome::Opened(direction)
            }
            PostureCode::Stop(direction) => match self.open[direction.index()].take() {
                Some(open) => CodeOutcome::Closed(close(direction, open, now)),
                None => match policy {
                    StrayStopPolicy::Ignore => CodeOutcome::StrayStop(direction),
                    StrayStopPolicy::Synthesize => {
                        let mut event = CompletedEvent::new(
                            direction,
                            mode,
                            self.walking_session_id.clone(),
                            now,
                            now,
                        );
                        event.synthesized = true;
                        CodeOutcome::Closed(event)
                    }
                },
            },
        }
    }

    /// Close every open direction at `now`, in Left, Right, Front order.
    pub fn force_close_all(&mut self, now: DateTime<Utc>) -> Vec<CompletedEvent> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                self.open[direction.index()]
                    .take()
                    .map(|open| close(direction, open, now))
            })
            .collect()
    }
}

fn close(direction: Direction, open: OpenEvent, now: DateTime<Utc>) -> CompletedEvent {
    CompletedEvent::new(direction, open.mode, open.session_id, open.started_at, now)
}
