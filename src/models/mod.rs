pub mod posture;

pub use posture::{elapsed_secs, ActivityMode, CompletedEvent, Direction, PostureCode};
