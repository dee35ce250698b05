pub mod state;

pub use state::{CodeOutcome, CorrelationState, OpenEvent, StrayStopPolicy};
