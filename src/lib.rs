// Library surface for headless/integration tests and reuse.
// The binary in main.rs adds the terminal glue on top of these modules.
pub mod facts;
pub mod mastery;
pub mod milestones;
pub mod progress;
pub mod runtime;
pub mod score;
pub mod session;
pub mod ui;

/// The countdown moves in whole seconds; the tick thread fires at this rate.
pub const TICK_INTERVAL_MS: u64 = 1000;
