/// Multi-run accumulation of visitation counts
pub mod accumulator;
/// Growth simulator state machine and seeded selection
pub mod executor;
/// Progress observer interface
pub mod observer;
