//! Control transfer state machine
//!
//! Tracks one vendor control transfer from its setup stage to its status
//! (ACK) stage. The machine is explicit, finite and deterministic; the
//! handler decides what to do with the hardware by looking at the state it
//! leaves.

pub mod events;
pub mod machine;

pub use events::TransferEvent;
pub use machine::TransferState;
