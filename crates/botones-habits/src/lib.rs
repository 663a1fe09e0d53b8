//! `botones-habits` — in-memory registry of recurring habit notifications.
//!
//! # Overview
//!
//! A habit is a message the bot repeats into its origin channel every N
//! minutes until deleted. Each habit owns one Tokio loop; the registry maps
//! the habit's message text (its key) to that loop's cancellation token.
//! Creating a habit under an existing key cancels the old loop first, so at
//! most one loop is ever live per key.
//!
//! Fired habits are emitted as [`HabitNotice`] values on an mpsc channel;
//! actual chat delivery happens on the consumer side. A failed delivery
//! never terminates a habit loop.
//!
//! Nothing is persisted — habits die with the process.

pub mod error;
pub mod registry;

pub use error::{HabitError, Result};
pub use registry::{HabitInfo, HabitNotice, HabitRegistry, InstallOutcome};
