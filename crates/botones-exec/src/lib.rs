//! botones-exec — one-shot execution of OS utilities.
//!
//! Commands are always spawned argv-style (never through a shell), with a
//! hard timeout, captured output streams, and middle-omission truncation so
//! a runaway tool can neither hang a handler nor flood a chat reply.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use botones_exec::{run, RunOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let out = run("uname", ["-a"], RunOptions::default()).await.unwrap();
//!     println!("{}", out.stdout);
//! }
//! ```

pub mod error;
pub mod runner;
pub mod truncate;
pub mod types;

pub use error::{ExecError, Result};
pub use runner::{probe, run, run_checked};
pub use truncate::{tail_chars, truncate_output};
pub use types::{ExecOutput, RunOptions};
