//! # sheetsync-daemon
//!
//! Foreground scheduler runtime: fires a sync cycle on a fixed cadence and
//! shuts down cleanly on ctrl-c. The engine itself is blocking; each tick
//! runs it on the blocking pool.

pub mod error;
pub mod runtime;

pub use error::DaemonError;
pub use runtime::{run, start_blocking};
