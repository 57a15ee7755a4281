//! Application layer containing the sweep pipeline.
//!
//! The `Sweeper` is the single entry point invoked by the scheduler. It pulls
//! candidates from the `EligibilityScanner`, hands them one by one to the
//! `DisableExecutor`, and paces both stages with independent `BatchThrottler`s.

pub mod executor;
pub mod scanner;
pub mod scheduler;
pub mod sweep;
pub mod throttle;
