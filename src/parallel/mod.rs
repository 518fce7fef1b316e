//! Bounded async execution
//!
//! The parallel module owns **how** work runs, never **what** the work is:
//!
//! - [`Scheduler`] dispatches async work items onto a `JoinSet` with a hard
//!   in-flight limit and periodic batch pauses
//! - [`Pacer`] is the shared rate-limit gate every dispatch waits on
//! - [`CancelToken`] stops dispatch cooperatively
//!
//! ```rust,no_run
//! use repoguard::parallel::{CancelToken, Flow, Pacer, Scheduler, SchedulerConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() {
//! let scheduler = Scheduler::new(SchedulerConfig::default(), Arc::new(Pacer::new()), CancelToken::new());
//! let summary = scheduler
//!     .run(vec![1, 2, 3], |n: i32| async move { n * 2 }, |_: i32| Flow::Continue)
//!     .await;
//! assert_eq!(summary.completed, 3);
//! # }
//! ```

pub mod cancel;
pub mod pacer;
pub mod scheduler;

pub use cancel::CancelToken;
pub use pacer::Pacer;
pub use scheduler::{Flow, RunSummary, Scheduler, SchedulerConfig};
