//! Scan sessions
//!
//! [`ScanOrchestrator`] starts sessions and is their only writer. Each session
//! moves through the [`ScanStateMachine`]; consumers observe it through a
//! [`SessionHandle`]: progress stream, issue snapshots, cancellation.

pub mod orchestrator;
#[allow(clippy::module_inception)]
pub mod session;
pub mod state;

pub use orchestrator::ScanOrchestrator;
pub use session::{ProgressStream, ScanProgress, ScanSession, SessionHandle, SessionSnapshot};
pub use state::{ScanEvent, ScanStateMachine, ScanStatus};
