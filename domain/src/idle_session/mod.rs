//! Idle session timeout: warns a signed-in user before signing them out after
//! a period of inactivity.
//!
//! [`IdleTimer`] is the state machine, [`SessionSurface`] is the page it acts on
//! and [`IdleSessionHandle`] runs one against the other on a tokio task.

mod handle;
mod surface;
mod timer;

pub use handle::IdleSessionHandle;
pub use surface::{ActivityEvent, SessionSurface};
pub use timer::{IdleEvent, IdlePhase, IdleTimer, IdleTimerConfig};
