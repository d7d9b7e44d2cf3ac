//! Domain layer: the canonical principal resolution policy and the idle session timer.

pub mod auth_status;
pub mod error;
pub mod idle_session;

pub use auth_status::{AuthStatus, PrincipalResolver};
pub use identity::{Claim, Profile, ResolvedPrincipal};
pub use idle_session::{IdlePhase, IdleSessionHandle, IdleTimerConfig};
