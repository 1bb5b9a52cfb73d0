//! Session plumbing for Quizroom: which socket belongs to which player,
//! and what happens when the host's socket goes away.

mod binder;
mod continuity;

pub use binder::{Binding, ConnectionId, SessionBinder};
pub use continuity::{HostContinuity, DEFAULT_GRACE};
