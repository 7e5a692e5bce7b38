//! # pb-engine
//!
//! The Pulseboard workflow engine: one service object, [`Portal`], owning
//! the aggregate and exposing every mutation the portal performs.
//!
//! Each mutation computes a brand-new [`AppState`], folds its side effects
//! (activity log entries, notification fan-out, KPI auto-increment) into
//! that same value, and persists it with a single whole-aggregate write
//! through the injected [`StateStore`]. That single replace is what makes
//! every mutation atomic: no reader ever observes the approval without the
//! KPI increment that belongs to it.
//!
//! ## Key components
//!
//! - [`Portal`] — the service object: entity repository operations plus
//!   the task lifecycle transitions
//! - the transition gate (`lifecycle`) — every status change, including
//!   general edits, is validated against the state machine and triggers
//!   the side effects of its edge; there is no bypass path
//! - cascade rules (`cascade`) — department deletion removes its KPIs and
//!   tasks and unassigns its users
//! - dispatch (`dispatch`) — bounded newest-first activity log, typed
//!   notification fan-out to concrete recipients
//!
//! [`AppState`]: pb_model::AppState
//! [`StateStore`]: pb_store::StateStore

mod cascade;
mod dispatch;
mod due;
pub mod error;
mod lifecycle;
pub mod service;

pub use error::EngineError;
pub use service::Portal;
