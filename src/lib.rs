//! # Idefix Reconciler Library
//!
//! Converges declarative descriptions of CIs and projects onto the Idefix
//! inventory service, and reads back the observed state.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod reconciler;
pub mod schema;
pub mod session;
pub mod telemetry;

pub use error::{ReconcileError, ReconcileResult};
pub use reconciler::{ReadOutcome, Reconciler};
pub use session::{Session, SessionError};
