//! # Error Handling
//!
//! Errors surfaced by the reconcilers to the host. Remote failures are wrapped
//! together with the call that produced them and are never retried or
//! compensated.

use thiserror::Error;

use crate::client::{RemoteCall, RemoteError};
use crate::codec::AssociationError;

/// Result alias for reconciler operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A remote call failed; the operation stopped at this call.
    #[error("{call} failed: {source}")]
    RemoteCallFailed {
        call: RemoteCall,
        #[source]
        source: RemoteError,
    },

    /// An association string from the remote service could not be decoded.
    #[error("malformed association in field '{field}': {source}")]
    MalformedAssociation {
        field: &'static str,
        #[source]
        source: AssociationError,
    },

    /// A scalar field from the remote service could not be decoded.
    #[error("malformed value '{value}' in field '{field}'")]
    MalformedField { field: &'static str, value: String },

    /// The identifier is not in the integer form a dependent call requires.
    #[error("invalid identifier '{id}': expected an integer")]
    InvalidIdentifier { id: String },

    /// A record disappeared while refreshing the mirror after a write.
    #[error("{kind} '{id}' not found after write")]
    NotFound { kind: &'static str, id: String },

    /// `CI.Create` assigned `id` but a later step failed. The remote record
    /// exists and is left in place for the operator.
    #[error("CI '{id}' was created but its configuration did not complete: {source}")]
    PartialCreate {
        id: String,
        #[source]
        source: Box<ReconcileError>,
    },
}

impl ReconcileError {
    /// Identifier of a remote record left behind by a failed create, if any.
    pub fn orphaned_id(&self) -> Option<&str> {
        match self {
            ReconcileError::PartialCreate { id, .. } => Some(id),
            _ => None,
        }
    }

    /// The remote call that failed, looking through partial-create wrapping.
    pub fn failed_call(&self) -> Option<RemoteCall> {
        match self {
            ReconcileError::RemoteCallFailed { call, .. } => Some(*call),
            ReconcileError::PartialCreate { source, .. } => source.failed_call(),
            _ => None,
        }
    }
}

/// Build a mapper attaching the failing call to a `RemoteError`.
pub(crate) fn remote(call: RemoteCall) -> impl FnOnce(RemoteError) -> ReconcileError {
    move |source| ReconcileError::RemoteCallFailed { call, source }
}
