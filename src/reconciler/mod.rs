//! Reconcilers
//!
//! This module provides the host-facing CRUD entry points:
//! - The `Reconciler` trait implemented once per entity type
//! - `CiReconciler`, the composite CI with its sub-resources
//! - `ProjectReconciler`, single-record project CRUD
//! - Read-only queries (`ProjectsQuery`, `CiLookup`, `ProjectLookup`)

pub mod ci;
pub mod project;
pub mod query;
pub mod sub_resources;

use async_trait::async_trait;

use crate::error::{ReconcileError, ReconcileResult};
use crate::session::Session;

pub use ci::CiReconciler;
pub use project::ProjectReconciler;
pub use query::{CiLookup, ProjectLookup, ProjectsQuery};
pub use sub_resources::{KeyDatesSync, ServiceAtSync, ServiceCloudSync, SubResourceSync};

/// Outcome of reading a record by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    /// The record exists; the mirror reflects remote state.
    Found(T),
    /// The record is absent; the host must drop its local identifier.
    Gone,
}

impl<T> ReadOutcome<T> {
    pub fn is_gone(&self) -> bool {
        matches!(self, ReadOutcome::Gone)
    }
}

/// CRUD convergence for one entity type.
///
/// Operations are sequential; the host must not run two operations against the
/// same identifier concurrently.
#[async_trait]
pub trait Reconciler: Send + Sync {
    type Desired: Send + Sync;
    type State: Send;

    /// Entity name used in logs and errors.
    fn kind(&self) -> &'static str;

    /// Create the remote record and return the refreshed mirror.
    async fn create(&self, session: &Session, desired: &Self::Desired)
    -> ReconcileResult<Self::State>;

    /// Observe the remote record. Never modifies remote state.
    async fn read(&self, session: &Session, id: &str) -> ReconcileResult<ReadOutcome<Self::State>>;

    /// Converge the remote record to `desired` and return the refreshed mirror.
    async fn update(
        &self,
        session: &Session,
        id: &str,
        desired: &Self::Desired,
    ) -> ReconcileResult<Self::State>;

    /// Destroy the remote record. On success the host clears its identifier.
    async fn delete(&self, session: &Session, id: &str) -> ReconcileResult<()>;

    /// Read that must find the record; used to end Create and Update.
    async fn refresh(&self, session: &Session, id: &str) -> ReconcileResult<Self::State> {
        match self.read(session, id).await? {
            ReadOutcome::Found(state) => Ok(state),
            ReadOutcome::Gone => Err(ReconcileError::NotFound {
                kind: self.kind(),
                id: id.to_string(),
            }),
        }
    }
}
