//! Project reconciler
//!
//! Plain CRUD on a single remote record. Every write carries the fixed
//! bookkeeping constants (type, invoice type, initial budget).

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{ReadOutcome, Reconciler};
use crate::client::{ProjectPayload, ProjectRecord, ProjectUpdateRequest, RemoteCall};
use crate::error::{ReconcileResult, remote};
use crate::model::project::constants;
use crate::model::{ProjectSpec, ProjectState};
use crate::session::Session;

/// Reconciler for `idefix_project` records
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectReconciler;

impl ProjectReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Payload shared by create and update, constants included.
    pub fn payload(desired: &ProjectSpec) -> ProjectPayload {
        ProjectPayload {
            name: desired.name.clone(),
            company_id: desired.company_id,
            parent_id: desired.parent_id.filter(|id| *id > 0),
            wbs: desired.wbs.clone(),
            contract_number: desired.contract_number.clone(),
            type_name: constants::TYPE_NAME.to_string(),
            invoice_type: constants::INVOICE_TYPE.to_string(),
            initial_budget: constants::INITIAL_BUDGET.to_string(),
        }
    }

    fn mirror(id: &str, record: ProjectRecord) -> ProjectState {
        ProjectState {
            id: id.to_string(),
            name: record.name,
            company_id: record.company_id,
            parent_id: record.parent_id.filter(|id| *id > 0),
            wbs: record.wbs,
            contract_number: record.contract_number,
        }
    }
}

#[async_trait]
impl Reconciler for ProjectReconciler {
    type Desired = ProjectSpec;
    type State = ProjectState;

    fn kind(&self) -> &'static str {
        "project"
    }

    async fn create(
        &self,
        session: &Session,
        desired: &ProjectSpec,
    ) -> ReconcileResult<ProjectState> {
        info!(name = %desired.name, company_id = %desired.company_id, "Creating project");

        let id = session
            .api()
            .project_create(&Self::payload(desired))
            .await
            .map_err(remote(RemoteCall::ProjectCreate))?;

        info!(project_id = %id, "Project created");
        self.refresh(session, &id).await
    }

    async fn read(
        &self,
        session: &Session,
        id: &str,
    ) -> ReconcileResult<ReadOutcome<ProjectState>> {
        if id.is_empty() {
            return Ok(ReadOutcome::Gone);
        }

        match session
            .api()
            .project_read(id)
            .await
            .map_err(remote(RemoteCall::ProjectRead))?
        {
            Some(record) => {
                debug!(project_id = %id, "Project read");
                Ok(ReadOutcome::Found(Self::mirror(id, record)))
            }
            None => {
                warn!(project_id = %id, "Project not found on Idefix; dropping local identifier");
                Ok(ReadOutcome::Gone)
            }
        }
    }

    async fn update(
        &self,
        session: &Session,
        id: &str,
        desired: &ProjectSpec,
    ) -> ReconcileResult<ProjectState> {
        info!(project_id = %id, name = %desired.name, "Updating project");

        session
            .api()
            .project_update(&ProjectUpdateRequest {
                id: id.to_string(),
                payload: Self::payload(desired),
            })
            .await
            .map_err(remote(RemoteCall::ProjectUpdate))?;

        self.refresh(session, id).await
    }

    async fn delete(&self, session: &Session, id: &str) -> ReconcileResult<()> {
        session
            .api()
            .project_delete(id)
            .await
            .map_err(remote(RemoteCall::ProjectDelete))?;

        info!(project_id = %id, "Project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_merges_constants() {
        let mut spec = ProjectSpec::new("infra", 4, "C-77");
        spec.parent_id = Some(0);
        spec.wbs.canada = Some("CA-2".to_string());

        let payload = ProjectReconciler::payload(&spec);
        assert_eq!(payload.type_name, "Suivi");
        assert_eq!(payload.invoice_type, "FDT");
        assert_eq!(payload.initial_budget, "0");
        assert_eq!(payload.parent_id, None);
        assert_eq!(payload.wbs.canada.as_deref(), Some("CA-2"));
        assert_eq!(payload.contract_number, "C-77");
    }
}
