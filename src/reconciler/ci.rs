//! CI reconciler
//!
//! Converges a composite CI: the core equipment record plus its Service Cloud,
//! key dates and ServiceAT sub-resources. Writes follow a fixed order:
//!
//! 1. `CI.Create` / `CI.Update`
//! 2. `CI.UpdateServiceCloud` (when requested with a positive subscription)
//! 3. `CI.UpdateUseAndKeyDate` (when requested)
//! 4. `Equipment.UpdateAT` (when requested)
//! 5. `CI.UpdatePlatform`
//!
//! Deletion purges monitoring events referencing the equipment before the
//! equipment record itself.

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::sub_resources::{
    KeyDatesSync, ServiceAtSync, ServiceCloudSync, SubResourceSync, decode_list,
};
use super::{ReadOutcome, Reconciler};
use crate::client::{CiPayload, CiRecord, CiUpdateRequest, RemoteCall, SearchEventsRequest};
use crate::codec;
use crate::error::{ReconcileError, ReconcileResult, remote};
use crate::model::{CiCore, CiSpec, CiState};
use crate::session::Session;

/// Reconciler for `idefix_ci` records
#[derive(Debug, Clone, Copy, Default)]
pub struct CiReconciler;

impl CiReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Core payload shared by create and update.
    pub fn payload(core: &CiCore) -> CiPayload {
        CiPayload {
            name: core.name.clone(),
            type_id: core.type_id,
            company_id: core.company_id,
            project_ids: codec::encode(&core.project_ids),
            outsourcing_name: core.outsourcing_name.clone(),
            service_level_id: core.service_level_id,
            team: core.team.clone(),
            is_owner_lbn: core.is_owner_lbn,
            comment: core.comment.clone(),
        }
    }

    /// Decode the core record returned by `CI.Read`.
    pub fn decode_core(record: CiRecord) -> ReconcileResult<CiCore> {
        let project_ids = decode_list("project_ids", &record.project_ids)?;
        let type_id = record
            .type_id
            .trim()
            .parse::<i64>()
            .map_err(|_| ReconcileError::MalformedField {
                field: "type_id",
                value: record.type_id.clone(),
            })?;

        Ok(CiCore {
            name: record.name,
            type_id,
            company_id: record.company_id,
            project_ids,
            outsourcing_name: record.outsourcing_name,
            service_level_id: record.service_level_id,
            team: record.team,
            is_owner_lbn: record.is_owner_lbn,
            comment: record.comment,
        })
    }

    /// Sub-resource writes and the platform sync, strictly in order.
    async fn converge_sub_resources(
        &self,
        session: &Session,
        id: &str,
        desired: &CiSpec,
    ) -> ReconcileResult<()> {
        if let Some(service_cloud) = &desired.service_cloud {
            converge(&ServiceCloudSync, session, id, service_cloud).await?;
        }
        if let Some(key_dates) = &desired.key_dates {
            converge(&KeyDatesSync, session, id, key_dates).await?;
        }
        if let Some(service_at) = &desired.service_at {
            converge(&ServiceAtSync, session, id, service_at).await?;
        }

        session
            .api()
            .ci_update_platform(id)
            .await
            .map_err(remote(RemoteCall::CiUpdatePlatform))?;
        debug!(ci_id = %id, "Platform sync requested");

        Ok(())
    }
}

async fn converge<S: SubResourceSync>(
    sync: &S,
    session: &Session,
    id: &str,
    desired: &S::Record,
) -> ReconcileResult<()> {
    let sent = sync.push(session, id, desired).await?;
    debug!(ci_id = %id, sub_resource = %sync.name(), sent = %sent, "Sub-resource converged");
    Ok(())
}

#[async_trait]
impl Reconciler for CiReconciler {
    type Desired = CiSpec;
    type State = CiState;

    fn kind(&self) -> &'static str {
        "ci"
    }

    async fn create(&self, session: &Session, desired: &CiSpec) -> ReconcileResult<CiState> {
        info!(name = %desired.core.name, company_id = %desired.core.company_id, "Creating CI");

        let id = session
            .api()
            .ci_create(&Self::payload(&desired.core))
            .await
            .map_err(remote(RemoteCall::CiCreate))?;
        info!(ci_id = %id, name = %desired.core.name, "CI record created");

        let configured = async {
            self.converge_sub_resources(session, &id, desired).await?;
            self.refresh(session, &id).await
        }
        .await;

        configured.map_err(|source| {
            error!(
                ci_id = %id,
                error = %source,
                "CI created but configuration failed; remote record left in place"
            );
            ReconcileError::PartialCreate {
                id: id.clone(),
                source: Box::new(source),
            }
        })
    }

    async fn read(&self, session: &Session, id: &str) -> ReconcileResult<ReadOutcome<CiState>> {
        if id.is_empty() {
            debug!("CI read without identifier; nothing to observe");
            return Ok(ReadOutcome::Gone);
        }

        let Some(record) = session
            .api()
            .ci_read(id)
            .await
            .map_err(remote(RemoteCall::CiRead))?
        else {
            warn!(ci_id = %id, "CI not found on Idefix; dropping local identifier");
            return Ok(ReadOutcome::Gone);
        };

        let core = Self::decode_core(record)?;
        let service_cloud = ServiceCloudSync.pull(session, id).await?;
        let key_dates = KeyDatesSync.pull(session, id).await?;
        let service_at = ServiceAtSync.pull(session, id).await?;

        debug!(ci_id = %id, projects = %core.project_ids.len(), "CI read");

        Ok(ReadOutcome::Found(CiState {
            id: id.to_string(),
            core,
            service_cloud,
            key_dates,
            service_at,
        }))
    }

    async fn update(
        &self,
        session: &Session,
        id: &str,
        desired: &CiSpec,
    ) -> ReconcileResult<CiState> {
        info!(ci_id = %id, name = %desired.core.name, "Updating CI");

        session
            .api()
            .ci_update(&CiUpdateRequest {
                id: id.to_string(),
                payload: Self::payload(&desired.core),
            })
            .await
            .map_err(remote(RemoteCall::CiUpdate))?;

        self.converge_sub_resources(session, id, desired).await?;
        self.refresh(session, id).await
    }

    async fn delete(&self, session: &Session, id: &str) -> ReconcileResult<()> {
        // The same identifier drives the event search and the equipment delete
        let equipment_id = id
            .parse::<i64>()
            .map_err(|_| ReconcileError::InvalidIdentifier { id: id.to_string() })?;

        let events = session
            .api()
            .monitoring_search_events(&SearchEventsRequest {
                equipment_ids: vec![equipment_id],
            })
            .await
            .map_err(remote(RemoteCall::MonitoringSearchEvents))?;

        info!(ci_id = %id, events = %events.len(), "Deleting CI and its monitoring events");

        for event in &events {
            session
                .api()
                .monitoring_delete_event(&event.id)
                .await
                .map_err(remote(RemoteCall::MonitoringDeleteEvents))?;
            debug!(ci_id = %id, event_id = %event.id, "Monitoring event deleted");
        }

        session
            .api()
            .equipment_delete(id)
            .await
            .map_err(remote(RemoteCall::EquipmentDelete))?;

        info!(ci_id = %id, "CI deleted");
        Ok(())
    }
}
