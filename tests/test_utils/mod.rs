//! Test utilities for reconciler testing.
//!
//! `RecordingApi` is an in-memory inventory service. It records every call in
//! order together with its JSON request body, and can be told to fail specific
//! calls with an API error.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use idefix_reconciler::Session;
use idefix_reconciler::client::{
    AtRecord, CiPayload, CiRecord, CiUpdateRequest, InventoryApi, MonitoringEvent, ProjectPayload,
    ProjectRecord, ProjectSearchHit, ProjectSearchRequest, ProjectUpdateRequest, RemoteCall,
    RemoteError, RemoteResult, SearchEventsRequest, ServiceCloudRecord, UpdateAtRequest,
    UpdateServiceCloudRequest, UpdateUseAndKeyDateRequest, UseAndKeyDateRecord,
};
use serde::Serialize;
use serde_json::Value;

/// Remote CI with every sub-record, as stored by the fake service.
#[derive(Debug, Clone, Default)]
pub struct StoredCi {
    pub record: CiRecord,
    pub service_cloud: ServiceCloudRecord,
    pub key_dates: UseAndKeyDateRecord,
    pub at: AtRecord,
}

#[derive(Default)]
struct State {
    calls: Vec<(RemoteCall, Value)>,
    failures: HashSet<RemoteCall>,
    cis: HashMap<String, StoredCi>,
    projects: HashMap<String, ProjectRecord>,
    events: Vec<(i64, String)>,
    next_id: u64,
}

#[derive(Default)]
pub struct RecordingApi {
    state: Mutex<State>,
}

impl RecordingApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn session(self: &Arc<Self>) -> Session {
        Session::new(self.clone())
    }

    /// Make every subsequent `call` fail with HTTP 500.
    pub fn fail_on(&self, call: RemoteCall) {
        self.state.lock().unwrap().failures.insert(call);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .map(|(call, _)| *call)
            .collect()
    }

    /// Request bodies sent for `call`, in order.
    pub fn requests(&self, call: RemoteCall) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(recorded, _)| *recorded == call)
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn insert_ci(&self, id: &str, ci: StoredCi) {
        self.state.lock().unwrap().cis.insert(id.to_string(), ci);
    }

    pub fn ci(&self, id: &str) -> Option<StoredCi> {
        self.state.lock().unwrap().cis.get(id).cloned()
    }

    pub fn remove_ci(&self, id: &str) {
        self.state.lock().unwrap().cis.remove(id);
    }

    pub fn insert_project(&self, id: &str, record: ProjectRecord) {
        self.state
            .lock()
            .unwrap()
            .projects
            .insert(id.to_string(), record);
    }

    pub fn project(&self, id: &str) -> Option<ProjectRecord> {
        self.state.lock().unwrap().projects.get(id).cloned()
    }

    pub fn add_event(&self, equipment_id: i64, event_id: &str) {
        self.state
            .lock()
            .unwrap()
            .events
            .push((equipment_id, event_id.to_string()));
    }

    pub fn event_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .map(|(_, id)| id.clone())
            .collect()
    }

    fn record<B: Serialize + ?Sized>(&self, call: RemoteCall, body: &B) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push((call, serde_json::to_value(body).unwrap_or(Value::Null)));
        if state.failures.contains(&call) {
            return Err(RemoteError::Api {
                status: 500,
                body: format!("{call} rejected"),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        (1000 + state.next_id).to_string()
    }

    fn with_ci<T>(&self, id: &str, apply: impl FnOnce(&mut StoredCi) -> T) -> RemoteResult<T> {
        let mut state = self.state.lock().unwrap();
        match state.cis.get_mut(id) {
            Some(ci) => Ok(apply(ci)),
            None => Err(RemoteError::Api {
                status: 404,
                body: format!("CI {id} not found"),
            }),
        }
    }
}

fn ci_record(payload: &CiPayload) -> CiRecord {
    CiRecord {
        name: payload.name.clone(),
        type_id: payload.type_id.to_string(),
        company_id: payload.company_id,
        project_ids: payload.project_ids.clone(),
        outsourcing_name: payload.outsourcing_name.clone(),
        service_level_id: payload.service_level_id,
        team: payload.team.clone(),
        is_owner_lbn: payload.is_owner_lbn,
        comment: payload.comment.clone(),
    }
}

fn project_record(payload: &ProjectPayload) -> ProjectRecord {
    ProjectRecord {
        name: payload.name.clone(),
        company_id: payload.company_id,
        parent_id: payload.parent_id,
        wbs: payload.wbs.clone(),
        contract_number: Some(payload.contract_number.clone()),
    }
}

#[derive(Serialize)]
struct Id<'a> {
    id: &'a str,
}

#[async_trait]
impl InventoryApi for RecordingApi {
    async fn ci_create(&self, request: &CiPayload) -> RemoteResult<String> {
        self.record(RemoteCall::CiCreate, request)?;
        let id = self.next_id();
        self.insert_ci(
            &id,
            StoredCi {
                record: ci_record(request),
                ..StoredCi::default()
            },
        );
        Ok(id)
    }

    async fn ci_read(&self, id: &str) -> RemoteResult<Option<CiRecord>> {
        self.record(RemoteCall::CiRead, &Id { id })?;
        Ok(self.ci(id).map(|ci| ci.record))
    }

    async fn ci_update(&self, request: &CiUpdateRequest) -> RemoteResult<()> {
        self.record(RemoteCall::CiUpdate, request)?;
        self.with_ci(&request.id, |ci| ci.record = ci_record(&request.payload))
    }

    async fn ci_update_platform(&self, id: &str) -> RemoteResult<()> {
        self.record(RemoteCall::CiUpdatePlatform, &Id { id })
    }

    async fn ci_read_service_cloud(&self, id: &str) -> RemoteResult<ServiceCloudRecord> {
        self.record(RemoteCall::CiReadServiceCloud, &Id { id })?;
        self.with_ci(id, |ci| ci.service_cloud.clone())
    }

    async fn ci_update_service_cloud(
        &self,
        request: &UpdateServiceCloudRequest,
    ) -> RemoteResult<()> {
        self.record(RemoteCall::CiUpdateServiceCloud, request)?;
        self.with_ci(&request.id, |ci| {
            ci.service_cloud = ServiceCloudRecord {
                subscription_id: request.subscription_id,
                product_id: request.product_id.unwrap_or_default(),
                region_id: request.region_id.clone().unwrap_or_default(),
            }
        })
    }

    async fn ci_read_use_and_key_date(&self, id: &str) -> RemoteResult<UseAndKeyDateRecord> {
        self.record(RemoteCall::CiReadUseAndKeyDate, &Id { id })?;
        self.with_ci(id, |ci| ci.key_dates.clone())
    }

    async fn ci_update_use_and_key_date(
        &self,
        request: &UpdateUseAndKeyDateRequest,
    ) -> RemoteResult<()> {
        self.record(RemoteCall::CiUpdateUseAndKeyDate, request)?;
        self.with_ci(&request.id, |ci| {
            ci.key_dates = UseAndKeyDateRecord {
                environment_ids: request.environment_ids.clone(),
                function_ids: request.function_ids.clone(),
            }
        })
    }

    async fn equipment_read_at(&self, id: &str) -> RemoteResult<AtRecord> {
        self.record(RemoteCall::EquipmentReadAt, &Id { id })?;
        self.with_ci(id, |ci| ci.at.clone())
    }

    async fn equipment_update_at(&self, request: &UpdateAtRequest) -> RemoteResult<()> {
        self.record(RemoteCall::EquipmentUpdateAt, request)?;
        self.with_ci(&request.id, |ci| {
            ci.at = AtRecord {
                required_services: request.required_services.clone(),
                monitoring_tool: request.monitoring_tool.clone(),
            }
        })
    }

    async fn equipment_delete(&self, id: &str) -> RemoteResult<()> {
        self.record(RemoteCall::EquipmentDelete, &Id { id })?;
        self.remove_ci(id);
        Ok(())
    }

    async fn monitoring_search_events(
        &self,
        request: &SearchEventsRequest,
    ) -> RemoteResult<Vec<MonitoringEvent>> {
        self.record(RemoteCall::MonitoringSearchEvents, request)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .iter()
            .filter(|(equipment, _)| request.equipment_ids.contains(equipment))
            .map(|(_, id)| MonitoringEvent { id: id.clone() })
            .collect())
    }

    async fn monitoring_delete_event(&self, event_id: &str) -> RemoteResult<()> {
        self.record(RemoteCall::MonitoringDeleteEvents, &Id { id: event_id })?;
        self.state
            .lock()
            .unwrap()
            .events
            .retain(|(_, id)| id != event_id);
        Ok(())
    }

    async fn project_create(&self, request: &ProjectPayload) -> RemoteResult<String> {
        self.record(RemoteCall::ProjectCreate, request)?;
        let id = self.next_id();
        self.insert_project(&id, project_record(request));
        Ok(id)
    }

    async fn project_read(&self, id: &str) -> RemoteResult<Option<ProjectRecord>> {
        self.record(RemoteCall::ProjectRead, &Id { id })?;
        Ok(self.project(id))
    }

    async fn project_update(&self, request: &ProjectUpdateRequest) -> RemoteResult<()> {
        self.record(RemoteCall::ProjectUpdate, request)?;
        self.insert_project(&request.id, project_record(&request.payload));
        Ok(())
    }

    async fn project_delete(&self, id: &str) -> RemoteResult<()> {
        self.record(RemoteCall::ProjectDelete, &Id { id })?;
        self.state.lock().unwrap().projects.remove(id);
        Ok(())
    }

    /// Answers null when nothing matches, like the real service.
    async fn project_search(
        &self,
        request: &ProjectSearchRequest,
    ) -> RemoteResult<Option<Vec<ProjectSearchHit>>> {
        self.record(RemoteCall::ProjectSearch, request)?;
        let state = self.state.lock().unwrap();
        let mut hits: Vec<ProjectSearchHit> = state
            .projects
            .iter()
            .filter(|(_, project)| project.name.contains(&request.name))
            .filter_map(|(id, project)| {
                Some(ProjectSearchHit {
                    id: id.parse().ok()?,
                    name: project.name.clone(),
                })
            })
            .collect();
        hits.sort_by_key(|hit| hit.id);
        Ok(if hits.is_empty() { None } else { Some(hits) })
    }
}
