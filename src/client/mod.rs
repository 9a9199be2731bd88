//! Remote inventory API boundary
//!
//! Defines the interface every Idefix client implementation must follow:
//! - The `InventoryApi` trait, one method per remote call
//! - `RemoteCall`, the catalogue of calls used for logging, metrics and errors
//! - `RemoteError`, transport and API failures
//! - The HTTP implementation (`HttpInventoryClient`)

pub mod http;
pub mod types;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpInventoryClient;
pub use types::{
    AtRecord, CiCreateResponse, CiPayload, CiRecord, CiUpdateRequest, MonitoringEvent,
    ProjectPayload, ProjectRecord, ProjectSearchHit, ProjectSearchRequest, ProjectUpdateRequest,
    SearchEventsRequest, ServiceCloudRecord, UpdateAtRequest, UpdateServiceCloudRequest,
    UpdateUseAndKeyDateRequest, UseAndKeyDateRecord,
};

/// Result alias for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised while talking to the inventory service
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON serialization/deserialization error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Login rejected: {0}")]
    Login(String),
}

/// Every call the reconcilers may issue against the inventory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCall {
    Login,
    CiCreate,
    CiRead,
    CiUpdate,
    CiUpdatePlatform,
    CiReadServiceCloud,
    CiUpdateServiceCloud,
    CiReadUseAndKeyDate,
    CiUpdateUseAndKeyDate,
    EquipmentReadAt,
    EquipmentUpdateAt,
    EquipmentDelete,
    MonitoringSearchEvents,
    MonitoringDeleteEvents,
    ProjectCreate,
    ProjectRead,
    ProjectUpdate,
    ProjectDelete,
    ProjectSearch,
}

impl RemoteCall {
    /// Service segment of the endpoint path.
    pub fn service(&self) -> &'static str {
        match self {
            RemoteCall::Login => "authentification",
            RemoteCall::CiCreate
            | RemoteCall::CiRead
            | RemoteCall::CiUpdate
            | RemoteCall::CiUpdatePlatform
            | RemoteCall::CiReadServiceCloud
            | RemoteCall::CiUpdateServiceCloud
            | RemoteCall::CiReadUseAndKeyDate
            | RemoteCall::CiUpdateUseAndKeyDate => "ci",
            RemoteCall::EquipmentReadAt
            | RemoteCall::EquipmentUpdateAt
            | RemoteCall::EquipmentDelete => "equipment",
            RemoteCall::MonitoringSearchEvents | RemoteCall::MonitoringDeleteEvents => {
                "monitoring"
            }
            RemoteCall::ProjectCreate
            | RemoteCall::ProjectRead
            | RemoteCall::ProjectUpdate
            | RemoteCall::ProjectDelete
            | RemoteCall::ProjectSearch => "project",
        }
    }

    /// Method segment of the endpoint path.
    pub fn method(&self) -> &'static str {
        match self {
            RemoteCall::Login => "login",
            RemoteCall::CiCreate | RemoteCall::ProjectCreate => "create",
            RemoteCall::CiRead | RemoteCall::ProjectRead => "read",
            RemoteCall::CiUpdate | RemoteCall::ProjectUpdate => "update",
            RemoteCall::CiUpdatePlatform => "updatePlatform",
            RemoteCall::CiReadServiceCloud => "readServiceCloud",
            RemoteCall::CiUpdateServiceCloud => "updateServiceCloud",
            RemoteCall::CiReadUseAndKeyDate => "readUseAndKeyDate",
            RemoteCall::CiUpdateUseAndKeyDate => "updateUseAndKeyDate",
            RemoteCall::EquipmentReadAt => "readAT",
            RemoteCall::EquipmentUpdateAt => "updateAT",
            RemoteCall::EquipmentDelete | RemoteCall::ProjectDelete => "delete",
            RemoteCall::MonitoringSearchEvents => "searchEvents",
            RemoteCall::MonitoringDeleteEvents => "deleteEvents",
            RemoteCall::ProjectSearch => "search",
        }
    }

    /// Stable label used in logs and metrics, e.g. `CI.UpdateServiceCloud`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteCall::Login => "Authentification.Login",
            RemoteCall::CiCreate => "CI.Create",
            RemoteCall::CiRead => "CI.Read",
            RemoteCall::CiUpdate => "CI.Update",
            RemoteCall::CiUpdatePlatform => "CI.UpdatePlatform",
            RemoteCall::CiReadServiceCloud => "CI.ReadServiceCloud",
            RemoteCall::CiUpdateServiceCloud => "CI.UpdateServiceCloud",
            RemoteCall::CiReadUseAndKeyDate => "CI.ReadUseAndKeyDate",
            RemoteCall::CiUpdateUseAndKeyDate => "CI.UpdateUseAndKeyDate",
            RemoteCall::EquipmentReadAt => "Equipment.ReadAT",
            RemoteCall::EquipmentUpdateAt => "Equipment.UpdateAT",
            RemoteCall::EquipmentDelete => "Equipment.Delete",
            RemoteCall::MonitoringSearchEvents => "Monitoring.SearchEvents",
            RemoteCall::MonitoringDeleteEvents => "Monitoring.DeleteEvents",
            RemoteCall::ProjectCreate => "Project.Create",
            RemoteCall::ProjectRead => "Project.Read",
            RemoteCall::ProjectUpdate => "Project.Update",
            RemoteCall::ProjectDelete => "Project.Delete",
            RemoteCall::ProjectSearch => "Project.Search",
        }
    }
}

impl fmt::Display for RemoteCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request/response surface of the inventory service.
///
/// Reads of an absent entity return `Ok(None)`; every other failure is a
/// `RemoteError`. Implementations must not retry.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Create the core CI record and return the identifier assigned by the service.
    async fn ci_create(&self, request: &CiPayload) -> RemoteResult<String>;

    async fn ci_read(&self, id: &str) -> RemoteResult<Option<CiRecord>>;

    async fn ci_update(&self, request: &CiUpdateRequest) -> RemoteResult<()>;

    /// Ask the service to reconcile the CI against its platform inventory.
    async fn ci_update_platform(&self, id: &str) -> RemoteResult<()>;

    async fn ci_read_service_cloud(&self, id: &str) -> RemoteResult<ServiceCloudRecord>;

    async fn ci_update_service_cloud(
        &self,
        request: &UpdateServiceCloudRequest,
    ) -> RemoteResult<()>;

    async fn ci_read_use_and_key_date(&self, id: &str) -> RemoteResult<UseAndKeyDateRecord>;

    async fn ci_update_use_and_key_date(
        &self,
        request: &UpdateUseAndKeyDateRequest,
    ) -> RemoteResult<()>;

    async fn equipment_read_at(&self, id: &str) -> RemoteResult<AtRecord>;

    async fn equipment_update_at(&self, request: &UpdateAtRequest) -> RemoteResult<()>;

    async fn equipment_delete(&self, id: &str) -> RemoteResult<()>;

    /// Monitoring events referencing any of the given equipment identifiers.
    async fn monitoring_search_events(
        &self,
        request: &SearchEventsRequest,
    ) -> RemoteResult<Vec<MonitoringEvent>>;

    async fn monitoring_delete_event(&self, event_id: &str) -> RemoteResult<()>;

    async fn project_create(&self, request: &ProjectPayload) -> RemoteResult<String>;

    async fn project_read(&self, id: &str) -> RemoteResult<Option<ProjectRecord>>;

    async fn project_update(&self, request: &ProjectUpdateRequest) -> RemoteResult<()>;

    async fn project_delete(&self, id: &str) -> RemoteResult<()>;

    /// `None` when the service answers with a null result.
    async fn project_search(
        &self,
        request: &ProjectSearchRequest,
    ) -> RemoteResult<Option<Vec<ProjectSearchHit>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_call_paths() {
        assert_eq!(RemoteCall::CiUpdatePlatform.service(), "ci");
        assert_eq!(RemoteCall::CiUpdatePlatform.method(), "updatePlatform");
        assert_eq!(RemoteCall::EquipmentReadAt.service(), "equipment");
        assert_eq!(RemoteCall::EquipmentReadAt.method(), "readAT");
        assert_eq!(RemoteCall::Login.service(), "authentification");
        assert_eq!(
            RemoteCall::MonitoringDeleteEvents.to_string(),
            "Monitoring.DeleteEvents"
        );
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::Api {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API request failed with status 500: boom");
    }
}
