//! Wire records exchanged with the inventory service.
//!
//! Association fields are comma-delimited strings here; conversion to typed
//! lists happens in the reconcilers through [`crate::codec`].

use serde::{Deserialize, Serialize};

use crate::model::WbsCodes;

/// Core CI attributes shared by `CI.Create` and `CI.Update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiPayload {
    pub name: String,
    pub type_id: i64,
    pub company_id: i64,
    pub project_ids: String,
    pub outsourcing_name: String,
    pub service_level_id: i64,
    pub team: String,
    pub is_owner_lbn: bool,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiUpdateRequest {
    pub id: String,
    #[serde(flatten)]
    pub payload: CiPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CiCreateResponse {
    pub id: String,
}

/// Core CI record as returned by `CI.Read`.
///
/// `type_id` is delivered as a string by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiRecord {
    pub name: String,
    pub type_id: String,
    pub company_id: i64,
    pub project_ids: String,
    pub outsourcing_name: String,
    pub service_level_id: i64,
    pub team: String,
    pub is_owner_lbn: bool,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCloudRecord {
    pub subscription_id: i64,
    pub product_id: i64,
    pub region_id: String,
}

/// Non-positive product and region identifiers are left off the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateServiceCloudRequest {
    pub id: String,
    pub subscription_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UseAndKeyDateRecord {
    pub environment_ids: String,
    pub function_ids: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUseAndKeyDateRequest {
    pub id: String,
    pub env_select: i64,
    pub environment_ids: String,
    pub func_select: i64,
    pub function_ids: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtRecord {
    pub required_services: String,
    pub monitoring_tool: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAtRequest {
    pub id: String,
    pub required_services: String,
    pub monitoring_tool: String,
    pub backup_comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEventsRequest {
    pub equipment_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringEvent {
    pub id: String,
}

/// Project attributes shared by `Project.Create` and `Project.Update`,
/// including the fixed bookkeeping constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPayload {
    pub name: String,
    pub company_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(flatten)]
    pub wbs: WbsCodes,
    pub contract_number: String,
    pub type_name: String,
    pub invoice_type: String,
    pub initial_budget: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdateRequest {
    pub id: String,
    #[serde(flatten)]
    pub payload: ProjectPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub name: String,
    pub company_id: i64,
    pub parent_id: Option<i64>,
    #[serde(flatten)]
    pub wbs: WbsCodes,
    pub contract_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSearchRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSearchHit {
    pub id: i64,
    pub name: String,
}
