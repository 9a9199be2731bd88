//! CI desired-state and mirrored-state records.

use serde::{Deserialize, Serialize};

/// Defaults applied to optional CI fields left unset by the desired state.
pub mod defaults {
    pub const TYPE_ID: i64 = 41;
    pub const OUTSOURCING_NAME: &str = "0 - Non-défini";
    pub const SERVICE_LEVEL_ID: i64 = 100000080;
    pub const TEAM: &str = "Unix";
    pub const IS_OWNER_LBN: bool = true;
    /// Backup comment tag attached to every ServiceAT write.
    pub const BACKUP_COMMENT: &str = "Asset PaaS";
    /// Environment and function selectors are never derived from desired state.
    pub const KEY_DATE_SELECTOR: i64 = 0;
}

fn default_type_id() -> i64 {
    defaults::TYPE_ID
}

fn default_outsourcing_name() -> String {
    defaults::OUTSOURCING_NAME.to_string()
}

fn default_service_level_id() -> i64 {
    defaults::SERVICE_LEVEL_ID
}

fn default_team() -> String {
    defaults::TEAM.to_string()
}

fn default_is_owner_lbn() -> bool {
    defaults::IS_OWNER_LBN
}

/// Core attributes carried by the `CI.Create` / `CI.Update` / `CI.Read` calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiCore {
    pub name: String,
    #[serde(default = "default_type_id")]
    pub type_id: i64,
    pub company_id: i64,
    pub project_ids: Vec<i64>,
    #[serde(default = "default_outsourcing_name")]
    pub outsourcing_name: String,
    #[serde(default = "default_service_level_id")]
    pub service_level_id: i64,
    #[serde(default = "default_team")]
    pub team: String,
    #[serde(default = "default_is_owner_lbn")]
    pub is_owner_lbn: bool,
    #[serde(default)]
    pub comment: String,
}

impl CiCore {
    /// Required attributes only; every optional attribute takes its default.
    pub fn new(name: impl Into<String>, company_id: i64, project_ids: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            type_id: default_type_id(),
            company_id,
            project_ids,
            outsourcing_name: default_outsourcing_name(),
            service_level_id: default_service_level_id(),
            team: default_team(),
            is_owner_lbn: default_is_owner_lbn(),
            comment: String::new(),
        }
    }
}

/// Service Cloud attachment.
///
/// The region is optional; a missing or non-positive region is never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCloud {
    pub subscription_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub region_id: Option<i64>,
}

/// Use and key dates: environments and functions of the CI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDates {
    #[serde(default)]
    pub environment_ids: Vec<i64>,
    #[serde(default)]
    pub function_ids: Vec<i64>,
}

/// Equipment AT attributes: required services and monitoring tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAt {
    #[serde(default)]
    pub required_services: Vec<i64>,
    #[serde(default)]
    pub monitoring_tool: Vec<i64>,
}

/// Desired state of a CI as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiSpec {
    #[serde(flatten)]
    pub core: CiCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_cloud: Option<ServiceCloud>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_dates: Option<KeyDates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_at: Option<ServiceAt>,
}

impl CiSpec {
    pub fn new(core: CiCore) -> Self {
        Self {
            core,
            service_cloud: None,
            key_dates: None,
            service_at: None,
        }
    }

    pub fn with_service_cloud(mut self, service_cloud: ServiceCloud) -> Self {
        self.service_cloud = Some(service_cloud);
        self
    }

    pub fn with_key_dates(mut self, key_dates: KeyDates) -> Self {
        self.key_dates = Some(key_dates);
        self
    }

    pub fn with_service_at(mut self, service_at: ServiceAt) -> Self {
        self.service_at = Some(service_at);
        self
    }
}

/// Core CI attributes as observed on the remote service, without sub-resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiDetails {
    pub id: String,
    #[serde(flatten)]
    pub core: CiCore,
}

/// Full mirror of a CI after a read. Every sub-resource is always materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiState {
    pub id: String,
    #[serde(flatten)]
    pub core: CiCore,
    pub service_cloud: ServiceCloud,
    pub key_dates: KeyDates,
    pub service_at: ServiceAt,
}
