//! Project desired-state and mirrored-state records.

use serde::{Deserialize, Serialize};

/// Fixed bookkeeping values merged into every project write.
pub mod constants {
    pub const TYPE_NAME: &str = "Suivi";
    pub const INVOICE_TYPE: &str = "FDT";
    pub const INITIAL_BUDGET: &str = "0";
}

/// Regional WBS codes, one optional code per entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WbsCodes {
    #[serde(rename = "wbs_france", skip_serializing_if = "Option::is_none")]
    pub france: Option<String>,
    #[serde(rename = "wbs_vietnam", skip_serializing_if = "Option::is_none")]
    pub vietnam: Option<String>,
    #[serde(rename = "wbs_singapour", skip_serializing_if = "Option::is_none")]
    pub singapour: Option<String>,
    #[serde(rename = "wbs_maurice", skip_serializing_if = "Option::is_none")]
    pub maurice: Option<String>,
    #[serde(rename = "wbs_luxembourg", skip_serializing_if = "Option::is_none")]
    pub luxembourg: Option<String>,
    #[serde(rename = "wbs_hong_kong", skip_serializing_if = "Option::is_none")]
    pub hong_kong: Option<String>,
    #[serde(rename = "wbs_chine", skip_serializing_if = "Option::is_none")]
    pub chine: Option<String>,
    #[serde(rename = "wbs_canada", skip_serializing_if = "Option::is_none")]
    pub canada: Option<String>,
    #[serde(rename = "wbs_belgique", skip_serializing_if = "Option::is_none")]
    pub belgique: Option<String>,
}

/// Desired state of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Must be unique on the remote service.
    pub name: String,
    pub company_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(flatten)]
    pub wbs: WbsCodes,
    pub contract_number: String,
}

impl ProjectSpec {
    pub fn new(
        name: impl Into<String>,
        company_id: i64,
        contract_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            company_id,
            parent_id: None,
            wbs: WbsCodes::default(),
            contract_number: contract_number.into(),
        }
    }
}

/// Mirror of a project as read back from the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    pub id: String,
    pub name: String,
    pub company_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(flatten)]
    pub wbs: WbsCodes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_number: Option<String>,
}

/// Project found by a lookup by integer id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub parent_id: Option<i64>,
}

/// One entry of a projects search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
}

/// Result of a projects search. `id` is a freshness marker (Unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectsQueryResult {
    pub id: String,
    pub name_filter: String,
    pub projects: Vec<ProjectSummary>,
}
