//! Read-only queries: projects search and lookups by identifier.

use chrono::Utc;
use tracing::debug;

use super::ci::CiReconciler;
use crate::client::{ProjectSearchRequest, RemoteCall};
use crate::error::{ReconcileResult, remote};
use crate::model::{CiDetails, ProjectDetails, ProjectSummary, ProjectsQueryResult};
use crate::session::Session;

/// Search projects by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectsQuery;

impl ProjectsQuery {
    /// Always yields a list, empty when nothing matches. The result id is the
    /// current Unix time since the query has no natural key.
    pub async fn search(
        &self,
        session: &Session,
        name_filter: &str,
    ) -> ReconcileResult<ProjectsQueryResult> {
        let hits = session
            .api()
            .project_search(&ProjectSearchRequest {
                name: name_filter.to_string(),
            })
            .await
            .map_err(remote(RemoteCall::ProjectSearch))?
            .unwrap_or_default();

        let projects: Vec<ProjectSummary> = hits
            .into_iter()
            .map(|hit| ProjectSummary {
                id: hit.id,
                name: hit.name,
            })
            .collect();

        debug!(name_filter = %name_filter, matches = %projects.len(), "Projects search completed");

        Ok(ProjectsQueryResult {
            id: Utc::now().timestamp().to_string(),
            name_filter: name_filter.to_string(),
            projects,
        })
    }
}

/// Look up the core attributes of an existing CI.
#[derive(Debug, Clone, Copy, Default)]
pub struct CiLookup;

impl CiLookup {
    pub async fn read(&self, session: &Session, id: &str) -> ReconcileResult<Option<CiDetails>> {
        let record = session
            .api()
            .ci_read(id)
            .await
            .map_err(remote(RemoteCall::CiRead))?;

        match record {
            Some(record) => Ok(Some(CiDetails {
                id: id.to_string(),
                core: CiReconciler::decode_core(record)?,
            })),
            None => {
                debug!(ci_id = %id, "CI lookup found nothing");
                Ok(None)
            }
        }
    }
}

/// Look up an existing project by integer id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectLookup;

impl ProjectLookup {
    pub async fn read(
        &self,
        session: &Session,
        id: i64,
    ) -> ReconcileResult<Option<ProjectDetails>> {
        let record = session
            .api()
            .project_read(&id.to_string())
            .await
            .map_err(remote(RemoteCall::ProjectRead))?;

        Ok(record.map(|record| ProjectDetails {
            id,
            name: record.name,
            company_id: record.company_id,
            parent_id: record.parent_id.filter(|parent| *parent > 0),
        }))
    }
}
