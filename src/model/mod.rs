//! Desired-state and mirrored-state records exchanged with the host.

pub mod ci;
pub mod project;

pub use ci::{CiCore, CiDetails, CiSpec, CiState, KeyDates, ServiceAt, ServiceCloud};
pub use project::{
    ProjectDetails, ProjectSpec, ProjectState, ProjectSummary, ProjectsQueryResult, WbsCodes,
};
