//! Start-up orchestration
//!
//! [`Bootstrapper::initialize`] runs once per cold start: it checks the
//! session, loads organizations, profile and plan, attributes legacy local
//! projects to the personal organization and picks the landing route.
//! [`Bootstrapper::resync`] refreshes the [`OrganizationCache`] on demand.

pub mod cache;
pub mod orchestrator;
pub mod promote;
pub mod sort;

pub use cache::{OrganizationCache, OrganizationData};
pub use orchestrator::{BootstrapOutcome, Bootstrapper, LOGIN_ROUTE, Landing, choose_landing};
pub use promote::{
    PROJECT_TYPE_PREFERENCE, ProjectTypePreference, PromotionFailure, PromotionReport,
    preferred_project_type, promote_local_projects,
};
pub use sort::sort_organizations;
