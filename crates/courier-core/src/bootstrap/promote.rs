//! Promotion of local-only projects to remote-backed ones
//!
//! Runs after legacy projects are migrated into the personal organization,
//! when the user prefers remote projects. Each conversion is independent: a
//! failure is recorded in the [`PromotionReport`] and the project stays
//! local in the organization. The sync engine decides which remote link is
//! kept before the project record is written.

use futures_util::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::Project;
use crate::error::{Error, Result};
use crate::remote::{ApiClient, ApiRequest, fetch, paths};
use crate::storage::{DocumentStore, ProjectFilter};
use crate::sync::SyncEngine;

/// Preference key recording the project type the user last chose
pub const PROJECT_TYPE_PREFERENCE: &str = "prefers-project-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectTypePreference {
    #[default]
    Local,
    Remote,
}

impl ProjectTypePreference {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Stored preference, `Local` when unset or unreadable
pub async fn preferred_project_type(store: &dyn DocumentStore) -> ProjectTypePreference {
    match store.preference(PROJECT_TYPE_PREFERENCE).await {
        Ok(Some(value)) => ProjectTypePreference::parse(&value).unwrap_or_default(),
        Ok(None) => ProjectTypePreference::default(),
        Err(e) => {
            warn!(error = %e, "Failed to read project type preference");
            ProjectTypePreference::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionFailure {
    pub project_id: String,
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromotionReport {
    /// Ids of projects now linked to a remote project
    pub promoted: Vec<String>,
    pub failed: Vec<PromotionFailure>,
}

impl PromotionReport {
    pub fn attempted(&self) -> usize {
        self.promoted.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CreatedRemoteProject {
    id: String,
}

/// Convert every local-only project in `organization_id` into a remote project
pub async fn promote_local_projects(
    api: &dyn ApiClient,
    store: &dyn DocumentStore,
    sync: &dyn SyncEngine,
    session_id: &str,
    organization_id: &str,
    concurrency: usize,
) -> Result<PromotionReport> {
    let candidates: Vec<Project> = store
        .find_projects(&ProjectFilter::parent_is(organization_id).local_only())
        .await?
        .into_iter()
        .filter(|p| !p.is_scratchpad())
        .collect();

    if candidates.is_empty() {
        return Ok(PromotionReport::default());
    }

    let results = stream::iter(candidates)
        .map(|project| async move {
            let outcome = promote_one(api, store, sync, session_id, organization_id, &project).await;
            (project, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    let mut report = PromotionReport::default();
    for (project, outcome) in results {
        match outcome {
            Ok(()) => report.promoted.push(project.id),
            Err(e) => {
                warn!(project_id = %project.id, error = %e, "Failed to promote project to remote");
                report.failed.push(PromotionFailure {
                    project_id: project.id,
                    name: project.name,
                    error: e.to_string(),
                });
            }
        }
    }
    report.promoted.sort();

    info!(
        organization_id,
        promoted = report.promoted.len(),
        failed = report.failed.len(),
        "Promoted local projects"
    );
    Ok(report)
}

async fn promote_one(
    api: &dyn ApiClient,
    store: &dyn DocumentStore,
    sync: &dyn SyncEngine,
    session_id: &str,
    organization_id: &str,
    project: &Project,
) -> Result<()> {
    let request = ApiRequest::post(
        paths::team_projects(organization_id),
        json!({ "name": project.name }),
    )
    .session(Some(session_id));

    let created: CreatedRemoteProject = fetch(api, request)
        .await?
        .ok_or_else(|| Error::Other("Remote project was not created".to_string()))?;

    let mut linked = project.clone();
    linked.link_remote(created.id);
    if let Some(remote_id) = sync.track_remote_project(&linked).await? {
        linked.link_remote(remote_id);
    }
    store.upsert_project(&linked).await?;
    Ok(())
}
