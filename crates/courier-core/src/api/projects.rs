//! Project routes

use serde::Serialize;

use super::AppContext;
use crate::error::Result;
use crate::reconcile::{UntrackedProject, list_untracked};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UntrackedProjects {
    pub untracked_projects: Vec<UntrackedProject>,
}

pub async fn untracked_projects_loader(ctx: &AppContext) -> Result<UntrackedProjects> {
    Ok(UntrackedProjects {
        untracked_projects: list_untracked(ctx.store()).await?,
    })
}
