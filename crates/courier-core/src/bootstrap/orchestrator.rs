//! Application entry: session check, remote fetch, project reconciliation

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::cache::{OrganizationCache, OrganizationData};
use super::promote::{PromotionReport, ProjectTypePreference, preferred_project_type, promote_local_projects};
use super::sort::sort_organizations;
use crate::domain::features::FeaturesResponse;
use crate::domain::{
    CurrentPlan, FeatureList, Organization, OrganizationsResponse, UserProfile,
    is_scratchpad_organization_id,
};
use crate::error::{Error, Result};
use crate::remote::{ApiClient, ApiRequest, fetch, paths};
use crate::session::SessionProvider;
use crate::storage::DocumentStore;
use crate::sync::{ConflictResolver, SyncEngine, SyncEngineFactory};

pub const LOGIN_ROUTE: &str = "/auth/login";

const DEFAULT_PROMOTION_CONCURRENCY: usize = 4;

/// Where the UI goes after start-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "organizationId", rename_all = "camelCase")]
pub enum Landing {
    Organization(String),
    Login,
}

impl Landing {
    pub fn route(&self) -> String {
        match self {
            Landing::Organization(id) => format!("/organization/{}", id),
            Landing::Login => LOGIN_ROUTE.to_string(),
        }
    }
}

/// Personal organization if known, else the first one, else the login page
pub fn choose_landing(personal: Option<&Organization>, organizations: &[Organization]) -> Landing {
    personal
        .or_else(|| organizations.first())
        .map(|o| Landing::Organization(o.id.clone()))
        .unwrap_or(Landing::Login)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapOutcome {
    pub landing: Landing,
    /// Present when migrated projects were promoted to remote
    pub promotion: Option<PromotionReport>,
}

impl BootstrapOutcome {
    fn login() -> Self {
        Self {
            landing: Landing::Login,
            promotion: None,
        }
    }
}

/// Freshly fetched, not yet sorted
struct RemoteState {
    organizations: Vec<Organization>,
    user: UserProfile,
    current_plan: CurrentPlan,
}

pub struct Bootstrapper {
    session: Arc<dyn SessionProvider>,
    api: Arc<dyn ApiClient>,
    store: Arc<dyn DocumentStore>,
    sync_factory: Arc<dyn SyncEngineFactory>,
    resolver: Arc<dyn ConflictResolver>,
    cache: Arc<OrganizationCache>,
    sync_engine: OnceCell<Arc<dyn SyncEngine>>,
    promotion_concurrency: usize,
}

impl Bootstrapper {
    pub fn new(
        session: Arc<dyn SessionProvider>,
        api: Arc<dyn ApiClient>,
        store: Arc<dyn DocumentStore>,
        sync_factory: Arc<dyn SyncEngineFactory>,
        resolver: Arc<dyn ConflictResolver>,
    ) -> Self {
        Self {
            session,
            api,
            store,
            sync_factory,
            resolver,
            cache: Arc::new(OrganizationCache::new()),
            sync_engine: OnceCell::new(),
            promotion_concurrency: DEFAULT_PROMOTION_CONCURRENCY,
        }
    }

    pub fn with_promotion_concurrency(mut self, concurrency: usize) -> Self {
        self.promotion_concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &Arc<OrganizationCache> {
        &self.cache
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// The process-wide sync engine, created on first use
    pub async fn sync_engine(&self) -> Result<Arc<dyn SyncEngine>> {
        self.sync_engine
            .get_or_try_init(|| self.sync_factory.create(self.resolver.clone()))
            .await
            .cloned()
    }

    /// Run the start-up sequence and decide where the UI lands.
    ///
    /// Without a session this logs out and lands on the login page without
    /// touching the network. Remote failures surface as
    /// [`Error::Connectivity`], invariant failures as [`Error::Bootstrap`];
    /// in both cases the cache is left as it was.
    pub async fn initialize(&self) -> Result<BootstrapOutcome> {
        let Some(session_id) = self.session.current_session_id() else {
            info!("No active session, redirecting to login");
            if let Err(e) = self.session.logout().await {
                warn!(error = %e, "Failed to clear session");
            }
            self.cache.clear().await;
            return Ok(BootstrapOutcome::login());
        };

        let sync = self.sync_engine().await?;

        let remote = self.fetch_remote(&session_id).await?;
        let account_id = self.account_id()?;
        let organizations = sort_organizations(&account_id, remote.organizations);

        let personal = organizations
            .iter()
            .find(|o| o.is_home_of(&account_id))
            .cloned()
            .ok_or_else(|| {
                Error::Bootstrap("Could not find personal organization for user".to_string())
            })?;

        let mut promotion = None;
        if sync.should_migrate().await? {
            sync.migrate_local_projects_into_organization(&personal).await?;

            if preferred_project_type(self.store.as_ref()).await == ProjectTypePreference::Remote {
                match promote_local_projects(
                    self.api.as_ref(),
                    self.store.as_ref(),
                    sync.as_ref(),
                    &session_id,
                    &personal.id,
                    self.promotion_concurrency,
                )
                .await
                {
                    Ok(report) => promotion = Some(report),
                    Err(e) => warn!(error = %e, "Skipped promoting migrated projects"),
                }
            }
        }

        let landing = choose_landing(Some(&personal), &organizations);

        self.cache
            .replace(OrganizationData {
                organizations,
                user: Some(remote.user),
                current_plan: Some(remote.current_plan),
            })
            .await;

        info!(account_id = %account_id, landing = %landing.route(), "Bootstrap complete");
        Ok(BootstrapOutcome { landing, promotion })
    }

    /// Refresh the cache. Failures are logged and the cache keeps its contents.
    pub async fn resync(&self) {
        if let Err(e) = self.try_resync().await {
            warn!(error = %e, "Failed to sync organizations");
        }
    }

    async fn try_resync(&self) -> Result<()> {
        let session_id = self.session.current_session_id().ok_or(Error::NotAuthenticated)?;
        let remote = self.fetch_remote(&session_id).await?;
        let account_id = self.account_id()?;

        self.cache
            .replace(OrganizationData {
                organizations: sort_organizations(&account_id, remote.organizations),
                user: Some(remote.user),
                current_plan: Some(remote.current_plan),
            })
            .await;
        debug!("Organizations resynced");
        Ok(())
    }

    /// Feature flags for one organization. Never fails: the scratch
    /// organization and any fetch problem yield all flags disabled.
    pub async fn feature_flags(&self, organization_id: &str) -> FeatureList {
        if is_scratchpad_organization_id(organization_id) {
            return FeatureList::unreachable();
        }

        let request = ApiRequest::get(paths::organization_features(organization_id))
            .session(self.session.current_session_id().as_deref());

        match fetch::<FeaturesResponse>(self.api.as_ref(), request).await {
            Ok(Some(response)) => response.features,
            Ok(None) => {
                warn!(organization_id, "No feature flags returned");
                FeatureList::unreachable()
            }
            Err(e) => {
                warn!(organization_id, error = %e, "Failed to fetch feature flags");
                FeatureList::unreachable()
            }
        }
    }

    fn account_id(&self) -> Result<String> {
        self.session
            .current_account_id()
            .ok_or_else(|| Error::Bootstrap("Account is in an invalid state".to_string()))
    }

    /// Organizations, profile and plan, fetched one after another
    async fn fetch_remote(&self, session_id: &str) -> Result<RemoteState> {
        let organizations: OrganizationsResponse = self
            .fetch_required(paths::ORGANIZATIONS, session_id, "organizations")
            .await?;
        let user: UserProfile = self
            .fetch_required(paths::USER_PROFILE, session_id, "user profile")
            .await?;
        let current_plan: CurrentPlan = self
            .fetch_required(paths::CURRENT_PLAN, session_id, "current plan")
            .await?;

        Ok(RemoteState {
            organizations: organizations.organizations,
            user,
            current_plan,
        })
    }

    async fn fetch_required<T: DeserializeOwned>(
        &self,
        path: &str,
        session_id: &str,
        what: &str,
    ) -> Result<T> {
        let request = ApiRequest::get(path).session(Some(session_id));
        match fetch::<T>(self.api.as_ref(), request).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(Error::Bootstrap(format!("Failed to load {what}"))),
            Err(e) => Err(Error::Connectivity(format!(
                "Network connectivity issue: Failed to load {what}. {e}"
            ))),
        }
    }
}
