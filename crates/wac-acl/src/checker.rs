//! Per-request authorization façade.
//!
//! An [`AclChecker`] is created for one request and one target resource. It
//! resolves the effective agent, finds the governing policies, expands
//! groups, works out origin trust, plans the checks the method requires and
//! runs them through a [`PolicyMatcher`]. Decisions are memoized per
//! `(agent, mode)` for the life of the checker; concurrent callers asking
//! the same question share one evaluation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use wac_core::traits::{DEFAULT_ACL_SUFFIX, DEFAULT_META_SUFFIX};
use wac_core::uri::document_of;
use wac_core::{
    AppState, ConfigProvider, DocumentCache, Error, ResourceStore, ResourceUri, Result,
};

use crate::candidates::{possible_acls, resolve_nearest, Resolution};
use crate::delegation::effective_agent;
use crate::fetch::PolicyFetcher;
use crate::groups::expand_groups;
use crate::matcher::{MatchRequest, PolicyMatcher, WacMatcher};
use crate::mode::{AccessMode, Agent, Method};
use crate::origin::trusted_modes_for_origin;
use crate::plan::{needs_parent, plan, EvaluationContext, Plan, RequestIntent, ResourceState};

// ============================================================================
// Request inputs
// ============================================================================

/// Request headers that influence authorization.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    /// `Origin` header.
    pub origin: Option<String>,
    /// `On-Behalf-Of` header.
    pub on_behalf_of: Option<String>,
    /// Decoded `Slug` header.
    pub slug: Option<String>,
}

/// Settings bound into one checker.
#[derive(Clone, Debug)]
pub struct CheckerOptions {
    /// Suffix naming policy documents.
    pub suffix: String,
    /// Suffix naming metadata documents.
    pub meta_suffix: String,
    /// Request origin; `None` unless strict origin checking is on.
    pub agent_origin: Option<String>,
    /// Origins trusted without policy statements.
    pub trusted_origins: Vec<String>,
    /// Claimed principal from `On-Behalf-Of`.
    pub on_behalf_of: Option<String>,
    /// Name requested for a new resource.
    pub slug: Option<String>,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_ACL_SUFFIX.to_string(),
            meta_suffix: DEFAULT_META_SUFFIX.to_string(),
            agent_origin: None,
            trusted_origins: Vec::new(),
            on_behalf_of: None,
            slug: None,
        }
    }
}

impl CheckerOptions {
    /// Bind configuration and request headers for `resource`.
    ///
    /// The trusted set is the resource's own origin, the configured list and,
    /// on multi-user servers, the server URI. Origin checking is skipped
    /// entirely unless the configuration asks for strict origins.
    pub fn from_config<C: ConfigProvider>(
        config: &C,
        resource: &ResourceUri,
        request: &RequestContext,
    ) -> Self {
        let strict = config.strict_origin();
        let mut trusted_origins = Vec::new();
        if strict {
            trusted_origins.push(resource.origin().to_string());
            trusted_origins.extend(config.trusted_origins().iter().cloned());
            if config.multiuser() {
                trusted_origins.push(config.server_uri().trim_end_matches('/').to_string());
            }
        }
        Self {
            suffix: config.acl_suffix().to_string(),
            meta_suffix: config.meta_suffix().to_string(),
            agent_origin: request.origin.clone().filter(|_| strict),
            trusted_origins,
            on_behalf_of: request.on_behalf_of.clone(),
            slug: request.slug.clone(),
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// A denial, as a handler should report it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthError {
    /// 401 for anonymous agents, 403 otherwise.
    pub status: u16,
    /// Human-readable reason.
    pub message: String,
}

impl AuthError {
    fn for_agent(agent: &Agent, resource: &ResourceUri, reason: &str) -> Self {
        if agent.is_anonymous() {
            Self {
                status: 401,
                message: "Unauthenticated".to_string(),
            }
        } else {
            Self {
                status: 403,
                message: format!(
                    "No permission: Access to {resource} denied for {agent}: {reason}"
                ),
            }
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

/// The memoized answer to one `(agent, mode)` question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Whether access is granted.
    pub granted: bool,
    /// Why not, when denied.
    pub error: Option<AuthError>,
}

impl Decision {
    fn grant() -> Self {
        Self {
            granted: true,
            error: None,
        }
    }

    fn deny(error: AuthError) -> Self {
        Self {
            granted: false,
            error: Some(error),
        }
    }
}

// ============================================================================
// Checker
// ============================================================================

type DecisionKey = (Agent, AccessMode);

/// Authorization engine bound to one request and one resource.
pub struct AclChecker {
    resource: ResourceUri,
    fetcher: PolicyFetcher,
    matcher: Arc<dyn PolicyMatcher>,
    options: CheckerOptions,
    decisions: Mutex<HashMap<DecisionKey, Arc<OnceCell<Decision>>>>,
}

impl fmt::Debug for AclChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AclChecker")
            .field("resource", &self.resource)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl AclChecker {
    /// Create a checker using the standard [`WacMatcher`].
    pub fn new(
        resource: ResourceUri,
        store: Arc<dyn ResourceStore>,
        cache: DocumentCache,
        options: CheckerOptions,
    ) -> Self {
        Self {
            resource,
            fetcher: PolicyFetcher::new(store, cache),
            matcher: Arc::new(WacMatcher::new()),
            options,
            decisions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a checker for a request, binding configuration, the shared
    /// cache and request headers.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUri`] when `resource` is not an absolute URI.
    pub fn for_request<C: ConfigProvider>(
        resource: &str,
        store: Arc<dyn ResourceStore>,
        state: &AppState<C>,
        request: &RequestContext,
    ) -> Result<Self> {
        let resource = ResourceUri::parse(resource)?;
        let options = CheckerOptions::from_config(state.config(), &resource, request);
        Ok(Self::new(resource, store, state.cache().clone(), options))
    }

    /// Replace the policy matcher.
    pub fn with_matcher(mut self, matcher: Arc<dyn PolicyMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// The target resource.
    pub fn resource(&self) -> &ResourceUri {
        &self.resource
    }

    /// Bound options.
    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    /// Whether `agent` may use `mode` on the resource with `method`.
    ///
    /// # Errors
    ///
    /// Resolution failures (no policy anywhere, fetch errors), invalid
    /// delegation and invalid creation names. Denials are not errors.
    pub async fn can(
        &self,
        agent: &Agent,
        mode: AccessMode,
        method: &Method,
        resource_exists: bool,
    ) -> Result<bool> {
        Ok(self.decide(agent, mode, method, resource_exists).await?.granted)
    }

    /// The denial for `(agent, mode)`, or `None` when granted.
    ///
    /// Reuses the decision from an earlier [`can`](Self::can) call; otherwise
    /// evaluates as a `GET` of an existing resource.
    ///
    /// # Errors
    ///
    /// As for [`can`](Self::can).
    pub async fn get_error(&self, agent: &Agent, mode: AccessMode) -> Result<Option<AuthError>> {
        Ok(self.decide(agent, mode, &Method::Get, true).await?.error)
    }

    /// The memoized decision for `(agent, mode)`.
    ///
    /// Errors are not memoized; a later call retries.
    ///
    /// # Errors
    ///
    /// As for [`can`](Self::can).
    pub async fn decide(
        &self,
        agent: &Agent,
        mode: AccessMode,
        method: &Method,
        resource_exists: bool,
    ) -> Result<Decision> {
        let cell = {
            let mut decisions = self.decisions.lock().await;
            Arc::clone(decisions.entry((agent.clone(), mode)).or_default())
        };
        cell.get_or_try_init(|| self.evaluate(agent, mode, method, resource_exists))
            .await
            .cloned()
    }

    /// Resolve the policies that govern the resource for `method`.
    ///
    /// # Errors
    ///
    /// [`Error::ResolutionExhausted`] or store failures.
    pub async fn resolve(&self, method: &Method) -> Result<Resolution> {
        let suffix = &self.options.suffix;
        let chain = possible_acls(&self.resource, suffix);
        let need_parent = needs_parent(
            method,
            self.resource.is_container(),
            self.resource.has_suffix(suffix),
        );
        resolve_nearest(&self.fetcher, &chain, need_parent).await
    }

    fn check_creation_name(&self, method: &Method) -> Result<()> {
        if *method != Method::Post {
            return Ok(());
        }
        let Some(slug) = self.options.slug.as_deref() else {
            return Ok(());
        };
        if slug.ends_with(&self.options.suffix) || slug.ends_with(&self.options.meta_suffix) {
            return Err(Error::invalid_creation_name(format!(
                "{slug} names an auxiliary resource"
            )));
        }
        Ok(())
    }

    async fn evaluate(
        &self,
        session: &Agent,
        mode: AccessMode,
        method: &Method,
        resource_exists: bool,
    ) -> Result<Decision> {
        self.check_creation_name(method)?;

        let fetcher = &self.fetcher;
        let agent = effective_agent(
            session,
            self.options.on_behalf_of.as_deref(),
            |web_id| async move {
                fetcher
                    .graph(document_of(&web_id))
                    .await
                    .map(|profile| profile.graph.clone())
            },
        )
        .await?;

        let Resolution {
            governed,
            doc: policy,
            parent,
        } = self.resolve(method).await?;

        let groups = expand_groups(
            fetcher,
            std::iter::once(&policy.graph).chain(parent.as_ref().map(|p| &p.graph)),
        )
        .await;
        let directory = policy.directory();

        let origin = self.options.agent_origin.as_deref();
        let origin_trusted_modes = match origin {
            Some(origin) if !self.options.trusted_origins.iter().any(|t| t == origin) => {
                trusted_modes_for_origin(
                    fetcher,
                    &policy.graph,
                    &governed,
                    directory.as_ref(),
                    origin,
                )
                .await
            }
            _ => Vec::new(),
        };

        let state = ResourceState {
            exists: resource_exists,
            is_container: self.resource.is_container(),
            is_policy_document: self.resource.has_suffix(&self.options.suffix),
            inherited: policy.is_inherited,
        };
        let intent = RequestIntent {
            method: method.clone(),
            mode,
        };

        let checks = match plan(&intent, &state) {
            Plan::Deny(reason) => {
                log::debug!("{method} of {} denied without evaluation", self.resource);
                let error = AuthError::for_agent(&agent, &self.resource, reason);
                return Ok(Decision::deny(error));
            }
            Plan::Checks(checks) => checks,
        };

        let container = policy.container();
        let target_container = governed.container();
        let parent_directory = parent.as_ref().and_then(|p| p.directory());
        for check in &checks {
            let (graph, resource, directory, acl_document) = match check.context {
                EvaluationContext::Resource => {
                    (&policy.graph, &governed, directory.as_ref(), &policy.document)
                }
                EvaluationContext::ContainerAccessTo => {
                    (&policy.graph, &container, None, &policy.document)
                }
                EvaluationContext::Parent => {
                    let parent = parent.as_ref().ok_or_else(|| Error::ResolutionExhausted {
                        resource: target_container.to_string(),
                        searched: Vec::new(),
                    })?;
                    (
                        &parent.graph,
                        &target_container,
                        parent_directory.as_ref(),
                        &parent.document,
                    )
                }
            };
            let request = MatchRequest {
                graph,
                groups: &groups,
                resource,
                directory,
                acl_document,
                agent: &agent,
                modes: &check.modes,
                origin,
                trusted_origins: &self.options.trusted_origins,
                origin_trusted_modes: &origin_trusted_modes,
            };
            if let Some(reason) = self.matcher.access_denied(&request) {
                log::debug!(
                    "{mode} on {} denied to {agent} in {:?} context: {reason}",
                    self.resource,
                    check.context
                );
                let error = AuthError::for_agent(&agent, &self.resource, &reason);
                return Ok(Decision::deny(error));
            }
        }

        log::debug!("{mode} on {} granted to {agent}", self.resource);
        Ok(Decision::grant())
    }
}
