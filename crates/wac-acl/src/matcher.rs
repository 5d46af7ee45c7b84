//! Policy statement matching.
//!
//! A [`PolicyMatcher`] decides whether one policy graph grants a set of modes
//! to an agent for a resource. The engine calls it once per planned check;
//! [`WacMatcher`] is the standard Web Access Control interpretation.

use wac_core::vocab::{acl, foaf};
use wac_core::{Graph, ResourceUri, Term};

use crate::groups::GroupMembers;
use crate::mode::{AccessMode, Agent};

/// Denial reason when the agent is not covered by any authorization.
pub const USER_UNAUTHORIZED: &str = "User Unauthorized";
/// Denial reason when the agent is covered but the request origin is not.
pub const ORIGIN_UNAUTHORIZED: &str = "Origin Unauthorized";
/// Denial reason when some but not all required modes are granted.
pub const MODES_NOT_GRANTED: &str = "All Required Access Modes Not Granted";
/// Denial reason when no authorization applies at all.
pub const FORBIDDEN: &str = "Forbidden";

/// Everything a matcher needs for one check.
#[derive(Clone, Copy, Debug)]
pub struct MatchRequest<'a> {
    /// Statements of the policy document alone.
    pub graph: &'a Graph,
    /// Group documents the policy references.
    pub groups: &'a GroupMembers,
    /// Resource access is requested to (matched by `acl:accessTo`).
    pub resource: &'a ResourceUri,
    /// Container whose `acl:default` statements apply, for inherited policy.
    ///
    /// When set, only default authorizations are considered.
    pub directory: Option<&'a ResourceUri>,
    /// Where the policy was read from.
    pub acl_document: &'a ResourceUri,
    /// The acting agent.
    pub agent: &'a Agent,
    /// Modes that must all be granted.
    pub modes: &'a [AccessMode],
    /// Request origin, when origin checking applies.
    pub origin: Option<&'a str>,
    /// Origins trusted without policy statements.
    pub trusted_origins: &'a [String],
    /// Modes the origin is trusted for by the resource owners.
    pub origin_trusted_modes: &'a [AccessMode],
}

/// Decides whether a policy grants access.
pub trait PolicyMatcher: Send + Sync {
    /// `None` when every requested mode is granted, otherwise the reason.
    fn access_denied(&self, request: &MatchRequest<'_>) -> Option<String>;
}

/// Authorizations that apply to the request's resource.
///
/// Inherited policy is read through `acl:default` (and the legacy
/// `acl:defaultForNew`) on the directory; own policy through `acl:accessTo`.
pub(crate) fn applicable_authorizations<'a>(
    graph: &'a Graph,
    resource: &ResourceUri,
    directory: Option<&ResourceUri>,
) -> Vec<&'a Term> {
    match directory {
        None => graph
            .subjects(acl::ACCESS_TO, &Term::iri(resource.as_str()))
            .collect(),
        Some(directory) => {
            let dir = Term::iri(directory.as_str());
            let mut auths: Vec<&Term> = graph.subjects(acl::DEFAULT, &dir).collect();
            for auth in graph.subjects(acl::DEFAULT_FOR_NEW, &dir) {
                if !auths.contains(&auth) {
                    auths.push(auth);
                }
            }
            auths
        }
    }
}

/// The standard WAC matcher.
///
/// An authorization covers the agent when it is public (`foaf:Agent`), open
/// to any authenticated agent, names the agent, or names a group listing
/// the agent with `vcard:hasMember`. With a request origin that is not
/// trusted, the authorization must also name the origin, unless the owners
/// trust it for some modes. `Write` satisfies a required `Append`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WacMatcher;

#[derive(Debug, PartialEq, Eq)]
enum Allowance {
    Mode(String),
    Refused(&'static str),
}

impl WacMatcher {
    /// Create the matcher.
    pub fn new() -> Self {
        Self
    }

    fn allowances(&self, request: &MatchRequest<'_>) -> Vec<Allowance> {
        let graph = request.graph;
        let origin = request
            .origin
            .filter(|o| !request.trusted_origins.iter().any(|t| t.as_str() == *o));
        let origin_modes: Vec<&str> = request
            .origin_trusted_modes
            .iter()
            .map(|m| m.iri())
            .collect();

        let mut allowed = Vec::new();
        let mut push = |entry: Allowance| {
            if !allowed.contains(&entry) {
                allowed.push(entry);
            }
        };

        for auth in applicable_authorizations(graph, request.resource, request.directory) {
            let refusal = agent_and_origin_refusal(
                graph,
                request.groups,
                auth,
                request.agent,
                origin,
                &origin_modes,
            );
            if let Some(reason) = refusal {
                push(Allowance::Refused(reason));
                continue;
            }
            for mode in graph.objects(auth, acl::MODE).filter_map(Term::as_iri) {
                if origin_modes.is_empty() || origin_modes.contains(&mode) {
                    push(Allowance::Mode(mode.to_string()));
                }
            }
        }
        allowed
    }
}

impl PolicyMatcher for WacMatcher {
    fn access_denied(&self, request: &MatchRequest<'_>) -> Option<String> {
        let allowed = self.allowances(request);
        let grants = |iri: &str| {
            allowed
                .iter()
                .any(|a| matches!(a, Allowance::Mode(m) if m == iri))
        };

        let mut denied = None;
        for mode in request.modes {
            let ok = grants(mode.iri())
                || (*mode == AccessMode::Append && grants(AccessMode::Write.iri()));
            if ok {
                continue;
            }
            let reason = match allowed.first() {
                Some(Allowance::Refused(reason)) => *reason,
                Some(Allowance::Mode(_)) => MODES_NOT_GRANTED,
                None => FORBIDDEN,
            };
            log::debug!(
                "{mode} on {} denied to {}: {reason}",
                request.resource,
                request.agent
            );
            denied = Some(reason.to_string());
        }
        denied
    }
}

fn agent_and_origin_refusal(
    graph: &Graph,
    groups: &GroupMembers,
    auth: &Term,
    agent: &Agent,
    origin: Option<&str>,
    origin_modes: &[&str],
) -> Option<&'static str> {
    if graph.holds(auth, acl::AGENT_CLASS, &Term::iri(foaf::AGENT)) {
        return None;
    }
    if !agent_or_group_ok(graph, groups, auth, agent) {
        return Some(USER_UNAUTHORIZED);
    }
    let Some(origin) = origin else {
        return None;
    };
    if !origin_modes.is_empty() || graph.holds(auth, acl::ORIGIN, &Term::iri(origin)) {
        return None;
    }
    Some(ORIGIN_UNAUTHORIZED)
}

fn agent_or_group_ok(graph: &Graph, groups: &GroupMembers, auth: &Term, agent: &Agent) -> bool {
    let Some(web_id) = agent.web_id() else {
        return false;
    };
    if graph.holds(auth, acl::AGENT_CLASS, &Term::iri(acl::AUTHENTICATED_AGENT)) {
        return true;
    }
    let agent_term = Term::iri(web_id);
    if graph.holds(auth, acl::AGENT, &agent_term) {
        return true;
    }
    graph
        .objects(auth, acl::AGENT_GROUP)
        .filter_map(Term::as_iri)
        .any(|group| groups.is_member(group, web_id))
}
