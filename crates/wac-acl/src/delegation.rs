//! Delegated identity.
//!
//! A secretary agent may act for a principal by sending the principal's
//! WebID in an `On-Behalf-Of` header. The claim is honoured only when the
//! principal's profile says `<principal> acl:delegates <secretary>`.
//! Otherwise the request falls back to the secretary's own identity.

use std::future::Future;

use wac_core::vocab::acl;
use wac_core::{Error, Graph, Result, Term};

use crate::mode::Agent;

/// Strip optional angle brackets and whitespace from a header value.
pub fn debracket(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('<')
        .and_then(|v| v.strip_suffix('>'))
        .unwrap_or(value)
        .trim()
}

/// Whether `profile` says `principal` delegates to `secretary`.
pub fn delegates(profile: &Graph, principal: &str, secretary: &str) -> bool {
    profile.holds(
        &Term::iri(principal),
        acl::DELEGATES,
        &Term::iri(secretary),
    )
}

/// Resolve the agent a request acts as.
///
/// `fetch_profile` loads the principal's profile graph from its WebID. A
/// profile that cannot be fetched, or that does not confirm the
/// delegation, downgrades to the session agent.
///
/// # Errors
///
/// [`Error::InvalidDelegation`] when a claim arrives without an
/// authenticated session agent.
pub async fn effective_agent<F, Fut>(
    session: &Agent,
    claimed: Option<&str>,
    fetch_profile: F,
) -> Result<Agent>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Graph>>,
{
    let Some(principal) = claimed.map(debracket).filter(|c| !c.is_empty()) else {
        return Ok(session.clone());
    };
    let Some(secretary) = session.web_id() else {
        return Err(Error::invalid_delegation(format!(
            "On-Behalf-Of {principal} requires an authenticated agent"
        )));
    };

    match fetch_profile(principal.to_string()).await {
        Ok(profile) if delegates(&profile, principal, secretary) => {
            log::debug!("{secretary} acts on behalf of {principal}");
            Ok(Agent::WebId(principal.to_string()))
        }
        Ok(_) => {
            log::warn!("{principal} does not delegate to {secretary}; using {secretary}");
            Ok(session.clone())
        }
        Err(e) => {
            log::warn!("Could not verify delegation from {principal}: {e}");
            Ok(session.clone())
        }
    }
}
