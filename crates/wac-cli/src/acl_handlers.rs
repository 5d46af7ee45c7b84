//! Handlers for `wac check` and `wac chain`.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use wac_acl::{
    possible_acls, required_modes, AccessMode, AclChecker, Agent, AuthError, Method,
    RequestContext,
};
use wac_core::{AppState, ConfigProvider, Error, ResourceStore, ResourceUri, Result};

use crate::cli::CheckArgs;

/// What `wac check` reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Target resource.
    pub resource: String,
    /// Requesting agent, `anonymous` when unauthenticated.
    pub agent: String,
    /// Request method.
    pub method: String,
    /// Mode checked; `None` when the method needs no access.
    pub mode: Option<AccessMode>,
    /// Whether the target exists in the store.
    pub exists: bool,
    /// Whether access is granted.
    pub granted: bool,
    /// The denial, when not granted.
    pub error: Option<AuthError>,
}

/// Mode to check: explicit, otherwise the first mode the method requires.
///
/// # Errors
///
/// [`Error::InvalidData`] for an unknown mode name.
pub fn mode_for(explicit: Option<&str>, method: &Method) -> Result<Option<AccessMode>> {
    match explicit {
        Some(mode) => Ok(Some(mode.parse()?)),
        None => Ok(required_modes(method).first().copied()),
    }
}

/// `uri`, with a trailing `/` when it names a container addressed without one.
///
/// # Errors
///
/// [`Error::InvalidUri`] for a relative URI; store errors.
pub async fn container_aware_uri(store: &dyn ResourceStore, uri: &str) -> Result<String> {
    let resource = ResourceUri::parse(uri)?;
    if resource.is_container() || !store.is_container(&resource).await? {
        return Ok(uri.to_string());
    }
    log::debug!("{uri} is a container, checking {uri}/");
    Ok(format!("{uri}/"))
}

/// Decide `args` against `store`.
///
/// # Errors
///
/// Invalid input, resolution failures and store errors. A denial is a
/// report with `granted == false`, not an error.
pub async fn check<C: ConfigProvider>(
    state: &AppState<C>,
    store: Arc<dyn ResourceStore>,
    args: &CheckArgs,
) -> Result<CheckReport> {
    let method: Method = args.method.parse()?;
    let mode = mode_for(args.mode.as_deref(), &method)?;
    let agent = Agent::from_web_id(args.agent.as_deref());
    let request = RequestContext {
        origin: args.origin.clone(),
        on_behalf_of: args.on_behalf_of.clone(),
        slug: args.slug.clone(),
    };

    let target = container_aware_uri(store.as_ref(), &args.uri).await?;
    let checker = AclChecker::for_request(&target, Arc::clone(&store), state, &request)?;
    let exists = store.exists(checker.resource()).await?;

    let mut report = CheckReport {
        resource: checker.resource().to_string(),
        agent: agent.to_string(),
        method: method.to_string(),
        mode,
        exists,
        granted: true,
        error: None,
    };
    let Some(mode) = mode else {
        log::debug!("{method} needs no access mode");
        return Ok(report);
    };

    let decision = checker.decide(&agent, mode, &method, exists).await?;
    report.granted = decision.granted;
    report.error = decision.error;
    Ok(report)
}

/// Print a report as text or JSON.
///
/// # Errors
///
/// Serialization or write failures.
pub fn print_report(report: &CheckReport, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report)
            .map_err(|e| Error::invalid_data(e.to_string()))?;
        writeln!(out, "{text}")?;
        return Ok(());
    }

    let mode = report
        .mode
        .map_or_else(|| "no mode".to_string(), |m| m.to_string());
    match &report.error {
        None if report.granted => writeln!(
            out,
            "granted: {} {} {mode} for {}",
            report.method, report.resource, report.agent
        )?,
        Some(error) => writeln!(out, "denied: {error}")?,
        None => writeln!(out, "denied")?,
    }
    Ok(())
}

/// Print the candidate policy documents for `uri`, nearest first.
///
/// # Errors
///
/// [`Error::InvalidUri`] when `uri` is not absolute.
pub fn chain(uri: &str, suffix: &str, out: &mut impl Write) -> Result<()> {
    let resource = ResourceUri::parse(uri)?;
    for candidate in possible_acls(&resource, suffix).candidates() {
        writeln!(out, "{candidate}")?;
    }
    Ok(())
}
