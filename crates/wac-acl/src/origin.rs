//! Origin trust.
//!
//! A resource owner (an agent holding `Control`) may list applications they
//! trust in their profile:
//!
//! ```text
//! <owner> acl:trustedApp [ acl:origin <https://app.example>; acl:mode acl:Read ] .
//! ```
//!
//! Requests from such an origin are then trusted for the listed modes.
//! Profile lookups are best effort and never fail an authorization.

use std::collections::BTreeSet;

use futures::future::join_all;
use wac_core::uri::document_of;
use wac_core::vocab::acl;
use wac_core::{Graph, ResourceUri, Term};

use crate::fetch::PolicyFetcher;
use crate::matcher::applicable_authorizations;
use crate::mode::AccessMode;

/// Agents holding `Control` over the resource in `graph`.
pub fn owners(graph: &Graph, resource: &ResourceUri, directory: Option<&ResourceUri>) -> Vec<String> {
    let control = Term::iri(acl::CONTROL);
    let mut owners: Vec<String> = Vec::new();
    for auth in applicable_authorizations(graph, resource, directory) {
        if !graph.holds(auth, acl::MODE, &control) {
            continue;
        }
        for agent in graph.objects(auth, acl::AGENT).filter_map(Term::as_iri) {
            if !owners.iter().any(|o| o == agent) {
                owners.push(agent.to_string());
            }
        }
    }
    owners
}

/// Modes `owner`'s profile trusts `origin` for.
pub fn trusted_modes_in_profile(profile: &Graph, owner: &str, origin: &str) -> BTreeSet<AccessMode> {
    let origin = Term::iri(origin);
    profile
        .objects(&Term::iri(owner), acl::TRUSTED_APP)
        .filter(|app| profile.holds(app, acl::ORIGIN, &origin))
        .flat_map(|app| profile.objects(app, acl::MODE))
        .filter_map(Term::as_iri)
        .filter_map(AccessMode::from_iri)
        .collect()
}

/// Modes the resource owners trust `origin` for.
///
/// Owners' profiles are fetched concurrently; a profile that cannot be
/// fetched contributes nothing.
pub async fn trusted_modes_for_origin(
    fetcher: &PolicyFetcher,
    graph: &Graph,
    resource: &ResourceUri,
    directory: Option<&ResourceUri>,
    origin: &str,
) -> Vec<AccessMode> {
    let owners = owners(graph, resource, directory);
    if owners.is_empty() {
        return Vec::new();
    }

    let lookups = owners.iter().map(|owner| async move {
        match fetcher.graph(document_of(owner)).await {
            Ok(profile) => trusted_modes_in_profile(&profile.graph, owner, origin),
            Err(e) => {
                log::debug!("Could not fetch owner profile {owner}: {e}");
                BTreeSet::new()
            }
        }
    });

    let modes: BTreeSet<AccessMode> = join_all(lookups).await.into_iter().flatten().collect();
    if !modes.is_empty() {
        log::debug!("Origin {origin} trusted for {modes:?} on {resource}");
    }
    modes.into_iter().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use wac_core::graph::ntriples;
    use wac_core::{DocumentCache, MemoryStore};

    const POLICY: &str = "https://pod.example/a/.acl";
    const APP: &str = "https://app.example";

    fn uri(s: &str) -> ResourceUri {
        ResourceUri::parse(s).unwrap()
    }

    fn policy() -> Graph {
        ntriples::parse(
            concat!(
                "<#owner> <http://www.w3.org/ns/auth/acl#accessTo> <./> .\n",
                "<#owner> <http://www.w3.org/ns/auth/acl#agent> <https://alice.example/profile#me> .\n",
                "<#owner> <http://www.w3.org/ns/auth/acl#agent> <https://carol.example/profile#me> .\n",
                "<#owner> <http://www.w3.org/ns/auth/acl#mode> <http://www.w3.org/ns/auth/acl#Control> .\n",
                "<#reader> <http://www.w3.org/ns/auth/acl#accessTo> <./> .\n",
                "<#reader> <http://www.w3.org/ns/auth/acl#agent> <https://bob.example/profile#me> .\n",
                "<#reader> <http://www.w3.org/ns/auth/acl#mode> <http://www.w3.org/ns/auth/acl#Read> .\n",
            ),
            Some(POLICY),
        )
        .unwrap()
    }

    fn alice_profile() -> &'static str {
        concat!(
            "<#me> <http://www.w3.org/ns/auth/acl#trustedApp> _:app .\n",
            "_:app <http://www.w3.org/ns/auth/acl#origin> <https://app.example> .\n",
            "_:app <http://www.w3.org/ns/auth/acl#mode> <http://www.w3.org/ns/auth/acl#Read> .\n",
            "_:app <http://www.w3.org/ns/auth/acl#mode> <http://www.w3.org/ns/auth/acl#Append> .\n",
            "<#me> <http://www.w3.org/ns/auth/acl#trustedApp> _:other .\n",
            "_:other <http://www.w3.org/ns/auth/acl#origin> <https://other.example> .\n",
            "_:other <http://www.w3.org/ns/auth/acl#mode> <http://www.w3.org/ns/auth/acl#Write> .\n",
        )
    }

    #[test]
    fn test_owners_hold_control() {
        let owners = owners(&policy(), &uri("https://pod.example/a/"), None);
        assert_eq!(
            owners,
            vec![
                "https://alice.example/profile#me",
                "https://carol.example/profile#me"
            ]
        );
    }

    #[tokio::test]
    async fn test_trusted_modes_from_owner_profiles() {
        let store = MemoryStore::new();
        store
            .insert_ntriples("https://alice.example/profile", alice_profile())
            .unwrap();
        store.fail_with("https://carol.example/profile", "timeout");
        let fetcher = PolicyFetcher::new(
            Arc::new(store.clone()),
            DocumentCache::new(Duration::from_secs(10)),
        );

        let modes = trusted_modes_for_origin(
            &fetcher,
            &policy(),
            &uri("https://pod.example/a/"),
            None,
            APP,
        )
        .await;
        assert_eq!(modes, vec![AccessMode::Read, AccessMode::Append]);
        assert_eq!(store.fetch_count("https://bob.example/profile"), 0);
    }

    #[tokio::test]
    async fn test_no_owners_no_fetches() {
        let store = MemoryStore::new();
        let fetcher = PolicyFetcher::new(
            Arc::new(store.clone()),
            DocumentCache::new(Duration::from_secs(10)),
        );
        let modes = trusted_modes_for_origin(
            &fetcher,
            &Graph::new(),
            &uri("https://pod.example/a/"),
            None,
            APP,
        )
        .await;
        assert!(modes.is_empty());
        assert_eq!(store.total_fetches(), 0);
    }
}
