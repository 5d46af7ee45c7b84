//! End-to-end authorization scenarios against an in-memory pod.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use wac_acl::{possible_acls, AccessMode, AclChecker, Agent, CheckerOptions, Method};
use wac_core::{DocumentCache, Error, MemoryStore, ResourceUri};

const ACL: &str = "http://www.w3.org/ns/auth/acl#";
const ALICE: &str = "https://alice.example/profile#me";
const BOB: &str = "https://bob.example/profile#me";
const MALLORY: &str = "https://mallory.example/profile#me";
const APP: &str = "https://app.example";

// ============================================================================
// Fixtures
// ============================================================================

/// One `acl:Authorization`, rendered as N-Triples relative to its document.
struct Rule {
    name: &'static str,
    lines: Vec<String>,
}

impl Rule {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            lines: Vec::new(),
        }
    }

    fn with(mut self, predicate: &str, object: &str) -> Self {
        self.lines
            .push(format!("<#{}> <{ACL}{predicate}> <{object}> .", self.name));
        self
    }

    fn access_to(self, target: &str) -> Self {
        self.with("accessTo", target)
    }

    fn default(self, target: &str) -> Self {
        self.with("default", target)
    }

    fn default_for_new(self, target: &str) -> Self {
        self.with("defaultForNew", target)
    }

    fn agent(self, web_id: &str) -> Self {
        self.with("agent", web_id)
    }

    fn group(self, group: &str) -> Self {
        self.with("agentGroup", group)
    }

    fn origin(self, origin: &str) -> Self {
        self.with("origin", origin)
    }

    fn modes(mut self, modes: &[AccessMode]) -> Self {
        for mode in modes {
            self = self.with("mode", mode.iri());
        }
        self
    }
}

fn policy(rules: Vec<Rule>) -> String {
    rules
        .into_iter()
        .flat_map(|r| r.lines)
        .collect::<Vec<_>>()
        .join("\n")
}

struct Pod {
    store: MemoryStore,
    cache: DocumentCache,
}

impl Pod {
    fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            cache: DocumentCache::new(Duration::from_secs(10)),
        }
    }

    fn acl(&self, uri: &str, rules: Vec<Rule>) -> &Self {
        self.store.insert_ntriples(uri, &policy(rules)).unwrap();
        self
    }

    fn checker(&self, resource: &str) -> AclChecker {
        self.checker_with(resource, CheckerOptions::default())
    }

    fn checker_with(&self, resource: &str, options: CheckerOptions) -> AclChecker {
        AclChecker::new(
            ResourceUri::parse(resource).unwrap(),
            Arc::new(self.store.clone()),
            self.cache.clone(),
            options,
        )
    }
}

/// `/a/b/.acl` lets Alice read everything under `/a/b/`.
fn inherited_read_pod() -> Pod {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![Rule::new("root")
            .access_to("https://pod.example/")
            .default("https://pod.example/")
            .agent(BOB)
            .modes(&[AccessMode::Control])],
    )
    .acl(
        "https://pod.example/a/b/.acl",
        vec![Rule::new("readers")
            .access_to("./")
            .default_for_new("./")
            .agent(ALICE)
            .modes(&[AccessMode::Read])],
    );
    pod
}

// ============================================================================
// Candidate chains
// ============================================================================

#[test]
fn test_chain_ends_at_root_policy() {
    let resource = ResourceUri::parse("https://pod.example/a/b/c.ttl").unwrap();
    let chain = possible_acls(&resource, ".acl");
    assert_eq!(chain.nearest().as_str(), "https://pod.example/a/b/c.ttl.acl");
    assert_eq!(chain.root().as_str(), "https://pod.example/.acl");
    assert_eq!(chain.len(), 4);
}

// ============================================================================
// Decisions
// ============================================================================

#[tokio::test]
async fn test_repeated_questions_do_not_refetch() {
    let pod = inherited_read_pod();
    let checker = pod.checker("https://pod.example/a/b/c.ttl");
    let alice = Agent::from(ALICE);

    let first = checker
        .can(&alice, AccessMode::Read, &Method::Get, true)
        .await
        .unwrap();
    let fetches = pod.store.total_fetches();
    for _ in 0..3 {
        let again = checker
            .can(&alice, AccessMode::Read, &Method::Get, true)
            .await
            .unwrap();
        assert_eq!(again, first);
    }
    assert_eq!(pod.store.total_fetches(), fetches);
}

#[tokio::test]
async fn test_inherited_read_is_granted() {
    let pod = inherited_read_pod();
    let checker = pod.checker("https://pod.example/a/b/c.ttl");

    assert!(checker
        .can(&Agent::from(ALICE), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());

    let resolution = checker.resolve(&Method::Get).await.unwrap();
    assert!(resolution.doc.is_inherited);
    assert_eq!(
        resolution.doc.document.as_str(),
        "https://pod.example/a/b/.acl"
    );
    assert!(resolution.parent.is_none());
}

#[tokio::test]
async fn test_inherited_write_is_denied_with_403() {
    let pod = inherited_read_pod();
    let checker = pod.checker("https://pod.example/a/b/c.ttl");
    let alice = Agent::from(ALICE);

    assert!(!checker
        .can(&alice, AccessMode::Write, &Method::Get, true)
        .await
        .unwrap());
    let error = checker
        .get_error(&alice, AccessMode::Write)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(error.status, 403);
    assert!(error.message.ends_with("All Required Access Modes Not Granted"));
}

#[tokio::test]
async fn test_anonymous_denial_is_401() {
    let pod = inherited_read_pod();
    let checker = pod.checker("https://pod.example/a/b/c.ttl");

    let error = checker
        .get_error(&Agent::Anonymous, AccessMode::Read)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(error.status, 401);

    let json = serde_json::to_value(&error).unwrap();
    assert_eq!(json["status"], 401);
}

#[tokio::test]
async fn test_delete_requires_write_on_parent() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![Rule::new("root")
            .default("https://pod.example/")
            .agent(BOB)
            .modes(&[AccessMode::Control])],
    )
    .acl(
        "https://pod.example/a/b/.acl",
        vec![Rule::new("folder")
            .access_to("./")
            .agent(ALICE)
            .modes(&[AccessMode::Read])],
    )
    .acl(
        "https://pod.example/a/b/c.ttl.acl",
        vec![Rule::new("doc")
            .access_to("c.ttl")
            .agent(ALICE)
            .modes(&[AccessMode::Read, AccessMode::Write])],
    );
    pod.store.add_resource("https://pod.example/a/b/c.ttl");
    let alice = Agent::from(ALICE);

    let reader = pod.checker("https://pod.example/a/b/c.ttl");
    assert!(reader
        .can(&alice, AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());

    let deleter = pod.checker("https://pod.example/a/b/c.ttl");
    assert!(!deleter
        .can(&alice, AccessMode::Write, &Method::Delete, true)
        .await
        .unwrap());

    let resolution = deleter.resolve(&Method::Delete).await.unwrap();
    let parent = resolution.parent.unwrap();
    assert_eq!(parent.document.as_str(), "https://pod.example/a/b/.acl");
    assert!(!parent.is_inherited);
}

#[tokio::test]
async fn test_delete_with_own_read_only_policy_is_denied() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/a/b/.acl",
        vec![Rule::new("folder")
            .access_to("./")
            .default("./")
            .agent(ALICE)
            .modes(&[AccessMode::Read, AccessMode::Write])],
    )
    .acl(
        "https://pod.example/a/b/c.ttl.acl",
        vec![Rule::new("doc")
            .access_to("c.ttl")
            .agent(ALICE)
            .modes(&[AccessMode::Read])],
    );
    let alice = Agent::from(ALICE);

    let checker = pod.checker("https://pod.example/a/b/c.ttl");
    assert!(!checker
        .can(&alice, AccessMode::Write, &Method::Delete, true)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_delete_granted_with_write_on_both_levels() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/a/b/.acl",
        vec![Rule::new("folder")
            .access_to("./")
            .agent(ALICE)
            .modes(&[AccessMode::Read, AccessMode::Write])],
    )
    .acl(
        "https://pod.example/a/b/c.ttl.acl",
        vec![Rule::new("doc")
            .access_to("c.ttl")
            .agent(ALICE)
            .modes(&[AccessMode::Write])],
    );

    let checker = pod.checker("https://pod.example/a/b/c.ttl");
    assert!(checker
        .can(&Agent::from(ALICE), AccessMode::Write, &Method::Delete, true)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_delete_of_missing_resource_is_denied() {
    let pod = inherited_read_pod();
    let checker = pod.checker("https://pod.example/a/b/gone.ttl");
    assert!(!checker
        .can(&Agent::from(BOB), AccessMode::Write, &Method::Delete, false)
        .await
        .unwrap());
    let error = checker
        .get_error(&Agent::from(BOB), AccessMode::Write)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(error.status, 403);
}

#[tokio::test]
async fn test_create_needs_append_not_write() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/a/.acl",
        vec![Rule::new("appenders")
            .access_to("./")
            .default("./")
            .agent(ALICE)
            .modes(&[AccessMode::Append])],
    );
    let alice = Agent::from(ALICE);

    let create = pod.checker("https://pod.example/a/new.ttl");
    assert!(create
        .can(&alice, AccessMode::Append, &Method::Put, false)
        .await
        .unwrap());

    let overwrite = pod.checker("https://pod.example/a/new.ttl");
    assert!(!overwrite
        .can(&alice, AccessMode::Write, &Method::Put, false)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_create_without_container_append_is_denied() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/a/.acl",
        vec![Rule::new("defaults-only")
            .default("./")
            .agent(ALICE)
            .modes(&[AccessMode::Append])],
    );

    let checker = pod.checker("https://pod.example/a/new.ttl");
    assert!(!checker
        .can(&Agent::from(ALICE), AccessMode::Append, &Method::Put, false)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_policy_document_requires_control() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/a/b/c.ttl.acl",
        vec![
            Rule::new("owner")
                .access_to("c.ttl")
                .agent(ALICE)
                .modes(&[AccessMode::Control]),
            Rule::new("editor")
                .access_to("c.ttl")
                .agent(BOB)
                .modes(&[AccessMode::Read, AccessMode::Write]),
        ],
    );

    for mode in AccessMode::ALL {
        let checker = pod.checker("https://pod.example/a/b/c.ttl.acl");
        assert!(checker
            .can(&Agent::from(ALICE), mode, &Method::Get, true)
            .await
            .unwrap());
        assert!(!checker
            .can(&Agent::from(BOB), mode, &Method::Get, true)
            .await
            .unwrap());
    }
}

// ============================================================================
// Groups, origins and delegation
// ============================================================================

#[tokio::test]
async fn test_group_members_are_granted() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![Rule::new("team")
            .access_to("./")
            .default("./")
            .group("https://pod.example/groups#team")
            .modes(&[AccessMode::Read])],
    );
    pod.store
        .insert_ntriples(
            "https://pod.example/groups",
            "<#team> <http://www.w3.org/2006/vcard/ns#hasMember> <https://bob.example/profile#me> .",
        )
        .unwrap();

    let checker = pod.checker("https://pod.example/notes");
    assert!(checker
        .can(&Agent::from(BOB), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
    assert!(!checker
        .can(&Agent::from(ALICE), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_unreachable_group_contributes_no_members() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![Rule::new("team")
            .default("./")
            .group("https://groups.example/team#all")
            .modes(&[AccessMode::Read])],
    );
    pod.store
        .fail_with("https://groups.example/team", "connection refused");

    let checker = pod.checker("https://pod.example/notes");
    assert!(!checker
        .can(&Agent::from(BOB), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
}

/// Root policy granting Read to a remote group whose document also carries
/// an authorization of its own for Mallory.
fn rogue_group_pod() -> Pod {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![
            Rule::new("owner")
                .access_to("./")
                .default("./")
                .agent(ALICE)
                .modes(&[AccessMode::Read, AccessMode::Write]),
            Rule::new("team")
                .default("./")
                .group("https://groups.example/team#all")
                .modes(&[AccessMode::Read]),
        ],
    );
    let group = format!(
        "<#all> <http://www.w3.org/2006/vcard/ns#hasMember> <{BOB}> .\n{}",
        policy(vec![Rule::new("rogue")
            .access_to("https://pod.example/notes")
            .default("https://pod.example/")
            .agent(MALLORY)
            .modes(&[AccessMode::Write, AccessMode::Control])])
    );
    pod.store
        .insert_ntriples("https://groups.example/team", &group)
        .unwrap();
    pod.store
        .insert_ntriples(
            "https://mallory.example/profile",
            concat!(
                "<#me> <http://www.w3.org/ns/auth/acl#trustedApp> _:app .\n",
                "_:app <http://www.w3.org/ns/auth/acl#origin> <https://app.example> .\n",
                "_:app <http://www.w3.org/ns/auth/acl#mode> <http://www.w3.org/ns/auth/acl#Read> .\n",
            ),
        )
        .unwrap();
    pod
}

#[tokio::test]
async fn test_group_document_cannot_grant_authorizations() {
    let pod = rogue_group_pod();
    let checker = pod.checker("https://pod.example/notes");

    assert!(!checker
        .can(&Agent::from(MALLORY), AccessMode::Write, &Method::Put, true)
        .await
        .unwrap());
    assert!(!checker
        .can(&Agent::from(MALLORY), AccessMode::Control, &Method::Get, true)
        .await
        .unwrap());
    assert!(checker
        .can(&Agent::from(BOB), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_group_document_cannot_add_owners() {
    let pod = rogue_group_pod();
    let checker = pod.checker_with("https://pod.example/notes", strict(APP));

    let error = checker
        .get_error(&Agent::from(ALICE), AccessMode::Read)
        .await
        .unwrap()
        .unwrap();
    assert!(error.message.ends_with("Origin Unauthorized"));
    assert_eq!(pod.store.fetch_count("https://mallory.example/profile"), 0);
}

fn strict(origin: &str) -> CheckerOptions {
    CheckerOptions {
        agent_origin: Some(origin.to_string()),
        trusted_origins: vec!["https://pod.example".to_string()],
        ..CheckerOptions::default()
    }
}

#[tokio::test]
async fn test_untrusted_origin_is_refused() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![Rule::new("alice")
            .default("./")
            .agent(ALICE)
            .modes(&[AccessMode::Read])],
    );
    let alice = Agent::from(ALICE);

    let same_origin = pod.checker_with("https://pod.example/doc", strict("https://pod.example"));
    assert!(same_origin
        .can(&alice, AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());

    let foreign = pod.checker_with("https://pod.example/doc", strict(APP));
    assert!(!foreign
        .can(&alice, AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
    let error = foreign
        .get_error(&alice, AccessMode::Read)
        .await
        .unwrap()
        .unwrap();
    assert!(error.message.ends_with("Origin Unauthorized"));
}

#[tokio::test]
async fn test_origin_named_in_policy_is_accepted() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![Rule::new("alice")
            .default("./")
            .agent(ALICE)
            .origin(APP)
            .modes(&[AccessMode::Read])],
    );

    let checker = pod.checker_with("https://pod.example/doc", strict(APP));
    assert!(checker
        .can(&Agent::from(ALICE), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_owner_trusted_app_limits_modes() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![Rule::new("owner")
            .default("./")
            .agent(ALICE)
            .modes(&[AccessMode::Read, AccessMode::Write, AccessMode::Control])],
    );
    pod.store
        .insert_ntriples(
            "https://alice.example/profile",
            concat!(
                "<#me> <http://www.w3.org/ns/auth/acl#trustedApp> _:app .\n",
                "_:app <http://www.w3.org/ns/auth/acl#origin> <https://app.example> .\n",
                "_:app <http://www.w3.org/ns/auth/acl#mode> <http://www.w3.org/ns/auth/acl#Read> .\n",
            ),
        )
        .unwrap();
    let alice = Agent::from(ALICE);

    let checker = pod.checker_with("https://pod.example/doc", strict(APP));
    assert!(checker
        .can(&alice, AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
    assert!(!checker
        .can(&alice, AccessMode::Write, &Method::Put, true)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_delegation_switches_agent_only_when_confirmed() {
    let pod = Pod::new();
    pod.acl(
        "https://pod.example/.acl",
        vec![Rule::new("alice")
            .default("./")
            .agent(ALICE)
            .modes(&[AccessMode::Read])],
    );
    let options = CheckerOptions {
        on_behalf_of: Some(format!("<{ALICE}>")),
        ..CheckerOptions::default()
    };

    let unconfirmed = pod.checker_with("https://pod.example/doc", options.clone());
    assert!(!unconfirmed
        .can(&Agent::from(BOB), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());

    pod.store
        .insert_ntriples(
            "https://alice.example/profile",
            "<#me> <http://www.w3.org/ns/auth/acl#delegates> <https://bob.example/profile#me> .",
        )
        .unwrap();
    let confirmed = pod.checker_with("https://pod.example/doc", options);
    assert!(confirmed
        .can(&Agent::from(BOB), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
}

// ============================================================================
// Resolution failures and caching
// ============================================================================

#[tokio::test]
async fn test_missing_root_policy_is_fatal() {
    let pod = Pod::new();
    let checker = pod.checker("https://pod.example/a/b/c.ttl");
    let err = checker
        .can(&Agent::from(ALICE), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap_err();
    assert_eq!(err.status(), 500);
    match err {
        Error::ResolutionExhausted { searched, .. } => assert_eq!(searched.len(), 4),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_failure_aborts_resolution() {
    let pod = inherited_read_pod();
    pod.store
        .fail_with("https://pod.example/a/b/c.ttl.acl", "connection reset");
    let checker = pod.checker("https://pod.example/a/b/c.ttl");
    let err = checker
        .can(&Agent::from(ALICE), AccessMode::Read, &Method::Get, true)
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn test_invalidate_drops_cached_policy() {
    let pod = inherited_read_pod();
    let alice = Agent::from(ALICE);
    let uri = "https://pod.example/a/b/.acl";

    assert!(pod
        .checker("https://pod.example/a/b/c.ttl")
        .can(&alice, AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());

    pod.acl(
        uri,
        vec![Rule::new("readers")
            .default_for_new("./")
            .agent(BOB)
            .modes(&[AccessMode::Read])],
    );
    assert!(pod
        .checker("https://pod.example/a/b/c.ttl")
        .can(&alice, AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());

    pod.cache.invalidate(Some(uri)).await;
    assert!(!pod
        .checker("https://pod.example/a/b/c.ttl")
        .can(&alice, AccessMode::Read, &Method::Get, true)
        .await
        .unwrap());
}
