//! Group expansion.
//!
//! Authorizations can name an `acl:agentGroup` instead of single agents.
//! Membership lives in the group's own document, so before matching every
//! referenced group document is fetched. Each stays separate from the
//! policy: a group document can only list members of groups it defines,
//! never add authorizations. Group lookups are best effort: a group that
//! cannot be fetched simply contributes no members.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use futures::future::join_all;
use wac_core::uri::document_of;
use wac_core::vocab::{acl, vcard};
use wac_core::{Document, Graph, Term};

use crate::fetch::PolicyFetcher;

/// Documents holding the groups `graphs` reference, without fragments.
pub fn group_documents<'a>(graphs: impl IntoIterator<Item = &'a Graph>) -> BTreeSet<String> {
    graphs
        .into_iter()
        .flat_map(|graph| graph.matching(None, Some(acl::AGENT_GROUP), None))
        .filter_map(|t| t.object.as_iri())
        .map(|iri| document_of(iri).to_string())
        .collect()
}

/// Group documents fetched for one authorization, keyed by document URI.
#[derive(Clone, Debug, Default)]
pub struct GroupMembers {
    documents: HashMap<String, Arc<Document>>,
}

impl GroupMembers {
    /// No groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fetched group document.
    pub fn insert(&mut self, document: Arc<Document>) {
        self.documents.insert(document.uri.clone(), document);
    }

    /// Whether the document defining `group` lists `agent` as a member.
    ///
    /// Only `vcard:hasMember` statements in the group's own document count.
    pub fn is_member(&self, group: &str, agent: &str) -> bool {
        self.documents.get(document_of(group)).is_some_and(|doc| {
            doc.graph
                .holds(&Term::iri(group), vcard::HAS_MEMBER, &Term::iri(agent))
        })
    }

    /// Number of group documents held.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no group document was fetched.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Fetch every group document `graphs` reference.
///
/// Fetches run concurrently and go through the shared cache, so a group
/// referenced by several policies in one authorization is read once.
pub async fn expand_groups<'a>(
    fetcher: &PolicyFetcher,
    graphs: impl IntoIterator<Item = &'a Graph>,
) -> GroupMembers {
    let documents = group_documents(graphs);
    let mut members = GroupMembers::new();
    if documents.is_empty() {
        return members;
    }

    let fetches = documents.iter().map(|uri| fetcher.graph(uri));
    for (uri, result) in documents.iter().zip(join_all(fetches).await) {
        match result {
            Ok(document) => members.insert(document),
            Err(e) => log::debug!("Skipping group document {uri}: {e}"),
        }
    }
    members
}
