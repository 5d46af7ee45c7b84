//! Policy document discovery.
//!
//! A resource's policy lives next to it under the ACL suffix. When that
//! document is missing, the nearest ancestor container's policy applies
//! instead. [`CandidateChain`] lists the places to look, nearest first, and
//! [`resolve_nearest`] walks them.

use wac_core::{Error, Graph, ResourceUri, Result};

use crate::fetch::PolicyFetcher;

// ============================================================================
// Candidate chain
// ============================================================================

/// Ordered candidate policy documents for a resource.
///
/// Never empty. The first entry is the governed resource's own policy; the
/// last is the authority root's policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateChain {
    governed: ResourceUri,
    candidates: Vec<ResourceUri>,
}

impl CandidateChain {
    /// Build the chain for `resource`.
    ///
    /// A resource that already carries `suffix` is a policy document; its
    /// chain starts at itself and continues from the resource it governs.
    pub fn new(resource: &ResourceUri, suffix: &str) -> Self {
        let governed = resource
            .strip_suffix(suffix)
            .unwrap_or_else(|| resource.clone());
        let candidates = std::iter::once(governed.with_suffix(suffix))
            .chain(governed.ancestors().map(|dir| dir.with_suffix(suffix)))
            .collect();
        Self {
            governed,
            candidates,
        }
    }

    /// The resource whose policy is being looked up.
    pub fn governed(&self) -> &ResourceUri {
        &self.governed
    }

    /// All candidates, nearest first.
    pub fn candidates(&self) -> &[ResourceUri] {
        &self.candidates
    }

    /// The governed resource's own policy document.
    pub fn nearest(&self) -> &ResourceUri {
        // Construction always pushes the governed resource's own candidate.
        &self.candidates[0]
    }

    /// The authority root's policy document.
    pub fn root(&self) -> &ResourceUri {
        &self.candidates[self.candidates.len() - 1]
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn exhausted(&self) -> Error {
        Error::ResolutionExhausted {
            resource: self.governed.to_string(),
            searched: self.candidates.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Candidate policy documents for `resource`, nearest first.
pub fn possible_acls(resource: &ResourceUri, suffix: &str) -> CandidateChain {
    CandidateChain::new(resource, suffix)
}

// ============================================================================
// Resolution
// ============================================================================

/// A policy document found on the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPolicy {
    /// Where the document was found.
    pub document: ResourceUri,
    /// Its statements.
    pub graph: Graph,
    /// Whether closer candidates were missing, so the policy is inherited.
    pub is_inherited: bool,
}

impl ResolvedPolicy {
    /// Container the document sits in.
    pub fn container(&self) -> ResourceUri {
        self.document.container()
    }

    /// Container whose `acl:default` statements apply, for inherited policies.
    pub fn directory(&self) -> Option<ResourceUri> {
        self.is_inherited.then(|| self.container())
    }
}

/// The outcome of walking a candidate chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// The resource the policies govern; a policy document's own resource.
    pub governed: ResourceUri,
    /// The nearest existing policy.
    pub doc: ResolvedPolicy,
    /// The next policy up the chain, when one was requested.
    pub parent: Option<ResolvedPolicy>,
}

/// Walk `chain` and return the nearest existing policy.
///
/// Candidates are probed strictly in order. A missing candidate advances
/// the walk; any other failure aborts it. When `need_parent` is set and the
/// nearest policy is the resource's own, the walk continues to find the
/// parent container's governing policy as well.
///
/// # Errors
///
/// [`Error::ResolutionExhausted`] when no candidate exists (or no parent
/// does, when one is needed). Store errors other than not-found propagate.
pub async fn resolve_nearest(
    fetcher: &PolicyFetcher,
    chain: &CandidateChain,
    need_parent: bool,
) -> Result<Resolution> {
    let Some((index, doc)) = probe(fetcher, chain, 0).await? else {
        return Err(chain.exhausted());
    };
    log::debug!("Using ACL {} for {}", doc.document, chain.governed());

    let mut parent = None;
    if need_parent && index == 0 {
        let Some((parent_index, mut resolved)) = probe(fetcher, chain, 1).await? else {
            return Err(chain.exhausted());
        };
        resolved.is_inherited = parent_index > 1;
        log::debug!("Using parent ACL {}", resolved.document);
        parent = Some(resolved);
    }

    Ok(Resolution {
        governed: chain.governed().clone(),
        doc,
        parent,
    })
}

async fn probe(
    fetcher: &PolicyFetcher,
    chain: &CandidateChain,
    start: usize,
) -> Result<Option<(usize, ResolvedPolicy)>> {
    for (index, candidate) in chain.candidates().iter().enumerate().skip(start) {
        match fetcher.document(candidate.as_str()).await {
            Ok(document) => {
                return Ok(Some((
                    index,
                    ResolvedPolicy {
                        document: candidate.clone(),
                        graph: document.graph.clone(),
                        is_inherited: index > 0,
                    },
                )));
            }
            Err(e) if e.is_not_found() => {
                log::debug!("No ACL at {candidate}");
            }
            Err(e) => {
                log::debug!("Failed to fetch ACL {candidate}: {e}");
                return Err(e);
            }
        }
    }
    Ok(None)
}
