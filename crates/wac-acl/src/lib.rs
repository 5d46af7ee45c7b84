//! WAC ACL: policy resolution and authorization.
//!
//! Given a target resource, an agent and a request method, this crate finds
//! the governing policy document by walking up the resource hierarchy,
//! fetches the agent groups it references, and decides which access
//! modes are granted. It depends only on `wac-core` (dependency level 1).
//!
//! # Modules
//!
//! - [`mode`]: Access modes, agents and request methods
//! - [`candidates`]: Candidate policy chains and nearest-policy resolution
//! - [`fetch`]: Cached policy, group and profile document access
//! - [`groups`]: Agent group expansion
//! - [`origin`]: Origin trust from owner profiles
//! - [`delegation`]: `On-Behalf-Of` identity resolution
//! - [`matcher`]: Policy statement matching
//! - [`plan`]: The method-dependent decision table
//! - [`checker`]: The per-request authorization façade

#![doc = include_str!("../README.md")]

pub mod candidates;
pub mod checker;
pub mod delegation;
pub mod fetch;
pub mod groups;
pub mod matcher;
pub mod mode;
pub mod origin;
pub mod plan;

// Re-export key types at crate root for convenience
pub use candidates::{possible_acls, resolve_nearest, CandidateChain, Resolution, ResolvedPolicy};
pub use checker::{AclChecker, AuthError, CheckerOptions, Decision, RequestContext};
pub use fetch::PolicyFetcher;
pub use groups::GroupMembers;
pub use matcher::{MatchRequest, PolicyMatcher, WacMatcher};
pub use mode::{required_modes, AccessMode, Agent, Method};
pub use plan::{plan, Check, EvaluationContext, Plan, RequestIntent, ResourceState};
