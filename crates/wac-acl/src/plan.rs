//! The authorization decision table.
//!
//! [`plan`] is a pure function from what the request wants and what the
//! target looks like to the list of checks that must all pass. The checker
//! runs the list through one generic evaluation loop.

use serde::{Deserialize, Serialize};

use crate::mode::{AccessMode, Method};

/// What the request asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestIntent {
    /// Request method.
    pub method: Method,
    /// Mode the handler asked about.
    pub mode: AccessMode,
}

/// What is known about the target before evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceState {
    /// Whether the target exists.
    pub exists: bool,
    /// Whether the target is a container.
    pub is_container: bool,
    /// Whether the target is itself a policy document.
    pub is_policy_document: bool,
    /// Whether its nearest policy belongs to an ancestor.
    pub inherited: bool,
}

/// Which policy and resource a check is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationContext {
    /// The governed resource under its nearest policy.
    Resource,
    /// The container of an inherited policy, through `acl:accessTo` only.
    ContainerAccessTo,
    /// The target's container under the parent policy.
    Parent,
}

/// One required evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Where to evaluate.
    pub context: EvaluationContext,
    /// Modes that must all be granted there.
    pub modes: Vec<AccessMode>,
}

impl Check {
    fn new(context: EvaluationContext, modes: &[AccessMode]) -> Self {
        Self {
            context,
            modes: modes.to_vec(),
        }
    }
}

/// Outcome of planning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Plan {
    /// Refuse without evaluating any policy.
    Deny(&'static str),
    /// Grant only if every check passes.
    Checks(Vec<Check>),
}

/// Reason given when there is nothing to delete.
pub const NOTHING_TO_DELETE: &str = "Forbidden";

/// Whether evaluating `method` on a target of this shape may need the
/// parent container's policy.
///
/// Decided before resolution; the resolver fetches the parent only when
/// the target turns out to have its own policy.
pub fn needs_parent(method: &Method, is_container: bool, is_policy_document: bool) -> bool {
    method.is_delete() && !is_container && !is_policy_document
}

/// Map a request onto the checks it requires.
pub fn plan(intent: &RequestIntent, state: &ResourceState) -> Plan {
    use AccessMode::{Append, Control, Read, Write};
    use EvaluationContext::{ContainerAccessTo, Parent, Resource};

    let method = &intent.method;

    if state.is_policy_document {
        if method.is_delete() && !state.exists {
            return Plan::Deny(NOTHING_TO_DELETE);
        }
        return Plan::Checks(vec![Check::new(Resource, &[Control])]);
    }

    let mut checks = vec![Check::new(Resource, &[intent.mode])];

    if method.is_create() && !state.exists && state.inherited {
        checks.push(Check::new(ContainerAccessTo, &[Append]));
    }

    if method.is_delete() {
        if !state.exists {
            return Plan::Deny(NOTHING_TO_DELETE);
        }
        let extra = if state.is_container {
            Check::new(Resource, &[Read, Write])
        } else if state.inherited {
            Check::new(ContainerAccessTo, &[Write])
        } else {
            Check::new(Parent, &[Read, Write])
        };
        checks.push(extra);
    }

    Plan::Checks(checks)
}
