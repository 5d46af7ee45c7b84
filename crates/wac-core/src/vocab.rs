//! RDF vocabulary IRIs used by access control documents.

/// Web Access Control vocabulary.
pub mod acl {
    /// Namespace IRI.
    pub const NS: &str = "http://www.w3.org/ns/auth/acl#";

    /// Class of authorization statements.
    pub const AUTHORIZATION: &str = "http://www.w3.org/ns/auth/acl#Authorization";
    /// Resource an authorization applies to directly.
    pub const ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";
    /// Container whose descendants inherit an authorization.
    pub const DEFAULT: &str = "http://www.w3.org/ns/auth/acl#default";
    /// Legacy spelling of [`DEFAULT`].
    pub const DEFAULT_FOR_NEW: &str = "http://www.w3.org/ns/auth/acl#defaultForNew";
    /// A specific agent granted access.
    pub const AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";
    /// A class of agents granted access.
    pub const AGENT_CLASS: &str = "http://www.w3.org/ns/auth/acl#agentClass";
    /// A group whose members are granted access.
    pub const AGENT_GROUP: &str = "http://www.w3.org/ns/auth/acl#agentGroup";
    /// Access mode granted.
    pub const MODE: &str = "http://www.w3.org/ns/auth/acl#mode";
    /// Web origin allowed to exercise an authorization.
    pub const ORIGIN: &str = "http://www.w3.org/ns/auth/acl#origin";
    /// Every authenticated agent.
    pub const AUTHENTICATED_AGENT: &str = "http://www.w3.org/ns/auth/acl#AuthenticatedAgent";
    /// Links a principal to a secretary acting for it.
    pub const DELEGATES: &str = "http://www.w3.org/ns/auth/acl#delegates";
    /// Links a profile to an application it trusts.
    pub const TRUSTED_APP: &str = "http://www.w3.org/ns/auth/acl#trustedApp";

    /// Read mode.
    pub const READ: &str = "http://www.w3.org/ns/auth/acl#Read";
    /// Write mode.
    pub const WRITE: &str = "http://www.w3.org/ns/auth/acl#Write";
    /// Append mode.
    pub const APPEND: &str = "http://www.w3.org/ns/auth/acl#Append";
    /// Control mode.
    pub const CONTROL: &str = "http://www.w3.org/ns/auth/acl#Control";
}

/// Friend-of-a-friend vocabulary.
pub mod foaf {
    /// Every agent, authenticated or not.
    pub const AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
}

/// vCard vocabulary, used for group membership.
pub mod vcard {
    /// Links a group to a member.
    pub const HAS_MEMBER: &str = "http://www.w3.org/2006/vcard/ns#hasMember";
}

/// RDF core vocabulary.
pub mod rdf {
    /// `rdf:type`.
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}
