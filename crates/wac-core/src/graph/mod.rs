//! In-memory RDF graphs.
//!
//! Policy, group and profile documents are all read into a [`Graph`]: a
//! deduplicated set of [`Triple`]s with simple pattern matching. Each
//! document keeps its own graph; statements from one document never vouch
//! for another.
//!
//! # Modules
//!
//! - [`ntriples`]: N-Triples reader
//! - [`turtle`]: Turtle reader

pub mod ntriples;
pub mod turtle;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Media types [`parse_as`] can read, preferred first.
pub const RDF_MEDIA_TYPES: [&str; 2] = [turtle::CONTENT_TYPE, ntriples::CONTENT_TYPE];

/// The media type of a `Content-Type` value, without parameters, lowercased.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Parse `input` served as `content_type`.
///
/// Returns `None` when no reader handles the media type.
pub fn parse_as(content_type: &str, input: &str, base: Option<&str>) -> Option<Result<Graph>> {
    match media_type(content_type).as_str() {
        turtle::CONTENT_TYPE => Some(turtle::parse(input, base)),
        ntriples::CONTENT_TYPE => Some(ntriples::parse(input, base)),
        _ => None,
    }
}

// ============================================================================
// Terms
// ============================================================================

/// An RDF term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    /// An IRI.
    Iri(String),
    /// A blank node label (without the `_:` prefix).
    Blank(String),
    /// A literal value.
    Literal(Literal),
}

/// An RDF literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form.
    pub value: String,
    /// Language tag, if any.
    pub language: Option<String>,
    /// Datatype IRI, if any.
    pub datatype: Option<String>,
}

impl Term {
    /// Create an IRI term.
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// Create a blank node term.
    pub fn blank(label: impl Into<String>) -> Self {
        Self::Blank(label.into())
    }

    /// Create a plain literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(Literal {
            value: value.into(),
            language: None,
            datatype: None,
        })
    }

    /// The IRI, if this term is one.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Whether this term is a node that can be a subject.
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Iri(_) | Self::Blank(_))
    }
}

// ============================================================================
// Triples
// ============================================================================

/// A single statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject (IRI or blank node).
    pub subject: Term,
    /// Predicate IRI.
    pub predicate: String,
    /// Object.
    pub object: Term,
}

impl Triple {
    /// Create a triple.
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

// ============================================================================
// Graph
// ============================================================================

/// A set of triples.
///
/// Insertion order is preserved for iteration; duplicates are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Triple>", into = "Vec<Triple>")]
pub struct Graph {
    triples: Vec<Triple>,
    index: HashSet<Triple>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple; returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.index.contains(&triple) {
            return false;
        }
        self.index.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Insert a statement from its parts.
    pub fn add(&mut self, subject: Term, predicate: &str, object: Term) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }

    /// Merge every triple of `other` into this graph.
    pub fn extend(&mut self, other: &Graph) {
        for triple in &other.triples {
            self.insert(triple.clone());
        }
    }

    /// Number of distinct triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph has no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate over all triples.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples matching a pattern; `None` matches anything.
    ///
    /// Yielded triples borrow from the graph only, not from the pattern.
    pub fn matching<'a, 'p>(
        &'a self,
        subject: Option<&'p Term>,
        predicate: Option<&'p str>,
        object: Option<&'p Term>,
    ) -> impl Iterator<Item = &'a Triple> + use<'a, 'p> {
        self.triples.iter().filter(move |t| {
            subject.is_none_or(|s| &t.subject == s)
                && predicate.is_none_or(|p| t.predicate == p)
                && object.is_none_or(|o| &t.object == o)
        })
    }

    /// Objects of `subject predicate ?o`.
    pub fn objects<'a, 'p>(
        &'a self,
        subject: &'p Term,
        predicate: &'p str,
    ) -> impl Iterator<Item = &'a Term> + use<'a, 'p> {
        self.matching(Some(subject), Some(predicate), None)
            .map(|t| &t.object)
    }

    /// Subjects of `?s predicate object`.
    pub fn subjects<'a, 'p>(
        &'a self,
        predicate: &'p str,
        object: &'p Term,
    ) -> impl Iterator<Item = &'a Term> + use<'a, 'p> {
        self.matching(None, Some(predicate), Some(object))
            .map(|t| &t.subject)
    }

    /// Whether the exact statement is present.
    pub fn holds(&self, subject: &Term, predicate: &str, object: &Term) -> bool {
        self.index
            .contains(&Triple::new(subject.clone(), predicate, object.clone()))
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Graph {}

impl From<Vec<Triple>> for Graph {
    fn from(triples: Vec<Triple>) -> Self {
        let mut graph = Graph::new();
        for triple in triples {
            graph.insert(triple);
        }
        graph
    }
}

impl From<Graph> for Vec<Triple> {
    fn from(graph: Graph) -> Self {
        graph.triples
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        for triple in iter {
            graph.insert(triple);
        }
        graph
    }
}
