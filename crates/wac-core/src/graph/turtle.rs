//! Turtle reader.
//!
//! Turtle is how most servers publish policy, profile and group documents.
//! Parsing is done by `oxttl`; triples are converted into the crate's own
//! [`Graph`]. Statements about quoted triples are dropped.

use oxrdf::{Literal as RdfLiteral, Subject, Term as RdfTerm};
use oxttl::TurtleParser;

use super::{Graph, Literal, Term, Triple};
use crate::{Error, Result};

/// Media type served and accepted for Turtle documents.
pub const CONTENT_TYPE: &str = "text/turtle";

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Parse a Turtle document, resolving relative IRIs against `base`.
///
/// # Errors
///
/// Returns [`Error::Parse`] for an invalid base or malformed input.
///
/// # Example
///
/// ```
/// use wac_core::graph::turtle;
///
/// let graph = turtle::parse(
///     "@prefix acl: <http://www.w3.org/ns/auth/acl#> .\n<#auth> acl:accessTo <./> .",
///     Some("https://pod.example/a/.acl"),
/// ).unwrap();
/// assert_eq!(graph.len(), 1);
/// ```
pub fn parse(input: &str, base: Option<&str>) -> Result<Graph> {
    let mut parser = TurtleParser::new();
    if let Some(base) = base {
        parser = parser
            .with_base_iri(base)
            .map_err(|e| Error::parse(format!("invalid base {base}: {e}")))?;
    }

    let mut graph = Graph::new();
    for triple in parser.for_slice(input.as_bytes()) {
        let triple = triple.map_err(|e| Error::parse(e.to_string()))?;
        let (Some(subject), Some(object)) = (subject(triple.subject), object(triple.object))
        else {
            continue;
        };
        graph.insert(Triple::new(subject, triple.predicate.into_string(), object));
    }
    Ok(graph)
}

#[allow(unreachable_patterns)]
fn subject(subject: Subject) -> Option<Term> {
    match subject {
        Subject::NamedNode(node) => Some(Term::Iri(node.into_string())),
        Subject::BlankNode(node) => Some(Term::Blank(node.as_str().to_string())),
        _ => None,
    }
}

#[allow(unreachable_patterns)]
fn object(object: RdfTerm) -> Option<Term> {
    match object {
        RdfTerm::NamedNode(node) => Some(Term::Iri(node.into_string())),
        RdfTerm::BlankNode(node) => Some(Term::Blank(node.as_str().to_string())),
        RdfTerm::Literal(literal) => Some(Term::Literal(convert_literal(&literal))),
        _ => None,
    }
}

fn convert_literal(literal: &RdfLiteral) -> Literal {
    let language = literal.language().map(str::to_string);
    let datatype = literal.datatype();
    let datatype = (language.is_none() && datatype.as_str() != XSD_STRING)
        .then(|| datatype.as_str().to_string());
    Literal {
        value: literal.value().to_string(),
        language,
        datatype,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::vocab::{acl, vcard};

    const BASE: &str = "https://pod.example/a/.acl";

    #[test]
    fn test_prefixes_and_relative_iris() {
        let graph = parse(
            r#"
                @prefix acl: <http://www.w3.org/ns/auth/acl#> .
                <#owner> a acl:Authorization ;
                    acl:accessTo <./> ;
                    acl:agent <https://alice.example/#me> ;
                    acl:mode acl:Read, acl:Write .
            "#,
            Some(BASE),
        )
        .unwrap();

        let owner = Term::iri("https://pod.example/a/.acl#owner");
        assert!(graph.holds(&owner, acl::ACCESS_TO, &Term::iri("https://pod.example/a/")));
        assert_eq!(graph.objects(&owner, acl::MODE).count(), 2);
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn test_blank_nodes_and_literals() {
        let graph = parse(
            r#"
                @prefix acl: <http://www.w3.org/ns/auth/acl#> .
                <#me> acl:trustedApp [ acl:origin <https://app.example> ] ;
                    <http://xmlns.com/foaf/0.1/name> "Alice"@en .
            "#,
            Some("https://alice.example/profile"),
        )
        .unwrap();

        let me = Term::iri("https://alice.example/profile#me");
        let app = graph.objects(&me, acl::TRUSTED_APP).next().unwrap();
        assert!(matches!(app, Term::Blank(_)));
        assert!(graph.holds(app, acl::ORIGIN, &Term::iri("https://app.example")));

        let name = graph
            .objects(&me, "http://xmlns.com/foaf/0.1/name")
            .next()
            .unwrap();
        match name {
            Term::Literal(literal) => {
                assert_eq!(literal.value, "Alice");
                assert_eq!(literal.language.as_deref(), Some("en"));
                assert!(literal.datatype.is_none());
            }
            other => panic!("Expected literal, got {other:?}"),
        }
    }

    #[test]
    fn test_ntriples_is_valid_turtle() {
        let graph = parse(
            "<#team> <http://www.w3.org/2006/vcard/ns#hasMember> <https://bob.example/#me> .\n",
            Some("https://pod.example/groups"),
        )
        .unwrap();
        assert!(graph.holds(
            &Term::iri("https://pod.example/groups#team"),
            vcard::HAS_MEMBER,
            &Term::iri("https://bob.example/#me"),
        ));
    }

    #[test]
    fn test_malformed_input() {
        let err = parse("<#a> <#b> .", Some(BASE)).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
