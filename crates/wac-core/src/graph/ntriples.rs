//! N-Triples reader.
//!
//! Reads the line-based N-Triples syntax into a [`Graph`]. Relative IRIs are
//! resolved against an optional base, which lets hand-written policy files
//! say `<./>` for the container they sit in.

use url::Url;

use super::{Graph, Literal, Term, Triple};
use crate::{Error, Result};

/// Media type served and accepted for N-Triples documents.
pub const CONTENT_TYPE: &str = "application/n-triples";

/// Parse an N-Triples document.
///
/// # Errors
///
/// Returns [`Error::Parse`] naming the first offending line.
///
/// # Example
///
/// ```
/// use wac_core::graph::ntriples;
///
/// let graph = ntriples::parse(
///     "<#auth> <http://www.w3.org/ns/auth/acl#accessTo> <./> .",
///     Some("https://pod.example/a/.acl"),
/// ).unwrap();
/// assert_eq!(graph.len(), 1);
/// ```
pub fn parse(input: &str, base: Option<&str>) -> Result<Graph> {
    let base = base
        .map(|b| Url::parse(b).map_err(|e| Error::parse(format!("invalid base {b}: {e}"))))
        .transpose()?;

    let mut graph = Graph::new();
    for (index, line) in input.lines().enumerate() {
        let mut cursor = Cursor::new(line, index + 1, base.as_ref());
        cursor.skip_whitespace();
        if cursor.at_end_of_statement() {
            continue;
        }
        graph.insert(cursor.triple()?);
    }
    Ok(graph)
}

struct Cursor<'a> {
    line: &'a str,
    pos: usize,
    line_no: usize,
    base: Option<&'a Url>,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str, line_no: usize, base: Option<&'a Url>) -> Self {
        Self {
            line,
            pos: 0,
            line_no,
            base,
        }
    }

    fn error(&self, msg: &str) -> Error {
        Error::parse(format!("line {}: {msg}", self.line_no))
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.pos += 1;
        }
    }

    fn at_end_of_statement(&self) -> bool {
        matches!(self.peek(), None | Some('#'))
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(&format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(&format!("expected '{expected}', found end of line"))),
        }
    }

    fn triple(&mut self) -> Result<Triple> {
        let subject = self.term()?;
        if !subject.is_node() {
            return Err(self.error("subject must be an IRI or blank node"));
        }
        self.skip_whitespace();
        let predicate = match self.term()? {
            Term::Iri(iri) => iri,
            _ => return Err(self.error("predicate must be an IRI")),
        };
        self.skip_whitespace();
        let object = self.term()?;
        self.skip_whitespace();
        self.expect('.')?;
        self.skip_whitespace();
        if !self.at_end_of_statement() {
            return Err(self.error("trailing content after '.'"));
        }
        Ok(Triple::new(subject, predicate, object))
    }

    fn term(&mut self) -> Result<Term> {
        match self.peek() {
            Some('<') => self.iri().map(Term::Iri),
            Some('_') => self.blank(),
            Some('"') => self.literal(),
            Some(c) => Err(self.error(&format!("unexpected '{c}'"))),
            None => Err(self.error("unexpected end of line")),
        }
    }

    fn iri(&mut self) -> Result<String> {
        self.expect('<')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some('\\') => value.push(self.escape()?),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated IRI")),
            }
        }
        self.resolve(value)
    }

    fn resolve(&self, value: String) -> Result<String> {
        if Url::parse(&value).is_ok() {
            return Ok(value);
        }
        match self.base {
            Some(base) => base
                .join(&value)
                .map(String::from)
                .map_err(|e| self.error(&format!("cannot resolve <{value}>: {e}"))),
            None => Err(self.error(&format!("relative IRI <{value}> without a base"))),
        }
    }

    fn blank(&mut self) -> Result<Term> {
        self.expect('_')?;
        self.expect(':')?;
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            self.bump();
        }
        let label = self.line[start..self.pos].trim_end_matches('.');
        // A trailing '.' belongs to the statement, not the label.
        self.pos = start + label.len();
        if label.is_empty() {
            return Err(self.error("empty blank node label"));
        }
        Ok(Term::blank(label))
    }

    fn literal(&mut self) -> Result<Term> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => value.push(self.escape()?),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated literal")),
            }
        }

        let mut literal = Literal {
            value,
            language: None,
            datatype: None,
        };
        if self.peek() == Some('@') {
            self.bump();
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '-') {
                self.bump();
            }
            if start == self.pos {
                return Err(self.error("empty language tag"));
            }
            literal.language = Some(self.line[start..self.pos].to_string());
        } else if self.rest().starts_with("^^") {
            self.pos += 2;
            literal.datatype = Some(self.iri()?);
        }
        Ok(Term::Literal(literal))
    }

    fn escape(&mut self) -> Result<char> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.unicode(4),
            Some('U') => self.unicode(8),
            _ => Err(self.error("invalid escape sequence")),
        }
    }

    fn unicode(&mut self, digits: usize) -> Result<char> {
        let hex = self
            .rest()
            .get(..digits)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos += digits;
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }
}
