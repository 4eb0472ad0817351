//! Compiled route templates.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::{HeaderMap, HeaderName};
use thiserror::Error;

use crate::routing::descriptor::{HttpVerb, ReturnShape};

/// Errors raised while compiling a method into a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("malformed placeholder at byte {position} of `{path}`")]
    MalformedPlaceholder { path: String, position: usize },

    #[error("placeholder `{{{0}}}` has no path parameter")]
    UnboundPlaceholder(String),

    #[error("path parameter `{0}` has no placeholder")]
    UnusedPathParameter(String),

    #[error("parameters `{first}` and `{second}` are both declared as body")]
    DuplicateBody { first: String, second: String },

    #[error("body parameter `{0}` cannot be combined with multipart parts")]
    BodyWithMultipart(String),

    #[error("static header `{0}` is not of the form key=value")]
    MalformedHeader(String),

    #[error("`{0}` is not a valid HTTP header")]
    InvalidHeader(String),
}

/// One piece of a compiled path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Var(String),
}

/// A path with its `{name}` placeholders lifted out as typed segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses `{name}` placeholders; names are word characters only.
    pub fn parse(path: &str) -> Result<Self, TemplateError> {
        let malformed = |position| TemplateError::MalformedPlaceholder {
            path: path.to_string(),
            position,
        };

        let mut segments = Vec::new();
        let mut rest = path;
        let mut offset = 0;
        while let Some(open) = rest.find(['{', '}']) {
            let (literal, tail) = rest.split_at(open);
            if tail.starts_with('}') {
                return Err(malformed(offset + open));
            }
            let close = tail.find('}').ok_or_else(|| malformed(offset + open))?;
            let name = &tail[1..close];
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(malformed(offset + open));
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }
            segments.push(Segment::Var(name.to_string()));
            offset += open + close + 1;
            rest = &tail[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Var(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Renders the path, asking `lookup` for the text of every variable.
    pub fn render(&self, mut lookup: impl FnMut(&str) -> String) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Var(name) => out.push_str(&lookup(name)),
            }
        }
        out
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Var(name) => write!(f, "{{{}}}", name)?,
            }
        }
        Ok(())
    }
}

/// A field slot: the bound field name and the argument position supplying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub index: usize,
}

/// A header slot, with its name validated at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSlot {
    pub name: HeaderName,
    pub index: usize,
}

/// Immutable description of one remote method.
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    pub verb: HttpVerb,
    pub path: PathPattern,
    pub static_headers: HeaderMap,
    /// Query-role and part-role fields, in declaration order.
    pub query_slots: Vec<Slot>,
    pub header_slots: Vec<HeaderSlot>,
    pub path_slots: BTreeMap<String, usize>,
    pub body_index: Option<usize>,
    pub multipart: bool,
    pub returns: ReturnShape,
}

impl RouteTemplate {
    /// Minimum number of call arguments the slots reference.
    pub fn arity(&self) -> usize {
        let indices = self
            .query_slots
            .iter()
            .map(|s| s.index)
            .chain(self.header_slots.iter().map(|s| s.index))
            .chain(self.path_slots.values().copied())
            .chain(self.body_index);
        indices.map(|i| i + 1).max().unwrap_or(0)
    }
}

/// Outcome of compiling one method.
#[derive(Debug, Clone)]
pub enum CompiledRoute {
    Remote(RouteTemplate),
    /// No routing mapping; calls return `None` without touching the transport.
    NotRemote,
    Invalid(TemplateError),
}

impl CompiledRoute {
    pub fn template(&self) -> Option<&RouteTemplate> {
        match self {
            CompiledRoute::Remote(template) => Some(template),
            _ => None,
        }
    }
}

impl fmt::Display for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledRoute::Remote(t) => {
                write!(f, "{} {}", t.verb, t.path)?;
                if t.multipart {
                    f.write_str(" [multipart]")?;
                }
                write!(f, " -> {}", t.returns)
            }
            CompiledRoute::NotRemote => f.write_str("(not remote)"),
            CompiledRoute::Invalid(err) => write!(f, "(invalid: {})", err),
        }
    }
}
