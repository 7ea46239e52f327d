//! Closed template language for instruction strings
//!
//! Templates recognize a fixed set of `${...}` placeholders. Anything else
//! inside a placeholder marker is rejected at parse time, so a malformed
//! template fails loudly before any model is invoked instead of producing a
//! silently wrong prompt.

use thiserror::Error;

/// Placeholders recognized inside `${...}` markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `${previous_responses}` — the formatted upstream outputs
    PreviousResponses,
    /// `${task}` — the panel's task text
    Task,
    /// `${persona}` — the persona text inside a persona template
    Persona,
}

impl Placeholder {
    /// Every recognized placeholder
    pub const ALL: &'static [Placeholder] = &[
        Placeholder::PreviousResponses,
        Placeholder::Task,
        Placeholder::Persona,
    ];

    /// The name as it appears between `${` and `}`
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::PreviousResponses => "previous_responses",
            Placeholder::Task => "task",
            Placeholder::Persona => "persona",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "previous_responses" => Some(Placeholder::PreviousResponses),
            "task" => Some(Placeholder::Task),
            "persona" => Some(Placeholder::Persona),
            _ => None,
        }
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors from parsing or validating a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template is missing the required ${{{0}}} placeholder")]
    MissingPlaceholder(Placeholder),

    #[error("Placeholder ${{{0}}} appears more than once")]
    DuplicatePlaceholder(Placeholder),

    #[error("Placeholder ${{{0}}} is not recognized in this template")]
    UnknownPlaceholder(String),

    #[error("Unterminated ${{ starting at byte {0}")]
    Unterminated(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Values substituted for placeholders during rendering
///
/// Rendering is total: every recognized placeholder has a binding, and which
/// placeholders may appear at all is fixed when the template is parsed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings<'a> {
    pub previous_responses: &'a str,
    pub task: &'a str,
    pub persona: &'a str,
}

impl<'a> Bindings<'a> {
    fn get(&self, placeholder: Placeholder) -> &'a str {
        match placeholder {
            Placeholder::PreviousResponses => self.previous_responses,
            Placeholder::Task => self.task,
            Placeholder::Persona => self.persona,
        }
    }
}

/// A parsed instruction template (Value Object)
///
/// A `Template` in hand is always well-formed for its role; `render` cannot
/// fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template in which every recognized placeholder may appear
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        Self::parse_allowed(source, Placeholder::ALL)
    }

    /// Parse combination instructions
    ///
    /// Must contain `${previous_responses}` exactly once; `${task}` may also
    /// appear. Downstream correctness depends on the upstream block being
    /// substituted at exactly one site.
    pub fn combination(source: &str) -> Result<Self, TemplateError> {
        let template =
            Self::parse_allowed(source, &[Placeholder::PreviousResponses, Placeholder::Task])?;
        match template.count(Placeholder::PreviousResponses) {
            0 => Err(TemplateError::MissingPlaceholder(
                Placeholder::PreviousResponses,
            )),
            1 => Ok(template),
            _ => Err(TemplateError::DuplicatePlaceholder(
                Placeholder::PreviousResponses,
            )),
        }
    }

    /// Parse a persona template
    ///
    /// Must contain `${persona}` at least once, otherwise the persona text
    /// could never reach the rendered instructions.
    pub fn persona(source: &str) -> Result<Self, TemplateError> {
        let template = Self::parse_allowed(source, &[Placeholder::Persona])?;
        if !template.contains(Placeholder::Persona) {
            return Err(TemplateError::MissingPlaceholder(Placeholder::Persona));
        }
        Ok(template)
    }

    /// Parse a moderator persona
    ///
    /// `${task}` may appear and is bound to the panel task at run time.
    pub fn moderator_persona(source: &str) -> Result<Self, TemplateError> {
        Self::parse_allowed(source, &[Placeholder::Task])
    }

    fn parse_allowed(source: &str, allowed: &[Placeholder]) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((at, ch)) = chars.next() {
            if ch == '$'
                && let Some(&(_, '{')) = chars.peek()
            {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::Unterminated(at));
                }
                let placeholder = Placeholder::from_name(&name)
                    .filter(|p| allowed.contains(p))
                    .ok_or(TemplateError::UnknownPlaceholder(name))?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(placeholder));
            } else {
                literal.push(ch);
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The original template text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the template contains the given placeholder
    pub fn contains(&self, placeholder: Placeholder) -> bool {
        self.count(placeholder) > 0
    }

    /// How many times the given placeholder appears
    pub fn count(&self, placeholder: Placeholder) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Placeholder(p) if *p == placeholder))
            .count()
    }

    /// Substitute every placeholder with its binding
    pub fn render(&self, bindings: &Bindings<'_>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(p) => out.push_str(bindings.get(*p)),
            }
        }
        out
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}
