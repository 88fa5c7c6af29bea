use std::error::Error;
use std::fmt::Display;

/// Error constructed from a malformed input
/// payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    line: usize,
    message: String,
}

impl ParseError {
    /// The 1-based number of the offending line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// What was wrong with the line.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error on line {}: {}", self.line, self.message)
    }
}

/// Error raised when the search could not produce
/// a rectangle for an input which passed parsing.
///
/// This indicates a defect in the engine, not a
/// problem with the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantError {
    required: usize,
    buildings: usize,
}

impl InvariantError {
    /// The coverage the search was asked for.
    pub fn required(&self) -> usize {
        self.required
    }

    /// The number of buildings the search was given.
    pub fn buildings(&self) -> usize {
        self.buildings
    }

    pub(crate) fn new(required: usize, buildings: usize) -> Self {
        Self {
            required,
            buildings,
        }
    }
}

impl Error for InvariantError {}

impl Display for InvariantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "internal invariant violated: no rectangle covers {} of {} buildings",
            self.required, self.buildings
        )
    }
}
