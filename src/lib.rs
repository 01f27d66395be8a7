use std::error::Error as StdError;
use std::fmt;

mod config;
mod dom;
mod form_controls;
mod html;
mod location;
mod page;
mod pattern;
mod rules;
mod selector;
mod summary;
#[cfg(test)]
mod test_pages;
mod validator;
mod validity;

pub use config::{AgeFieldShape, FieldMap, FormConfig, SuccessAction};
pub use dom::NodeId;
pub use form_controls::MockFile;
pub use page::{FormPage, ScrollBehavior, ScrollBlock, ScrollRequest};
pub use rules::{
    CapturePolicy, ErrorTarget, FailureSource, FieldBinding, FieldFailure, FieldRole, PetAge,
    ValidationReport,
};
pub use summary::{SubmissionSummary, SummaryRow};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    Config(String),
    Pattern(String),
    MissingElement(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::Config(msg) => write!(f, "invalid form config: {msg}"),
            Self::Pattern(msg) => write!(f, "invalid pattern: {msg}"),
            Self::MissingElement(id) => write!(f, "configured element not found: #{id}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

impl From<pattern::PatternError> for Error {
    fn from(err: pattern::PatternError) -> Self {
        Self::Pattern(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
