use std::fmt;

/// Thin wrapper over the regex backend so call sites never see backend types.
#[derive(Debug, Clone)]
pub(crate) struct Regex {
    backend: fancy_regex::Regex,
}

impl Regex {
    pub(crate) fn new(pattern: &str) -> Result<Self, PatternError> {
        let backend = fancy_regex::Regex::new(pattern).map_err(PatternError::from)?;
        Ok(Self { backend })
    }

    /// Compiles a `pattern` attribute, which must match the whole value.
    pub(crate) fn whole_value(pattern: &str) -> Result<Self, PatternError> {
        Self::new(&format!("^(?:{pattern})$"))
    }

    pub(crate) fn is_match(&self, input: &str) -> Result<bool, PatternError> {
        self.backend.is_match(input).map_err(PatternError::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternError {
    message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PatternError {}

impl From<fancy_regex::Error> for PatternError {
    fn from(value: fancy_regex::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}
