//! Field rules of the adoption form and the report they feed.
//!
//! Every check here is a pure function over raw control values. Binding those
//! checks to document elements is described by [`FieldBinding`], built from the
//! configured [`FieldMap`].

use super::*;
use crate::config::{AgeFieldShape, FieldMap};
use crate::dom::NodeId;
use crate::pattern::Regex;

pub(crate) const NAME_TOO_SHORT: &str = "Pet name must be at least 2 characters.";
pub(crate) const EMAIL_INVALID: &str = "Please enter a valid email address for the owner's contact.";
pub(crate) const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long.";
pub(crate) const PASSWORD_NO_DIGIT: &str = "Password should contain at least one number.";
pub(crate) const AGE_OUT_OF_RANGE: &str = "Please enter a valid age between 1 and 30 years.";
pub(crate) const AGE_REQUIRED: &str = "Please enter a valid age (at least 1 month).";
pub(crate) const AGE_TOO_OLD: &str = "Pet's age cannot exceed 30 years.";
pub(crate) const DATE_REQUIRED: &str = "The adoption date is required.";
pub(crate) const SPECIES_REQUIRED: &str = "Please select the pet species.";
pub(crate) const DIET_REQUIRED: &str = "Please select the pet's diet type.";
pub(crate) const PHOTO_REQUIRED: &str = "A pet photo is required.";

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const MAX_AGE_YEARS: i64 = 30;

/// The form fields with a hand-written rule, in the order rules run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Name,
    Email,
    Password,
    Age,
    AgeYears,
    AgeMonths,
    Date,
    Species,
    Diet,
    Photo,
}

impl FieldRole {
    /// One role per rule for the given age shape, in evaluation order. The split
    /// age rule is keyed by [`FieldRole::AgeYears`] and reads the months field too.
    pub fn ordered(age_shape: AgeFieldShape) -> Vec<Self> {
        let mut roles = vec![Self::Name, Self::Email, Self::Password];
        match age_shape {
            AgeFieldShape::Single => roles.push(Self::Age),
            AgeFieldShape::Split => roles.push(Self::AgeYears),
        }
        roles.extend([Self::Date, Self::Species, Self::Diet, Self::Photo]);
        roles
    }
}

/// Where a failing rule writes its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorTarget {
    /// Element id of the inline error display.
    Element(String),
    None,
}

/// Whether a failing rule may become the scroll-to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePolicy {
    Capture,
    Skip,
}

/// How one field rule attaches to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub role: FieldRole,
    /// Element id, or the group `name` for [`FieldRole::Species`].
    pub element: String,
    pub error_target: ErrorTarget,
    pub capture: CapturePolicy,
    /// Whether failing controls receive the invalid marker class.
    pub mark_invalid: bool,
}

impl FieldMap {
    pub fn binding(&self, role: FieldRole) -> FieldBinding {
        let by_convention = |id: &str| FieldBinding {
            role,
            element: id.to_string(),
            error_target: ErrorTarget::Element(format!("{id}Error")),
            capture: CapturePolicy::Capture,
            mark_invalid: true,
        };
        match role {
            FieldRole::Name => by_convention(&self.name),
            FieldRole::Email => by_convention(&self.email),
            FieldRole::Password => by_convention(&self.password),
            FieldRole::Age => FieldBinding {
                error_target: ErrorTarget::Element(self.age_error.clone()),
                ..by_convention(&self.age)
            },
            FieldRole::AgeYears => FieldBinding {
                error_target: ErrorTarget::Element(self.age_error.clone()),
                ..by_convention(&self.age_years)
            },
            FieldRole::AgeMonths => FieldBinding {
                error_target: ErrorTarget::Element(self.age_error.clone()),
                capture: CapturePolicy::Skip,
                ..by_convention(&self.age_months)
            },
            FieldRole::Date => by_convention(&self.date),
            FieldRole::Species => FieldBinding {
                role,
                element: self.species_group.clone(),
                error_target: ErrorTarget::Element(self.species_error.clone()),
                capture: CapturePolicy::Capture,
                mark_invalid: false,
            },
            FieldRole::Diet => by_convention(&self.diet),
            FieldRole::Photo => FieldBinding {
                capture: CapturePolicy::Skip,
                ..by_convention(&self.photo)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSource {
    Rule(FieldRole),
    /// Flagged by the markup's own `required`/`pattern`/`min`/`max` constraints.
    NativeConstraint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// Element the failure is about; the scroll target when captured.
    pub node: NodeId,
    /// Controls that received the invalid marker.
    pub marked: Vec<NodeId>,
    pub message: String,
    pub capture: CapturePolicy,
    pub source: FailureSource,
}

/// Every failure of one submit attempt, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    failures: Vec<FieldFailure>,
    first_invalid: Option<NodeId>,
}

impl ValidationReport {
    pub(crate) fn record(&mut self, failure: FieldFailure) {
        if failure.capture == CapturePolicy::Capture && self.first_invalid.is_none() {
            self.first_invalid = Some(failure.node);
        }
        self.failures.push(failure);
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn first_invalid(&self) -> Option<NodeId> {
        self.first_invalid
    }

    pub fn rule_failure(&self, role: FieldRole) -> Option<&FieldFailure> {
        self.failures
            .iter()
            .find(|failure| failure.source == FailureSource::Rule(role))
    }

    pub fn native_failures(&self) -> impl Iterator<Item = &FieldFailure> {
        self.failures
            .iter()
            .filter(|failure| failure.source == FailureSource::NativeConstraint)
    }
}

/// Years and months as read from the age fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PetAge {
    pub years: i64,
    pub months: i64,
}

impl PetAge {
    pub fn total_months(&self) -> i64 {
        self.years.saturating_mul(12).saturating_add(self.months)
    }

    pub fn display(&self) -> String {
        format!("{} Years, {} Months", self.years, self.months)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SplitAgeVerdict {
    Valid,
    /// Zero, negative, or otherwise unusable age. Both fields are at fault.
    Required,
    TooOld,
}

pub(crate) fn email_regex() -> Result<Regex> {
    Ok(Regex::new(EMAIL_PATTERN)?)
}

pub(crate) fn check_name(value: &str) -> Option<&'static str> {
    (value.trim().chars().count() < 2).then_some(NAME_TOO_SHORT)
}

pub(crate) fn check_email(regex: &Regex, value: &str) -> Result<Option<&'static str>> {
    Ok((!regex.is_match(value)?).then_some(EMAIL_INVALID))
}

pub(crate) fn check_password(value: &str) -> Option<&'static str> {
    if value.chars().count() < 8 {
        Some(PASSWORD_TOO_SHORT)
    } else if !value.chars().any(|ch| ch.is_ascii_digit()) {
        Some(PASSWORD_NO_DIGIT)
    } else {
        None
    }
}

pub(crate) fn check_required_text(value: &str, message: &'static str) -> Option<&'static str> {
    value.is_empty().then_some(message)
}

/// Reads a leading integer the way browsers read a number typed into a text box:
/// leading whitespace, an optional sign, then digits (or `0x` and hex digits).
/// Trailing junk is ignored; no digits at all yields `None`.
pub(crate) fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x") | Some("0X") => (16, &rest[2..]),
        _ => (10, rest),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(radix) else {
            break;
        };
        seen = true;
        value = value
            .saturating_mul(i64::from(radix))
            .saturating_add(i64::from(digit));
    }
    seen.then_some(if negative { -value } else { value })
}

pub(crate) fn check_single_age(raw: &str) -> Option<&'static str> {
    match parse_int_prefix(raw) {
        Some(years) if (1..=MAX_AGE_YEARS).contains(&years) => None,
        _ => Some(AGE_OUT_OF_RANGE),
    }
}

/// Unparseable parts count as zero.
pub(crate) fn read_split_age(years_raw: &str, months_raw: &str) -> PetAge {
    PetAge {
        years: parse_int_prefix(years_raw).unwrap_or(0),
        months: parse_int_prefix(months_raw).unwrap_or(0),
    }
}

pub(crate) fn check_split_age(age: PetAge) -> SplitAgeVerdict {
    if age.years < 0 || age.months < 0 || age.total_months() == 0 {
        SplitAgeVerdict::Required
    } else if age.years > MAX_AGE_YEARS {
        SplitAgeVerdict::TooOld
    } else {
        SplitAgeVerdict::Valid
    }
}
