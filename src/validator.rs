use super::*;
use crate::config::{AgeFieldShape, FormConfig};
use crate::dom::{Dom, NodeId};
use crate::form_controls::{FormData, collect_form_data, elements_by_name, is_radio_input};
use crate::pattern::Regex;
use crate::rules::{
    AGE_REQUIRED, AGE_TOO_OLD, CapturePolicy, DATE_REQUIRED, DIET_REQUIRED, ErrorTarget,
    FailureSource, FieldBinding, FieldFailure, FieldRole, PHOTO_REQUIRED, PetAge, SPECIES_REQUIRED,
    SplitAgeVerdict, ValidationReport, check_email, check_name, check_password,
    check_required_text, check_single_age, check_split_age, email_regex, parse_int_prefix,
    read_split_age,
};
use crate::validity::invalid_controls;

/// Values captured from a submission that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedSubmission {
    pub form_data: FormData,
    pub age: PetAge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Rejected(ValidationReport),
    Accepted(AcceptedSubmission),
}

/// Runs the adoption form's rules against a document, one submit attempt at a time.
#[derive(Debug, Clone)]
pub struct FormValidator {
    config: FormConfig,
    email_regex: Regex,
}

impl FormValidator {
    pub fn new(config: FormConfig) -> Result<Self> {
        Ok(Self {
            config,
            email_regex: email_regex()?,
        })
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn require(&self, dom: &Dom, id: &str) -> Result<NodeId> {
        dom.by_id(id)
            .ok_or_else(|| Error::MissingElement(id.to_string()))
    }

    /// Drops every message and marker left by the previous attempt.
    pub(crate) fn clear_errors(&self, dom: &mut Dom) -> Result<()> {
        let fields = &self.config.fields;
        for node in dom.query_selector_all(&format!(".{}", fields.error_class))? {
            dom.set_text_content(node, "")?;
        }
        for node in dom.query_selector_all("input, select, textarea")? {
            dom.class_remove(node, &fields.invalid_class)?;
        }
        Ok(())
    }

    fn fail(
        &self,
        dom: &mut Dom,
        report: &mut ValidationReport,
        binding: &FieldBinding,
        node: NodeId,
        marked: Vec<NodeId>,
        message: &str,
    ) -> Result<()> {
        let marked = if binding.mark_invalid { marked } else { Vec::new() };
        for target in &marked {
            dom.class_add(*target, &self.config.fields.invalid_class)?;
        }
        if let ErrorTarget::Element(id) = &binding.error_target {
            if let Some(error_node) = dom.by_id(id) {
                dom.set_text_content(error_node, message)?;
            }
        }
        report.record(FieldFailure {
            node,
            marked,
            message: message.to_string(),
            capture: binding.capture,
            source: FailureSource::Rule(binding.role),
        });
        Ok(())
    }

    fn check_value(
        &self,
        dom: &mut Dom,
        report: &mut ValidationReport,
        role: FieldRole,
        check: impl FnOnce(&str) -> Result<Option<&'static str>>,
    ) -> Result<()> {
        let binding = self.config.fields.binding(role);
        let node = self.require(dom, &binding.element)?;
        let value = dom.value(node)?;
        if let Some(message) = check(&value)? {
            self.fail(dom, report, &binding, node, vec![node], message)?;
        }
        Ok(())
    }

    fn check_split_age(&self, dom: &mut Dom, report: &mut ValidationReport) -> Result<()> {
        let years_binding = self.config.fields.binding(FieldRole::AgeYears);
        let months_binding = self.config.fields.binding(FieldRole::AgeMonths);
        let years = self.require(dom, &years_binding.element)?;
        let months = self.require(dom, &months_binding.element)?;
        let age = read_split_age(&dom.value(years)?, &dom.value(months)?);

        match check_split_age(age) {
            SplitAgeVerdict::Valid => Ok(()),
            SplitAgeVerdict::Required => self.fail(
                dom,
                report,
                &years_binding,
                years,
                vec![years, months],
                AGE_REQUIRED,
            ),
            SplitAgeVerdict::TooOld => {
                let binding = match &self.config.fields.age_years_error {
                    Some(id) => FieldBinding {
                        error_target: ErrorTarget::Element(id.clone()),
                        ..years_binding
                    },
                    None => years_binding,
                };
                self.fail(dom, report, &binding, years, vec![years], AGE_TOO_OLD)
            }
        }
    }

    fn check_species(&self, dom: &mut Dom, report: &mut ValidationReport) -> Result<()> {
        let binding = self.config.fields.binding(FieldRole::Species);
        let radios = elements_by_name(dom, &binding.element)
            .into_iter()
            .filter(|node| is_radio_input(dom, *node))
            .collect::<Vec<_>>();
        let Some(first) = radios.first().copied() else {
            return Err(Error::MissingElement(binding.element));
        };
        let any_checked = radios
            .iter()
            .map(|radio| dom.checked(*radio))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .any(|checked| checked);
        if !any_checked {
            self.fail(dom, report, &binding, first, radios, SPECIES_REQUIRED)?;
        }
        Ok(())
    }

    fn check_photo(&self, dom: &mut Dom, report: &mut ValidationReport) -> Result<()> {
        let binding = self.config.fields.binding(FieldRole::Photo);
        let node = self.require(dom, &binding.element)?;
        if dom.files(node).is_empty() {
            self.fail(dom, report, &binding, node, vec![node], PHOTO_REQUIRED)?;
        }
        Ok(())
    }

    fn check_native_constraints(
        &self,
        dom: &mut Dom,
        report: &mut ValidationReport,
        form: NodeId,
    ) -> Result<()> {
        for (node, message) in invalid_controls(dom, form)? {
            dom.class_add(node, &self.config.fields.invalid_class)?;
            report.record(FieldFailure {
                node,
                marked: vec![node],
                message,
                capture: CapturePolicy::Capture,
                source: FailureSource::NativeConstraint,
            });
        }
        Ok(())
    }

    /// Evaluates every rule in order without stopping at the first failure.
    pub(crate) fn validate(&self, dom: &mut Dom) -> Result<ValidationReport> {
        let form = self.require(dom, &self.config.fields.form)?;
        self.clear_errors(dom)?;

        let mut report = ValidationReport::default();
        for role in FieldRole::ordered(self.config.age_shape) {
            match role {
                FieldRole::Name => {
                    self.check_value(dom, &mut report, role, |value| Ok(check_name(value)))?
                }
                FieldRole::Email => self.check_value(dom, &mut report, role, |value| {
                    check_email(&self.email_regex, value)
                })?,
                FieldRole::Password => {
                    self.check_value(dom, &mut report, role, |value| Ok(check_password(value)))?
                }
                FieldRole::Age => {
                    self.check_value(dom, &mut report, role, |value| Ok(check_single_age(value)))?
                }
                FieldRole::AgeYears | FieldRole::AgeMonths => {
                    self.check_split_age(dom, &mut report)?
                }
                FieldRole::Date => self.check_value(dom, &mut report, role, |value| {
                    Ok(check_required_text(value, DATE_REQUIRED))
                })?,
                FieldRole::Species => self.check_species(dom, &mut report)?,
                FieldRole::Diet => self.check_value(dom, &mut report, role, |value| {
                    Ok(check_required_text(value, DIET_REQUIRED))
                })?,
                FieldRole::Photo => self.check_photo(dom, &mut report)?,
            }
        }
        self.check_native_constraints(dom, &mut report, form)?;

        log::debug!(
            "validated #{}: {} failure(s)",
            self.config.fields.form,
            report.failures().len()
        );
        Ok(report)
    }

    fn read_age(&self, dom: &Dom) -> Result<PetAge> {
        let fields = &self.config.fields;
        match self.config.age_shape {
            AgeFieldShape::Split => {
                let years = dom.value(self.require(dom, &fields.age_years)?)?;
                let months = dom.value(self.require(dom, &fields.age_months)?)?;
                Ok(read_split_age(&years, &months))
            }
            AgeFieldShape::Single => {
                let raw = dom.value(self.require(dom, &fields.age)?)?;
                Ok(PetAge {
                    years: parse_int_prefix(&raw).unwrap_or(0),
                    months: 0,
                })
            }
        }
    }

    pub(crate) fn submit(&self, dom: &mut Dom) -> Result<ValidationOutcome> {
        let report = self.validate(dom)?;
        if !report.is_valid() {
            return Ok(ValidationOutcome::Rejected(report));
        }
        let form = self.require(dom, &self.config.fields.form)?;
        Ok(ValidationOutcome::Accepted(AcceptedSubmission {
            form_data: collect_form_data(dom, form)?,
            age: self.read_age(dom)?,
        }))
    }
}
