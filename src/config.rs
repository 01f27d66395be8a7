use super::*;
use serde::{Deserialize, Serialize};

/// How the pet's age is entered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeFieldShape {
    /// One whole-years field accepting 1 through 30.
    Single,
    /// Separate years and months fields.
    #[default]
    Split,
}

/// What happens after a submission passes every rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessAction {
    /// Render the submitted values into the confirmation overlay.
    #[default]
    ShowSummary,
    /// Follow the form's `action` URL.
    Navigate,
}

/// Element ids and names the page logic binds to.
///
/// Most rules write their message to `<id>Error`. The age rules write to
/// `age_error` instead, except that "too old" goes to `age_years_error` when
/// one is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldMap {
    pub form: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: String,
    pub age_years: String,
    pub age_months: String,
    /// Shared error element for the split age fields.
    pub age_error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_years_error: Option<String>,
    pub date: String,
    /// `name` attribute of the species radio group.
    pub species_group: String,
    pub species_error: String,
    pub diet: String,
    pub photo: String,
    pub range_input: String,
    pub range_display: String,
    pub overlay: String,
    pub overlay_content: String,
    pub overlay_close: String,
    pub overlay_confirm: String,
    /// Class shared by every inline error element.
    pub error_class: String,
    /// Marker class put on failing controls.
    pub invalid_class: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            form: "surveyForm".into(),
            name: "fullName".into(),
            email: "email".into(),
            password: "password".into(),
            age: "age".into(),
            age_years: "ageYears".into(),
            age_months: "ageMonths".into(),
            age_error: "ageError".into(),
            age_years_error: None,
            date: "dob".into(),
            species_group: "species".into(),
            species_error: "genderError".into(),
            diet: "country".into(),
            photo: "profilePic".into(),
            range_input: "satisfaction".into(),
            range_display: "rangeValue".into(),
            overlay: "confirmationModal".into(),
            overlay_content: "modalDataOutput".into(),
            overlay_close: "closeModalButton".into(),
            overlay_confirm: "okButton".into(),
            error_class: "error-message".into(),
            invalid_class: "invalid".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormConfig {
    #[serde(default)]
    pub age_shape: AgeFieldShape,
    #[serde(default)]
    pub on_success: SuccessAction,
    #[serde(default)]
    pub fields: FieldMap,
}

impl FormConfig {
    /// Split age fields; a valid submission opens the summary overlay.
    pub fn summary_overlay() -> Self {
        Self {
            age_shape: AgeFieldShape::Split,
            on_success: SuccessAction::ShowSummary,
            fields: FieldMap::default(),
        }
    }

    /// Single age field; a valid submission navigates to the form action.
    pub fn redirect() -> Self {
        Self {
            age_shape: AgeFieldShape::Single,
            on_success: SuccessAction::Navigate,
            fields: FieldMap::default(),
        }
    }

    pub fn from_json(src: &str) -> Result<Self> {
        let config = serde_json::from_str::<Self>(src)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let fields = &self.fields;
        let required = [
            ("form", &fields.form),
            ("name", &fields.name),
            ("email", &fields.email),
            ("password", &fields.password),
            ("date", &fields.date),
            ("species_group", &fields.species_group),
            ("diet", &fields.diet),
            ("photo", &fields.photo),
            ("error_class", &fields.error_class),
            ("invalid_class", &fields.invalid_class),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("fields.{key} must not be empty")));
            }
        }
        let age_ids = match self.age_shape {
            AgeFieldShape::Single => vec![("age", &fields.age)],
            AgeFieldShape::Split => vec![
                ("age_years", &fields.age_years),
                ("age_months", &fields.age_months),
            ],
        };
        for (key, value) in age_ids {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("fields.{key} must not be empty")));
            }
        }
        if fields
            .age_years_error
            .as_deref()
            .is_some_and(|id| id.trim().is_empty())
        {
            return Err(Error::Config(
                "fields.age_years_error must not be empty".into(),
            ));
        }
        Ok(())
    }
}
