use super::*;
use crate::dom::{Dom, NodeId};
use crate::form_controls::{FormData, FormValue};
use crate::rules::PetAge;
use serde::Serialize;
use serde_json::{Map, Value};

const AGE_KEY: &str = "petAge";
const AGE_LABEL: &str = "Pet's Age";
const VET_KEY: &str = "vetChecked";
const VET_LABEL: &str = "Vet Records Up-to-Date";
const NOTES_KEY: &str = "notes";
const PHOTO_KEY: &str = "petPhoto";

pub(crate) const LOG_HEADER: &str = "--- Form Submission Data ---";
pub(crate) const LOG_FOOTER: &str = "--------------------------";

/// Submitted names shown in the overlay, with their labels.
fn display_label(name: &str) -> Option<&'static str> {
    Some(match name {
        "petName" => "Pet's Name",
        "ownerEmail" => "Owner's Email",
        "adoptionDate" => "Adoption Date",
        "energyLevel" => "Energy Level (1-10)",
        "petPhoto" => "Pet Photo File",
        "vetChecked" => VET_LABEL,
        "species" => "Species",
        "dietType" => "Diet Type",
        "notes" => "Quirks & Habits",
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

impl SummaryRow {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// Human-readable rows for the confirmation overlay plus the key/value mapping
/// written to the console.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionSummary {
    rows: Vec<SummaryRow>,
    log: Map<String, Value>,
}

impl SubmissionSummary {
    pub(crate) fn build(form_data: &FormData, age: PetAge) -> Self {
        let age_text = age.display();
        let mut rows = vec![SummaryRow::new(AGE_LABEL, age_text.clone())];
        let mut log = Map::new();
        log.insert(AGE_KEY.to_string(), Value::String(age_text));

        for entry in form_data.entries() {
            let (display, logged) = match &entry.value {
                FormValue::Text(text) => (text.clone(), text.clone()),
                FormValue::File(file) => {
                    let (name, size) = file
                        .as_ref()
                        .map(|file| (file.name.clone(), file.size))
                        .unwrap_or_default();
                    let logged = if entry.name == PHOTO_KEY {
                        format!("File: {name} ({size} bytes)")
                    } else {
                        name.clone()
                    };
                    (name, logged)
                }
            };
            log.insert(entry.name.clone(), Value::String(logged));

            let Some(label) = display_label(&entry.name) else {
                continue;
            };
            match entry.name.as_str() {
                VET_KEY if display == "yes" => rows.push(SummaryRow::new(label, "Yes")),
                VET_KEY => {}
                NOTES_KEY if display.is_empty() => {
                    rows.push(SummaryRow::new(label, "None provided"))
                }
                _ => rows.push(SummaryRow::new(label, display)),
            }
        }

        if form_data.get(VET_KEY).is_none() {
            rows.push(SummaryRow::new(VET_LABEL, "No"));
            log.insert(VET_KEY.to_string(), Value::String("No".into()));
        }

        Self { rows, log }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Value of the first row carrying `label`.
    pub fn row(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }

    pub fn log(&self) -> &Map<String, Value> {
        &self.log
    }

    /// Header, pretty-printed mapping, footer.
    pub fn log_lines(&self) -> Vec<String> {
        vec![
            LOG_HEADER.to_string(),
            format!("{:#}", Value::Object(self.log.clone())),
            LOG_FOOTER.to_string(),
        ]
    }

    /// Replaces the children of `container` with one `<p><strong>` row per entry.
    pub(crate) fn render_into(&self, dom: &mut Dom, container: NodeId) -> Result<()> {
        dom.clear_children(container)?;
        for row in &self.rows {
            let paragraph = dom.append_element(container, "p");
            let strong = dom.append_element(paragraph, "strong");
            dom.create_text(strong, format!("{}:", row.label));
            dom.create_text(paragraph, format!(" {}", row.value));
        }
        Ok(())
    }
}
