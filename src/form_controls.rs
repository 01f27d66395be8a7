use super::*;
use crate::dom::{Dom, NodeId};

/// A file attached to a file input. Only the metadata the page reads is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFile {
    pub name: String,
    pub size: u64,
}

impl MockFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// A file input entry. `None` stands for a file input with nothing attached.
    File(Option<MockFile>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
    pub name: String,
    pub value: FormValue,
}

/// The named values a form would submit, in tree order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<FormEntry>,
}

impl FormData {
    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    fn append(&mut self, name: &str, value: FormValue) {
        self.entries.push(FormEntry {
            name: name.to_string(),
            value,
        });
    }
}

pub(crate) fn input_type(dom: &Dom, node_id: NodeId) -> String {
    dom.attr(node_id, "type")
        .map(|kind| kind.trim().to_ascii_lowercase())
        .filter(|kind| !kind.is_empty())
        .unwrap_or_else(|| "text".into())
}

fn is_input_of_type(dom: &Dom, node_id: NodeId, kind: &str) -> bool {
    dom.has_tag(node_id, "input") && input_type(dom, node_id) == kind
}

pub(crate) fn is_form_control(dom: &Dom, node_id: NodeId) -> bool {
    dom.has_tag(node_id, "input")
        || dom.has_tag(node_id, "select")
        || dom.has_tag(node_id, "textarea")
        || dom.has_tag(node_id, "button")
}

pub(crate) fn is_checkbox_input(dom: &Dom, node_id: NodeId) -> bool {
    is_input_of_type(dom, node_id, "checkbox")
}

pub(crate) fn is_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    is_input_of_type(dom, node_id, "radio")
}

pub(crate) fn is_checkbox_or_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    is_checkbox_input(dom, node_id) || is_radio_input(dom, node_id)
}

pub(crate) fn is_file_input(dom: &Dom, node_id: NodeId) -> bool {
    is_input_of_type(dom, node_id, "file")
}

pub(crate) fn is_range_input(dom: &Dom, node_id: NodeId) -> bool {
    is_input_of_type(dom, node_id, "range")
}

pub(crate) fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    if dom.has_tag(node_id, "button") {
        return dom
            .attr(node_id, "type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(true);
    }

    dom.has_tag(node_id, "input") && matches!(input_type(dom, node_id).as_str(), "submit" | "image")
}

pub(crate) fn is_reset_control(dom: &Dom, node_id: NodeId) -> bool {
    if dom.has_tag(node_id, "button") || dom.has_tag(node_id, "input") {
        return dom
            .attr(node_id, "type")
            .map(|kind| kind.eq_ignore_ascii_case("reset"))
            .unwrap_or(false);
    }
    false
}

/// Radios sharing `radio`'s name inside the same form owner, in tree order.
pub(crate) fn radio_group_members(dom: &Dom, radio: NodeId) -> Vec<NodeId> {
    let Some(name) = dom.attr(radio, "name").filter(|name| !name.is_empty()) else {
        return vec![radio];
    };
    let owner = dom.find_ancestor_by_tag(radio, "form");
    dom.descendant_elements(dom.root)
        .into_iter()
        .filter(|node| {
            is_radio_input(dom, *node)
                && dom.attr(*node, "name").as_deref() == Some(name.as_str())
                && dom.find_ancestor_by_tag(*node, "form") == owner
        })
        .collect()
}

pub(crate) fn elements_by_name(dom: &Dom, name: &str) -> Vec<NodeId> {
    dom.descendant_elements(dom.root)
        .into_iter()
        .filter(|node| dom.attr(*node, "name").as_deref() == Some(name))
        .collect()
}

pub(crate) fn uncheck_other_radios_in_group(dom: &mut Dom, radio: NodeId) -> Result<()> {
    for member in radio_group_members(dom, radio) {
        if member != radio {
            dom.set_checked(member, false)?;
        }
    }
    Ok(())
}

/// Controls owned by `form`, in tree order.
pub(crate) fn form_controls(dom: &Dom, form: NodeId) -> Vec<NodeId> {
    dom.descendant_elements(form)
        .into_iter()
        .filter(|node| is_form_control(dom, *node))
        .collect()
}

/// Builds the entry list `form` would submit.
pub(crate) fn collect_form_data(dom: &Dom, form: NodeId) -> Result<FormData> {
    let mut data = FormData::default();
    for control in form_controls(dom, form) {
        if dom.disabled(control) || dom.has_tag(control, "button") {
            continue;
        }
        let Some(name) = dom.attr(control, "name").filter(|name| !name.is_empty()) else {
            continue;
        };

        if dom.has_tag(control, "input") {
            let kind = input_type(dom, control);
            match kind.as_str() {
                "submit" | "reset" | "button" | "image" => continue,
                "checkbox" | "radio" => {
                    if dom.checked(control)? {
                        data.append(&name, FormValue::Text(dom.value(control)?));
                    }
                    continue;
                }
                "file" => {
                    let files = dom.files(control);
                    if files.is_empty() {
                        data.append(&name, FormValue::File(None));
                    }
                    for file in files {
                        data.append(&name, FormValue::File(Some(file.clone())));
                    }
                    continue;
                }
                _ => {}
            }
        }

        data.append(&name, FormValue::Text(dom.value(control)?));
    }
    Ok(data)
}
