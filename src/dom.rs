use super::*;
use crate::form_controls::{MockFile, input_type, is_checkbox_or_radio_input};
use std::collections::HashMap;

/// Opaque handle to a node inside a parsed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[cfg(test)]
impl NodeId {
    pub(crate) fn for_tests(index: usize) -> Self {
        Self(index)
    }
}

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
    pub(crate) required: bool,
    pub(crate) files: Vec<MockFile>,
}

impl Element {
    pub(crate) fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    pub(crate) root: NodeId,
    id_index: HashMap<String, NodeId>,
    /// Slots of detached nodes, reused before the arena grows.
    free: Vec<NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
            free: Vec::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let node = Node {
            parent,
            children: Vec::new(),
            node_type,
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot.0] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        };
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let checked = attrs.contains_key("checked");
        let disabled = attrs.contains_key("disabled");
        let readonly = attrs.contains_key("readonly");
        let required = attrs.contains_key("required");
        let element = Element {
            tag_name,
            attrs,
            value,
            checked,
            disabled,
            readonly,
            required,
            files: Vec::new(),
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.entry(id_attr).or_insert(id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut_or_err(&mut self, node_id: NodeId, what: &str) -> Result<&mut Element> {
        self.element_mut(node_id)
            .ok_or_else(|| not_an_element(what))
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn has_tag(&self, node_id: NodeId, tag: &str) -> bool {
        self.element(node_id).is_some_and(|e| e.is_tag(tag))
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn element_id(&self, node_id: NodeId) -> Option<String> {
        self.attr(node_id, "id").filter(|id| !id.is_empty())
    }

    pub(crate) fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self.has_tag(current, tag) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Element descendants of `root` in tree order, excluding `root` itself.
    pub(crate) fn descendant_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.nodes[root.0]
            .children
            .iter()
            .rev()
            .copied()
            .collect::<Vec<_>>();
        while let Some(node) = stack.pop() {
            if self.element(node).is_some() {
                out.push(node);
            }
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    pub(crate) fn set_text_content(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        self.clear_children(node_id)?;
        if !value.is_empty() {
            self.create_text(node_id, value.to_string());
        }
        Ok(())
    }

    /// Removes every descendant of `node_id`. Their slots go back to the free
    /// list, so handles to removed nodes must not be kept.
    pub(crate) fn clear_children(&mut self, node_id: NodeId) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(not_an_element("children"));
        }
        let mut detached = std::mem::take(&mut self.nodes[node_id.0].children);
        while let Some(child) = detached.pop() {
            let node = &mut self.nodes[child.0];
            detached.append(&mut node.children);
            node.parent = None;
            let removed = std::mem::replace(&mut node.node_type, NodeType::Text(String::new()));
            if let NodeType::Element(element) = removed {
                if let Some(id_attr) = element.attrs.get("id") {
                    if self.id_index.get(id_attr) == Some(&child) {
                        self.id_index.remove(id_attr);
                    }
                }
            }
            self.free.push(child);
        }
        Ok(())
    }

    pub(crate) fn append_element(&mut self, parent: NodeId, tag_name: &str) -> NodeId {
        self.create_element(parent, tag_name.to_ascii_lowercase(), HashMap::new())
    }

    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| not_an_element("value"))?;
        if element.is_tag("option") {
            return Ok(self.option_value(node_id));
        }
        Ok(element.value.clone())
    }

    /// Stores `value` as typed. Range inputs are clamped and snapped; other
    /// types skip browser sanitizing, so an email keeps surrounding whitespace
    /// and a number input keeps non-numeric text.
    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let sanitized = if self.has_tag(node_id, "input") && input_type(self, node_id) == "range" {
            self.sanitize_range_value(node_id, value)
        } else {
            value.to_string()
        };
        self.element_mut_or_err(node_id, "value")?.value = sanitized;
        Ok(())
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> Result<bool> {
        self.element(node_id)
            .map(|element| element.checked)
            .ok_or_else(|| not_an_element("checked"))
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        self.element_mut_or_err(node_id, "checked")?.checked = checked;
        Ok(())
    }

    pub(crate) fn files(&self, node_id: NodeId) -> &[MockFile] {
        self.element(node_id)
            .map(|element| element.files.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn set_files(&mut self, node_id: NodeId, files: Vec<MockFile>) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "files")?;
        element.value = files
            .first()
            .map(|file| format!("C:\\fakepath\\{}", file.name))
            .unwrap_or_default();
        element.files = files;
        Ok(())
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.disabled)
    }

    pub(crate) fn readonly(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.readonly)
    }

    pub(crate) fn required(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.required)
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> bool {
        self.element(node_id).is_some_and(|element| {
            class_tokens(element.attrs.get("class").map(String::as_str))
                .iter()
                .any(|name| name == class_name)
        })
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|name| name != class_name);
        set_class_attr(element, &classes);
        Ok(())
    }

    pub(crate) fn style_property(&self, node_id: NodeId, property: &str) -> Option<String> {
        let style = self.attr(node_id, "style")?;
        parse_style_declarations(&style)
            .into_iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value)
    }

    pub(crate) fn set_style_property(
        &mut self,
        node_id: NodeId,
        property: &str,
        value: &str,
    ) -> Result<()> {
        let element = self.element_mut_or_err(node_id, "style")?;
        let mut decls = parse_style_declarations(
            element.attrs.get("style").map(String::as_str).unwrap_or(""),
        );
        decls.retain(|(name, _)| !name.eq_ignore_ascii_case(property));
        if !value.is_empty() {
            decls.push((property.to_ascii_lowercase(), value.to_string()));
        }
        let serialized = decls
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        if serialized.is_empty() {
            element.attrs.remove("style");
        } else {
            element.attrs.insert("style".into(), serialized);
        }
        Ok(())
    }

    fn option_value(&self, option: NodeId) -> String {
        self.attr(option, "value").unwrap_or_else(|| {
            self.text_content(option)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendant_elements(select)
            .into_iter()
            .filter(|node| self.has_tag(*node, "option"))
            .collect()
    }

    fn default_select_value(&self, select: NodeId) -> String {
        let options = self.select_options(select);
        let selected = options
            .iter()
            .rev()
            .find(|option| self.attr(**option, "selected").is_some())
            .or_else(|| options.iter().find(|option| !self.disabled(**option)));
        selected
            .map(|option| self.option_value(*option))
            .unwrap_or_default()
    }

    /// Picks the option whose value equals `value`; returns `false` when none does.
    pub(crate) fn select_option(&mut self, select: NodeId, value: &str) -> Result<bool> {
        let matched = self
            .select_options(select)
            .into_iter()
            .any(|option| self.option_value(option) == value);
        if matched {
            self.element_mut_or_err(select, "select")?.value = value.to_string();
        }
        Ok(matched)
    }

    fn range_bounds(&self, node_id: NodeId) -> (f64, f64, f64) {
        let parse = |name: &str| {
            self.attr(node_id, name)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite())
        };
        let min = parse("min").unwrap_or(0.0);
        let max = parse("max").unwrap_or(100.0).max(min);
        let step = parse("step").filter(|step| *step > 0.0).unwrap_or(1.0);
        (min, max, step)
    }

    fn sanitize_range_value(&self, node_id: NodeId, raw: &str) -> String {
        let (min, max, step) = self.range_bounds(node_id);
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .unwrap_or(min + (max - min) / 2.0)
            .clamp(min, max);
        let mut snapped = min + ((value - min) / step).round() * step;
        if snapped > max {
            snapped -= step;
        }
        format_number(snapped)
    }

    fn default_control_value(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return String::new();
        };
        if element.is_tag("select") {
            return self.default_select_value(node_id);
        }
        if element.is_tag("textarea") {
            return self.text_content(node_id);
        }
        let raw = element.attrs.get("value").cloned().unwrap_or_default();
        match input_type(self, node_id).as_str() {
            "range" => self.sanitize_range_value(node_id, &raw),
            "checkbox" | "radio" if !element.attrs.contains_key("value") => "on".into(),
            "file" => String::new(),
            _ => raw,
        }
    }

    pub(crate) fn initialize_form_control_values(&mut self) -> Result<()> {
        for node in self.descendant_elements(self.root) {
            let is_control = self.element(node).is_some_and(|element| {
                element.is_tag("input") || element.is_tag("select") || element.is_tag("textarea")
            });
            if !is_control {
                continue;
            }
            let value = self.default_control_value(node);
            self.element_mut_or_err(node, "value")?.value = value;
        }
        Ok(())
    }

    /// Restores every control under `form` to its markup default.
    pub(crate) fn reset_form(&mut self, form: NodeId) -> Result<()> {
        for node in self.descendant_elements(form) {
            let is_control = self.element(node).is_some_and(|element| {
                element.is_tag("input") || element.is_tag("select") || element.is_tag("textarea")
            });
            if !is_control {
                continue;
            }
            let value = self.default_control_value(node);
            let default_checked =
                is_checkbox_or_radio_input(self, node) && self.attr(node, "checked").is_some();
            let element = self.element_mut_or_err(node, "reset")?;
            element.value = value;
            element.checked = default_checked;
            element.files.clear();
        }
        Ok(())
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
            NodeType::Element(element) => {
                let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                attrs.sort();
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.tag_name);
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(v);
                    out.push('"');
                }
                out.push('>');
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
                out
            }
        }
    }
}

fn not_an_element(what: &str) -> Error {
    Error::TypeMismatch {
        selector: what.to_string(),
        expected: "element".into(),
        actual: "non-element".into(),
    }
}

fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".into(), classes.join(" "));
    }
}

fn parse_style_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
