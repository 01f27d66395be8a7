use super::*;
use crate::config::{FormConfig, SuccessAction};
use crate::dom::{Dom, NodeId};
use crate::form_controls::{
    MockFile, input_type, is_checkbox_input, is_checkbox_or_radio_input, is_file_input,
    is_radio_input, is_range_input, is_reset_control, is_submit_control,
    uncheck_other_radios_in_group,
};
use crate::html::parse_html;
use crate::location::resolve_url;
use crate::rules::ValidationReport;
use crate::summary::SubmissionSummary;
use crate::validator::{FormValidator, ValidationOutcome};
use std::collections::VecDeque;

const DEFAULT_CONSOLE_LOG_LIMIT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Center,
}

/// The page asked for `node` to be scrolled into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub node: NodeId,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

#[derive(Debug, Clone)]
struct ConsoleState {
    enabled: bool,
    logs: VecDeque<String>,
    log_limit: usize,
    to_stderr: bool,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            enabled: true,
            logs: VecDeque::new(),
            log_limit: DEFAULT_CONSOLE_LOG_LIMIT,
            to_stderr: false,
        }
    }
}

/// A parsed adoption form page with its submit, slider and overlay behavior wired up.
///
/// Drive it the way a user would (`type_text`, `click`, `submit`, ...) and inspect
/// the result through the accessors and `assert_*` helpers.
#[derive(Debug)]
pub struct FormPage {
    dom: Dom,
    validator: FormValidator,
    document_url: String,
    console: ConsoleState,
    last_report: Option<ValidationReport>,
    last_summary: Option<SubmissionSummary>,
    scroll_request: Option<ScrollRequest>,
    navigations: Vec<String>,
}

impl FormPage {
    pub fn from_html(html: &str, config: FormConfig) -> Result<Self> {
        Self::from_html_with_url("about:blank", html, config)
    }

    pub fn from_html_with_url(url: &str, html: &str, config: FormConfig) -> Result<Self> {
        let dom = parse_html(html)?;
        let validator = FormValidator::new(config)?;
        let page = Self {
            dom,
            validator,
            document_url: url.to_string(),
            console: ConsoleState::default(),
            last_report: None,
            last_summary: None,
            scroll_request: None,
            navigations: Vec::new(),
        };
        page.form()?;
        log::debug!("loaded form page at {url}");
        Ok(page)
    }

    pub fn config(&self) -> &FormConfig {
        self.validator.config()
    }

    fn form(&self) -> Result<NodeId> {
        self.configured(&self.config().fields.form)
    }

    fn configured(&self, id: &str) -> Result<NodeId> {
        self.dom
            .by_id(id)
            .ok_or_else(|| Error::MissingElement(id.to_string()))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    fn type_mismatch(&self, selector: &str, expected: &str, node: NodeId) -> Error {
        let actual = match self.dom.tag_name(node) {
            Some("input") => format!("input[type={}]", input_type(&self.dom, node)),
            Some(tag) => tag.to_string(),
            None => "non-element".to_string(),
        };
        Error::TypeMismatch {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual,
        }
    }

    fn console_log(&mut self, line: String) {
        if !self.console.enabled {
            return;
        }
        if self.console.to_stderr {
            eprintln!("{line}");
        }
        if self.console.logs.len() >= self.console.log_limit {
            self.console.logs.pop_front();
        }
        self.console.logs.push_back(line);
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) || self.dom.readonly(target) {
            return Ok(());
        }
        let is_text_input = self.dom.has_tag(target, "input")
            && !is_checkbox_or_radio_input(&self.dom, target)
            && !is_file_input(&self.dom, target);
        if !is_text_input && !self.dom.has_tag(target, "textarea") {
            return Err(self.type_mismatch(selector, "input or textarea", target));
        }
        self.dom.set_value(target, text)?;
        self.fire_input(target)
    }

    pub fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if !self.dom.has_tag(target, "select") {
            return Err(self.type_mismatch(selector, "select", target));
        }
        if self.dom.disabled(target) {
            return Ok(());
        }
        if !self.dom.select_option(target, value)? {
            return Err(Error::SelectorNotFound(format!(
                "{selector} option[value={value}]"
            )));
        }
        Ok(())
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if !is_checkbox_or_radio_input(&self.dom, target) {
            return Err(self.type_mismatch(selector, "input[type=checkbox|radio]", target));
        }
        if self.dom.disabled(target) {
            return Ok(());
        }
        if checked && is_radio_input(&self.dom, target) {
            uncheck_other_radios_in_group(&mut self.dom, target)?;
        }
        self.dom.set_checked(target, checked)
    }

    pub fn set_files(&mut self, selector: &str, files: Vec<MockFile>) -> Result<()> {
        let target = self.select_one(selector)?;
        if !is_file_input(&self.dom, target) {
            return Err(self.type_mismatch(selector, "input[type=file]", target));
        }
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.dom.set_files(target, files)
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    fn click_node(&mut self, target: NodeId) -> Result<()> {
        if self.dom.disabled(target) {
            return Ok(());
        }

        if is_checkbox_input(&self.dom, target) {
            let checked = self.dom.checked(target)?;
            self.dom.set_checked(target, !checked)?;
        } else if is_radio_input(&self.dom, target) {
            uncheck_other_radios_in_group(&mut self.dom, target)?;
            self.dom.set_checked(target, true)?;
        }

        let fields = &self.config().fields;
        let closes_overlay = [&fields.overlay_close, &fields.overlay_confirm, &fields.overlay]
            .into_iter()
            .any(|id| self.dom.by_id(id) == Some(target));
        if closes_overlay {
            return self.close_overlay();
        }

        let owner = self.dom.find_ancestor_by_tag(target, "form");
        match owner {
            Some(form) if is_submit_control(&self.dom, target) => self.submit_form(form),
            Some(form) if is_reset_control(&self.dom, target) => self.reset_form(form),
            _ => Ok(()),
        }
    }

    /// Submits the form `selector` names, or the form owning the matched control.
    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let form = if self.dom.has_tag(target, "form") {
            Some(target)
        } else {
            self.dom.find_ancestor_by_tag(target, "form")
        };
        let Some(form) = form else {
            return Err(self.type_mismatch(selector, "form or form control", target));
        };
        self.submit_form(form)
    }

    /// Fires `event` at the element `selector` matches. Only the events the page
    /// listens for have an effect.
    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        match event {
            "input" => self.fire_input(target),
            "click" => self.click_node(target),
            "submit" if self.dom.has_tag(target, "form") => self.submit_form(target),
            "reset" if self.dom.has_tag(target, "form") => self.reset_form(target),
            _ => Ok(()),
        }
    }

    fn fire_input(&mut self, target: NodeId) -> Result<()> {
        let is_slider = is_range_input(&self.dom, target)
            && self.dom.by_id(&self.config().fields.range_input) == Some(target);
        if is_slider {
            self.sync_range_display()?;
        }
        Ok(())
    }

    /// Copies the slider's current value into its readout.
    fn sync_range_display(&mut self) -> Result<()> {
        let fields = &self.config().fields;
        let (Some(slider), Some(readout)) = (
            self.dom.by_id(&fields.range_input),
            self.dom.by_id(&fields.range_display),
        ) else {
            return Ok(());
        };
        let value = self.dom.value(slider)?;
        self.dom.set_text_content(readout, &value)
    }

    fn reset_form(&mut self, form: NodeId) -> Result<()> {
        self.dom.reset_form(form)?;
        self.sync_range_display()
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        if Some(form) != self.dom.by_id(&self.config().fields.form) {
            let action = self.dom.attr(form, "action").unwrap_or_default();
            self.navigate(&action);
            return Ok(());
        }

        match self.validator.submit(&mut self.dom)? {
            ValidationOutcome::Rejected(report) => {
                log::info!(
                    "submission rejected: {} field(s) failed",
                    report.failures().len()
                );
                self.scroll_request = report.first_invalid().map(|node| ScrollRequest {
                    node,
                    behavior: ScrollBehavior::Smooth,
                    block: ScrollBlock::Center,
                });
                self.last_summary = None;
                self.last_report = Some(report);
            }
            ValidationOutcome::Accepted(accepted) => {
                self.scroll_request = None;
                self.last_report = Some(ValidationReport::default());
                let on_success = self.config().on_success;
                match on_success {
                    SuccessAction::ShowSummary => {
                        let summary = SubmissionSummary::build(&accepted.form_data, accepted.age);
                        self.show_summary(&summary)?;
                        self.last_summary = Some(summary);
                    }
                    SuccessAction::Navigate => {
                        let action = self.dom.attr(form, "action").unwrap_or_default();
                        self.last_summary = None;
                        self.navigate(&action);
                    }
                }
            }
        }
        Ok(())
    }

    fn show_summary(&mut self, summary: &SubmissionSummary) -> Result<()> {
        let fields = &self.config().fields;
        let overlay = self.configured(&fields.overlay)?;
        let content = self.configured(&fields.overlay_content)?;
        for line in summary.log_lines() {
            self.console_log(line);
        }
        summary.render_into(&mut self.dom, content)?;
        self.dom.set_style_property(overlay, "display", "block")?;
        log::info!("submission accepted: showing {} summary row(s)", summary.rows().len());
        Ok(())
    }

    fn close_overlay(&mut self) -> Result<()> {
        let overlay = self.configured(&self.config().fields.overlay)?;
        self.dom.set_style_property(overlay, "display", "none")?;
        let form = self.form()?;
        self.reset_form(form)?;
        log::debug!("summary overlay closed");
        Ok(())
    }

    fn navigate(&mut self, action: &str) {
        let url = resolve_url(&self.document_url, action);
        log::info!("navigating to {url}");
        self.navigations.push(url);
    }

    pub fn overlay_visible(&self) -> bool {
        self.dom
            .by_id(&self.config().fields.overlay)
            .and_then(|overlay| self.dom.style_property(overlay, "display"))
            .is_some_and(|display| display == "block")
    }

    pub fn scroll_request(&self) -> Option<ScrollRequest> {
        self.scroll_request
    }

    /// `id` of the element the last rejected submit scrolled to.
    pub fn scroll_target_id(&self) -> Option<String> {
        self.scroll_request
            .and_then(|request| self.dom.element_id(request.node))
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn current_url(&self) -> &str {
        self.navigations
            .last()
            .map(String::as_str)
            .unwrap_or(self.document_url.as_str())
    }

    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.last_report.as_ref()
    }

    pub fn last_summary(&self) -> Option<&SubmissionSummary> {
        self.last_summary.as_ref()
    }

    pub fn take_console_logs(&mut self) -> Vec<String> {
        self.console.logs.drain(..).collect()
    }

    pub fn set_console_enabled(&mut self, enabled: bool) {
        self.console.enabled = enabled;
    }

    pub fn set_console_stderr(&mut self, enabled: bool) {
        self.console.to_stderr = enabled;
    }

    pub fn set_console_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Config(
                "set_console_log_limit requires at least 1 entry".into(),
            ));
        }
        self.console.log_limit = max_entries;
        while self.console.logs.len() > self.console.log_limit {
            self.console.logs.pop_front();
        }
        Ok(())
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.class_contains(target, class_name))
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name);
        if actual != expected {
            let describe = |present: bool| {
                if present {
                    format!("class {class_name}")
                } else {
                    format!("no class {class_name}")
                }
            };
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: describe(expected),
                actual: describe(actual),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }
}
