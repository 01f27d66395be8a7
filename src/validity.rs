use super::*;
use crate::dom::{Dom, NodeId};
use crate::form_controls::{form_controls, input_type, radio_group_members};
use crate::pattern::Regex;

/// Outcome of the declarative constraint check for one control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ConstraintValidity {
    pub(crate) value_missing: bool,
    pub(crate) type_mismatch: bool,
    pub(crate) pattern_mismatch: bool,
    pub(crate) too_long: bool,
    pub(crate) too_short: bool,
    pub(crate) range_underflow: bool,
    pub(crate) range_overflow: bool,
    pub(crate) step_mismatch: bool,
    pub(crate) bad_input: bool,
}

impl ConstraintValidity {
    pub(crate) fn valid(&self) -> bool {
        !(self.value_missing
            || self.type_mismatch
            || self.pattern_mismatch
            || self.too_long
            || self.too_short
            || self.range_underflow
            || self.range_overflow
            || self.step_mismatch
            || self.bad_input)
    }
}

fn input_participates_in_constraint_validation(kind: &str) -> bool {
    !matches!(kind, "button" | "submit" | "reset" | "hidden" | "image")
}

fn input_supports_required(kind: &str) -> bool {
    !matches!(kind, "range" | "color")
}

fn parse_attr_i64(dom: &Dom, node: NodeId, name: &str) -> Option<i64> {
    dom.attr(node, name)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
}

fn parse_attr_f64(dom: &Dom, node: NodeId, name: &str) -> Option<f64> {
    dom.attr(node, name).and_then(|raw| parse_number_value(&raw))
}

fn parse_number_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a `YYYY-MM-DD` date input value into comparable components.
fn parse_date_input_value(raw: &str) -> Option<(i32, u32, u32)> {
    let mut parts = raw.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || year.len() < 4 || month.len() != 2 || day.len() != 2 {
        return None;
    }
    if ![year, month, day]
        .iter()
        .all(|part| part.chars().all(|ch| ch.is_ascii_digit()))
    {
        return None;
    }
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    let day = day.parse::<u32>().ok()?;
    if year < 1 || !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
        return None;
    }
    Some((year, month, day))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

fn is_ascii_email_local_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '.' | '!'
                | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
                | '-'
        )
}

fn is_valid_email_domain_label(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }
    let bytes = label.as_bytes();
    bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        && bytes[0].is_ascii_alphanumeric()
        && bytes[bytes.len() - 1].is_ascii_alphanumeric()
}

/// The email syntax an `<input type=email>` accepts natively.
pub(crate) fn is_simple_email(value: &str) -> bool {
    let Some((local, domain)) = value.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && local.chars().all(is_ascii_email_local_char)
        && !domain.is_empty()
        && domain.split('.').all(is_valid_email_domain_label)
}

fn is_radio_group_checked(dom: &Dom, radio: NodeId) -> bool {
    radio_group_members(dom, radio)
        .into_iter()
        .any(|member| dom.checked(member).unwrap_or(false))
}

pub(crate) fn compute_validity(dom: &Dom, node: NodeId) -> Result<ConstraintValidity> {
    let mut validity = ConstraintValidity::default();
    if dom.disabled(node) {
        return Ok(validity);
    }

    let Some(tag_name) = dom.tag_name(node) else {
        return Ok(validity);
    };

    if tag_name == "select" {
        validity.value_missing = dom.required(node) && dom.value(node)?.is_empty();
        return Ok(validity);
    }

    if tag_name == "textarea" {
        let value = dom.value(node)?;
        validity.value_missing = dom.required(node) && !dom.readonly(node) && value.is_empty();
        check_length(dom, node, &value, &mut validity);
        return Ok(validity);
    }

    if tag_name != "input" {
        return Ok(validity);
    }

    let kind = input_type(dom, node);
    if !input_participates_in_constraint_validation(&kind) {
        return Ok(validity);
    }
    let value = dom.value(node)?;

    if dom.required(node) && !dom.readonly(node) && input_supports_required(&kind) {
        validity.value_missing = match kind.as_str() {
            "checkbox" => !dom.checked(node)?,
            "radio" => !is_radio_group_checked(dom, node),
            "file" => dom.files(node).is_empty(),
            _ => value.is_empty(),
        };
    }

    if value.is_empty() || matches!(kind.as_str(), "checkbox" | "radio" | "file") {
        return Ok(validity);
    }

    if kind == "email" {
        validity.type_mismatch = !is_simple_email(&value);
    }

    if matches!(
        kind.as_str(),
        "text" | "search" | "url" | "tel" | "email" | "password"
    ) {
        check_length(dom, node, &value, &mut validity);
        if let Some(pattern) = dom.attr(node, "pattern").filter(|p| !p.is_empty()) {
            // An uncompilable pattern attribute is ignored, as browsers do.
            if let Ok(regex) = Regex::whole_value(&pattern) {
                validity.pattern_mismatch = !regex.is_match(&value)?;
            }
        }
    }

    match kind.as_str() {
        "number" | "range" => match parse_number_value(&value) {
            Some(numeric) => {
                let min = parse_attr_f64(dom, node, "min");
                let max = parse_attr_f64(dom, node, "max");
                validity.range_underflow = min.is_some_and(|min| numeric < min);
                validity.range_overflow = max.is_some_and(|max| numeric > max);

                let step_attr = dom.attr(node, "step").unwrap_or_default();
                if !step_attr.eq_ignore_ascii_case("any") {
                    let step = parse_number_value(&step_attr)
                        .filter(|step| *step > 0.0)
                        .unwrap_or(1.0);
                    let base = min.unwrap_or(0.0);
                    let ratio = (numeric - base) / step;
                    validity.step_mismatch = (ratio - ratio.round()).abs() > 1e-7;
                }
            }
            None => validity.bad_input = true,
        },
        "date" => match parse_date_input_value(&value) {
            Some(date) => {
                let bound = |name: &str| {
                    dom.attr(node, name)
                        .and_then(|raw| parse_date_input_value(&raw))
                };
                validity.range_underflow = bound("min").is_some_and(|min| date < min);
                validity.range_overflow = bound("max").is_some_and(|max| date > max);
            }
            None => validity.bad_input = true,
        },
        _ => {}
    }

    Ok(validity)
}

fn check_length(dom: &Dom, node: NodeId, value: &str, validity: &mut ConstraintValidity) {
    if value.is_empty() {
        return;
    }
    let value_len = value.chars().count() as i64;
    if let Some(min_len) = parse_attr_i64(dom, node, "minlength") {
        validity.too_short = min_len >= 0 && value_len < min_len;
    }
    if let Some(max_len) = parse_attr_i64(dom, node, "maxlength") {
        validity.too_long = max_len >= 0 && value_len > max_len;
    }
}

/// Human-readable reason for the first failing constraint, empty when valid.
pub(crate) fn validation_message(dom: &Dom, node: NodeId, validity: &ConstraintValidity) -> String {
    let kind = if dom.has_tag(node, "input") {
        input_type(dom, node)
    } else {
        dom.tag_name(node).unwrap_or_default().to_string()
    };
    let attr = |name: &str| dom.attr(node, name).unwrap_or_default();

    if validity.value_missing {
        return match kind.as_str() {
            "checkbox" => "Please check this box if you want to proceed.",
            "radio" => "Please select one of these options.",
            "file" => "Please select a file.",
            "select" => "Please select an item in the list.",
            _ => "Please fill out this field.",
        }
        .to_string();
    }
    if validity.type_mismatch {
        return "Please enter an email address.".to_string();
    }
    if validity.bad_input {
        return match kind.as_str() {
            "number" | "range" => "Please enter a number.",
            _ => "Please enter a valid value.",
        }
        .to_string();
    }
    if validity.too_short {
        return format!(
            "Please lengthen this text to {} characters or more.",
            attr("minlength")
        );
    }
    if validity.too_long {
        return format!(
            "Please shorten this text to {} characters or less.",
            attr("maxlength")
        );
    }
    if validity.pattern_mismatch {
        return "Please match the requested format.".to_string();
    }
    if validity.range_underflow {
        return format!("Value must be greater than or equal to {}.", attr("min"));
    }
    if validity.range_overflow {
        return format!("Value must be less than or equal to {}.", attr("max"));
    }
    if validity.step_mismatch {
        return "Please enter a valid value.".to_string();
    }
    String::new()
}

/// Controls under `form` that fail their declarative constraints, in tree order.
pub(crate) fn invalid_controls(dom: &Dom, form: NodeId) -> Result<Vec<(NodeId, String)>> {
    let mut out = Vec::new();
    for control in form_controls(dom, form) {
        let validity = compute_validity(dom, control)?;
        if !validity.valid() {
            out.push((control, validation_message(dom, control, &validity)));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_controls::MockFile;
    use crate::html::parse_html;

    fn validity_of(html: &str, id: &str) -> Result<ConstraintValidity> {
        let dom = parse_html(html)?;
        let node = dom.by_id(id).expect("control exists");
        compute_validity(&dom, node)
    }

    #[test]
    fn required_text_and_select_report_value_missing() -> Result<()> {
        assert!(validity_of("<input id='n' required>", "n")?.value_missing);
        assert!(
            validity_of(
                "<select id='s' required><option value=''>Pick</option><option>Raw</option></select>",
                "s"
            )?
            .value_missing
        );
        assert!(validity_of("<input id='n' required readonly>", "n")?.valid());
        assert!(validity_of("<input id='n' required disabled>", "n")?.valid());
        Ok(())
    }

    #[test]
    fn pattern_and_length_constraints_apply_to_text() -> Result<()> {
        let v = validity_of("<input id='n' value='ab1' pattern='[A-Za-z]+' minlength='4'>", "n")?;
        assert!(v.pattern_mismatch);
        assert!(v.too_short);
        assert!(validity_of("<input id='n' value='Rexy' pattern='[A-Za-z]+'>", "n")?.valid());
        assert!(validity_of("<input id='n' value='x' pattern='('>", "n")?.valid());
        Ok(())
    }

    #[test]
    fn email_type_requires_local_part_and_domain() -> Result<()> {
        assert!(validity_of("<input id='e' type='email' value='owner@vet.example'>", "e")?.valid());
        assert!(validity_of("<input id='e' type='email' value='owner@'>", "e")?.type_mismatch);
        assert!(validity_of("<input id='e' type='email' value='a b@c.d'>", "e")?.type_mismatch);
        assert!(validity_of("<input id='e' type='email'>", "e")?.valid());
        Ok(())
    }

    #[test]
    fn numeric_range_and_step_checks() -> Result<()> {
        let html = "<input id='a' type='number' min='1' max='30' value='31'>";
        assert!(validity_of(html, "a")?.range_overflow);
        let html = "<input id='a' type='number' min='1' max='30' value='0'>";
        assert!(validity_of(html, "a")?.range_underflow);
        let html = "<input id='a' type='number' min='1' max='30' value='2.5'>";
        assert!(validity_of(html, "a")?.step_mismatch);
        let html = "<input id='a' type='number' value='abc'>";
        assert!(validity_of(html, "a")?.bad_input);
        Ok(())
    }

    #[test]
    fn date_bounds_and_syntax() -> Result<()> {
        let html = "<input id='d' type='date' max='2026-12-31' value='2027-01-01'>";
        assert!(validity_of(html, "d")?.range_overflow);
        let html = "<input id='d' type='date' value='2025-02-29'>";
        assert!(validity_of(html, "d")?.bad_input);
        let html = "<input id='d' type='date' value='2024-02-29'>";
        assert!(validity_of(html, "d")?.valid());
        Ok(())
    }

    #[test]
    fn required_radio_group_is_satisfied_by_any_member() -> Result<()> {
        let html = r#"
        <form id='f'>
          <input id='dog' type='radio' name='species' value='Dog' required>
          <input id='cat' type='radio' name='species' value='Cat' checked>
        </form>"#;
        assert!(validity_of(html, "dog")?.valid());
        Ok(())
    }

    #[test]
    fn invalid_controls_lists_failures_with_messages() -> Result<()> {
        let html = r#"
        <form id='f'>
          <input id='name' required>
          <input id='photo' type='file' required>
          <input id='ok' value='fine' required>
        </form>"#;
        let mut dom = parse_html(html)?;
        let form = dom.by_id("f").expect("form exists");
        let failures = invalid_controls(&dom, form)?;
        let ids = failures
            .iter()
            .map(|(node, message)| (dom.element_id(*node).unwrap_or_default(), message.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                ("name".to_string(), "Please fill out this field.".to_string()),
                ("photo".to_string(), "Please select a file.".to_string()),
            ]
        );

        let photo = dom.by_id("photo").expect("photo exists");
        dom.set_files(photo, vec![MockFile::new("a.png", 10)])?;
        assert_eq!(invalid_controls(&dom, form)?.len(), 1);
        Ok(())
    }
}
