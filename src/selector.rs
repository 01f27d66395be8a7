use super::*;
use crate::dom::{Dom, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

/// One compound selector: `tag#id.class[attr=value]`. Combinators are not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SelectorStep {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<SelectorAttrCondition>,
}

impl SelectorStep {
    fn id_only(&self) -> Option<&str> {
        if self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty() {
            self.id.as_deref()
        } else {
            None
        }
    }

    fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        let Some(element) = dom.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !element.is_tag(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class_name| dom.class_contains(node, class_name))
        {
            return false;
        }
        self.attrs.iter().all(|cond| match cond {
            SelectorAttrCondition::Exists { key } => element.attrs.contains_key(key),
            SelectorAttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
        })
    }
}

fn parse_selector_list(selector: &str) -> Result<Vec<SelectorStep>> {
    let steps = selector
        .split(',')
        .map(|part| parse_selector_step(part.trim(), selector))
        .collect::<Result<Vec<_>>>()?;
    if steps.is_empty() {
        return Err(Error::UnsupportedSelector(selector.to_string()));
    }
    Ok(steps)
}

fn parse_selector_step(part: &str, full: &str) -> Result<SelectorStep> {
    let unsupported = || Error::UnsupportedSelector(full.to_string());
    if part.is_empty() {
        return Err(unsupported());
    }

    let chars = part.chars().collect::<Vec<_>>();
    let mut step = SelectorStep::default();
    let mut i = 0usize;

    let read_ident = |i: &mut usize| {
        let start = *i;
        while *i < chars.len()
            && (chars[*i].is_ascii_alphanumeric() || chars[*i] == '-' || chars[*i] == '_')
        {
            *i += 1;
        }
        chars[start..*i].iter().collect::<String>()
    };

    if chars[0] == '*' {
        i += 1;
    } else if chars[0].is_ascii_alphabetic() {
        step.tag = Some(read_ident(&mut i).to_ascii_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let id = read_ident(&mut i);
                if id.is_empty() || step.id.is_some() {
                    return Err(unsupported());
                }
                step.id = Some(id);
            }
            '.' => {
                i += 1;
                let class_name = read_ident(&mut i);
                if class_name.is_empty() {
                    return Err(unsupported());
                }
                step.classes.push(class_name);
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|ch| *ch == ']')
                    .map(|pos| i + pos)
                    .ok_or_else(unsupported)?;
                let body = chars[i + 1..close].iter().collect::<String>();
                i = close + 1;
                let cond = match body.split_once('=') {
                    Some((key, value)) => SelectorAttrCondition::Eq {
                        key: key.trim().to_ascii_lowercase(),
                        value: value
                            .trim()
                            .trim_matches(|ch| ch == '"' || ch == '\'')
                            .to_string(),
                    },
                    None => SelectorAttrCondition::Exists {
                        key: body.trim().to_ascii_lowercase(),
                    },
                };
                step.attrs.push(cond);
            }
            _ => return Err(unsupported()),
        }
    }

    Ok(step)
}

impl Dom {
    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let steps = parse_selector_list(selector)?;
        if let [step] = steps.as_slice() {
            if let Some(id) = step.id_only() {
                return Ok(self.by_id(id));
            }
        }
        Ok(self
            .descendant_elements(self.root)
            .into_iter()
            .find(|node| steps.iter().any(|step| step.matches(self, *node))))
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let steps = parse_selector_list(selector)?;
        Ok(self
            .descendant_elements(self.root)
            .into_iter()
            .filter(|node| steps.iter().any(|step| step.matches(self, *node)))
            .collect())
    }
}
