use resolvekit_shared::{ListItem, Method, Step};

use crate::element::Element;
use crate::rules::{Rules, contact_details};

/// Longest step head that is split off as the step title.
const STEP_TITLE_MAX_CHARS: usize = 80;

/// Accumulates complaint methods.
///
/// A level-2+ heading matching the method rules flushes the open method and
/// opens the next one. While open, the first paragraph long enough becomes
/// the description and the first list becomes the steps. Other headings do
/// not close the open method.
#[derive(Debug)]
pub(crate) struct MethodScan<'r> {
    rules: &'r Rules,
    current: Option<Method>,
    methods: Vec<Method>,
}

impl<'r> MethodScan<'r> {
    pub fn new(rules: &'r Rules) -> Self {
        Self {
            rules,
            current: None,
            methods: Vec::new(),
        }
    }

    pub fn step(mut self, el: &Element) -> Self {
        match el {
            Element::Heading { level, text } if *level > 1 && self.rules.is_method_heading(text) => {
                self.flush();
                self.current = Some(Method {
                    method_number: self.methods.len() as u32 + 1,
                    title: text.clone(),
                    ..Method::default()
                });
            }
            Element::Paragraph { text, .. } => {
                if let Some(method) = self.current.as_mut() {
                    if method.description.is_empty() && self.rules.is_description(text) {
                        method.description = text.clone();
                    }
                }
            }
            Element::List { items, .. } => {
                if let Some(method) = self.current.as_mut() {
                    if method.steps.is_empty() {
                        method.steps = steps(items);
                    }
                }
            }
            Element::Heading { .. } => {}
        }
        self
    }

    pub fn finish(mut self) -> Vec<Method> {
        self.flush();
        self.methods
    }

    fn flush(&mut self) {
        if let Some(mut method) = self.current.take() {
            method.contact_info = method_contacts(&method);
            self.methods.push(method);
        }
    }
}

fn steps(items: &[ListItem]) -> Vec<Step> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let (title, description) = split_step(&item.text);
            Step {
                step_number: i as u32 + 1,
                title,
                description,
                details: item.details.clone(),
            }
        })
        .collect()
}

/// `"Online: Use the portal"` splits into title and description.
fn split_step(text: &str) -> (String, String) {
    match text.split_once(": ") {
        Some((head, rest))
            if !head.trim().is_empty()
                && head.chars().count() <= STEP_TITLE_MAX_CHARS
                && !rest.trim().is_empty() =>
        {
            (head.trim().to_string(), rest.trim().to_string())
        }
        _ => (text.to_string(), String::new()),
    }
}

fn method_contacts(method: &Method) -> String {
    let texts = std::iter::once(method.title.as_str())
        .chain(std::iter::once(method.description.as_str()))
        .chain(method.steps.iter().flat_map(|s| {
            [s.title.as_str(), s.description.as_str()]
                .into_iter()
                .chain(s.details.iter().map(String::as_str))
        }));
    contact_details(texts)
}
