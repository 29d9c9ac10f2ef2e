//! The one stylesheet the agent writes to.
//!
//! Rules are addressed by their exact selector text. Several rules may share a selector when
//! earlier writers produced duplicates; every write touches all of them in lock-step. The rule
//! list is private to this module and is flushed into the `<style>` element after each change.

use crate::naming::to_js_property;
use crate::syntax::{Declaration, Rule, Stylesheet, normalize_selector, parse_stylesheet};
use html::{Document, DomError, NodeKey};
use std::collections::BTreeMap;

pub const MANAGED_STYLESHEET_ID: &str = "livedit-managed-styles";

pub struct ManagedStylesheet {
    element: Option<NodeKey>,
    sheet: Stylesheet,
}

impl ManagedStylesheet {
    pub fn new() -> Self {
        ManagedStylesheet {
            element: None,
            sheet: Stylesheet::default(),
        }
    }

    /// The managed `<style>` element, created in `<head>` if absent. An existing element with the
    /// managed id (left by an earlier agent instance) is adopted and its rules parsed. A missing
    /// element is recreated holding the current rules.
    pub fn ensure(&mut self, doc: &mut Document) -> Result<NodeKey, DomError> {
        if let Some(key) = self.element.filter(|k| doc.is_connected(*k)) {
            return Ok(key);
        }
        let existing = doc.find_element(doc.root(), |d, k| {
            d.tag_name(k) == Some("style") && d.attribute(k, "id") == Some(MANAGED_STYLESHEET_ID)
        });
        let key = match existing {
            Some(key) => {
                self.sheet = parse_stylesheet(&doc.text_content(key));
                log::debug!("adopted managed stylesheet with {} rules", self.sheet.rules.len());
                key
            }
            None => {
                let parent = doc.head().or(doc.document_element()).unwrap_or(doc.root());
                let key = doc.create_element("style");
                doc.set_attribute(key, "id", MANAGED_STYLESHEET_ID)?;
                doc.append_child(parent, key)?;
                key
            }
        };
        self.element = Some(key);
        Ok(key)
    }

    /// Drop every managed rule.
    pub fn clear(&mut self, doc: &mut Document) -> Result<(), DomError> {
        self.sheet.rules.clear();
        self.flush(doc)
    }

    /// Apply `(css-property, value)` writes to the rules for `selector`. An empty value deletes
    /// the declaration; a rule left without declarations stays in place.
    pub fn update_style(
        &mut self,
        doc: &mut Document,
        selector: &str,
        changes: &[(String, String)],
    ) -> Result<(), DomError> {
        let selector = normalize_selector(selector);
        for (property, value) in changes {
            let mut matched = false;
            for rule in self.matching_rules_mut(&selector) {
                matched = true;
                write_declaration(rule, property, value);
            }
            if !matched && !value.is_empty() {
                let mut rule = Rule::new(&selector);
                write_declaration(&mut rule, property, value);
                self.sheet.rules.push(rule);
            }
        }
        self.flush(doc)
    }

    /// Delete the named declarations from every rule for `selector`.
    pub fn remove_styles(
        &mut self,
        doc: &mut Document,
        selector: &str,
        properties: &[String],
    ) -> Result<(), DomError> {
        let selector = normalize_selector(selector);
        for rule in self.matching_rules_mut(&selector) {
            rule.declarations
                .retain(|d| !properties.iter().any(|p| *p == d.name));
        }
        self.flush(doc)
    }

    /// Declarations of every rule for `selector`, flattened with camelCase keys. Later rules win.
    pub fn get_js_style(&self, selector: &str) -> BTreeMap<String, String> {
        let selector = normalize_selector(selector);
        let mut out = BTreeMap::new();
        for rule in self.sheet.rules.iter().filter(|r| r.selector_text == selector) {
            for d in &rule.declarations {
                out.insert(to_js_property(&d.name), d.value.clone());
            }
        }
        out
    }

    pub fn css_text(&self) -> String {
        self.sheet.to_string()
    }

    fn matching_rules_mut<'a>(
        &'a mut self,
        selector: &'a str,
    ) -> impl Iterator<Item = &'a mut Rule> {
        self.sheet
            .rules
            .iter_mut()
            .filter(move |r| r.selector_text == selector)
    }

    fn flush(&mut self, doc: &mut Document) -> Result<(), DomError> {
        let key = self.ensure(doc)?;
        let css = self.sheet.to_string();
        let existing_text = doc
            .children(key)
            .iter()
            .copied()
            .find(|k| doc.text(*k).is_some());
        match existing_text {
            Some(text) => doc.set_text(text, &css),
            None => {
                let text = doc.create_text(&css);
                doc.append_child(key, text)
            }
        }
    }
}

impl Default for ManagedStylesheet {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep exactly one declaration of `property` (the first), or none when `value` is empty.
fn write_declaration(rule: &mut Rule, property: &str, value: &str) {
    if value.is_empty() {
        rule.declarations.retain(|d| d.name != property);
        return;
    }
    match rule.declarations.iter().position(|d| d.name == property) {
        Some(first) => {
            rule.declarations[first].value = value.to_string();
            let mut index = 0;
            rule.declarations.retain(|d| {
                let keep = d.name != property || index == first;
                index += 1;
                keep
            });
        }
        None => rule.declarations.push(Declaration {
            name: property.to_string(),
            value: value.to_string(),
            important: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEL: &str = "[data-odid=\"n1\"]";

    fn change(name: &str, value: &str) -> Vec<(String, String)> {
        vec![(name.to_string(), value.to_string())]
    }

    #[test]
    fn ensure_creates_one_element_in_head() {
        let mut doc = Document::new();
        let mut sheet = ManagedStylesheet::new();
        let a = sheet.ensure(&mut doc).unwrap();
        let b = sheet.ensure(&mut doc).unwrap();
        assert_eq!(a, b);
        assert_eq!(doc.parent(a), doc.head());
        assert_eq!(doc.attribute(a, "id"), Some(MANAGED_STYLESHEET_ID));
    }

    #[test]
    fn repeated_update_keeps_single_declaration() {
        let mut doc = Document::new();
        let mut sheet = ManagedStylesheet::new();
        sheet.update_style(&mut doc, SEL, &change("color", "red")).unwrap();
        sheet.update_style(&mut doc, SEL, &change("color", "red")).unwrap();
        assert_eq!(sheet.css_text(), "[data-odid=\"n1\"] { color: red; }\n");
    }

    #[test]
    fn duplicate_rules_update_in_lock_step() {
        let mut doc = Document::new();
        let style = doc.create_element("style");
        doc.set_attribute(style, "id", MANAGED_STYLESHEET_ID).unwrap();
        let css = doc.create_text(
            "[data-odid=\"n1\"] { color: blue; } [data-odid=\"n1\"] { width: 1px; }",
        );
        doc.append_child(style, css).unwrap();
        let head = doc.head().unwrap();
        doc.append_child(head, style).unwrap();

        let mut sheet = ManagedStylesheet::new();
        assert_eq!(sheet.ensure(&mut doc).unwrap(), style);
        sheet.update_style(&mut doc, SEL, &change("color", "red")).unwrap();
        assert_eq!(
            sheet.css_text(),
            "[data-odid=\"n1\"] { color: red; }\n[data-odid=\"n1\"] { width: 1px; color: red; }\n"
        );
        assert_eq!(doc.text_content(style), sheet.css_text());
    }

    #[test]
    fn empty_value_deletes_and_leaves_empty_rule() {
        let mut doc = Document::new();
        let mut sheet = ManagedStylesheet::new();
        sheet.update_style(&mut doc, SEL, &change("opacity", "0.5")).unwrap();
        sheet.update_style(&mut doc, SEL, &change("opacity", "")).unwrap();
        assert_eq!(sheet.css_text(), "[data-odid=\"n1\"] { }\n");
        assert!(sheet.get_js_style(SEL).is_empty());
    }

    #[test]
    fn remove_styles_touches_only_named_properties() {
        let mut doc = Document::new();
        let mut sheet = ManagedStylesheet::new();
        let changes = vec![
            ("background-color".to_string(), "red".to_string()),
            ("width".to_string(), "10px".to_string()),
        ];
        sheet.update_style(&mut doc, SEL, &changes).unwrap();
        sheet
            .remove_styles(&mut doc, SEL, &["width".to_string()])
            .unwrap();
        let js = sheet.get_js_style(SEL);
        assert_eq!(js.get("backgroundColor").map(String::as_str), Some("red"));
        assert!(!js.contains_key("width"));
    }

    #[test]
    fn clear_empties_sheet_text() {
        let mut doc = Document::new();
        let mut sheet = ManagedStylesheet::new();
        sheet.update_style(&mut doc, SEL, &change("color", "red")).unwrap();
        sheet.clear(&mut doc).unwrap();
        let key = sheet.ensure(&mut doc).unwrap();
        assert_eq!(doc.text_content(key), "");
    }
}
