use crate::inline::inline_declarations;
use crate::syntax::{Selector, SimpleSelector, Stylesheet, parse_stylesheet};
use html::{Document, NodeKey};
use std::cmp::Ordering::Equal;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
struct Specificity(u16, u16, u16); // (id, class/attribute, type)

struct Candidate {
    property: String,
    value: String,
    important: bool,
    inline: bool,
    specificity: Specificity,
    order: u32,
}

impl Candidate {
    fn rank(&self) -> (bool, bool, Specificity, u32) {
        (self.important, self.inline, self.specificity, self.order)
    }
}

fn specificity_of(selector: &Selector) -> Specificity {
    selector
        .parts
        .iter()
        .fold(Specificity::default(), |Specificity(a, b, c), part| match part {
            SimpleSelector::Universal => Specificity(a, b, c),
            SimpleSelector::Type(_) => Specificity(a, b, c + 1),
            SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => Specificity(a, b + 1, c),
            SimpleSelector::Id(_) => Specificity(a + 1, b, c),
        })
}

pub fn matches_selector(doc: &Document, key: NodeKey, selector: &Selector) -> bool {
    let Some(name) = doc.tag_name(key) else {
        return false;
    };
    selector.parts.iter().all(|part| match part {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(t) => name.eq_ignore_ascii_case(t),
        SimpleSelector::Id(want) => doc.attribute(key, "id") == Some(want.as_str()),
        SimpleSelector::Class(want) => doc
            .attribute(key, "class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == want)),
        SimpleSelector::Attribute { name, value } => match (doc.attribute(key, name), value) {
            (Some(_), None) => true,
            (Some(actual), Some(want)) => actual == want.as_str(),
            (None, _) => false,
        },
    })
}

/// Every connected `<style>` element, parsed, in document order. Sheets are only read here.
pub fn collect_author_sheets(doc: &Document) -> Vec<Stylesheet> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|k| doc.tag_name(*k) == Some("style"))
        .map(|k| parse_stylesheet(&doc.text_content(k)))
        .collect()
}

/// Winning specified value per property for `key`, sorted by property name.
/// Inline declarations beat author rules; `!important` beats both.
pub fn cascade(doc: &Document, key: NodeKey, sheets: &[Stylesheet]) -> Vec<(String, String)> {
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut order = 0u32;

    for sheet in sheets {
        for rule in &sheet.rules {
            order += 1;
            let matched = rule
                .selectors
                .iter()
                .filter(|s| matches_selector(doc, key, s))
                .map(specificity_of)
                .max();
            if let Some(specificity) = matched {
                candidates.extend(rule.declarations.iter().map(|d| Candidate {
                    property: d.name.clone(),
                    value: d.value.clone(),
                    important: d.important,
                    inline: false,
                    specificity,
                    order,
                }));
            }
        }
    }

    for d in inline_declarations(doc, key) {
        order += 1;
        candidates.push(Candidate {
            property: d.name,
            value: d.value,
            important: d.important,
            inline: true,
            specificity: Specificity::default(),
            order,
        });
    }

    candidates.sort_by(|a, b| match a.property.cmp(&b.property) {
        Equal => a.rank().cmp(&b.rank()),
        other => other,
    });

    let mut winners: Vec<(String, String)> = Vec::new();
    for candidate in candidates {
        match winners.last_mut() {
            Some((property, value)) if *property == candidate.property => *value = candidate.value,
            _ => winners.push((candidate.property, candidate.value)),
        }
    }
    winners
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_style(css: &str) -> (Document, NodeKey) {
        let mut doc = Document::new();
        let head = doc.head().unwrap();
        let style = doc.create_element("style");
        let text = doc.create_text(css);
        doc.append_child(style, text).unwrap();
        doc.append_child(head, style).unwrap();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        (doc, div)
    }

    #[test]
    fn higher_specificity_wins_then_source_order() {
        let (mut doc, div) =
            doc_with_style(
                ".a { color: red; } div { color: blue; width: 1px; } div { width: 2px; }",
            );
        doc.set_attribute(div, "class", "a").unwrap();
        let sheets = collect_author_sheets(&doc);
        let winners = cascade(&doc, div, &sheets);
        assert_eq!(
            winners,
            vec![
                ("color".to_string(), "red".to_string()),
                ("width".to_string(), "2px".to_string()),
            ]
        );
    }

    #[test]
    fn inline_beats_author_unless_important() {
        let (mut doc, div) = doc_with_style("div { color: blue !important; opacity: 1; }");
        doc.set_attribute(div, "style", "color: red; opacity: 0.5").unwrap();
        let sheets = collect_author_sheets(&doc);
        let winners = cascade(&doc, div, &sheets);
        assert_eq!(
            winners,
            vec![
                ("color".to_string(), "blue".to_string()),
                ("opacity".to_string(), "0.5".to_string()),
            ]
        );
    }

    #[test]
    fn attribute_selectors_match_exact_values() {
        let (mut doc, div) = doc_with_style("[data-odid=\"n1\"] { opacity: 0.5; }");
        let sheets = collect_author_sheets(&doc);
        assert!(cascade(&doc, div, &sheets).is_empty());
        doc.set_attribute(div, "data-odid", "n1").unwrap();
        assert_eq!(cascade(&doc, div, &sheets).len(), 1);
    }
}
