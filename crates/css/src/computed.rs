use crate::cascade::{cascade, collect_author_sheets};
use crate::syntax::Stylesheet;
use crate::values::{
    Display, FlexDirection, Position, count_tracks, parse_display, parse_flex_direction,
    parse_position,
    parse_px,
};
use html::{Document, NodeKey};
use std::collections::{BTreeMap, HashMap};

/// Initial values for the properties the engine reports or lays out with.
const INITIAL: &[(&str, &str)] = &[
    ("background-color", "transparent"),
    ("background-image", "none"),
    ("color", "rgb(0, 0, 0)"),
    ("display", "inline"),
    ("flex-direction", "row"),
    ("font-size", "16px"),
    ("font-weight", "400"),
    ("grid-template-columns", "none"),
    ("grid-template-rows", "none"),
    ("height", "auto"),
    ("opacity", "1"),
    ("position", "static"),
    ("text-align", "start"),
    ("visibility", "visible"),
    ("width", "auto"),
];

const INHERITED: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "text-align",
    "visibility",
];

/// Fully resolved style of one element, as a property map with typed accessors for the values
/// layout needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    properties: BTreeMap<String, String>,
}

pub type StyleMap = HashMap<NodeKey, ComputedStyle>;

impl ComputedStyle {
    pub fn initial() -> Self {
        ComputedStyle {
            properties: INITIAL
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    fn set(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    pub fn display(&self) -> Display {
        self.get("display")
            .and_then(parse_display)
            .unwrap_or(Display::Inline)
    }

    pub fn position(&self) -> Position {
        self.get("position")
            .and_then(parse_position)
            .unwrap_or(Position::Static)
    }

    pub fn flex_direction(&self) -> FlexDirection {
        self.get("flex-direction")
            .and_then(parse_flex_direction)
            .unwrap_or(FlexDirection::Row)
    }

    /// Explicit `width` in px; `None` for `auto` and unresolved units.
    pub fn width(&self) -> Option<f32> {
        self.get("width").and_then(parse_px).filter(|w| *w >= 0.0)
    }

    pub fn height(&self) -> Option<f32> {
        self.get("height").and_then(parse_px).filter(|h| *h >= 0.0)
    }

    pub fn grid_columns(&self) -> usize {
        self.get("grid-template-columns").map_or(0, count_tracks)
    }

    pub fn grid_rows(&self) -> usize {
        self.get("grid-template-rows").map_or(0, count_tracks)
    }

    pub fn is_visible(&self) -> bool {
        self.display() != Display::None
            && !matches!(self.get("visibility"), Some("hidden" | "collapse"))
    }
}

/// Compute the final style for an element from its cascaded declarations and its parent's
/// computed style.
pub fn compute_style(
    tag: &str,
    specified: &[(String, String)],
    parent: Option<&ComputedStyle>,
) -> ComputedStyle {
    let mut result = ComputedStyle::initial();

    if let Some(p) = parent {
        for name in INHERITED {
            if let Some(v) = p.get(name) {
                result.set(name, v);
            }
        }
    }

    if !specified.iter().any(|(name, _)| name == "display") {
        result.set("display", default_display_for(tag).as_str());
    }

    for (name, value) in specified {
        match value.trim() {
            "inherit" => match parent.and_then(|p| p.get(name)) {
                Some(v) => result.set(name, v),
                None => {
                    result.properties.remove(name);
                }
            },
            "initial" => match INITIAL.iter().find(|(k, _)| k == name) {
                Some((_, v)) => result.set(name, v),
                None => {
                    result.properties.remove(name);
                }
            },
            v => {
                if name == "display" && parse_display(v).is_none() {
                    // unsupported display keyword: keep the element default
                    result.set("display", default_display_for(tag).as_str());
                    continue;
                }
                result.set(name, v);
            }
        }
    }

    result
}

pub fn default_display_for(tag: &str) -> Display {
    match tag {
        "a" | "abbr" | "b" | "big" | "br" | "code" | "em" | "i" | "img" | "label" | "small"
        | "span" | "strong" | "sub" | "sup" | "u" => Display::Inline,
        "button" | "input" | "select" | "textarea" => Display::InlineBlock,
        "li" => Display::ListItem,
        "head" | "link" | "meta" | "noscript" | "script" | "style" | "template" | "title" => {
            Display::None
        }
        _ => Display::Block,
    }
}

/// Computed styles for every connected element of `doc`.
pub fn compute_styles(doc: &Document) -> StyleMap {
    let sheets = collect_author_sheets(doc);
    let mut map = StyleMap::new();
    walk(doc, doc.root(), None, &sheets, &mut map);
    map
}

fn walk(
    doc: &Document,
    key: NodeKey,
    parent: Option<&ComputedStyle>,
    sheets: &[Stylesheet],
    map: &mut StyleMap,
) {
    for child in doc.element_children(key) {
        let tag = doc.tag_name(child).unwrap_or_default();
        let style = compute_style(tag, &cascade(doc, child, sheets), parent);
        walk(doc, child, Some(&style), sheets, map);
        map.insert(child, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn applies_tag_default_display_unless_specified() {
        assert_eq!(compute_style("span", &[], None).display(), Display::Inline);
        assert_eq!(compute_style("div", &[], None).display(), Display::Block);
        let flex = compute_style("span", &spec(&[("display", "flex")]), None);
        assert_eq!(flex.display(), Display::Flex);
        let bogus = compute_style("div", &spec(&[("display", "table")]), None);
        assert_eq!(bogus.display(), Display::Block);
    }

    #[test]
    fn inherits_only_inherited_properties() {
        let parent = compute_style(
            "div",
            &spec(&[("color", "red"), ("opacity", "0.5"), ("width", "10px")]),
            None,
        );
        let child = compute_style("p", &[], Some(&parent));
        assert_eq!(child.get("color"), Some("red"));
        assert_eq!(child.get("opacity"), Some("1"));
        assert_eq!(child.width(), None);

        let explicit = compute_style("p", &spec(&[("width", "inherit")]), Some(&parent));
        assert_eq!(explicit.width(), Some(10.0));
    }

    #[test]
    fn hidden_visibility_is_not_visible() {
        let style = compute_style("div", &spec(&[("visibility", "hidden")]), None);
        assert!(!style.is_visible());
        assert!(compute_style("div", &[], None).is_visible());
    }

    #[test]
    fn computes_styles_for_whole_document() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        doc.set_attribute(div, "style", "display: grid; grid-template-columns: 1fr 1fr")
            .unwrap();
        let styles = compute_styles(&doc);
        assert_eq!(styles[&div].display(), Display::Grid);
        assert_eq!(styles[&div].grid_columns(), 2);
        assert_eq!(styles[&doc.head().unwrap()].display(), Display::None);
    }
}
