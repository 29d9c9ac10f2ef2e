use super::Agent;
use crate::descriptor::ElementDescriptor;
use crate::identity::{ensure_id, selector_for};
use css::to_css_property;
use serde::Deserialize;
use std::collections::BTreeMap;

const BACKGROUND_IMAGE: &str = "background-image";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleChangeKind {
    /// Property named in camelCase.
    #[default]
    Value,
    /// Property named as written in CSS; passed through untouched.
    Custom,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StyleChange {
    pub value: String,
    #[serde(default)]
    pub kind: StyleChangeKind,
}

impl StyleChange {
    pub fn value(value: impl Into<String>) -> Self {
        StyleChange {
            value: value.into(),
            kind: StyleChangeKind::Value,
        }
    }
}

impl Agent {
    /// Write each change into the managed rule for `id`. An empty value deletes the property.
    pub fn update_style(
        &mut self,
        id: &str,
        changes: &BTreeMap<String, StyleChange>,
    ) -> Option<ElementDescriptor> {
        self.require_frame("updateStyle")?;
        let key = self.resolve("updateStyle", id)?;
        let changes: Vec<(String, String)> = changes
            .iter()
            .map(|(name, change)| {
                let property = match change.kind {
                    StyleChangeKind::Value => to_css_property(name),
                    StyleChangeKind::Custom => name.clone(),
                };
                (property, change.value.trim().to_string())
            })
            .collect();
        let dom_id = match ensure_id(&mut self.doc, key) {
            Ok(id) => id,
            Err(err) => {
                Self::warn_dom("updateStyle", err);
                return None;
            }
        };
        if let Err(err) = self
            .stylesheet
            .update_style(&mut self.doc, &selector_for(&dom_id), &changes)
        {
            Self::warn_dom("updateStyle", err);
            return None;
        }
        self.describe(key, true)
    }

    /// Delete the named (camelCase) properties from the managed rules for `id`.
    pub fn remove_styles(&mut self, id: &str, properties: &[String]) -> Option<ElementDescriptor> {
        self.require_frame("removeStyles")?;
        let key = self.resolve("removeStyles", id)?;
        let properties: Vec<String> = properties.iter().map(|p| to_css_property(p)).collect();
        let dom_id = match ensure_id(&mut self.doc, key) {
            Ok(id) => id,
            Err(err) => {
                Self::warn_dom("removeStyles", err);
                return None;
            }
        };
        if let Err(err) = self
            .stylesheet
            .remove_styles(&mut self.doc, &selector_for(&dom_id), &properties)
        {
            Self::warn_dom("removeStyles", err);
            return None;
        }
        self.describe(key, true)
    }

    pub fn set_background_image(&mut self, id: &str, url: &str) -> Option<ElementDescriptor> {
        let escaped = url.replace('\\', "\\\\").replace('"', "\\\"");
        let change = StyleChange {
            value: format!("url(\"{escaped}\")"),
            kind: StyleChangeKind::Custom,
        };
        self.update_style(id, &BTreeMap::from([(BACKGROUND_IMAGE.to_string(), change)]))
    }

    pub fn clear_background_image(&mut self, id: &str) -> Option<ElementDescriptor> {
        self.remove_styles(id, &["backgroundImage".to_string()])
    }
}
