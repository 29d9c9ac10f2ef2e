use core_types::Theme;
use html::{Document, DomError};

const DARK: &str = "dark";
const LIGHT: &str = "light";

/// Read from the class list of the document element.
pub fn get_theme(doc: &Document) -> Theme {
    let Some(html) = doc.document_element() else {
        return Theme::System;
    };
    let classes = doc.attribute(html, "class").unwrap_or_default();
    let mut theme = Theme::System;
    for class in classes.split_whitespace() {
        match class {
            DARK => return Theme::Dark,
            LIGHT => theme = Theme::Light,
            _ => {}
        }
    }
    theme
}

pub fn set_theme(doc: &mut Document, theme: Theme) -> Result<(), DomError> {
    let Some(html) = doc.document_element() else {
        return Ok(());
    };
    let mut classes: Vec<String> = doc
        .attribute(html, "class")
        .unwrap_or_default()
        .split_whitespace()
        .filter(|c| *c != DARK && *c != LIGHT)
        .map(str::to_string)
        .collect();
    match theme {
        Theme::Dark => classes.push(DARK.to_string()),
        Theme::Light => classes.push(LIGHT.to_string()),
        Theme::System => {}
    }
    if classes.is_empty() {
        doc.remove_attribute(html, "class")?;
        Ok(())
    } else {
        doc.set_attribute(html, "class", &classes.join(" "))
    }
}
