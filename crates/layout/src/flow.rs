//! Deterministic box layout of the live document.
//!
//! Only what hit testing and drop geometry need: block flow, inline runs, flex along
//! `flex-direction`, equal-width grid tracks, px `width`/`height`, and `left`/`top` offsets for
//! positioned boxes. Text is measured with a fixed advance.

use crate::Rect;
use core_types::Viewport;
use css::{ComputedStyle, Display, Position, StyleMap, parse_px};
use html::{Document, NodeKey};
use std::collections::HashMap;

pub const GLYPH_WIDTH: f32 = 8.0; // temporary until we have text metrics
pub const LINE_HEIGHT: f32 = 18.0;

/// Border boxes of every element that generates one.
pub type LayoutMap = HashMap<NodeKey, Rect>;

pub fn layout_document(doc: &Document, styles: &StyleMap, viewport: Viewport) -> LayoutMap {
    let mut ctx = Ctx {
        doc,
        styles,
        boxes: LayoutMap::new(),
    };
    if let Some(html) = doc.document_element() {
        ctx.layout_element(html, 0.0, 0.0, viewport.width, false);
    }
    ctx.boxes
}

struct Ctx<'a> {
    doc: &'a Document,
    styles: &'a StyleMap,
    boxes: LayoutMap,
}

fn out_of_flow(style: &ComputedStyle) -> bool {
    matches!(style.position(), Position::Absolute | Position::Fixed)
}

fn offset(style: &ComputedStyle, x: f32, y: f32) -> (f32, f32) {
    if style.position() == Position::Static {
        return (x, y);
    }
    let left = style.get("left").and_then(parse_px).unwrap_or(0.0);
    let top = style.get("top").and_then(parse_px).unwrap_or(0.0);
    (x + left, y + top)
}

fn text_width(text: &str) -> f32 {
    text.chars().count() as f32 * GLYPH_WIDTH
}

impl<'a> Ctx<'a> {
    /// Lay out `key` with its top-left at `(x, y)` inside `avail` px of width. Returns the
    /// border-box size, or `None` when the element generates no box. `shrink` sizes an
    /// auto-width box to its content instead of filling `avail`.
    fn layout_element(
        &mut self,
        key: NodeKey,
        x: f32,
        y: f32,
        avail: f32,
        shrink: bool,
    ) -> Option<(f32, f32)> {
        let styles = self.styles;
        let style = styles.get(&key)?;
        let display = style.display();
        if display == Display::None {
            return None;
        }
        let (x, y) = offset(style, x, y);
        let explicit_width = style.width();
        let inner = explicit_width.unwrap_or(avail);

        let (content_width, content_height) = if self.doc.tag_name(key) == Some("br") {
            (0.0, LINE_HEIGHT)
        } else if display.is_grid() {
            self.layout_grid(key, style, x, y, inner)
        } else if display.is_flex() {
            self.layout_flex(key, style, x, y, inner)
        } else {
            self.layout_flow(key, x, y, inner)
        };

        let width = explicit_width.unwrap_or(if shrink || display.is_inline_level() {
            content_width
        } else {
            avail
        });
        let height = style.height().unwrap_or(content_height);
        self.boxes.insert(key, Rect::new(x, y, width, height));
        Some((width, height))
    }

    fn layout_flow(&mut self, key: NodeKey, x: f32, y: f32, width: f32) -> (f32, f32) {
        let doc = self.doc;
        let styles = self.styles;
        let mut cursor_y = y;
        let mut line_x = 0.0f32;
        let mut line_h = 0.0f32;
        let mut max_w = 0.0f32;

        for &child in doc.children(key) {
            if let Some(text) = doc.text(child) {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    continue;
                }
                line_x += text_width(trimmed);
                line_h = line_h.max(LINE_HEIGHT);
                max_w = max_w.max(line_x);
                continue;
            }
            let Some(style) = styles.get(&child) else {
                continue;
            };
            if out_of_flow(style) {
                self.layout_element(child, x, y, width, true);
                continue;
            }
            if doc.tag_name(child) == Some("br") {
                self.boxes
                    .insert(child, Rect::new(x + line_x, cursor_y, 0.0, LINE_HEIGHT));
                cursor_y += line_h.max(LINE_HEIGHT);
                line_x = 0.0;
                line_h = 0.0;
                continue;
            }
            if style.display().is_inline_level() {
                let remaining = (width - line_x).max(0.0);
                if let Some((w, h)) =
                    self.layout_element(child, x + line_x, cursor_y, remaining, false)
                {
                    line_x += w;
                    line_h = line_h.max(h);
                    max_w = max_w.max(line_x);
                }
            } else {
                cursor_y += line_h;
                line_x = 0.0;
                line_h = 0.0;
                if let Some((w, h)) = self.layout_element(child, x, cursor_y, width, false) {
                    cursor_y += h;
                    max_w = max_w.max(w);
                }
            }
        }

        cursor_y += line_h;
        (max_w, cursor_y - y)
    }

    fn in_flow_children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.doc
            .element_children(key)
            .filter(|k| {
                self.styles
                    .get(k)
                    .is_some_and(|s| s.display() != Display::None && !out_of_flow(s))
            })
            .collect()
    }

    fn layout_out_of_flow(&mut self, key: NodeKey, x: f32, y: f32, width: f32) {
        let styles = self.styles;
        let positioned: Vec<NodeKey> = self
            .doc
            .element_children(key)
            .filter(|k| styles.get(k).is_some_and(out_of_flow))
            .collect();
        for child in positioned {
            self.layout_element(child, x, y, width, true);
        }
    }

    fn layout_flex(
        &mut self,
        key: NodeKey,
        style: &ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> (f32, f32) {
        let direction = style.flex_direction();
        let mut items = self.in_flow_children(key);
        if matches!(
            direction,
            css::FlexDirection::RowReverse | css::FlexDirection::ColumnReverse
        ) {
            items.reverse();
        }
        self.layout_out_of_flow(key, x, y, width);

        let (mut main, mut cross) = (0.0f32, 0.0f32);
        for child in items {
            if direction.is_row() {
                let remaining = (width - main).max(0.0);
                if let Some((w, h)) = self.layout_element(child, x + main, y, remaining, true) {
                    main += w;
                    cross = cross.max(h);
                }
            } else if let Some((w, h)) = self.layout_element(child, x, y + main, width, false) {
                main += h;
                cross = cross.max(w);
            }
        }
        if direction.is_row() {
            (main, cross)
        } else {
            (cross, main)
        }
    }

    fn layout_grid(
        &mut self,
        key: NodeKey,
        style: &ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> (f32, f32) {
        let columns = style.grid_columns().max(1);
        let column_width = width / columns as f32;
        let items = self.in_flow_children(key);
        self.layout_out_of_flow(key, x, y, width);

        let mut row_y = y;
        for row in items.chunks(columns) {
            let mut row_h = 0.0f32;
            for (i, child) in row.iter().enumerate() {
                let cell_x = x + i as f32 * column_width;
                if let Some((_, h)) =
                    self.layout_element(*child, cell_x, row_y, column_width, false)
                {
                    row_h = row_h.max(h);
                }
            }
            row_y += row_h;
        }
        (width, row_y - y)
    }
}
