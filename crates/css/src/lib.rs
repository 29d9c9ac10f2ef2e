pub mod cascade;
pub mod computed;
pub mod inline;
pub mod managed;
pub mod naming;
pub mod syntax;
pub mod values;

// Re-exports so other crates can just use `css::...` nicely.
pub use cascade::{cascade, collect_author_sheets, matches_selector};
pub use computed::{ComputedStyle, StyleMap, compute_style, compute_styles, default_display_for};
pub use inline::{inline_declarations, inline_style_value, remove_inline_style, set_inline_style};
pub use managed::{MANAGED_STYLESHEET_ID, ManagedStylesheet};
pub use naming::{to_css_property, to_js_property};
pub use syntax::{
    Declaration, Rule, Selector, SimpleSelector, Stylesheet, parse_declarations, parse_stylesheet,
};
pub use values::{Display, FlexDirection, Position, count_tracks, parse_display, parse_px};
