/// CSS `display` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    Block,
    Inline,
    InlineBlock,
    ListItem,
    Flex,
    InlineFlex,
    Grid,
    InlineGrid,
    None,
}

impl Display {
    pub fn is_flex(self) -> bool {
        matches!(self, Display::Flex | Display::InlineFlex)
    }

    pub fn is_grid(self) -> bool {
        matches!(self, Display::Grid | Display::InlineGrid)
    }

    /// Flex or grid: children are placed along more than the block axis.
    pub fn is_multi_axis(self) -> bool {
        self.is_flex() || self.is_grid()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Display::Block => "block",
            Display::Inline => "inline",
            Display::InlineBlock => "inline-block",
            Display::ListItem => "list-item",
            Display::Flex => "flex",
            Display::InlineFlex => "inline-flex",
            Display::Grid => "grid",
            Display::InlineGrid => "inline-grid",
            Display::None => "none",
        }
    }

    pub fn is_inline_level(self) -> bool {
        matches!(
            self,
            Display::Inline | Display::InlineBlock | Display::InlineFlex | Display::InlineGrid
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

pub fn parse_display(value: &str) -> Option<Display> {
    let v = value.trim().to_ascii_lowercase();
    match v.as_str() {
        "block" | "flow-root" => Some(Display::Block),
        "inline" => Some(Display::Inline),
        "inline-block" => Some(Display::InlineBlock),
        "list-item" => Some(Display::ListItem),
        "flex" => Some(Display::Flex),
        "inline-flex" => Some(Display::InlineFlex),
        "grid" => Some(Display::Grid),
        "inline-grid" => Some(Display::InlineGrid),
        "none" => Some(Display::None),
        _ => None,
    }
}

pub fn parse_flex_direction(value: &str) -> Option<FlexDirection> {
    match value.trim().to_ascii_lowercase().as_str() {
        "row" => Some(FlexDirection::Row),
        "row-reverse" => Some(FlexDirection::RowReverse),
        "column" => Some(FlexDirection::Column),
        "column-reverse" => Some(FlexDirection::ColumnReverse),
        _ => None,
    }
}

pub fn parse_position(value: &str) -> Option<Position> {
    match value.trim().to_ascii_lowercase().as_str() {
        "static" => Some(Position::Static),
        "relative" => Some(Position::Relative),
        "absolute" => Some(Position::Absolute),
        "fixed" => Some(Position::Fixed),
        "sticky" => Some(Position::Sticky),
        _ => None,
    }
}

/// `NNpx` or a bare `0`. Other units are not resolved.
pub fn parse_px(value: &str) -> Option<f32> {
    let v = value.trim();
    let num = match v.strip_suffix("px") {
        Some(stripped) => stripped.trim().parse::<f32>().ok()?,
        None if v == "0" => 0.0,
        None => return None,
    };
    num.is_finite().then_some(num)
}

/// Number of tracks in a `grid-template-*` value.
///
/// Splits on whitespace, so `repeat(...)`, `minmax(a, b)` and named lines are undercounted or
/// overcounted. Known approximation.
pub fn count_tracks(template: &str) -> usize {
    let t = template.trim();
    if t.is_empty() || t.eq_ignore_ascii_case("none") {
        return 0;
    }
    t.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_keywords() {
        assert_eq!(parse_display(" Flex "), Some(Display::Flex));
        assert_eq!(parse_display("inline-grid"), Some(Display::InlineGrid));
        assert_eq!(parse_display("table"), None);
        assert!(Display::Grid.is_multi_axis());
        assert!(!Display::Block.is_multi_axis());
    }

    #[test]
    fn parses_px_lengths() {
        assert_eq!(parse_px("12.5px"), Some(12.5));
        assert_eq!(parse_px("0"), Some(0.0));
        assert_eq!(parse_px("2em"), None);
        assert_eq!(parse_px("auto"), None);
    }

    #[test]
    fn counts_whitespace_separated_tracks() {
        assert_eq!(count_tracks("100px 1fr 2fr"), 3);
        assert_eq!(count_tracks("none"), 0);
        // repeat() is not expanded
        assert_eq!(count_tracks("repeat(4, 1fr)"), 2);
    }
}
