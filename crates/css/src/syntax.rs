use std::fmt;

/// A single CSS property: "color: red".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Type(String),  // element/tag selector
    Id(String),    // #id selector
    Class(String), // .class selector
    Attribute { name: String, value: Option<String> },
}

/// A compound selector such as `div.card[data-x="1"]`. Combinators are not supported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub parts: Vec<SimpleSelector>,
}

/// Selector list plus declarations. `selector_text` keeps the normalized source text so a rule can
/// be addressed by exactly the selector it was written with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub selector_text: String,
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Rule {
    pub fn new(selector_text: &str) -> Self {
        let selector_text = normalize_selector(selector_text);
        let selectors = selector_text
            .split(',')
            .filter_map(parse_selector)
            .collect();
        Rule {
            selector_text,
            selectors,
            declarations: Vec::new(),
        }
    }
}

/// Collapse runs of whitespace so textual selector comparisons are layout independent.
pub fn normalize_selector(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// input: "div, #id { color: red; } @media print { p { color: blue } } .class { font-size: 12px; }"
// output: two rules; at-rule blocks are skipped whole.
pub fn parse_stylesheet(input: &str) -> Stylesheet {
    let text = strip_comments(input);
    let mut rules = Vec::new();
    let mut rest = text.as_str();

    while let Some(open) = find_top_level(rest, b'{') {
        let Some(close) = matching_brace(rest, open) else {
            break;
        };
        // Block-less at-rules (`@import ...;`) may precede the prelude.
        let prelude = rest[..open].rsplit(';').next().unwrap_or("").trim();
        let body = &rest[open + 1..close];
        rest = &rest[close + 1..];

        if prelude.is_empty() || prelude.starts_with('@') {
            continue;
        }
        let mut rule = Rule::new(prelude);
        rule.declarations = parse_declarations(body);
        rules.push(rule);
    }
    Stylesheet { rules }
}

// input: "color: red; background-image: url(\"a;b.png\") !important"
// output: two declarations, the second marked important.
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    split_top_level(input, b';')
        .into_iter()
        .filter_map(|pair| {
            let colon = find_top_level(pair, b':')?;
            let name = pair[..colon].trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            let mut value = pair[colon + 1..].trim();
            let mut important = false;
            if let Some(stripped) = strip_important(value) {
                value = stripped;
                important = true;
            }
            Some(Declaration {
                name,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

fn strip_important(value: &str) -> Option<&str> {
    let bang = value.rfind('!')?;
    value[bang + 1..]
        .trim()
        .eq_ignore_ascii_case("important")
        .then(|| value[..bang].trim_end())
}

// input: "#id", ".class", "div", "*", "[data-id=\"x\"]", "p.note"
// output: Some(Selector { parts }), or None for anything with combinators or pseudo-classes.
pub fn parse_selector(s: &str) -> Option<Selector> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                parts.push(SimpleSelector::Universal);
                i += 1;
            }
            b'#' => {
                let (ident, next) = read_ident(s, i + 1)?;
                parts.push(SimpleSelector::Id(ident.to_string()));
                i = next;
            }
            b'.' => {
                let (ident, next) = read_ident(s, i + 1)?;
                parts.push(SimpleSelector::Class(ident.to_string()));
                i = next;
            }
            b'[' => {
                let close = i + s[i..].find(']')?;
                parts.push(parse_attribute_selector(&s[i + 1..close])?);
                i = close + 1;
            }
            c if is_ident_byte(c) => {
                let (ident, next) = read_ident(s, i)?;
                parts.push(SimpleSelector::Type(ident.to_ascii_lowercase()));
                i = next;
            }
            _ => return None,
        }
    }
    Some(Selector { parts })
}

fn parse_attribute_selector(inner: &str) -> Option<SimpleSelector> {
    let Some((name, value)) = inner.split_once('=') else {
        let name = inner.trim();
        return (!name.is_empty()).then(|| SimpleSelector::Attribute {
            name: name.to_ascii_lowercase(),
            value: None,
        });
    };
    let name = name.trim();
    if name.is_empty() || name.ends_with(['~', '|', '^', '$', '*']) {
        return None;
    }
    let value = value.trim();
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    Some(SimpleSelector::Attribute {
        name: name.to_ascii_lowercase(),
        value: Some(unquoted.to_string()),
    })
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

fn read_ident(s: &str, start: usize) -> Option<(&str, usize)> {
    let end = s[start..]
        .bytes()
        .position(|b| !is_ident_byte(b))
        .map_or(s.len(), |p| start + p);
    (end > start).then(|| (&s[start..end], end))
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Position of `needle` outside quotes and parentheses.
fn find_top_level(s: &str, needle: u8) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                _ if b == needle && depth == 0 => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = s;
    while let Some(i) = find_top_level(rest, sep) {
        out.push(&rest[..i]);
        rest = &rest[i + 1..];
    }
    out.push(rest);
    out
}

/// Index of the `}` closing the `{` at `open`, honouring nesting and quotes.
fn matching_brace(s: &str, open: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    for (i, b) in s.bytes().enumerate().skip(open) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.selector_text)?;
        for declaration in &self.declarations {
            write!(f, " {declaration};")?;
        }
        f.write_str(" }")
    }
}

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
