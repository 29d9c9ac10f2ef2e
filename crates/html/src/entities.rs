use memchr::memchr;

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
];

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111
// Longest reference body we scan for a terminating ';' ("#x10FFFF" plus slack).
const MAX_REF_LEN: usize = 10;

/// Decode the small entity subset produced by markup serialization.
///
/// Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`. Numeric references decode only
/// when semicolon-terminated, within the digit limit, and a valid scalar value. Anything else
/// passes through unchanged.
pub fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut copy_start = 0;
    let mut i = 0;

    while let Some(rel) = memchr(b'&', &bytes[i..]) {
        let amp = i + rel;
        out.push_str(&s[copy_start..amp]);
        match decode_one(&s[amp..]) {
            Some((ch, consumed)) => {
                out.push(ch);
                i = amp + consumed;
            }
            None => {
                out.push('&');
                i = amp + 1;
            }
        }
        copy_start = i;
    }

    out.push_str(&s[copy_start..]);
    out
}

/// `rest` starts at '&'. Returns the decoded char and the byte length of the reference.
fn decode_one(rest: &str) -> Option<(char, usize)> {
    let body = &rest[1..];
    let semi = body.bytes().take(MAX_REF_LEN).position(|b| b == b';')?;
    let name = &body[..semi];
    let consumed = semi + 2;

    if let Some(digits) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return numeric(digits, 16, MAX_HEX_DIGITS).map(|c| (c, consumed));
    }
    if let Some(digits) = name.strip_prefix('#') {
        return numeric(digits, 10, MAX_DEC_DIGITS).map(|c| (c, consumed));
    }
    NAMED
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| (*c, consumed))
}

fn numeric(digits: &str, radix: u32, max_digits: usize) -> Option<char> {
    if digits.is_empty()
        || digits.len() > max_digits
        || !digits.chars().all(|c| c.is_digit(radix))
    {
        return None;
    }
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
}

/// Escape text content for serialization (`&`, `<`, `>`, and non-breaking space).
pub fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Escape an attribute value for a double-quoted serialization.
pub fn escape_attribute(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
