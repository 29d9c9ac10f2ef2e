//! Property name mapping between the host's camelCase keys and hyphenated CSS names.
//!
//! Both directions apply only the generic rule (uppercase letter <-> hyphen + lowercase letter),
//! so any hyphen-free camelCase name round-trips. Vendor prefixes fall out of the same rule:
//! `WebkitTransform` <-> `-webkit-transform`.

pub fn to_css_property(js: &str) -> String {
    let mut out = String::with_capacity(js.len() + 4);
    for c in js.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn to_js_property(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut upper_next = false;
    for c in css.chars() {
        if c == '-' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_both_directions() {
        assert_eq!(to_css_property("backgroundColor"), "background-color");
        assert_eq!(to_css_property("opacity"), "opacity");
        assert_eq!(to_js_property("grid-template-columns"), "gridTemplateColumns");
        assert_eq!(to_css_property("WebkitTransform"), "-webkit-transform");
        assert_eq!(to_js_property("-webkit-transform"), "WebkitTransform");
    }

    #[test]
    fn camel_case_names_round_trip() {
        for name in [
            "color",
            "borderTopLeftRadius",
            "zIndex",
            "flexDirection",
            "MozAppearance",
            "x",
        ] {
            assert_eq!(to_js_property(&to_css_property(name)), name);
        }
    }
}
