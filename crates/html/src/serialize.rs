use crate::dom::{Document, NodeKey, NodeKind};
use crate::entities::{escape_attribute, escape_text};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

impl Document {
    /// Markup of the children of `key`.
    pub fn inner_html(&self, key: NodeKey) -> String {
        let mut out = String::new();
        for child in self.children(key) {
            self.write_node(*child, &mut out);
        }
        out
    }

    /// Markup of `key` itself including its subtree.
    pub fn outer_html(&self, key: NodeKey) -> String {
        let mut out = String::new();
        self.write_node(key, &mut out);
        out
    }

    fn write_node(&self, key: NodeKey, out: &mut String) {
        match self.kind(key) {
            Some(NodeKind::Element { name, attributes }) => {
                out.push('<');
                out.push_str(name);
                for (k, v) in attributes {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    escape_attribute(v, out);
                    out.push('"');
                }
                out.push('>');
                if is_void_element(name) {
                    return;
                }
                for child in self.children(key) {
                    self.write_node(*child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Some(NodeKind::Text { text }) => escape_text(text, out),
            Some(NodeKind::Comment { text }) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Some(NodeKind::Document) => {
                for child in self.children(key) {
                    self.write_node(*child, out);
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn serializes_elements_text_and_void_tags() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let p = doc.create_element("p");
        doc.set_attribute(p, "title", "a \"q\"").unwrap();
        doc.append_child(body, p).unwrap();
        let t1 = doc.create_text("1 < 2");
        let br = doc.create_element("br");
        let t2 = doc.create_text("x & y");
        for k in [t1, br, t2] {
            doc.append_child(p, k).unwrap();
        }

        assert_eq!(doc.inner_html(p), "1 &lt; 2<br>x &amp; y");
        assert_eq!(
            doc.outer_html(p),
            "<p title=\"a &quot;q&quot;\">1 &lt; 2<br>x &amp; y</p>"
        );
    }
}
