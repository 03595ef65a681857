//! SVG serialization.

use super::{NodeId, SvgDocument};

pub(super) fn write_document(doc: &SvgDocument) -> String {
    let mut out = String::new();
    write_element(doc, doc.root(), 0, &mut out);
    out
}

fn write_element(doc: &SvgDocument, id: NodeId, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push('<');
    out.push_str(doc.tag(id));
    for (k, v) in doc.attributes(id) {
        out.push_str(&format!(r#" {}="{}""#, k, escape(v)));
    }
    let style = &doc.nodes[id.0].style;
    if !style.is_empty() {
        let decl: Vec<String> = style.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        out.push_str(&format!(r#" style="{}""#, escape(&decl.join("; "))));
    }

    let children = doc.children(id);
    match (doc.text(id), children.is_empty()) {
        (None, true) => out.push_str("/>\n"),
        (Some(text), true) => {
            out.push('>');
            out.push_str(&escape(text));
            out.push_str(&format!("</{}>\n", doc.tag(id)));
        }
        (text, false) => {
            out.push_str(">\n");
            if let Some(text) = text {
                for _ in 0..=depth {
                    out.push_str("  ");
                }
                out.push_str(&escape(text));
                out.push('\n');
            }
            for &child in children {
                write_element(doc, child, depth + 1, out);
            }
            for _ in 0..depth {
                out.push_str("  ");
            }
            out.push_str(&format!("</{}>\n", doc.tag(id)));
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
