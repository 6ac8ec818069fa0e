//! Second stage of the encoder: serialize a canonical tree to text.

use crate::canonical::CanonicalNode;
use crate::options::Layout;

const INDENT: &str = "  ";

/// Writes `node` into `out` using the fixed separators of `layout`.
pub fn write_node(node: &CanonicalNode, layout: Layout, out: &mut String) {
    write_at(node, layout, 0, out);
}

fn write_at(node: &CanonicalNode, layout: Layout, depth: usize, out: &mut String) {
    match node {
        CanonicalNode::Null => out.push_str("null"),
        CanonicalNode::Bool(true) => out.push_str("true"),
        CanonicalNode::Bool(false) => out.push_str("false"),
        CanonicalNode::Number(token) => out.push_str(token),
        CanonicalNode::String(text) => write_string(text, out),
        CanonicalNode::Sequence(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                newline(layout, depth + 1, out);
                write_at(item, layout, depth + 1, out);
            }
            newline(layout, depth, out);
            out.push(']');
        }
        CanonicalNode::Mapping(entries) => {
            if entries.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            for (idx, (key, value)) in entries.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                newline(layout, depth + 1, out);
                write_string(key, out);
                match layout {
                    Layout::Compact => out.push(':'),
                    Layout::Pretty => out.push_str(": "),
                }
                write_at(value, layout, depth + 1, out);
            }
            newline(layout, depth, out);
            out.push('}');
        }
    }
}

fn newline(layout: Layout, depth: usize, out: &mut String) {
    if layout == Layout::Pretty {
        out.push('\n');
        for _ in 0..depth {
            out.push_str(INDENT);
        }
    }
}

/// Writes a JSON string literal. Only `"`, `\` and control characters are
/// escaped; everything else is emitted as raw UTF-8.
pub fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
