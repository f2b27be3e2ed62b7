//! Serialization of HCL blocks to configuration text.
//!
//! Every string literal passes through [`escape_hcl_string`] here; nothing
//! upstream escapes.

use crate::block::{BodyItem, HclBlock, HclValue};
use crate::escape::quote;

const INDENT: &str = "  ";

/// Render a sequence of top-level blocks separated by blank lines.
pub fn render_document(blocks: &[HclBlock]) -> String {
    let rendered: Vec<String> = blocks.iter().map(render_block).collect();
    rendered.join("\n")
}

/// Render one top-level block, including its trailing newline.
pub fn render_block(block: &HclBlock) -> String {
    let mut out = String::new();
    write_block(&mut out, block, 0);
    out
}

fn write_block(out: &mut String, block: &HclBlock, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    out.push_str(&block.block_type);
    for label in &block.labels {
        out.push(' ');
        out.push_str(&quote(label));
    }

    if block.body.is_empty() {
        out.push_str(" {}\n");
        return;
    }

    out.push_str(" {\n");
    write_body(out, &block.body, depth + 1);
    out.push_str(&indent);
    out.push_str("}\n");
}

fn write_body(out: &mut String, body: &[BodyItem], depth: usize) {
    let indent = INDENT.repeat(depth);
    let mut index = 0;
    let mut previous_was_attribute = false;

    while index < body.len() {
        match &body[index] {
            BodyItem::Block(child) => {
                if previous_was_attribute {
                    out.push('\n');
                }
                write_block(out, child, depth);
                previous_was_attribute = false;
                index += 1;
            }
            BodyItem::Attribute(..) => {
                // Consecutive attributes share one `=` column.
                let run: Vec<(&String, &HclValue)> = body[index..]
                    .iter()
                    .map_while(|item| match item {
                        BodyItem::Attribute(k, v) => Some((k, v)),
                        BodyItem::Block(_) => None,
                    })
                    .collect();
                let width = run.iter().map(|(k, _)| render_key(k).len()).max().unwrap_or(0);

                for (key, value) in &run {
                    out.push_str(&format!(
                        "{}{:<width$} = {}\n",
                        indent,
                        render_key(key),
                        render_value(value, depth),
                        width = width
                    ));
                }

                index += run.len();
                previous_was_attribute = true;
            }
        }
    }
}

/// Render a value expression. `depth` is the indentation level of the owning attribute.
pub fn render_value(value: &HclValue, depth: usize) -> String {
    match value {
        HclValue::String(s) => quote(s),
        HclValue::Expression(e) => e.clone(),
        HclValue::Number(n) => n.to_string(),
        HclValue::Bool(b) => b.to_string(),
        HclValue::List(items) => {
            let rendered: Vec<String> = items.iter().map(|v| render_value(v, depth)).collect();
            format!("[{}]", rendered.join(", "))
        }
        HclValue::Object(entries) if entries.is_empty() => "{}".to_string(),
        HclValue::Object(entries) => {
            let inner = INDENT.repeat(depth + 1);
            let width = entries.iter().map(|(k, _)| render_key(k).len()).max().unwrap_or(0);
            let mut out = String::from("{\n");
            for (key, v) in entries {
                out.push_str(&format!(
                    "{}{:<width$} = {}\n",
                    inner,
                    render_key(key),
                    render_value(v, depth + 1),
                    width = width
                ));
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
            out
        }
    }
}

/// Bare identifiers stay bare; anything else is quoted.
fn render_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    };

    if is_identifier {
        key.to_string()
    } else {
        quote(key)
    }
}
