// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! XML tag helpers for the execution-report reporters

use quick_xml::escape::escape;

/// Render `<name attr="value" ...>`
///
/// With `close` the tag is self-closing. With `content` the content and a
/// matching end tag follow.
#[must_use]
pub fn tag(name: &str, attrs: &[(&str, &str)], close: bool, content: Option<&str>) -> String {
    let mut out = String::with_capacity(name.len() * 2 + 16);
    out.push('<');
    out.push_str(name);
    for (key, value) in attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(*value));
        out.push('"');
    }
    out.push_str(if close { "/>" } else { ">" });
    if let Some(content) = content {
        out.push_str(content);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
    out
}

/// Wrap `text` in a CDATA section
///
/// Any `]]>` in the text is split across two sections.
#[must_use]
pub fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}
