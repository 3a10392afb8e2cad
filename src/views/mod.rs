//! Server-rendered HTML: page layout, forms, resource lists and the error page.

pub mod error;
pub mod form;
pub mod persons;
pub mod tasks;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

/// Escape text for element content and quoted attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full document around already-rendered `body`.
pub fn layout(title: &str, body: &str) -> String {
    let title = escape(title);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{title}</title>\n</head>\n\
         <body>\n<h1>{title}</h1>\n<main>{body}</main>\n<script src=\"{HTMX_SRC}\"></script>\n</body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    }

    #[test]
    fn layout_escapes_title_only() {
        let page = layout("A < B", "<p>ok</p>");
        assert!(page.contains("<title>A &lt; B</title>"));
        assert!(page.contains("<main><p>ok</p></main>"));
    }
}
