//! Escaping helpers shared by the HTML and XML renderers.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};

/// Escape `&`, `<`, `>` and `"` for HTML text and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    push_escaped_html(&mut escaped, text);
    escaped
}

pub(crate) fn push_escaped_html(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Bytes percent-encoded in a link destination.
///
/// `&` and `'` stay unencoded here; they become HTML entities afterwards.
const HREF_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'%')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'_')
    .remove(b'~');

/// Escape a link destination for an `href` or `src` attribute.
///
/// Existing percent escapes are kept; any other byte outside the URL-safe
/// set is percent-encoded.
///
/// # Example
///
/// ```
/// use presto_renderer::escape_href;
///
/// assert_eq!(escape_href("a b&c"), "a%20b&amp;c");
/// ```
pub fn escape_href(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    push_escaped_href(&mut escaped, url);
    escaped
}

pub(crate) fn push_escaped_href(out: &mut String, url: &str) {
    for chunk in percent_encode(url.as_bytes(), HREF_ENCODE_SET) {
        for c in chunk.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '\'' => out.push_str("&#x27;"),
                _ => out.push(c),
            }
        }
    }
}

/// Whether a destination uses a scheme that safe mode refuses.
///
/// `data:` is allowed for PNG, GIF, JPEG and WebP images only.
pub fn is_dangerous_url(url: &str) -> bool {
    let lower = url.get(..20).unwrap_or(url).to_ascii_lowercase();
    if lower.starts_with("data:") {
        return !["image/png", "image/gif", "image/jpeg", "image/webp"]
            .iter()
            .any(|image| lower["data:".len()..].starts_with(image));
    }
    ["javascript:", "vbscript:", "file:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Whether `url` starts with a URI scheme followed by `:`.
pub(crate) fn has_scheme(url: &str) -> bool {
    let bytes = url.as_bytes();
    if !bytes.first().is_some_and(u8::is_ascii_alphabetic) {
        return false;
    }
    let length = bytes[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-'))
        .count();
    (1..=31).contains(&length) && bytes.get(length + 1) == Some(&b':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; 'Jerry'&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_passthrough() {
        assert_eq!(escape_html("plain café"), "plain café");
    }

    #[test]
    fn test_escape_href() {
        assert_eq!(escape_href("http://x.org/a?b=c&d=e"), "http://x.org/a?b=c&amp;d=e");
        assert_eq!(escape_href("it's"), "it&#x27;s");
        assert_eq!(escape_href("a\"b<c>"), "a%22b%3Cc%3E");
        assert_eq!(escape_href("/caf%C3%A9"), "/caf%C3%A9");
        assert_eq!(escape_href("é"), "%C3%A9");
        assert_eq!(escape_href("[x]"), "%5Bx%5D");
        assert_eq!(escape_href("a b\\c`"), "a%20b%5Cc%60");
        assert_eq!(escape_href("!$()*+,;=@~"), "!$()*+,;=@~");
    }

    #[test]
    fn test_dangerous_urls() {
        assert!(is_dangerous_url("javascript:alert(1)"));
        assert!(is_dangerous_url("JavaScript:alert(1)"));
        assert!(is_dangerous_url("vbscript:msgbox"));
        assert!(is_dangerous_url("file:///etc/passwd"));
        assert!(is_dangerous_url("data:text/html;base64,xx"));
        assert!(!is_dangerous_url("data:image/png;base64,xx"));
        assert!(!is_dangerous_url("DATA:IMAGE/WEBP;base64,xx"));
        assert!(!is_dangerous_url("https://example.com"));
        assert!(!is_dangerous_url("/relative/javascript:"));
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("http://example.com"));
        assert!(has_scheme("mailto:me@example.com"));
        assert!(has_scheme("a+b.c-d:rest"));
        assert!(!has_scheme("x:single-letter"));
        assert!(!has_scheme("/path"));
        assert!(!has_scheme("#anchor"));
        assert!(!has_scheme(""));
    }
}
