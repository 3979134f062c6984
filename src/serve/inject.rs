//! Live-reload script injection for served pages.

/// Insert `script` before the last `</body>`, or append it when there is none.
pub fn inject_script(content: &[u8], script: &str) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = script.as_bytes();
    let mut result = Vec::with_capacity(content.len() + script.len());

    match content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        Some(pos) => {
            result.extend_from_slice(&content[..pos]);
            result.extend_from_slice(script);
            result.extend_from_slice(&content[pos..]);
        }
        None => {
            result.extend_from_slice(content);
            result.extend_from_slice(script);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "<script src=\"/lr.js\"></script>";

    #[test]
    fn test_before_last_body_close() {
        let html = b"<body><pre></body></pre></BODY></html>";
        let out = String::from_utf8(inject_script(html, TAG)).unwrap();
        assert_eq!(
            out,
            "<body><pre></body></pre><script src=\"/lr.js\"></script></BODY></html>"
        );
    }

    #[test]
    fn test_appended_without_body() {
        let out = inject_script(b"<p>hi</p>", TAG);
        assert_eq!(out, format!("<p>hi</p>{TAG}").into_bytes());
    }
}
