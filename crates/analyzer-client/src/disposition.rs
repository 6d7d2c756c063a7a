//! File name resolution for report downloads.
//!
//! Reads the `filename` (or RFC 5987 `filename*`) parameter of a
//! `Content-Disposition` header. The result is always a bare file name that
//! is safe to join onto a download directory.

use analyzer_protocol::DEFAULT_DOWNLOAD_NAME;

/// File name announced by `header`, or `report.html` when it names none.
///
/// `filename*` wins over `filename` when both are present.
pub fn filename_from_disposition(header: Option<&str>) -> String {
    header
        .and_then(resolve)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}

fn resolve(header: &str) -> Option<String> {
    let params = parameters(header);
    let extended = params.iter().find(|(key, _)| key == "filename*");
    let value = match extended {
        Some((_, raw)) => percent_decode(strip_charset(raw)),
        None => params
            .iter()
            .find(|(key, _)| key == "filename")
            .map(|(_, raw)| raw.clone())?,
    };
    sanitize(&value)
}

/// Split `type; key=value; key="quoted; value"` into lowercased keys and raw values.
fn parameters(header: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = header.chars().peekable();

    while chars.peek().is_some() {
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c == ';' || c == '\n' {
                break;
            }
            key.push(c);
            chars.next();
        }
        if chars.next() != Some('=') {
            continue;
        }

        let mut value = String::new();
        while chars.peek().is_some_and(|c| *c == ' ' || *c == '\t') {
            chars.next();
        }
        match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                let mut escaped = false;
                for c in chars.by_ref() {
                    if escaped {
                        value.push(c);
                        escaped = false;
                    } else if c == '\\' && quote == '"' {
                        escaped = true;
                    } else if c == quote {
                        break;
                    } else {
                        value.push(c);
                    }
                }
                // Skip anything between the closing quote and the next separator.
                for c in chars.by_ref() {
                    if c == ';' || c == '\n' {
                        break;
                    }
                }
            }
            _ => {
                for c in chars.by_ref() {
                    if c == ';' || c == '\n' {
                        break;
                    }
                    value.push(c);
                }
            }
        }

        params.push((key.trim().to_ascii_lowercase(), value));
    }

    params
}

/// `UTF-8''name.html` → `name.html`.
fn strip_charset(value: &str) -> &str {
    let mut parts = value.splitn(3, '\'');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(rest)) => rest,
        _ => value,
    }
}

/// Invalid escapes pass through; invalid UTF-8 is replaced.
fn percent_decode(value: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(value.as_bytes())).into_owned()
}

fn sanitize(value: &str) -> Option<String> {
    let unquoted: String = value.chars().filter(|c| *c != '"' && *c != '\'').collect();
    let name = unquoted
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
