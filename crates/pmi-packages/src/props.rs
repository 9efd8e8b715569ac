//! Reader and writer for the `key=value` properties files used by the
//! package repository (`{version}.props`) and by installed packages
//! (`Description.props`).

use std::collections::BTreeMap;

/// Parsed properties, ordered by key
pub type Properties = BTreeMap<String, String>;

/// Parse properties text.
///
/// Supports `=`, `:` or whitespace separators, `#`/`!` comment lines,
/// backslash line continuations and the usual escapes (`\n`, `\t`, `\uXXXX`).
pub fn parse(text: &str) -> Properties {
    let mut props = Properties::new();
    let mut logical = String::new();

    for line in text.lines() {
        let line = line.trim_start();

        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        if ends_with_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }

        logical.push_str(line);
        if let Some((key, value)) = split_entry(&logical) {
            props.insert(key, value);
        }
        logical.clear();
    }

    if !logical.is_empty() {
        if let Some((key, value)) = split_entry(&logical) {
            props.insert(key, value);
        }
    }

    props
}

/// Render properties, escaping keys and values so that [`parse`] reads them back
pub fn render(props: &Properties) -> String {
    let mut out = String::new();
    for (key, value) in props {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    trailing % 2 == 1
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let mut chars = line.char_indices();
    let mut key_end = line.len();
    let mut value_start = line.len();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '=' | ':' => {
                key_end = i;
                value_start = i + 1;
                break;
            }
            c if c.is_whitespace() => {
                key_end = i;
                // Whitespace separator, optionally followed by '=' or ':'
                let rest = line[i..].trim_start();
                let offset = line.len() - rest.len();
                value_start = if rest.starts_with('=') || rest.starts_with(':') {
                    offset + 1
                } else {
                    offset
                };
                break;
            }
            _ => {}
        }
    }

    let key = unescape(&line[..key_end]);
    if key.is_empty() {
        return None;
    }
    let value = unescape(line[value_start..].trim_start());
    Some((key, value))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => out.push_str(&hex),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_props() {
        let text = r#"
# Template Description file for a Weka package
PackageName=LibSVM
Version=1.0.10
Title=Java wrapper for the LibSVM library
Depends=weka (>=3.7.5)
PackageURL=http://prdownloads.sourceforge.net/weka/LibSVM1.0.10.zip?download
Author: Yasser EL-Manzalawy, \
        FracPete
! another comment
Description   multi word value
"#;
        let props = parse(text);
        assert_eq!(props["PackageName"], "LibSVM");
        assert_eq!(props["Depends"], "weka (>=3.7.5)");
        assert_eq!(
            props["PackageURL"],
            "http://prdownloads.sourceforge.net/weka/LibSVM1.0.10.zip?download"
        );
        assert_eq!(props["Author"], "Yasser EL-Manzalawy, FracPete");
        assert_eq!(props["Description"], "multi word value");
        assert_eq!(props.len(), 7);
    }

    #[test]
    fn test_escapes() {
        let props = parse("key\\ with\\ spaces=a\\=b\\u0041\\n");
        assert_eq!(props["key with spaces"], "a=bA\n");
    }

    #[test]
    fn test_render_reads_back() {
        let mut props = Properties::new();
        props.insert("PackageName".into(), "kerasZoo".into());
        props.insert("Depends".into(), "weka (>=3.8.0), wekaDeeplearning4j (>=1.5.0)".into());
        props.insert("Odd key".into(), " leading space: and #hash".into());

        assert_eq!(parse(&render(&props)), props);
    }
}
