//! Escaped forms of a payload that a server may echo back instead of the
//! literal string.

const FULL_ESCAPE: &[(char, &str)] = &[
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#39;"),
];

/// Whole-payload escapes emitted by common server stacks besides the default
/// one: `html.EscapeString` style and `html.escape` / JSX style.
const ALTERNATE_ESCAPES: &[&[(char, &str)]] = &[
    &[('&', "&amp;"), ('<', "&lt;"), ('>', "&gt;"), ('"', "&#34;"), ('\'', "&#39;")],
    &[('&', "&amp;"), ('<', "&lt;"), ('>', "&gt;"), ('"', "&quot;"), ('\'', "&#x27;")],
];

const SINGLE_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("<", "&lt;"),
    (">", "&gt;"),
    ("\"", "&quot;"),
    ("'", "&#39;"),
    ("'", "&apos;"),
    ("&", "&amp;"),
];

/// Extra spellings tried one at a time but kept out of the cumulative chain.
const ALTERNATE_SUBSTITUTIONS: &[(&str, &str)] = &[("\"", "&#34;"), ("'", "&#x27;")];

const SPECIAL_CHARS: &[char] = &['&', '<', '>', '"', '\''];

pub fn escape_html(s: &str) -> String {
    escape_with(s, FULL_ESCAPE)
}

fn escape_with(s: &str, table: &[(char, &str)]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match table.iter().find(|(ch, _)| *ch == c) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(c),
        }
    }
    out
}

/// Candidate escaped forms in match priority order: full entity escapes,
/// each single substitution applied to the untouched payload, the cumulative
/// substitution chain, then numeric character references. Forms identical to
/// the payload are dropped.
pub fn escaped_variants(payload: &str) -> Vec<String> {
    let mut variants = vec![escape_html(payload)];
    for table in ALTERNATE_ESCAPES {
        variants.push(escape_with(payload, table));
    }

    for (from, to) in SINGLE_SUBSTITUTIONS.iter().chain(ALTERNATE_SUBSTITUTIONS) {
        variants.push(payload.replace(from, to));
    }

    let mut chained = payload.to_string();
    for (from, to) in SINGLE_SUBSTITUTIONS {
        chained = chained.replace(from, to);
        variants.push(chained.clone());
    }

    variants.push(numeric_decimal(payload, |_| true));
    variants.push(numeric_hex(payload));
    variants.push(numeric_decimal(payload, |c| SPECIAL_CHARS.contains(&c)));

    let mut unique: Vec<String> = Vec::with_capacity(variants.len());
    for variant in variants {
        if variant != payload && !unique.contains(&variant) {
            unique.push(variant);
        }
    }
    unique
}

fn numeric_decimal(payload: &str, encode: impl Fn(char) -> bool) -> String {
    payload
        .chars()
        .map(|c| {
            if encode(c) {
                format!("&#{};", c as u32)
            } else {
                c.to_string()
            }
        })
        .collect()
}

fn numeric_hex(payload: &str) -> String {
    payload
        .chars()
        .map(|c| format!("&#x{:x};", c as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_full_escape_comes_first() {
        let variants = escaped_variants("\"><img src=x>");
        assert_eq!(variants[0], "&quot;&gt;&lt;img src=x&gt;");
    }

    #[test]
    fn test_single_substitutions_are_independent() {
        let variants = escaped_variants("<b>\"");
        assert!(variants.contains(&"&lt;b>\"".to_string()));
        assert!(variants.contains(&"<b&gt;\"".to_string()));
        assert!(variants.contains(&"<b>&quot;".to_string()));
    }

    #[test]
    fn test_cumulative_chain_double_escapes_ampersand() {
        let variants = escaped_variants("<b>");
        assert!(variants.contains(&"&amp;lt;b&amp;gt;".to_string()));
    }

    #[test]
    fn test_numeric_forms() {
        let variants = escaped_variants("<x>");
        assert!(variants.contains(&"&#60;&#120;&#62;".to_string()));
        assert!(variants.contains(&"&#x3c;&#x78;&#x3e;".to_string()));
        assert!(variants.contains(&"&#60;x&#62;".to_string()));
    }

    #[test]
    fn test_other_server_escape_styles() {
        let variants = escaped_variants("\"><img src='x'>");
        assert!(variants.contains(&"&#34;&gt;&lt;img src=&#39;x&#39;&gt;".to_string()));
        assert!(variants.contains(&"&quot;&gt;&lt;img src=&#x27;x&#x27;&gt;".to_string()));
        assert!(variants.contains(&"&#34;><img src='x'>".to_string()));
        assert!(variants.contains(&"\"><img src=&#x27;x&#x27;>".to_string()));
    }

    #[test]
    fn test_variants_never_equal_payload() {
        for payload in ["plain", "<b>", "a'b"] {
            assert!(escaped_variants(payload).iter().all(|v| v != payload));
        }
    }
}
