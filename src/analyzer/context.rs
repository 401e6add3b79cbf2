/// Characters of markup examined on each side of a reflection.
pub const CONTEXT_WINDOW: usize = 500;

/// Containers whose content the browser renders as text. `None` means the
/// container has no closing form and swallows the rest of the document.
const SAFE_CONTAINERS: &[(&str, Option<&str>)] = &[
    ("<!--", Some("-->")),
    ("<title", Some("</title>")),
    ("<textarea", Some("</textarea>")),
    ("<noscript", Some("</noscript>")),
    ("<style", Some("</style>")),
    ("<xmp", Some("</xmp>")),
    ("<plaintext", None),
    ("<listing", Some("</listing>")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Dangerous,
    Safe,
}

/// Decides whether the first occurrence of `payload` in `body` sits where the
/// browser would parse it as markup. Ambiguous cases are `Dangerous`.
pub fn placement(body: &str, payload: &str) -> Placement {
    let Some(index) = body.find(payload) else {
        return Placement::Dangerous;
    };

    let start = back_chars(body, index, CONTEXT_WINDOW);
    let end = forward_chars(body, index + payload.len(), CONTEXT_WINDOW);
    let window = body[start..end].to_ascii_lowercase();
    let pos = index - start;
    let before = &window[..pos];
    let from_payload = &window[pos..];

    let mut openers: Vec<(usize, &str, Option<&str>)> = SAFE_CONTAINERS
        .iter()
        .filter_map(|(open, close)| {
            before
                .rmatch_indices(open)
                .map(|(at, _)| at)
                .find(|at| is_tag_boundary(before, at + open.len(), open))
                .map(|at| (at, *open, *close))
        })
        .collect();
    openers.sort_by(|a, b| b.0.cmp(&a.0));

    for (at, open, close) in openers {
        let Some(close) = close else {
            return Placement::Safe;
        };

        // Closed before the payload: this container does not enclose it.
        if before[at + open.len()..].contains(close) {
            continue;
        }

        return match from_payload.find(close) {
            Some(offset) if offset >= payload.len() => Placement::Safe,
            _ => Placement::Dangerous,
        };
    }

    Placement::Dangerous
}

fn is_tag_boundary(text: &str, after: usize, open: &str) -> bool {
    if open == "<!--" {
        return true;
    }
    match text[after..].chars().next() {
        None => true,
        Some(c) => c == '>' || c == '/' || c.is_ascii_whitespace(),
    }
}

fn back_chars(s: &str, from: usize, count: usize) -> usize {
    s[..from]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(from)
}

fn forward_chars(s: &str, from: usize, count: usize) -> usize {
    s[from..]
        .char_indices()
        .nth(count)
        .map(|(i, _)| from + i)
        .unwrap_or(s.len())
}
