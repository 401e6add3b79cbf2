use super::context::{Placement, placement};
use super::encoding::escaped_variants;
use crate::models::ReflectionVerdict;

const SNIPPET_CHARS: usize = 40;
const MIN_PAYLOAD_CHARS: usize = 3;

/// Bare markup fragments that qualify for the context check even when they
/// are shorter than the minimum payload length.
#[rustfmt::skip]
const COMMON_FRAGMENTS: &[&str] = &[
    "<script", "</script>", "<script>",
    "<style", "</style>", "<style>",
    "<div", "</div>", "<div>",
    "<span", "</span>", "<span>",
    "<svg", "</svg>", "<svg>",
    "<img", "</img>", "<img>",
    "<a", "</a>", "<a>",
    "<body", "</body>", "<body>",
    "<html", "</html>", "<html>",
    "<head", "</head>", "<head>",
    "<link", "</link>", "<link>",
    "<meta", "</meta>", "<meta>",
    "<iframe", "</iframe>", "<iframe>",
    "<form", "</form>", "<form>",
    "<input", "</input>", "<input>",
    "<button", "</button>", "<button>",
    "<p", "</p>", "<p>",
    "<h1", "</h1>", "<h1>",
    "<h2", "</h2>", "<h2>",
    "<h3", "</h3>", "<h3>",
    "<ul", "</ul>", "<ul>",
    "<li", "</li>", "<li>",
    "<table", "</table>", "<table>",
    "<tr", "</tr>", "<tr>",
    "<td", "</td>", "<td>",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: ReflectionVerdict,
    pub parameter: String,
    pub payload: String,
    pub snippet: String,
}

pub struct ReflectionAnalyzer;

impl ReflectionAnalyzer {
    pub fn classify(body: &str, payload: &str, parameter: &str) -> Classification {
        Classification {
            verdict: Self::verdict(body, payload),
            parameter: parameter.to_string(),
            payload: payload.to_string(),
            snippet: Self::snippet(body, payload),
        }
    }

    pub fn verdict(body: &str, payload: &str) -> ReflectionVerdict {
        if payload.is_empty() {
            return ReflectionVerdict::NoReflection;
        }

        if body.contains(payload) && Self::qualifies(payload) {
            return match placement(body, payload) {
                Placement::Dangerous => ReflectionVerdict::RawReflection,
                Placement::Safe => ReflectionVerdict::EscapedReflection,
            };
        }

        if escaped_variants(payload)
            .iter()
            .any(|variant| body.contains(variant.as_str()))
        {
            return ReflectionVerdict::EscapedReflection;
        }

        ReflectionVerdict::NoReflection
    }

    pub fn is_common_fragment(payload: &str) -> bool {
        COMMON_FRAGMENTS.contains(&payload)
    }

    fn qualifies(payload: &str) -> bool {
        payload.chars().count() >= MIN_PAYLOAD_CHARS || Self::is_common_fragment(payload)
    }

    fn snippet(body: &str, payload: &str) -> String {
        let start = if payload.is_empty() {
            None
        } else {
            body.find(payload)
        };

        let from = start
            .map(|index| {
                let lead = SNIPPET_CHARS / 4;
                body[..index]
                    .char_indices()
                    .rev()
                    .take(lead)
                    .last()
                    .map(|(i, _)| i)
                    .unwrap_or(index)
            })
            .unwrap_or(0);

        body[from..].chars().take(SNIPPET_CHARS).collect()
    }
}
