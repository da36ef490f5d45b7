//! Math span extraction and remote rendering.
//!
//! Notification messages cannot rely on client-side typesetting, so each
//! `$...$` / `$$...$$` span is rendered to a PNG by an external endpoint.
//! Failure semantics are per-expression: one failing span degrades to the
//! Unicode transliteration without affecting the rest of the report.

use std::sync::OnceLock;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;
use thiserror::Error;

use crate::translit::transliterate;

/// Display math first so `$$...$$` is not consumed as two inline spans.
const MATH_PATTERN: &str = r"(?s)\$\$(.+?)\$\$|\$([^\$\n]+?)\$";

fn math_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MATH_PATTERN).expect("math pattern is valid"))
}

/// One LaTeX span found in a report body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    pub tex: String,
    /// `true` for `$$...$$` display math.
    pub display: bool,
}

/// Extract all math spans from a body, in document order.
pub fn extract_math(body: &str) -> Vec<MathSpan> {
    math_regex()
        .captures_iter(body)
        .map(|caps| match caps.get(1) {
            Some(display) => MathSpan {
                tex: display.as_str().trim().to_string(),
                display: true,
            },
            None => MathSpan {
                tex: caps[2].trim().to_string(),
                display: false,
            },
        })
        .collect()
}

/// One piece of a body split around its math spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Math(MathSpan),
}

/// Split a body into text and math segments, in document order. Callers
/// that need different treatment for the two (escaping text, resolving
/// math to images) build their output from this.
pub fn segment(body: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in math_regex().captures_iter(body) {
        let whole = caps.get(0).expect("match has a whole capture");
        if whole.start() > last {
            segments.push(Segment::Text(body[last..whole.start()].to_string()));
        }
        let span = match caps.get(1) {
            Some(display) => MathSpan {
                tex: display.as_str().trim().to_string(),
                display: true,
            },
            None => MathSpan {
                tex: caps[2].trim().to_string(),
                display: false,
            },
        };
        segments.push(Segment::Math(span));
        last = whole.end();
    }
    if last < body.len() {
        segments.push(Segment::Text(body[last..].to_string()));
    }
    segments
}

/// Replace every math span in `body` using `f`, leaving the surrounding
/// markdown untouched.
pub fn replace_math(body: &str, mut f: impl FnMut(&MathSpan) -> String) -> String {
    math_regex()
        .replace_all(body, |caps: &regex::Captures<'_>| {
            let span = match caps.get(1) {
                Some(display) => MathSpan {
                    tex: display.as_str().trim().to_string(),
                    display: true,
                },
                None => MathSpan {
                    tex: caps[2].trim().to_string(),
                    display: false,
                },
            };
            f(&span)
        })
        .into_owned()
}

/// Replace every math span with its Unicode transliteration.
pub fn transliterate_body(body: &str) -> String {
    replace_math(body, |span| transliterate(&span.tex))
}

/// Math rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Render endpoint returned status {0}")]
    Status(u16),
}

/// Client for the external LaTeX→PNG endpoint.
///
/// The per-expression timeout bounds every call; a timeout degrades to the
/// transliteration fallback rather than blocking the submission.
#[derive(Clone)]
pub struct MathRenderer {
    client: reqwest::Client,
    endpoint: String,
}

impl MathRenderer {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        MathRenderer { client, endpoint }
    }

    /// Render one expression to PNG bytes.
    pub async fn render_png(&self, tex: &str) -> Result<Vec<u8>, RenderError> {
        let query = format!("\\dpi{{150}} {}", tex);
        let url = format!(
            "{}?{}",
            self.endpoint,
            utf8_percent_encode(&query, NON_ALPHANUMERIC)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                "Math render endpoint returned non-success"
            );
            return Err(RenderError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_inline_spans() {
        let spans = extract_math("energy $E = mc^2$ observed");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].tex, "E = mc^2");
        assert!(!spans[0].display);
    }

    #[test]
    fn extracts_display_spans() {
        let spans = extract_math("before $$\\sum_i x_i$$ after");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].tex, "\\sum_i x_i");
        assert!(spans[0].display);
    }

    #[test]
    fn mixed_spans_in_document_order() {
        let spans = extract_math("$a$ then $$b$$ then $c$");
        assert_eq!(
            spans.iter().map(|s| s.tex.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(
            spans.iter().map(|s| s.display).collect::<Vec<_>>(),
            vec![false, true, false]
        );
    }

    #[test]
    fn no_spans_in_plain_text() {
        assert!(extract_math("plain text, $5 is not math without a closer on the same line\nnext").is_empty());
    }

    #[test]
    fn segments_cover_the_whole_body() {
        let segments = segment("a $x$ b");
        assert_eq!(
            segments,
            vec![
                Segment::Text("a ".to_string()),
                Segment::Math(MathSpan {
                    tex: "x".to_string(),
                    display: false
                }),
                Segment::Text(" b".to_string()),
            ]
        );
    }

    #[test]
    fn replace_preserves_surroundings() {
        let out = replace_math("a $x^2$ b", |span| format!("[{}]", span.tex));
        assert_eq!(out, "a [x^2] b");
    }

    #[test]
    fn transliterate_body_renders_unicode() {
        assert_eq!(transliterate_body("hello $x^2$"), "hello x²");
        assert_eq!(
            transliterate_body("$$\\frac{1}{2}$$ done"),
            "1⁄2 done"
        );
    }
}
