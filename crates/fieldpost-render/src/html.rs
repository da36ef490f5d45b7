//! Browsable artifact generation.
//!
//! Produces a single self-contained HTML page per report: the raw markdown
//! body is embedded escaped and rendered client-side (pinned CDN builds of
//! marked and MathJax, so `$...$` spans typeset on load). Building the page
//! needs no network access and cannot fail the submission; a `<noscript>`
//! block carries the transliterated plain-text body as an offline fallback.

use crate::math::transliterate_body;

const MARKED_CDN: &str = "https://cdn.jsdelivr.net/npm/marked@12.0.2/marked.min.js";
const MATHJAX_CDN: &str = "https://cdn.jsdelivr.net/npm/mathjax@3.2.2/es5/tex-mml-chtml.js";

/// Escape text for embedding in HTML content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render the browsable artifact for a report.
pub fn render_artifact(title: &str, agent_name: &str, tag: &str, body: &str) -> String {
    let escaped_title = escape_html(title);
    let escaped_body = escape_html(body);
    let fallback = escape_html(&transliterate_body(body));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{escaped_title}</title>
<style>
  body {{ font-family: -apple-system, "Segoe UI", Roboto, sans-serif;
         max-width: 56rem; margin: 2rem auto; padding: 0 1rem;
         color: #1f2328; line-height: 1.6; }}
  header {{ border-bottom: 1px solid #d0d7de; margin-bottom: 1.5rem;
            padding-bottom: 0.75rem; }}
  header .meta {{ color: #57606a; font-size: 0.875rem; }}
  header .tag {{ font-family: ui-monospace, monospace; background: #f6f8fa;
                 border: 1px solid #d0d7de; border-radius: 4px;
                 padding: 0 0.375rem; }}
  pre {{ background: #f6f8fa; padding: 0.75rem; border-radius: 6px;
        overflow-x: auto; }}
  code {{ font-family: ui-monospace, monospace; font-size: 0.9em; }}
  img {{ max-width: 100%; }}
</style>
<script>
  window.MathJax = {{
    tex: {{ inlineMath: [['$', '$']], displayMath: [['$$', '$$']] }},
    options: {{ skipHtmlTags: ['script', 'noscript', 'style'] }}
  }};
</script>
</head>
<body>
<header>
  <h1>{escaped_title}</h1>
  <div class="meta">agent <strong>{agent}</strong> &middot; tag <span class="tag">{tag}</span></div>
</header>
<div id="report-source" hidden>{escaped_body}</div>
<div id="report-content"></div>
<noscript><pre>{fallback}</pre></noscript>
<script src="{marked}"></script>
<script>
  var source = document.getElementById('report-source').textContent;
  document.getElementById('report-content').innerHTML = marked.parse(source);
</script>
<script src="{mathjax}" async></script>
</body>
</html>
"#,
        escaped_title = escaped_title,
        agent = escape_html(agent_name),
        tag = escape_html(tag),
        escaped_body = escaped_body,
        fallback = fallback,
        marked = MARKED_CDN,
        mathjax = MATHJAX_CDN,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_entities() {
        assert_eq!(
            escape_html("<script>&\"'"),
            "&lt;script&gt;&amp;&quot;&#39;"
        );
    }

    #[test]
    fn artifact_contains_title_and_body() {
        let html = render_artifact("Run 42", "bot1", "A1B2", "hello **world**");
        assert!(html.contains("Run 42"));
        assert!(html.contains("hello **world**"));
        assert!(html.contains("A1B2"));
        assert!(html.contains("bot1"));
    }

    #[test]
    fn artifact_pins_cdn_assets() {
        let html = render_artifact("t", "a", "TTTT", "body");
        assert!(html.contains(MARKED_CDN));
        assert!(html.contains(MATHJAX_CDN));
    }

    #[test]
    fn math_spans_survive_and_fallback_is_transliterated() {
        let html = render_artifact("t", "a", "TTTT", "value $x^2$");
        // Raw LaTeX kept for MathJax.
        assert!(html.contains("$x^2$"));
        // Offline fallback carries the Unicode form.
        assert!(html.contains("x²"));
    }

    #[test]
    fn hostile_body_is_escaped() {
        let html = render_artifact("t", "a", "TTTT", "<script>alert(1)</script>");
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }
}
