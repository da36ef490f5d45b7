//! Fieldpost Render Library
//!
//! Turns report bodies (markdown with `$...$` / `$$...$$` math spans) into
//! display artifacts.
//!
//! Two targets with different fidelity requirements:
//!
//! - **Browsable artifact** ([`html::render_artifact`]): a self-contained
//!   HTML page with pinned CDN assets for client-side markdown and math
//!   typesetting. Builds offline and cannot fail a submission.
//! - **Notification math** ([`math::MathRenderer`]): each math span is
//!   rendered to a PNG by an external endpoint; any failure degrades that
//!   one expression to a Unicode transliteration ([`translit`]) without
//!   affecting the rest of the report.

pub mod html;
pub mod math;
pub mod translit;

pub use html::render_artifact;
pub use math::{
    extract_math, replace_math, segment, transliterate_body, MathRenderer, MathSpan, RenderError,
    Segment,
};
pub use translit::transliterate;
