//! Pipeline stages for fit-index analysis.
//!
//! Each submodule implements exactly one step, so each is testable on its own
//! and the two external collaborators (PDF parser, modeling tool) sit behind
//! traits.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ text ──▶ indices ──▶ table / chart
//! (path/URL) (pdfium) (regex)    (display)
//!
//! diagram  (on request only; fixed model, not fed by the document)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path or URL to a local PDF
//! 2. [`text`]    — page texts joined by `\n`; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`indices`] — first number after each known fit-index label
//! 4. [`table`]   — one row per index, missing values marked
//! 5. [`chart`]   — bar chart of the present values, rendered to SVG
//! 6. [`diagram`] — external R run producing a path-diagram PNG
//! 7. [`encode`]  — base64 data URIs for the HTML report

pub mod chart;
pub mod diagram;
pub mod encode;
pub mod indices;
pub mod input;
pub mod table;
pub mod text;
