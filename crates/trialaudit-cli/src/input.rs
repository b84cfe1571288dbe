//! Reading filings and option files from disk.

use anyhow::{Context, Result};
use scraper::node::Node;
use scraper::{ElementRef, Html};
use std::fs;
use std::path::Path;

use trialaudit_compare::AuditorOptions;

/// Characters of an ancestor's text searched for pipeline wording.
const PIPELINE_CONTEXT_CHARS: usize = 500;

/// Filing text plus what only the HTML markup could tell us.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilingText {
    pub text: String,
    pub pipeline_is_image: bool,
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("htm") || ext.eq_ignore_ascii_case("html"))
}

/// Visible text of an HTML filing, one text node per line.
fn visible_text(doc: &Html) -> String {
    let mut lines: Vec<&str> = Vec::new();

    for node in doc.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if matches!(el.name(), "script" | "style"))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines.join("\n")
}

/// An `<img>` sits inside an element whose text talks about the pipeline.
///
/// Ancestors are searched outward up to, not including, `body`.
fn pipeline_image(doc: &Html) -> bool {
    doc.tree.nodes().any(|node| {
        let is_img = matches!(node.value(), Node::Element(el) if el.name() == "img");
        is_img
            && node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|el| !matches!(el.value().name(), "body" | "html"))
                .any(|el| {
                    let text: String = el
                        .text()
                        .map(str::trim)
                        .collect::<String>()
                        .to_lowercase()
                        .chars()
                        .take(PIPELINE_CONTEXT_CHARS)
                        .collect();
                    text.contains("pipeline") || text.contains("our programs")
                })
    })
}

/// Parse an HTML filing once for both its text and its pipeline chart.
pub fn read_html(html: &str) -> FilingText {
    let doc = Html::parse_document(html);
    FilingText {
        text: visible_text(&doc),
        pipeline_is_image: pipeline_image(&doc),
    }
}

/// Filing text from a `.htm`/`.html` or plain-text file.
pub fn read_filing(path: &Path) -> Result<FilingText> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read filing {}", path.display()))?;
    if is_html(path) {
        let filing = read_html(&raw);
        tracing::info!(
            path = %path.display(),
            html_bytes = raw.len(),
            text_bytes = filing.text.len(),
            pipeline_is_image = filing.pipeline_is_image,
            "converted HTML filing to text"
        );
        Ok(filing)
    } else {
        Ok(FilingText {
            text: raw,
            pipeline_is_image: false,
        })
    }
}

/// Options from a JSON file, or the defaults.
pub fn read_options(path: Option<&Path>) -> Result<AuditorOptions> {
    let Some(path) = path else {
        return Ok(AuditorOptions::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read options {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid options file {}", path.display()))
}
