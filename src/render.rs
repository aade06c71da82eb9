use serde::Serialize;

use crate::app::Report;
use crate::extract::{Extraction, ExtractionResult};
use crate::links::SearchLink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Markdown => Ok(markdown(report)),
        OutputFormat::Json => json(report).map(|mut out| {
            out.push('\n');
            out
        }),
    }
}

pub const NO_DETAILS_NOTE: &str =
    "Could not extract specific details, proceeding with general keywords.";
pub const NO_LINKS_NOTE: &str =
    "The AI returned no search keywords, so no links could be built. Try rephrasing your request.";

/// Markdown report: the interpreted attributes, then the generated links.
pub fn markdown(report: &Report) -> String {
    let result = match &report.extraction {
        Extraction::Found(result) => result,
        Extraction::Failed { error } => return format!("**Error:** {}\n", escape_md(error)),
    };

    let mut out = String::from("## Interpreting Your Request...\n\n");
    format_attributes(result, &mut out);

    out.push_str("\n## Generated Search Links\n\n");
    if report.links.is_empty() {
        out.push_str(NO_LINKS_NOTE);
        out.push('\n');
    } else {
        out.push_str("Open these links in your browser for targeted searches:\n\n");
        for link in &report.links {
            format_link(link, &mut out);
        }
    }
    out
}

fn format_attributes(result: &ExtractionResult, out: &mut String) {
    if !result.has_attributes() {
        out.push_str(NO_DETAILS_NOTE);
        out.push('\n');
        return;
    }

    let rows = [
        ("Industry", result.industry.join(", ")),
        ("Location", result.location.join(", ")),
        ("Stage", result.stage.clone().unwrap_or_default()),
        ("Technologies", result.technologies.join(", ")),
    ];
    for (label, value) in rows.iter().filter(|(_, v)| !v.is_empty()) {
        out.push_str(&format!("- **{label}:** {}\n", escape_md(value)));
    }
}

fn format_link(link: &SearchLink, out: &mut String) {
    out.push_str(&format!(
        "- [**Search on {}**]({}) ({})\n",
        link.destination.label(),
        link.url,
        escape_md(&link.keyword)
    ));
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    extraction: &'a Extraction,
    #[serde(skip_serializing_if = "<[SearchLink]>::is_empty")]
    links: &'a [SearchLink],
}

/// JSON report: the extraction (or `{"error": ...}`) plus a `links` array.
pub fn json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        extraction: &report.extraction,
        links: &report.links,
    })
}

/// Escape characters that Markdown would treat as formatting or link syntax.
fn escape_md(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '*' | '_' | '`' | '[' | ']' | '(' | ')' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}
