//! Citation audit for generated reports.
//!
//! The writer only *asks* the model to cite sources with `[Source: URL]`
//! tags. This module checks the result: which URLs the report cites, and
//! which of those do not appear in the collected content. The report itself
//! is never modified.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref SOURCE_TAG: Regex =
        Regex::new(r"\[Source:([^\]]*)\]").expect("source tag pattern is valid");
}

/// Outcome of checking a report's citations against the collected content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CitationAudit {
    /// Distinct URLs cited by the report, in order of first appearance
    pub cited: Vec<String>,
    /// Cited URLs that are not the source of any content block
    pub unverified: Vec<String>,
    /// Content sources the report never cites
    pub uncited: Vec<String>,
}

impl CitationAudit {
    /// True when every citation points at collected content.
    pub fn is_clean(&self) -> bool {
        self.unverified.is_empty()
    }
}

/// Every `[Source: URL]` URL in `text`, in order, duplicates included.
///
/// One tag may list several URLs separated by commas, semicolons or
/// whitespace, e.g. `[Source: https://a.com, https://b.com]`.
pub fn extract_citations(text: &str) -> Vec<String> {
    SOURCE_TAG
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .flat_map(|m| {
            m.as_str()
                .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                .filter(|url| !url.is_empty())
        })
        .map(str::to_string)
        .collect()
}

/// Compare the citations of `report` with the sources of `content`.
pub fn audit_citations(report: &str, content: &[String]) -> CitationAudit {
    let cited = dedup(extract_citations(report));
    let sources = dedup(content.iter().flat_map(|block| extract_citations(block)).collect());

    let unverified = cited
        .iter()
        .filter(|url| !sources.contains(url))
        .cloned()
        .collect();
    let uncited = sources
        .iter()
        .filter(|url| !cited.contains(url))
        .cloned()
        .collect();

    CitationAudit {
        cited,
        unverified,
        uncited,
    }
}

fn dedup(urls: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(urls.len());
    for url in urls {
        if !seen.contains(&url) {
            seen.push(url);
        }
    }
    seen
}
