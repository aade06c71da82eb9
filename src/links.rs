//! Search links built from extracted keywords.
//!
//! Keywords are assigned to destinations in fixed order (Google, LinkedIn,
//! Crunchbase). With fewer keywords than destinations the last keyword is
//! reused; with none, no links are produced.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

/// Form-style query encoding: only `A-Z a-z 0-9 _ . - ~` pass through.
/// Space is kept here and turned into `+` afterwards.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b' ');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Google,
    LinkedIn,
    Crunchbase,
}

impl Destination {
    pub const ALL: [Destination; 3] = [
        Destination::Google,
        Destination::LinkedIn,
        Destination::Crunchbase,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Destination::Google => "Google",
            Destination::LinkedIn => "LinkedIn",
            Destination::Crunchbase => "Crunchbase",
        }
    }

    fn url_prefix(self) -> &'static str {
        match self {
            Destination::Google => "https://www.google.com/search?q=",
            Destination::LinkedIn => "https://www.linkedin.com/search/results/companies/?keywords=",
            Destination::Crunchbase => {
                "https://www.crunchbase.com/discover/organization.companies/PRIMARY_ROLE=company,QUERY="
            }
        }
    }

    pub fn url_for(self, keyword: &str) -> String {
        format!("{}{}", self.url_prefix(), encode_query_value(keyword))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchLink {
    pub destination: Destination,
    pub keyword: String,
    pub url: String,
}

pub fn build_links(keywords: &[String]) -> Vec<SearchLink> {
    let usable: Vec<&str> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    let Some(&last) = usable.last() else {
        return Vec::new();
    };

    Destination::ALL
        .iter()
        .enumerate()
        .map(|(i, &destination)| {
            let keyword = usable.get(i).copied().unwrap_or(last);
            SearchLink {
                destination,
                keyword: keyword.to_string(),
                url: destination.url_for(keyword),
            }
        })
        .collect()
}

pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE_SET)
        .to_string()
        .replace(' ', "+")
}
