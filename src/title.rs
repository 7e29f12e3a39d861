// Copyright © 2024 WikiSEO. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Titles and URLs
//!
//! Wiki page titles, the namespaces they live in, and the reference
//! [`TitleResolver`] that turns them into absolute URLs.
//!
//! ```
//! use wikiseo::core::config::SiteConfig;
//! use wikiseo::core::traits::TitleResolver;
//! use wikiseo::title::{Namespace, Protocol, WikiTitleResolver};
//!
//! let resolver = WikiTitleResolver::new(SiteConfig {
//!     server: "//wiki.example.org".to_string(),
//!     ..SiteConfig::default()
//! });
//! let title = resolver.resolve("tropical fruit", Namespace::Category).unwrap();
//! assert_eq!(
//!     resolver.full_url(&title, &[], Some(Protocol::Https)),
//!     "https://wiki.example.org/wiki/Category:Tropical_fruit"
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use url::Url;

use crate::core::config::SiteConfig;
use crate::core::error::SeoError;
use crate::core::traits::TitleResolver;

/// Characters that are never legal in a page title.
const ILLEGAL_TITLE_CHARS: &[char] = &['<', '>', '[', ']', '|', '{', '}'];

/// Percent escapes that stay literal in title paths.
const LITERAL_PATH_ESCAPES: &[(&str, &str)] = &[
    ("%3B", ";"),
    ("%40", "@"),
    ("%24", "$"),
    ("%21", "!"),
    ("%2A", "*"),
    ("%28", "("),
    ("%29", ")"),
    ("%2C", ","),
    ("%2F", "/"),
    ("%7E", "~"),
    ("%3A", ":"),
];

/// Namespaces a title can belong to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Ordinary content pages, no prefix.
    Main,
    /// Generated pages such as `Special:Search`.
    Special,
    /// Category pages.
    Category,
    /// Template pages.
    Template,
    /// File description pages.
    File,
    /// Help pages.
    Help,
}

impl Namespace {
    const PREFIXED: [Namespace; 5] = [
        Namespace::Special,
        Namespace::Category,
        Namespace::Template,
        Namespace::File,
        Namespace::Help,
    ];

    /// Returns the canonical prefix, or `None` for the main namespace.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Namespace::Main => None,
            Namespace::Special => Some("Special"),
            Namespace::Category => Some("Category"),
            Namespace::Template => Some("Template"),
            Namespace::File => Some("File"),
            Namespace::Help => Some("Help"),
        }
    }

    /// Looks up a namespace by prefix, ignoring case and surrounding
    /// whitespace.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let prefix = prefix.trim();
        Self::PREFIXED.into_iter().find(|ns| {
            ns.prefix()
                .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
        })
    }
}

/// Scheme of the current request.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain `http`.
    Http,
    /// `https`.
    #[default]
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => f.write_str("http"),
            Protocol::Https => f.write_str("https"),
        }
    }
}

impl FromStr for Protocol {
    type Err = SeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(SeoError::config_error(
                format!("Unknown protocol '{}'", other),
                None,
            )),
        }
    }
}

/// A normalized page title.
///
/// Titles are only created through [`Title::new_from_text`], so the text
/// is always non-empty, trimmed, free of illegal characters and starts
/// with an upper-case letter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title {
    namespace: Namespace,
    text: String,
}

impl Title {
    /// Parses user-facing text into a title.
    ///
    /// A known namespace prefix in `text` wins over `default_namespace`.
    /// Returns `None` when the text cannot name a page.
    pub fn new_from_text(
        text: &str,
        default_namespace: Namespace,
    ) -> Option<Self> {
        let text = normalize_whitespace(text);
        if text.is_empty()
            || text.chars().any(|c| {
                c.is_control() || ILLEGAL_TITLE_CHARS.contains(&c)
            })
        {
            return None;
        }

        let (namespace, rest) = match text.split_once(':') {
            Some((prefix, rest)) => match Namespace::from_prefix(prefix)
            {
                Some(ns) => (ns, rest.trim()),
                None => (default_namespace, text.as_str()),
            },
            None => (default_namespace, text.as_str()),
        };

        let mut chars = rest.chars();
        let first = chars.next()?;
        Some(Self {
            namespace,
            text: first.to_uppercase().chain(chars).collect(),
        })
    }

    /// The namespace the title lives in.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The title text without namespace prefix, spaces intact.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The title text with its namespace prefix, e.g. `Category:Food`.
    pub fn prefixed_text(&self) -> String {
        match self.namespace.prefix() {
            Some(prefix) => format!("{}:{}", prefix, self.text),
            None => self.text.clone(),
        }
    }

    /// The prefixed text with spaces written as underscores.
    pub fn db_key(&self) -> String {
        self.prefixed_text().replace(' ', "_")
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefixed_text())
    }
}

/// Gives a scheme-less, protocol-relative URL the scheme of the current
/// request. Any other URL is returned unchanged.
pub fn protocolize_url(url: &str, protocol: Protocol) -> String {
    if Url::parse(url).is_err() && url.starts_with("//") {
        format!("{}:{}", protocol, url)
    } else {
        url.to_string()
    }
}

/// Resolves titles against the configured server and URL layout.
#[derive(Debug, Clone)]
pub struct WikiTitleResolver {
    site: SiteConfig,
}

impl WikiTitleResolver {
    /// Creates a resolver for the given site layout.
    pub fn new(site: SiteConfig) -> Self {
        Self { site }
    }

    fn server(&self, protocol: Option<Protocol>) -> String {
        match protocol {
            Some(protocol) if self.site.server.starts_with("//") => {
                format!("{}:{}", protocol, self.site.server)
            }
            _ => self.site.server.clone(),
        }
    }
}

impl TitleResolver for WikiTitleResolver {
    fn resolve(
        &self,
        text: &str,
        namespace: Namespace,
    ) -> Option<Title> {
        Title::new_from_text(text, namespace)
    }

    fn full_url(
        &self,
        title: &Title,
        query: &[(&str, &str)],
        protocol: Option<Protocol>,
    ) -> String {
        let server = self.server(protocol);
        let key = encode_db_key(&title.db_key());

        if query.is_empty() {
            return format!(
                "{}{}",
                server,
                self.site.article_path.replace("$1", &key)
            );
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query)
            .finish();
        format!("{}{}?title={}&{}", server, self.site.script, key, query)
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn encode_db_key(key: &str) -> String {
    let mut encoded = urlencoding::encode(key).into_owned();
    for (escape, literal) in LITERAL_PATH_ESCAPES {
        encoded = encoded.replace(escape, literal);
    }
    encoded
}
