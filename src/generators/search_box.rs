//! Sitelinks search box.
//!
//! When a page's metadata carries the `searchbox` tag, a schema.org object
//! with a `SearchAction` is emitted so search engines can offer a search
//! field for the wiki.

use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::{json_ld_script, GeneratorKind, SCHEMA_CONTEXT};
use crate::core::error::Result;
use crate::core::traits::{HeadSink, MetadataGenerator, TitleResolver};
use crate::page::{Metadata, PageContext};
use crate::title::{protocolize_url, Namespace, Protocol};

/// Head fragment key of the search box payload.
pub const SEARCH_BOX_KEY: &str = "jsonld-metadata";

/// Page the search action targets unless configured otherwise.
pub const DEFAULT_SEARCH_PAGE: &str = "Special:Search";

/// `@type` used when the page metadata has no `type` tag.
pub const DEFAULT_TYPE: &str = "article";

const SEARCHBOX_TAG: &str = "searchbox";
const TYPE_TAG: &str = "type";
const SEARCH_PARAM: &str = "search";
/// Query value replaced by `{search_term}` in the search URL.
pub const SEARCH_PLACEHOLDER: &str = "search_term";
const QUERY_INPUT: &str = "required name=search_term";

#[derive(Debug, Serialize)]
struct SearchBox {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(
        rename = "potentialAction",
        skip_serializing_if = "Option::is_none"
    )]
    potential_action: Option<SearchAction>,
}

#[derive(Debug, Serialize)]
struct SearchAction {
    #[serde(rename = "@type")]
    kind: &'static str,
    target: String,
    #[serde(rename = "query-input")]
    query_input: &'static str,
}

/// Emits a search box payload for pages tagged `searchbox`.
#[derive(Debug, Clone)]
pub struct SearchBoxGenerator {
    resolver: Arc<dyn TitleResolver>,
    search_page: String,
    default_type: String,
}

impl SearchBoxGenerator {
    /// Creates a generator targeting `Special:Search`.
    pub fn new(resolver: Arc<dyn TitleResolver>) -> Self {
        Self {
            resolver,
            search_page: DEFAULT_SEARCH_PAGE.to_string(),
            default_type: DEFAULT_TYPE.to_string(),
        }
    }

    /// Sets the title of the search page.
    pub fn with_search_page<S: Into<String>>(mut self, page: S) -> Self {
        self.search_page = page.into();
        self
    }

    /// Sets the `@type` used when the metadata has no `type` tag.
    pub fn with_default_type<S: Into<String>>(mut self, kind: S) -> Self {
        self.default_type = kind.into();
        self
    }

    /// Builds the search URL template, with `{search_term}` standing in
    /// for the query. Returns `None` if the search page is not a valid
    /// title, or if the URL already contains `search_term` outside the
    /// query value.
    pub fn search_target(&self, protocol: Protocol) -> Option<String> {
        let title = self.resolver.resolve(&self.search_page, Namespace::Main)?;
        let mut target = self.resolver.full_url(
            &title,
            &[(SEARCH_PARAM, SEARCH_PLACEHOLDER)],
            Some(protocol),
        );
        // The query string is last, so the final occurrence is the value.
        let at = target.rfind(SEARCH_PLACEHOLDER)?;
        if target[..at].contains(SEARCH_PLACEHOLDER) {
            return None;
        }
        target.replace_range(
            at..at + SEARCH_PLACEHOLDER.len(),
            "{search_term}",
        );
        Some(target)
    }

    fn search_action(&self, protocol: Protocol) -> Option<SearchAction> {
        let Some(target) = self.search_target(protocol) else {
            debug!(
                "No search URL for page '{}', omitting search action",
                self.search_page
            );
            return None;
        };
        Some(SearchAction {
            kind: "SearchAction",
            target,
            query_input: QUERY_INPUT,
        })
    }
}

impl MetadataGenerator for SearchBoxGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::SearchBox
    }

    fn add_metadata(
        &self,
        metadata: &Metadata,
        page: &PageContext,
        out: &mut dyn HeadSink,
    ) -> Result<()> {
        if !metadata.contains_key(SEARCHBOX_TAG) {
            return Ok(());
        }

        let page_url = page.title.as_ref().map(|title| {
            protocolize_url(
                &self.resolver.full_url(title, &[], None),
                page.protocol,
            )
        });

        let payload = SearchBox {
            context: SCHEMA_CONTEXT,
            kind: metadata
                .get(TYPE_TAG)
                .unwrap_or(&self.default_type)
                .clone(),
            identifier: page_url.clone(),
            url: page_url,
            potential_action: self.search_action(page.protocol),
        };

        out.add_head_item(
            SEARCH_BOX_KEY,
            json_ld_script(SEARCH_BOX_KEY, &payload)?,
        );
        Ok(())
    }
}
