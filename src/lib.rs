// Copyright © 2024 WikiSEO. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # WikiSEO Library
//!
//! WikiSEO emits schema.org JSON-LD fragments into the head of rendered
//! wiki pages: a breadcrumb trail derived from the page categories and a
//! sitelinks search box pointing at the wiki search.
//!
//! The host supplies the page context and receives the fragments through
//! a [`HeadSink`](crate::core::traits::HeadSink); [`WikiSeo`] runs the
//! configured generators for each page.

#![doc = include_str!("../README.md")]

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use crate::core::config::Config;
use crate::core::traits::{HeadSink, MetadataGenerator, TitleResolver};
use crate::generators::{
    BreadcrumbGenerator, GeneratorKind, SearchBoxGenerator,
};
use crate::page::{Metadata, PageContext};
use crate::title::WikiTitleResolver;

pub use crate::core::error::{Result, SeoError};

/// Module containing configuration, errors and the host-facing traits.
pub mod core;

/// Provides command-line interface utilities.
pub mod cli;

/// Provides the JSON-LD generators.
pub mod generators;

/// Provides the per-render page context and head fragment sink.
pub mod page;

/// Provides titles, namespaces and URL construction.
pub mod title;

/// Runs the configured generators for a page.
#[derive(Debug)]
pub struct WikiSeo {
    generators: Vec<Box<dyn MetadataGenerator>>,
}

impl WikiSeo {
    /// Builds the generators listed in `config`, resolving titles with
    /// `resolver`.
    pub fn new(config: &Config, resolver: Arc<dyn TitleResolver>) -> Self {
        let generators = config
            .generators
            .iter()
            .map(|kind| -> Box<dyn MetadataGenerator> {
                match kind {
                    GeneratorKind::Breadcrumbs => {
                        Box::new(BreadcrumbGenerator::new(
                            config.breadcrumb_map(),
                            Arc::clone(&resolver),
                        ))
                    }
                    GeneratorKind::SearchBox => Box::new(
                        SearchBoxGenerator::new(Arc::clone(&resolver))
                            .with_search_page(
                                config.site.search_page.as_str(),
                            )
                            .with_default_type(
                                config.site.default_type.as_str(),
                            ),
                    ),
                }
            })
            .collect();
        Self::from_generators(generators)
    }

    /// Builds the generators listed in `config` with a
    /// [`WikiTitleResolver`] for its site layout.
    pub fn from_config(config: &Config) -> Self {
        let resolver = WikiTitleResolver::new(config.site.clone());
        Self::new(config, Arc::new(resolver))
    }

    /// Wraps an explicit list of generators.
    pub fn from_generators(
        generators: Vec<Box<dyn MetadataGenerator>>,
    ) -> Self {
        Self { generators }
    }

    /// The generators, in run order.
    pub fn generators(&self) -> &[Box<dyn MetadataGenerator>] {
        &self.generators
    }

    /// Union of the tag names recognized by the generators.
    pub fn allowed_tag_names(&self) -> BTreeSet<&'static str> {
        self.generators
            .iter()
            .flat_map(|g| g.allowed_tag_names().iter().copied())
            .collect()
    }

    /// Returns `metadata` without the tags no generator recognizes.
    pub fn validate_metadata(&self, metadata: &Metadata) -> Metadata {
        let allowed = self.allowed_tag_names();
        metadata
            .iter()
            .filter(|(tag, _)| {
                let known = allowed.contains(tag.as_str());
                if !known {
                    debug!("Dropping unrecognized metadata tag '{}'", tag);
                }
                known
            })
            .map(|(tag, value)| (tag.clone(), value.clone()))
            .collect()
    }

    /// Validates `metadata` and runs every generator for `page`.
    pub fn render(
        &self,
        metadata: &Metadata,
        page: &PageContext,
        out: &mut dyn HeadSink,
    ) -> Result<()> {
        let metadata = self.validate_metadata(metadata);
        for generator in &self.generators {
            debug!("Running {} generator", generator.kind());
            generator.add_metadata(&metadata, page, out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SiteConfig;
    use crate::generators::breadcrumbs::BREADCRUMBS_KEY;
    use crate::generators::search_box::SEARCH_BOX_KEY;
    use crate::generators::BreadcrumbMapping;
    use crate::page::HeadItems;
    use crate::title::{Namespace, Protocol, Title};

    fn config() -> Config {
        Config {
            site: SiteConfig {
                server: "//wiki.example.org".to_string(),
                ..SiteConfig::default()
            },
            breadcrumbs: vec![BreadcrumbMapping {
                category: "Fruit".to_string(),
                path: "Food>Fruit".to_string(),
            }],
            ..Config::default()
        }
    }

    fn page() -> PageContext {
        PageContext::new(
            Title::new_from_text("Apple", Namespace::Main),
            Protocol::Https,
        )
        .with_categories(["Fruit"])
    }

    #[test]
    fn test_render_runs_all_generators() {
        let seo = WikiSeo::from_config(&config());
        let metadata: Metadata =
            [("searchbox".to_string(), String::new())].into();
        let mut head = HeadItems::new();

        seo.render(&metadata, &page(), &mut head).unwrap();

        let keys: Vec<_> = head.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![BREADCRUMBS_KEY, SEARCH_BOX_KEY]);
    }

    #[test]
    fn test_allowed_tag_names_union() {
        let seo = WikiSeo::from_config(&config());
        let tags: Vec<_> = seo.allowed_tag_names().into_iter().collect();
        assert_eq!(tags, vec!["searchbox", "type"]);

        let breadcrumbs_only = WikiSeo::from_config(&Config {
            generators: vec![GeneratorKind::Breadcrumbs],
            ..config()
        });
        assert!(breadcrumbs_only.allowed_tag_names().is_empty());
    }

    #[test]
    fn test_validate_metadata_drops_unknown_tags() {
        let seo = WikiSeo::from_config(&config());
        let metadata: Metadata = [
            ("type".to_string(), "Organization".to_string()),
            ("description".to_string(), "ignored".to_string()),
        ]
        .into();
        let validated = seo.validate_metadata(&metadata);
        assert_eq!(validated.len(), 1);
        assert_eq!(validated["type"], "Organization");
    }

    #[test]
    fn test_configured_search_settings_reach_generator() {
        let mut config = config();
        config.generators = vec![GeneratorKind::SearchBox];
        config.site.default_type = "WebSite".to_string();
        let seo = WikiSeo::from_config(&config);
        let metadata: Metadata =
            [("searchbox".to_string(), String::new())].into();
        let mut head = HeadItems::new();

        seo.render(&metadata, &page(), &mut head).unwrap();

        assert_eq!(head.len(), 1);
        assert!(head
            .get(SEARCH_BOX_KEY)
            .unwrap()
            .contains("\"@type\":\"WebSite\""));
    }
}
