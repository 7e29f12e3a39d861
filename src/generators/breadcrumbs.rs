//! Breadcrumb trails from page categories.
//!
//! A [`BreadcrumbMap`] maps category names to `>`-delimited paths such as
//! `Food>Fruit>Apples`. The first mapping whose category is attached to
//! the page decides the trail; every step becomes a `ListItem` linking to
//! the category page of that name.

use std::sync::{Arc, OnceLock};

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{json_ld_script, GeneratorKind, SCHEMA_CONTEXT};
use crate::core::error::Result;
use crate::core::traits::{HeadSink, MetadataGenerator, TitleResolver};
use crate::page::{Metadata, PageContext};
use crate::title::{protocolize_url, Namespace, Protocol};

/// Head fragment key of the breadcrumb list.
pub const BREADCRUMBS_KEY: &str = "jsonld-metadata-breadcrumbs";

const STEP_DELIMITER: char = '>';

/// `* <category> @ <path>`, one mapping per line.
const MESSAGE_LINE: &str = r"(?m)^\s*\*\s*(.*)\s*@\s*(.*)$";

fn message_line() -> Option<&'static Regex> {
    static LINE: OnceLock<Option<Regex>> = OnceLock::new();
    LINE.get_or_init(|| Regex::new(MESSAGE_LINE).ok()).as_ref()
}

/// One configured category and the trail it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbMapping {
    /// Category name matched against the page categories.
    pub category: String,
    /// Steps separated by `>`, outermost first.
    pub path: String,
}

/// Ordered category to path mappings.
///
/// Inserting a category that is already mapped replaces its path but keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreadcrumbMap {
    entries: Vec<BreadcrumbMapping>,
}

impl BreadcrumbMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses mappings from message text, one `* <category> @ <path>` per
    /// line. Lines that do not follow the pattern are dropped.
    ///
    /// ```
    /// use wikiseo::generators::BreadcrumbMap;
    ///
    /// let map = BreadcrumbMap::from_message(
    ///     "* Fruit @ Food>Fruit\nnot a mapping\n* Tools @ Things>Tools",
    /// );
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(
    ///     map.find_path(&["Tools".to_string()]),
    ///     Some("Things>Tools")
    /// );
    /// ```
    pub fn from_message(text: &str) -> Self {
        let mut map = Self::new();
        let Some(line) = message_line() else {
            return map;
        };
        for caps in line.captures_iter(text) {
            map.insert(&caps[1], &caps[2]);
        }
        map
    }

    /// Maps `category` to `path`. Both are trimmed; an empty category is
    /// ignored.
    pub fn insert(&mut self, category: &str, path: &str) {
        let category = category.trim();
        let path = path.trim();
        if category.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|m| m.category == category) {
            Some(existing) => existing.path = path.to_string(),
            None => self.entries.push(BreadcrumbMapping {
                category: category.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// Returns the path of the first mapping, in map order, whose category
    /// is among `categories`.
    pub fn find_path(&self, categories: &[String]) -> Option<&str> {
        self.entries
            .iter()
            .find(|m| categories.iter().any(|c| *c == m.category))
            .map(|m| m.path.as_str())
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no mapping is configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the mappings in order.
    pub fn iter(&self) -> impl Iterator<Item = &BreadcrumbMapping> {
        self.entries.iter()
    }
}

impl Extend<BreadcrumbMapping> for BreadcrumbMap {
    fn extend<T: IntoIterator<Item = BreadcrumbMapping>>(
        &mut self,
        iter: T,
    ) {
        for mapping in iter {
            self.insert(&mapping.category, &mapping.path);
        }
    }
}

impl FromIterator<BreadcrumbMapping> for BreadcrumbMap {
    fn from_iter<T: IntoIterator<Item = BreadcrumbMapping>>(
        iter: T,
    ) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// A resolved step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbStep {
    /// Display name, the trimmed step text.
    pub name: String,
    /// Absolute URL of the step's category page.
    pub url: String,
}

#[derive(Debug, Serialize)]
struct BreadcrumbList {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "itemListElement")]
    item_list_element: Vec<ListItem>,
}

#[derive(Debug, Serialize)]
struct ListItem {
    #[serde(rename = "@type")]
    kind: &'static str,
    position: usize,
    name: String,
    item: String,
}

/// Emits a `BreadcrumbList` for pages in a mapped category.
#[derive(Debug, Clone)]
pub struct BreadcrumbGenerator {
    map: BreadcrumbMap,
    resolver: Arc<dyn TitleResolver>,
}

impl BreadcrumbGenerator {
    /// Creates a generator over `map`, resolving steps with `resolver`.
    pub fn new(map: BreadcrumbMap, resolver: Arc<dyn TitleResolver>) -> Self {
        Self { map, resolver }
    }

    /// Splits `path` into steps and resolves each to its category URL.
    ///
    /// Empty steps and steps that are not valid titles are skipped.
    pub fn steps(
        &self,
        path: &str,
        protocol: Protocol,
    ) -> Vec<BreadcrumbStep> {
        path.split(STEP_DELIMITER)
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .filter_map(|step| {
                let Some(title) =
                    self.resolver.resolve(step, Namespace::Category)
                else {
                    debug!("Skipping breadcrumb step '{}'", step);
                    return None;
                };
                let url = self.resolver.full_url(&title, &[], None);
                Some(BreadcrumbStep {
                    name: step.to_string(),
                    url: protocolize_url(&url, protocol),
                })
            })
            .collect()
    }
}

impl MetadataGenerator for BreadcrumbGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Breadcrumbs
    }

    fn add_metadata(
        &self,
        _metadata: &Metadata,
        page: &PageContext,
        out: &mut dyn HeadSink,
    ) -> Result<()> {
        if page.categories.is_empty() || self.map.is_empty() {
            return Ok(());
        }

        let Some(path) = self.map.find_path(&page.categories) else {
            debug!(
                "No breadcrumb mapping for categories {:?}",
                page.categories
            );
            return Ok(());
        };

        let steps = self.steps(path, page.protocol);
        if steps.is_empty() {
            return Ok(());
        }

        let payload = BreadcrumbList {
            context: SCHEMA_CONTEXT,
            kind: "BreadcrumbList",
            item_list_element: steps
                .into_iter()
                .enumerate()
                .map(|(index, step)| ListItem {
                    kind: "ListItem",
                    position: index + 1,
                    name: step.name,
                    item: step.url,
                })
                .collect(),
        };

        out.add_head_item(
            BREADCRUMBS_KEY,
            json_ld_script(BREADCRUMBS_KEY, &payload)?,
        );
        Ok(())
    }
}
