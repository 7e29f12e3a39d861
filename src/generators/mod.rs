//! # Metadata Generators
//!
//! Each generator emits one `<script type="application/ld+json">` block
//! into the page head.
//!
//! ## Available Generators
//!
//! - [`breadcrumbs`]: a schema.org `BreadcrumbList` derived from the page
//!   categories
//! - [`search_box`]: a schema.org `SearchAction` pointing at the wiki search
//!
//! The tags each generator recognizes live in a single lookup table keyed
//! by [`GeneratorKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SeoError};

/// Breadcrumb trail generation.
pub mod breadcrumbs;

/// Site search box generation.
pub mod search_box;

pub use breadcrumbs::{BreadcrumbGenerator, BreadcrumbMap, BreadcrumbMapping};
pub use search_box::SearchBoxGenerator;

/// Value of `@context` in every emitted payload.
pub const SCHEMA_CONTEXT: &str = "http://schema.org";

/// The generators WikiSEO knows how to build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// [`BreadcrumbGenerator`]
    Breadcrumbs,
    /// [`SearchBoxGenerator`]
    SearchBox,
}

const TAG_TABLE: &[(GeneratorKind, &[&str])] = &[
    (GeneratorKind::Breadcrumbs, &[]),
    (GeneratorKind::SearchBox, &["type", "searchbox"]),
];

impl GeneratorKind {
    /// Every kind, in default pipeline order.
    pub const ALL: [GeneratorKind; 2] =
        [GeneratorKind::Breadcrumbs, GeneratorKind::SearchBox];

    /// Tag names the generator recognizes in page metadata.
    pub fn allowed_tag_names(self) -> &'static [&'static str] {
        TAG_TABLE
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, tags)| *tags)
            .unwrap_or(&[])
    }

    /// Configuration name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Breadcrumbs => "breadcrumbs",
            GeneratorKind::SearchBox => "searchbox",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeneratorKind {
    type Err = SeoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                SeoError::config_error(
                    format!("Unknown generator '{}'", s),
                    None,
                )
            })
    }
}

/// Serializes `payload` into a JSON-LD script element.
///
/// `</` is written as `<\/` so text inside the payload cannot close the
/// script element.
pub fn json_ld_script<T: Serialize>(
    fragment: &str,
    payload: &T,
) -> Result<String> {
    let json = serde_json::to_string(payload)
        .map_err(|e| SeoError::serialization_error(fragment, e))?;
    Ok(format!(
        "<script type=\"application/ld+json\">{}</script>",
        json.replace("</", "<\\/")
    ))
}
