//! # Core Traits Module
//!
//! The seams between WikiSEO and the system rendering the wiki pages.
//!
//! ## Key Traits
//!
//! - [`MetadataGenerator`]: emits one kind of JSON-LD head fragment for a page
//! - [`TitleResolver`]: turns title text into titles and titles into URLs
//! - [`HeadSink`]: accepts keyed fragments for the document head
//!
//! The host owns rendering, category extraction and head injection. The
//! generators only read the page context and write through the sink.

use std::fmt::Debug;

use crate::core::error::Result;
use crate::generators::GeneratorKind;
use crate::page::{Metadata, PageContext};
use crate::title::{Namespace, Protocol, Title};

/// A generator of one JSON-LD head fragment.
///
/// Generators are stateless between calls. Missing input is never an
/// error: the generator returns `Ok(())` without touching the sink.
pub trait MetadataGenerator: Send + Sync + Debug {
    /// Which generator this is.
    fn kind(&self) -> GeneratorKind;

    /// Adds this generator's fragment for `page` to `out`.
    ///
    /// # Arguments
    ///
    /// * `metadata` - Tags configured for the page
    /// * `page` - Title, categories and request scheme of the page
    /// * `out` - Sink receiving the keyed head fragment
    fn add_metadata(
        &self,
        metadata: &Metadata,
        page: &PageContext,
        out: &mut dyn HeadSink,
    ) -> Result<()>;

    /// Tag names this generator recognizes in page metadata.
    fn allowed_tag_names(&self) -> &'static [&'static str] {
        self.kind().allowed_tag_names()
    }
}

/// Resolves title text to titles and titles to absolute URLs.
pub trait TitleResolver: Send + Sync + Debug {
    /// Parses `text` as a title, using `namespace` unless the text carries
    /// its own prefix. Returns `None` when no page can have that name.
    fn resolve(&self, text: &str, namespace: Namespace) -> Option<Title>;

    /// Builds the full URL of `title`.
    ///
    /// A non-empty `query` selects the script URL form. When `protocol` is
    /// given, a protocol-relative server is expanded with it.
    fn full_url(
        &self,
        title: &Title,
        query: &[(&str, &str)],
        protocol: Option<Protocol>,
    ) -> String;
}

/// Receives head fragments, keyed for overwrite.
pub trait HeadSink {
    /// Stores `fragment` under `key`, replacing any earlier fragment with
    /// the same key.
    fn add_head_item(&mut self, key: &str, fragment: String);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HeadItems;

    #[derive(Debug)]
    struct FixedGenerator;

    impl MetadataGenerator for FixedGenerator {
        fn kind(&self) -> GeneratorKind {
            GeneratorKind::SearchBox
        }

        fn add_metadata(
            &self,
            _metadata: &Metadata,
            _page: &PageContext,
            out: &mut dyn HeadSink,
        ) -> Result<()> {
            out.add_head_item("fixed", "<meta>".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_allowed_tag_names_follow_kind() {
        assert_eq!(
            FixedGenerator.allowed_tag_names(),
            &["type", "searchbox"]
        );
    }

    #[test]
    fn test_generator_writes_through_sink() {
        let mut head = HeadItems::new();
        FixedGenerator
            .add_metadata(
                &Metadata::new(),
                &PageContext::default(),
                &mut head,
            )
            .unwrap();
        assert_eq!(head.get("fixed"), Some("<meta>"));
    }
}
