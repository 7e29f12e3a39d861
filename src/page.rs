// Copyright © 2024 WikiSEO. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Page Context
//!
//! The per-render inputs handed to generators, and [`HeadItems`], an
//! in-memory [`HeadSink`] that collects the emitted head fragments.

use std::collections::HashMap;

use crate::core::traits::HeadSink;
use crate::title::{Protocol, Title};

/// Metadata tags configured for a page, keyed by tag name.
pub type Metadata = HashMap<String, String>;

/// What the host knows about the page being rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// Title of the page, if it has one.
    pub title: Option<Title>,
    /// Category names attached to the page, in page order.
    pub categories: Vec<String>,
    /// Scheme of the current request.
    pub protocol: Protocol,
}

impl PageContext {
    /// Creates a context for a titled page.
    pub fn new(title: Option<Title>, protocol: Protocol) -> Self {
        Self {
            title,
            categories: Vec::new(),
            protocol,
        }
    }

    /// Attaches categories to the page.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

/// Keyed head fragments in insertion order.
///
/// Adding a fragment under an existing key replaces the earlier fragment
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadItems {
    items: Vec<(String, String)>,
}

impl HeadItems {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fragment stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, fragment)| fragment.as_str())
    }

    /// Number of stored fragments.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(key, fragment)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl HeadSink for HeadItems {
    fn add_head_item(&mut self, key: &str, fragment: String) {
        match self.items.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = fragment,
            None => self.items.push((key.to_string(), fragment)),
        }
    }
}
