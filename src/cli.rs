// Copyright © 2024 WikiSEO. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for WikiSEO
//!
//! Renders the JSON-LD head fragments for a page described in a TOML file,
//! and lists the metadata tags each configured generator recognizes.
//!
//! # Examples
//!
//! ```
//! use wikiseo::cli;
//!
//! let matches = cli::build().get_matches_from(vec![
//!     "wikiseo",
//!     "render",
//!     "--page",
//!     "apple.toml",
//! ]);
//!
//! let render = matches.subcommand_matches("render").unwrap();
//! assert_eq!(
//!     render.get_one::<std::path::PathBuf>("page").unwrap().to_str(),
//!     Some("apple.toml")
//! );
//! ```
//!
//! A page file:
//!
//! ```toml
//! title = "Apple"
//! protocol = "https"
//! categories = ["Fruit"]
//!
//! [metadata]
//! searchbox = ""
//! type = "Organization"
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};
use serde::Deserialize;

use crate::core::config::{Config, ConfigBuilder};
use crate::core::error::{Result, SeoError};
use crate::core::traits::TitleResolver;
use crate::page::{HeadItems, Metadata, PageContext};
use crate::title::{Namespace, Protocol, WikiTitleResolver};
use crate::WikiSeo;

/// The current version of WikiSEO, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of environment variables overriding configuration values.
pub const ENV_PREFIX: &str = "WIKISEO_";

/// Builds and configures the WikiSEO command-line interface.
pub fn build() -> Command {
    debug!("Building CLI command structure");

    let config_arg = Arg::new("config")
        .short('c')
        .long("config")
        .help("TOML configuration file")
        .value_parser(value_parser!(PathBuf));

    Command::new("wikiseo")
        .author("WikiSEO Contributors")
        .about("Generates JSON-LD breadcrumbs and search boxes for wiki pages.")
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log output (-v, -vv)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Print the head fragments for a page")
                .arg(config_arg.clone())
                .arg(
                    Arg::new("page")
                        .short('p')
                        .long("page")
                        .help("TOML page description")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("tags")
                .about("List the metadata tags each generator recognizes")
                .arg(config_arg),
        )
}

/// A page as described in a page file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageFile {
    /// Page title, if the page has one.
    #[serde(default)]
    pub title: Option<String>,
    /// Scheme of the simulated request.
    #[serde(default)]
    pub protocol: Protocol,
    /// Categories attached to the page.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Metadata tags set on the page.
    #[serde(default)]
    pub metadata: Metadata,
}

impl PageFile {
    /// Reads a page file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SeoError::io_error(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| {
            SeoError::config_error(
                format!("Failed to parse page file: {}", e),
                Some(path.to_path_buf()),
            )
        })
    }

    /// Builds the render context, resolving the title with `resolver`.
    pub fn context(&self, resolver: &dyn TitleResolver) -> PageContext {
        let title = self
            .title
            .as_deref()
            .and_then(|text| resolver.resolve(text, Namespace::Main));
        PageContext::new(title, self.protocol)
            .with_categories(self.categories.iter().cloned())
    }
}

/// Loads the configuration from `path` (if any) and the environment.
pub fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let mut builder = ConfigBuilder::new().with_env_prefix(ENV_PREFIX);
    if let Some(path) = path {
        builder = builder.with_file(path);
    }
    let config = builder.build()?;
    let config = config.read().clone();
    Ok(config)
}

/// Runs the subcommand in `matches`, writing its output to `out`.
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    match matches.subcommand() {
        Some(("render", sub_matches)) => {
            let config =
                load_config(sub_matches.get_one::<PathBuf>("config"))?;
            let page = sub_matches.get_one::<PathBuf>("page").ok_or_else(
                || SeoError::config_error("No page file given", None),
            )?;
            render_page(&config, page, out)
        }
        Some(("tags", sub_matches)) => {
            let config =
                load_config(sub_matches.get_one::<PathBuf>("config"))?;
            list_tags(&config, out)
        }
        _ => Err(SeoError::config_error("Unknown command", None)),
    }
}

fn render_page(
    config: &Config,
    page_path: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    info!("Rendering head fragments for {}", page_path.display());

    let resolver = WikiTitleResolver::new(config.site.clone());
    let page = PageFile::load(page_path)?;
    let context = page.context(&resolver);

    let mut head = HeadItems::new();
    WikiSeo::from_config(config).render(&page.metadata, &context, &mut head)?;

    if head.is_empty() {
        info!("No head fragments emitted");
    }
    for (key, fragment) in head.iter() {
        writeln!(out, "<!-- {} -->", key)
            .map_err(SeoError::output_error)?;
        writeln!(out, "{}", fragment).map_err(SeoError::output_error)?;
    }
    Ok(())
}

fn list_tags(config: &Config, out: &mut dyn Write) -> Result<()> {
    for generator in WikiSeo::from_config(config).generators() {
        let tags = generator.allowed_tag_names();
        let line = if tags.is_empty() {
            "(none)".to_string()
        } else {
            tags.join(", ")
        };
        writeln!(out, "{}: {}", generator.kind(), line)
            .map_err(SeoError::output_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SiteConfig;
    use crate::generators::BreadcrumbMapping;
    use tempfile::TempDir;

    fn get_matches(args: Vec<&str>) -> ArgMatches {
        build().get_matches_from(args)
    }

    fn config() -> Config {
        Config {
            site: SiteConfig {
                server: "https://wiki.example.org".to_string(),
                ..SiteConfig::default()
            },
            breadcrumbs: vec![BreadcrumbMapping {
                category: "Fruit".to_string(),
                path: "Food>Fruit".to_string(),
            }],
            ..Config::default()
        }
    }

    #[test]
    fn test_render_command() {
        let matches = get_matches(vec![
            "wikiseo", "-v", "render", "--config", "seo.toml", "--page",
            "page.toml",
        ]);
        assert_eq!(matches.get_count("verbose"), 1);
        let render = matches.subcommand_matches("render").unwrap();
        assert_eq!(
            render.get_one::<PathBuf>("config").unwrap(),
            &PathBuf::from("seo.toml")
        );
        assert_eq!(
            render.get_one::<PathBuf>("page").unwrap(),
            &PathBuf::from("page.toml")
        );
    }

    #[test]
    fn test_render_requires_page() {
        let result =
            build().try_get_matches_from(vec!["wikiseo", "render"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_page_file_context() {
        let page: PageFile = toml::from_str(
            r#"
title = "apple"
protocol = "http"
categories = ["Fruit"]

[metadata]
searchbox = ""
"#,
        )
        .unwrap();
        let resolver = WikiTitleResolver::new(SiteConfig::default());
        let context = page.context(&resolver);

        assert_eq!(context.protocol, Protocol::Http);
        assert_eq!(context.title.unwrap().text(), "Apple");
        assert_eq!(context.categories, vec!["Fruit"]);
        assert!(page.metadata.contains_key("searchbox"));
    }

    #[test]
    fn test_render_page_output() {
        let temp_dir = TempDir::new().unwrap();
        let page_path = temp_dir.path().join("page.toml");
        fs::write(
            &page_path,
            "title = \"Apple\"\ncategories = [\"Fruit\"]\n\n[metadata]\nsearchbox = \"\"\n",
        )
        .unwrap();

        let mut out = Vec::new();
        render_page(&config(), &page_path, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "<!-- jsonld-metadata-breadcrumbs -->");
        assert!(lines[1].contains("\"name\":\"Food\""));
        assert_eq!(lines[2], "<!-- jsonld-metadata -->");
        assert!(lines[3].contains("{search_term}"));
    }

    #[test]
    fn test_render_missing_page_file() {
        let mut out = Vec::new();
        let err =
            render_page(&config(), Path::new("missing.toml"), &mut out)
                .unwrap_err();
        assert!(matches!(err, SeoError::IOError { .. }));
    }

    #[derive(Debug)]
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "pipe closed",
            ))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_output_error() {
        let err = list_tags(&config(), &mut ClosedPipe).unwrap_err();
        assert!(matches!(err, SeoError::OutputError { .. }));
        assert_eq!(err.to_string(), "Failed to write output: pipe closed");
    }

    #[test]
    fn test_list_tags() {
        let mut out = Vec::new();
        list_tags(&config(), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "breadcrumbs: (none)\nsearchbox: type, searchbox\n"
        );
    }
}
