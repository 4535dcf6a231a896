//! Syndication extension support for Atom and RSS feeds.
//!
//! Feeds and items carry namespace-qualified metadata from extension
//! modules such as Dublin Core, FeedSync and Slash. This crate discovers
//! which extensions an element uses, loads them into typed structs and
//! writes them back out.
//!
//! - [`extension`] - Descriptors, the extension contract, catalog, resolver and adapter
//! - [`builtin`] - The built-in extension kinds
//! - [`document`] - Whole-feed loading and saving
//! - [`config`] - TOML configuration
//! - [`xml`] - The XML tree and writer the extensions work against

pub mod builtin;
pub mod config;
pub mod document;
pub mod entity;
pub mod extension;
pub mod util;
pub mod xml;
