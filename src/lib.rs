//! JEXUpdate: Update Server for Joomla! Extensions
//!
//! Republishes version-update metadata for a configured catalog of
//! extensions, in the XML dialect the Joomla updater expects. Manifest and
//! release data come from the source-hosting API; rendered documents are
//! cached on disk for a configurable TTL.

pub mod cache;
pub mod catalog;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod manifest;
pub mod remote;
pub mod server;
pub mod tooling;
