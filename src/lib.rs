// ABOUTME: Main library file for lsky-uploader
// ABOUTME: Exports all public modules and types

pub mod actions;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod host;
pub mod i18n;
pub mod naming;
pub mod reference;
pub mod summary;
pub mod uploader;
pub mod vault;

pub use anyhow::{Error, Result};
