#![doc = "rds-log-export-core: core logic library for rds-log-export."]

//! This crate contains the export pipeline, its contracts and data models.
//! No cloud SDK is referenced here: AWS-backed implementations of the
//! contracts live in the `rds-log-export` crate.
//!
//! # Usage
//! Build a [`job::LogSyncJob`] from an [`config::ExportConfig`] and three
//! dependencies (watermark store, log source, log sink), then call
//! [`job::LogSyncJob::handle`] once per trigger.

pub mod config;
pub mod contract;
pub mod error;
pub mod fetch;
pub mod job;
pub mod select;
pub mod sink;
pub mod synchronise;
pub mod watermark;
