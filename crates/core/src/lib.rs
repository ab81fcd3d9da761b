//! # dp-core
//!
//! Core analysis cycle orchestrator and cycle store for deskpilot.
//!
//! This crate provides:
//! - Configuration loading from `deskpilot.toml` plus environment overrides
//! - Adapter traits and concrete adapters for capture, extraction, and
//!   inference
//! - The action executor with its confirmation policy
//! - The durable, queryable cycle store
//! - The orchestrator driving one cycle end-to-end, and its serial loop
//! - The read-only HTTP boundary consumed by the viewer
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`capture`]: Screen capture adapter
//! - [`extract`]: OCR and UI element extraction adapter
//! - [`infer`]: Language-model inference adapter and response parsing
//! - [`actions`]: Action executor and input-synthesis drivers
//! - [`store`]: Durable cycle log with indexed reads
//! - [`orchestrator`]: Cycle sequencing and the driving loop
//! - [`server`]: Read-only viewer query endpoints

pub mod actions;
pub mod capture;
pub mod config;
pub mod extract;
pub mod infer;
pub mod orchestrator;
pub mod server;
pub mod store;
