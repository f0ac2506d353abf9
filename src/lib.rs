//! marketscope: competitor-monitoring dashboard proxy and AI recommendation
//! extractor.

pub mod analytics;
pub mod backend;
pub mod cli;
pub mod config;
pub mod insights;
pub mod recommendations;
pub mod settings;
pub mod web;
