//! Terminal UI layer for the incident report.
//!
//! Provides themes, the header and share-bar components, the summary table,
//! the chart views, a plain-text renderer, and the main application event
//! loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod text_report;
pub mod themes;

pub use incident_core as core;
