//! Healthcare encounter dashboard.
//!
//! The [`data`] layer loads, cleans and filters encounter tables and computes
//! aggregates; [`dashboard`] bundles every view for one filter selection;
//! [`app`], [`state`] and [`ui`] are the egui front end.

pub mod app;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod export;
pub mod state;
pub mod ui;
