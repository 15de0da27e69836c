//! Core library for the newsletter command line application.
//!
//! A build reads three tables (meta, points, distribution) from a local
//! workbook or a published Google Sheet, validates them into an [`Issue`],
//! normalizes the supply distribution and renders a single self-contained
//! HTML page. Source adapters live under [`io`], table validation in
//! [`schema`], the percentage normalizer in [`distribution`], text-to-markup
//! conversion in [`markup`], page assembly under [`render`], and the run
//! orchestration in [`build`].

pub mod build;
pub mod distribution;
pub mod error;
pub mod io;
pub mod markup;
pub mod model;
pub mod render;
pub mod schema;

pub use build::{BuildOptions, BuildReport, Issue, SourceSelection};
pub use error::{NewsletterError, Result};
