//! Document assembly: the page shell, per-point sections with resolved
//! images, and the distribution snapshot.

pub mod document;
pub mod images;
pub mod shell;
pub mod snapshot;

pub use document::{DocumentInputs, render_document};
pub use images::{FsProbe, ImageProbe, ImageSettings};
