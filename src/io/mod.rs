//! Source adapters and file collaborators: row access over workbooks and
//! published sheets, the template scaffold, and source history snapshots.

pub mod google;
pub mod history;
pub mod rows;
pub mod template;
pub mod workbook;
