//! Category scans.
//!
//! Each scan is an explicit fold over [`Element`]s: `step` consumes the
//! state and one element and returns the next state, `finish` yields the
//! section content. Scans are independent, so one block may land in several
//! sections.

mod documents;
mod main_heading;
mod methods;
mod levels;
mod note;
mod timeline;

pub(crate) use documents::DocumentScan;
pub(crate) use levels::LevelScan;
pub(crate) use main_heading::MainHeadingScan;
pub(crate) use methods::MethodScan;
pub(crate) use note::NoteScan;
pub(crate) use timeline::TimelineScan;
