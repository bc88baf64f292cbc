//! Document model and element duplication for the design editor.
//!
//! This crate owns what is on the canvas: the element types, the in-memory
//! document store, and the identifier-remapping clone used by duplicate,
//! copy and paste. It performs no rendering and no I/O; the editor crate
//! decides which elements to feed in and where the copies go.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Element types, identifiers, and the [`doc::DocStore`] |
//! | [`duplicate`] | [`duplicate::Duplicator`], id sources, and duplicate-id policy |
//! | [`consts`] | Shared numeric constants (default font size, paste offset) |

pub mod consts;
pub mod doc;
pub mod duplicate;

pub use doc::{CanvasElement, DocStore, ElementBody, ElementId};
pub use duplicate::{DuplicateError, DuplicateIdPolicy, Duplicator, IdSource, duplicate};
