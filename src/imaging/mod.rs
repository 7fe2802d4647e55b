//! Filter processing — pure Rust, zero external dependencies.
//!
//! The module is split into:
//! - **Backend**: the [`FilterBackend`]/[`FilterHandle`] seam the session
//!   drives, plus the recording mock used by session tests
//! - **Raster backend**: [`RasterBackend`], the default implementation of
//!   the seven-filter catalog over the `image` crate

pub mod backend;
pub mod raster_backend;

pub use backend::{BackendError, FilterBackend, FilterHandle, Raster};
pub use raster_backend::RasterBackend;
