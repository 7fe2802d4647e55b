//! Image processing backend traits and shared types.
//!
//! A [`FilterBackend`] instantiates one [`FilterHandle`] per processing pass:
//! the session binds parameter values onto the handle (best-effort — a handle
//! may not accept every declared key) and then executes it over the baseline
//! raster. The production implementation is
//! [`RasterBackend`](super::raster_backend::RasterBackend), pure Rust over
//! the `image` crate.
//!
//! The backend owns the numeric semantics of each filter; the session never
//! looks inside a raster.

use crate::catalog::{FilterKind, ParamKey};
use thiserror::Error;

/// The raster type flowing through the session and backend.
pub type Raster = image::RgbaImage;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("unsupported filter: {0:?}")]
    UnsupportedFilter(FilterKind),
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// One instantiated filter, ready to be configured and executed.
pub trait FilterHandle {
    /// Whether this filter consumes the given binding key.
    fn accepts(&self, key: ParamKey) -> bool;

    /// Bind a parameter value. Only called for accepted keys.
    fn set_parameter(&mut self, key: ParamKey, value: f64);

    /// Run the filter over `input`, producing a new raster.
    fn execute(&self, input: &Raster) -> Result<Raster, BackendError>;
}

/// Trait for filter processing backends.
pub trait FilterBackend {
    /// Allocate a fresh handle for the given filter kind.
    fn instantiate(&self, kind: FilterKind) -> Result<Box<dyn FilterHandle>, BackendError>;
}
