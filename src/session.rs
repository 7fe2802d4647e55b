//! The image-edit session state machine.
//!
//! An [`EditSession`] owns the three image layers and everything that keeps
//! them consistent while the user changes filters and drags sliders:
//!
//! - `original` — the loaded photo, replaced only by a new load or a save
//! - `baseline` — what the active filter is applied *to*; advances to the
//!   previous working image on every filter switch, so filters stack onto
//!   the prior result instead of re-deriving from the original
//! - `current` — `baseline` with the active filter and live parameters
//!   applied; the only layer ever shown
//!
//! `current` is recomputed from scratch on every mutation, never patched.
//! Failures follow a recover-locally policy: absent input and unknown names
//! are silent no-ops, and a backend failure falls back to showing `baseline`
//! unchanged. Nothing in here is fatal; the session stays usable after any
//! failure.
//!
//! The session is an explicit, constructible object — inject a backend, get
//! an independent instance. Nothing process-wide.

use crate::catalog::{self, FilterDefinition};
use crate::imaging::{FilterBackend, Raster};
use crate::params::ParameterSet;
use crate::writer::{PhotoWriter, WriterError};
use std::sync::Arc;
use tracing::{debug, warn};

/// The aggregate root: three image layers, the active filter, its live
/// parameters, and the backend that executes processing passes.
pub struct EditSession<B: FilterBackend> {
    backend: B,
    original: Option<Arc<Raster>>,
    baseline: Option<Arc<Raster>>,
    current: Option<Arc<Raster>>,
    active: &'static FilterDefinition,
    parameters: ParameterSet,
}

impl<B: FilterBackend> EditSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            original: None,
            baseline: None,
            current: None,
            active: catalog::none(),
            parameters: ParameterSet::empty(),
        }
    }

    /// Load a freshly picked photo.
    ///
    /// `None` (the picker was cancelled) is a silent no-op. Otherwise all
    /// three layers are reseeded with the new image and the filter selection
    /// is forcibly cleared — a new photo always starts unfiltered; the user
    /// re-picks a filter for it.
    pub fn load_image(&mut self, raster: Option<Raster>) {
        let Some(raster) = raster else {
            debug!("load_image: nothing picked");
            return;
        };
        let raster = Arc::new(raster);
        self.original = Some(Arc::clone(&raster));
        self.baseline = Some(Arc::clone(&raster));
        self.current = Some(raster);
        self.active = catalog::none();
        self.parameters = ParameterSet::empty();
    }

    /// Switch the active filter by catalog name.
    ///
    /// Unknown names route to the sentinel, same as picking "None". The
    /// previous filter's output is first committed into the baseline, then
    /// parameters reseed to midpoint defaults and the image reprocesses, so
    /// the new filter is visible at default strength immediately.
    pub fn select_filter(&mut self, name: &str) {
        // Bake whatever the previous filter produced into the chain.
        self.baseline = self.current.clone();

        let def = catalog::resolve(name);
        if def.is_passthrough() && catalog::lookup(name).is_none() {
            debug!("select_filter: unknown filter {name:?}, clearing to pass-through");
        }
        self.active = def;
        self.parameters = ParameterSet::seeded(def);
        self.process();
    }

    /// Write one parameter of the active filter and reprocess.
    ///
    /// The value is clamped into the declared range. A name the active
    /// filter does not declare is logged and ignored; prior values keep
    /// their effect, nothing fails.
    pub fn set_parameter(&mut self, name: &str, value: f64) {
        if !self.parameters.set(name, value) {
            warn!(
                "set_parameter: {:?} has no parameter {name:?}, ignoring",
                self.active.name
            );
            return;
        }
        self.process();
    }

    /// Revert the image content to the original, keeping the filter
    /// selection and slider positions as they are.
    pub fn reset(&mut self) {
        match &self.original {
            Some(original) => {
                self.baseline = Some(Arc::clone(original));
                self.current = Some(Arc::clone(original));
            }
            None => {
                debug!("reset: no original, clearing all layers");
                self.baseline = None;
                self.current = None;
            }
        }
    }

    /// Commit the working image and hand it to the photo-library writer.
    ///
    /// With nothing to save this is a no-op and `on_complete` is never
    /// invoked (the save control should be disabled in that state).
    /// Otherwise `current` becomes the new `original` and `baseline` (a
    /// save behaves like starting a fresh edit from the saved result) and
    /// the writer reports back through `on_complete` exactly once, on an
    /// unspecified thread.
    pub fn save(
        &mut self,
        writer: &impl PhotoWriter,
        on_complete: impl FnOnce(Result<(), WriterError>) + Send + 'static,
    ) {
        let Some(frame) = self.current.clone() else {
            debug!("save: no working image, skipping");
            return;
        };
        self.baseline = Some(Arc::clone(&frame));
        self.original = Some(Arc::clone(&frame));
        writer.write(frame, Box::new(on_complete));
    }

    /// Recompute `current` from (`baseline`, active filter, parameters).
    ///
    /// Backend failure at any stage falls back to the last good image:
    /// `current := baseline`, logged, never raised.
    fn process(&mut self) {
        let Some(baseline) = self.baseline.clone() else {
            return;
        };
        let Some(kind) = self.active.kind else {
            self.current = Some(baseline);
            return;
        };

        let mut handle = match self.backend.instantiate(kind) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("process: instantiate {kind:?} failed: {e}");
                self.current = Some(baseline);
                return;
            }
        };

        // Best-effort binding: a filter may ignore declared parameters.
        for pv in self.parameters.iter() {
            if handle.accepts(pv.spec.key) {
                handle.set_parameter(pv.spec.key, pv.value);
            } else {
                debug!("process: {kind:?} does not accept {:?}, skipping", pv.spec.key);
            }
        }

        match handle.execute(&baseline) {
            Ok(output) => self.current = Some(Arc::new(output)),
            Err(e) => {
                warn!("process: {kind:?} execution failed: {e}");
                self.current = Some(baseline);
            }
        }
    }

    /// The working image — the only layer a presentation layer displays.
    pub fn current_image(&self) -> Option<&Arc<Raster>> {
        self.current.as_ref()
    }

    pub fn baseline_image(&self) -> Option<&Arc<Raster>> {
        self.baseline.as_ref()
    }

    pub fn original_image(&self) -> Option<&Arc<Raster>> {
        self.original.as_ref()
    }

    pub fn active_filter(&self) -> &'static FilterDefinition {
        self.active
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn has_image(&self) -> bool {
        self.original.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
