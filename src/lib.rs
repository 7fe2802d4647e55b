//! # Darkroom
//!
//! An interactive photo-filter session engine. Pick a photo, apply one of a
//! fixed catalog of parametric filters, tune its parameters live, stack
//! successive filters, and save the result.
//!
//! # Architecture: One State Machine, Declarative Edges
//!
//! The heart of the crate is [`session::EditSession`], which owns the
//! three-layer image chain and the apply/commit/reset/save protocol:
//!
//! ```text
//! original  ──load──►  baseline  ──active filter + parameters──►  current
//!    ▲                    ▲                                          │
//!    │                    └──────── commit on filter switch ─────────┤
//!    └──────────────────────────────── commit on save ───────────────┘
//! ```
//!
//! Everything around it is a declarative edge:
//!
//! - the [`catalog`] is static data (names, parameter schemas, ranges)
//! - the processing backend is a trait ([`imaging::FilterBackend`]); the
//!   session drives instantiate → bind → execute and never looks at pixels
//! - the photo-library writer is a trait ([`writer::PhotoWriter`]) with a
//!   one-shot asynchronous completion
//! - presentation code consumes [`worker::SessionWorker`] snapshots (or
//!   calls the synchronous session directly) and never mutates a layer
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Static filter registry: definitions, parameter schemas, ranges, sentinel |
//! | [`params`] | Live parameter values for the active filter, clamped on every write |
//! | [`session`] | The state machine: load / select / set / process / reset / save |
//! | [`worker`] | Session on a dedicated thread with coalesced parameter writes |
//! | [`imaging`] | Backend seam + the default pure-Rust filter implementation |
//! | [`writer`] | Photo-library writer seam + PNG file writer |
//!
//! # Design Decisions
//!
//! ## Recover Locally, Never Raise
//!
//! Interactive editing has no fatal paths: a cancelled picker, an unknown
//! filter or parameter name, and a failed processing pass are all absorbed
//! where they happen (logged via `tracing`, the last good image stays on
//! screen). The only error surfaced to callers is a save failure, delivered
//! through the writer's completion callback where the UI can show it.
//!
//! ## Filters Stack, They Don't Restack
//!
//! Switching filters commits the previous output into the baseline. Sepia
//! then vignette produces vignette(sepia(photo)) — the session never
//! re-derives from the original, which is what makes the chain feel like
//! physical darkroom passes. `reset` undoes the chain; `save` adopts it.
//!
//! ## Explicit Instances, No Globals
//!
//! A session is constructed with whatever backend and writer you hand it.
//! Tests run dozens of parallel sessions against a recording mock; the CLI
//! runs one against the pure-Rust backend and a PNG writer.

pub mod catalog;
pub mod imaging;
pub mod params;
pub mod session;
pub mod worker;
pub mod writer;

pub use catalog::{FilterDefinition, FilterKind, ParamKey, ParameterSpec};
pub use imaging::{BackendError, FilterBackend, FilterHandle, Raster, RasterBackend};
pub use params::ParameterSet;
pub use session::EditSession;
pub use worker::{SessionWorker, Snapshot};
pub use writer::{CompletionHandler, FileWriter, PhotoWriter, WriterError};
