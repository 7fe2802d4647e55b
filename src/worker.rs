//! Coalesced session driver for interactive use.
//!
//! A slider drag emits a burst of parameter writes, and each one triggers a
//! full filter pass over a potentially large raster. [`SessionWorker`] moves
//! the [`EditSession`] onto a dedicated thread fed by a command channel:
//! callers return immediately, commands apply in order, and a queued
//! parameter write that is already superseded by a newer write to the same
//! parameter is dropped before it wastes a processing pass. Commands other
//! than parameter writes are never skipped and never reordered, so the
//! observable end state is exactly what the synchronous session would have
//! converged to.
//!
//! Each applied command bumps a generation counter and publishes a
//! [`Snapshot`] — working image, active filter, parameter values — which is
//! what a presentation layer polls. Only the newest result is ever visible.

use crate::catalog::{self, FilterDefinition};
use crate::imaging::{FilterBackend, Raster};
use crate::session::EditSession;
use crate::writer::{CompletionHandler, PhotoWriter, WriterError};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tracing::trace;

enum Command {
    LoadImage(Option<Raster>),
    SelectFilter(String),
    SetParameter { name: String, value: f64 },
    Reset,
    Save(CompletionHandler),
    Flush(Sender<()>),
}

/// Published view of the session after a processed command.
#[derive(Clone)]
pub struct Snapshot {
    /// The working image, if a photo is loaded.
    pub image: Option<Arc<Raster>>,
    pub filter: &'static FilterDefinition,
    /// `(name, value)` for each of the active filter's parameters.
    pub parameters: Vec<(&'static str, f64)>,
    /// Bumped once per applied command. Strictly monotonic.
    pub generation: u64,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            image: None,
            filter: catalog::none(),
            parameters: Vec::new(),
            generation: 0,
        }
    }
}

/// Handle to a session running on its own thread.
///
/// Dropping the handle shuts the thread down after the queue drains.
pub struct SessionWorker {
    tx: Option<Sender<Command>>,
    state: Arc<Mutex<Snapshot>>,
    join: Option<JoinHandle<()>>,
}

impl SessionWorker {
    pub fn spawn<B, W>(backend: B, writer: W) -> Self
    where
        B: FilterBackend + Send + 'static,
        W: PhotoWriter + Send + 'static,
    {
        let (tx, rx) = channel();
        let state = Arc::new(Mutex::new(Snapshot::default()));
        let thread_state = Arc::clone(&state);
        let join = std::thread::spawn(move || {
            run(EditSession::new(backend), writer, rx, thread_state);
        });
        Self {
            tx: Some(tx),
            state,
            join: Some(join),
        }
    }

    fn send(&self, command: Command) {
        // The receiver lives as long as the handle; a send can only fail
        // after shutdown, at which point there is nobody to notify.
        if let Some(tx) = &self.tx {
            let _ = tx.send(command);
        }
    }

    pub fn load_image(&self, raster: Option<Raster>) {
        self.send(Command::LoadImage(raster));
    }

    pub fn select_filter(&self, name: impl Into<String>) {
        self.send(Command::SelectFilter(name.into()));
    }

    pub fn set_parameter(&self, name: impl Into<String>, value: f64) {
        self.send(Command::SetParameter {
            name: name.into(),
            value,
        });
    }

    pub fn reset(&self) {
        self.send(Command::Reset);
    }

    pub fn save(&self, on_complete: impl FnOnce(Result<(), WriterError>) + Send + 'static) {
        self.send(Command::Save(Box::new(on_complete)));
    }

    /// Block until every previously sent command has been applied.
    pub fn flush(&self) {
        let (tx, rx) = channel();
        self.send(Command::Flush(tx));
        let _ = rx.recv();
    }

    /// The latest published state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().unwrap().clone()
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Mark queued parameter writes that a newer write to the same parameter
/// supersedes. Only runs of consecutive `SetParameter` commands coalesce:
/// any other command in between is a barrier, because it observes (or
/// commits) the value written before it.
fn mark_superseded(pending: &[Command]) -> Vec<bool> {
    let mut skip = vec![false; pending.len()];
    for i in 0..pending.len() {
        let Command::SetParameter { name, .. } = &pending[i] else {
            continue;
        };
        for later in &pending[i + 1..] {
            match later {
                Command::SetParameter { name: other, .. } => {
                    if other == name {
                        skip[i] = true;
                        break;
                    }
                }
                _ => break,
            }
        }
    }
    skip
}

fn run<B, W>(
    mut session: EditSession<B>,
    writer: W,
    rx: Receiver<Command>,
    state: Arc<Mutex<Snapshot>>,
) where
    B: FilterBackend,
    W: PhotoWriter,
{
    let mut generation = 0u64;
    while let Ok(first) = rx.recv() {
        // Drain whatever queued up while the previous pass was running.
        let mut pending = vec![first];
        while let Ok(next) = rx.try_recv() {
            pending.push(next);
        }
        let skip = mark_superseded(&pending);

        for (command, skip) in pending.into_iter().zip(skip) {
            if skip {
                trace!("dropping superseded parameter write");
                continue;
            }
            match command {
                Command::LoadImage(raster) => session.load_image(raster),
                Command::SelectFilter(name) => session.select_filter(&name),
                Command::SetParameter { name, value } => session.set_parameter(&name, value),
                Command::Reset => session.reset(),
                Command::Save(on_complete) => session.save(&writer, on_complete),
                Command::Flush(ack) => {
                    let _ = ack.send(());
                    continue;
                }
            }
            generation += 1;
            let mut snapshot = state.lock().unwrap();
            snapshot.image = session.current_image().cloned();
            snapshot.filter = session.active_filter();
            snapshot.parameters = session
                .parameters()
                .iter()
                .map(|pv| (pv.spec.name, pv.value))
                .collect();
            snapshot.generation = generation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FilterKind, ParamKey};
    use crate::imaging::backend::tests::MockBackend;
    use crate::writer::tests::RecordingWriter;
    use std::sync::mpsc;

    fn photo() -> Raster {
        Raster::from_fn(8, 6, |x, y| {
            image::Rgba([(x * 20) as u8, (y * 20) as u8, 77, 255])
        })
    }

    fn set(name: &str, value: f64) -> Command {
        Command::SetParameter {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn consecutive_same_parameter_writes_coalesce() {
        let pending = [set("intensity", 0.1), set("radius", 5.0), set("intensity", 0.9)];
        assert_eq!(mark_superseded(&pending), [true, false, false]);
    }

    #[test]
    fn non_parameter_commands_are_barriers() {
        let pending = [
            set("intensity", 0.1),
            Command::Save(Box::new(|_| {})),
            set("intensity", 0.9),
        ];
        // The save must capture the first write's result.
        assert_eq!(mark_superseded(&pending), [false, false, false]);

        let pending = [
            set("intensity", 0.1),
            Command::SelectFilter("Vignette".to_string()),
            set("intensity", 0.9),
        ];
        assert_eq!(mark_superseded(&pending), [false, false, false]);
    }

    #[test]
    fn worker_converges_to_latest_state() {
        let worker = SessionWorker::spawn(MockBackend::new(), RecordingWriter::new());
        worker.load_image(Some(photo()));
        worker.select_filter("Sepia Tone");
        for i in 0..50 {
            worker.set_parameter("intensity", i as f64 / 50.0);
        }
        worker.set_parameter("intensity", 1.0);
        worker.flush();

        let snapshot = worker.snapshot();
        assert_eq!(snapshot.filter.name, "Sepia Tone");
        assert_eq!(snapshot.parameters, vec![("intensity", 1.0)]);
        let expected = MockBackend::transform(
            &photo(),
            FilterKind::SepiaTone,
            &[(ParamKey::Intensity, 1.0)],
        );
        assert_eq!(*snapshot.image.unwrap(), expected);
    }

    #[test]
    fn generation_is_monotonic() {
        let worker = SessionWorker::spawn(MockBackend::new(), RecordingWriter::new());
        worker.load_image(Some(photo()));
        worker.flush();
        let first = worker.snapshot().generation;
        assert!(first >= 1);

        worker.select_filter("Edges");
        worker.flush();
        assert!(worker.snapshot().generation > first);
    }

    #[test]
    fn save_round_trips_through_the_worker() {
        let worker = SessionWorker::spawn(MockBackend::new(), RecordingWriter::new());
        worker.load_image(Some(photo()));
        worker.select_filter("Sepia Tone");

        let (tx, rx) = mpsc::channel();
        worker.save(move |result| tx.send(result).unwrap());
        rx.recv().unwrap().unwrap();
    }

    #[test]
    fn save_with_no_image_never_completes() {
        let worker = SessionWorker::spawn(MockBackend::new(), RecordingWriter::new());
        let (tx, rx) = mpsc::channel::<Result<(), WriterError>>();
        worker.save(move |result| tx.send(result).unwrap());
        worker.flush();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropping_the_worker_joins_cleanly() {
        let worker = SessionWorker::spawn(MockBackend::new(), RecordingWriter::new());
        worker.load_image(Some(photo()));
        drop(worker);
    }
}
