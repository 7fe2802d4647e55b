//! The photo-library writer seam.
//!
//! Saving is the one asynchronous edge of the session: a [`PhotoWriter`]
//! consumes a committed raster and reports success or a descriptive failure
//! through a completion handler invoked exactly once, on an unspecified
//! thread. Callers must not assume the session is quiescent while a write is
//! in flight.
//!
//! [`FileWriter`] is the shipped implementation: PNG onto the local
//! filesystem, either a fixed destination file or timestamped files into a
//! directory (the closest stand-in for "add to the photo library").

use crate::imaging::Raster;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// One-shot completion callback. Invoked exactly once per write.
pub type CompletionHandler = Box<dyn FnOnce(Result<(), WriterError>) + Send + 'static>;

/// Consumes one raster per call and reports back asynchronously.
pub trait PhotoWriter {
    fn write(&self, raster: Arc<Raster>, on_complete: CompletionHandler);
}

enum Destination {
    /// Every write lands on this exact path (overwriting).
    File(PathBuf),
    /// Every write creates a new timestamped file in this directory.
    Dir(PathBuf),
}

/// PNG writer onto the local filesystem.
///
/// Encoding happens on a spawned thread; the completion handler runs there.
pub struct FileWriter {
    destination: Destination,
    counter: AtomicU64,
}

impl FileWriter {
    /// Write every save to exactly `path`.
    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        Self {
            destination: Destination::File(path.into()),
            counter: AtomicU64::new(0),
        }
    }

    /// Write each save as a new `darkroom-<epoch>-<n>.png` inside `dir`.
    pub fn into_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            destination: Destination::Dir(dir.into()),
            counter: AtomicU64::new(0),
        }
    }

    fn target_path(&self) -> PathBuf {
        match &self.destination {
            Destination::File(path) => path.clone(),
            Destination::Dir(dir) => {
                let epoch = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                let n = self.counter.fetch_add(1, Ordering::Relaxed);
                dir.join(format!("darkroom-{epoch}-{n}.png"))
            }
        }
    }
}

fn encode_png(raster: &Raster, path: &Path) -> Result<(), WriterError> {
    raster.save_with_format(path, image::ImageFormat::Png).map_err(|e| match e {
        image::ImageError::IoError(io) => WriterError::Io(io),
        other => WriterError::Encode(other.to_string()),
    })
}

impl PhotoWriter for FileWriter {
    fn write(&self, raster: Arc<Raster>, on_complete: CompletionHandler) {
        let path = self.target_path();
        std::thread::spawn(move || {
            let result = encode_png(&raster, &path);
            if let Err(ref e) = result {
                tracing::warn!("write to {} failed: {e}", path.display());
            }
            on_complete(result);
        });
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::mpsc;

    /// In-memory writer that records every raster it receives and completes
    /// immediately on the calling thread.
    #[derive(Default)]
    pub struct RecordingWriter {
        pub written: Arc<Mutex<Vec<Arc<Raster>>>>,
    }

    impl RecordingWriter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn write_count(&self) -> usize {
            self.written.lock().unwrap().len()
        }
    }

    impl PhotoWriter for RecordingWriter {
        fn write(&self, raster: Arc<Raster>, on_complete: CompletionHandler) {
            self.written.lock().unwrap().push(raster);
            on_complete(Ok(()));
        }
    }

    fn small_raster() -> Arc<Raster> {
        Arc::new(Raster::from_pixel(6, 4, image::Rgba([10, 20, 30, 255])))
    }

    #[test]
    fn file_writer_writes_png_and_completes_ok() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.png");
        let writer = FileWriter::to_path(&path);

        let (tx, rx) = mpsc::channel();
        writer.write(small_raster(), Box::new(move |r| tx.send(r).unwrap()));
        rx.recv().unwrap().unwrap();

        let reopened = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reopened.dimensions(), (6, 4));
        assert_eq!(reopened.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn dir_writer_creates_distinct_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let writer = FileWriter::into_dir(tmp.path());

        for _ in 0..2 {
            let (tx, rx) = mpsc::channel();
            writer.write(small_raster(), Box::new(move |r| tx.send(r).unwrap()));
            rx.recv().unwrap().unwrap();
        }

        let files: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn missing_directory_surfaces_io_error() {
        let writer = FileWriter::to_path("/nonexistent-darkroom-dir/out.png");
        let (tx, rx) = mpsc::channel();
        writer.write(small_raster(), Box::new(move |r| tx.send(r).unwrap()));
        assert!(rx.recv().unwrap().is_err());
    }

    #[test]
    fn recording_writer_completes_exactly_once() {
        let writer = RecordingWriter::new();
        let (tx, rx) = mpsc::channel();
        writer.write(small_raster(), Box::new(move |r| tx.send(r).unwrap()));
        rx.recv().unwrap().unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(writer.write_count(), 1);
    }
}
