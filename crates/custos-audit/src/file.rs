//! Auditing file access.
//!
//! [`FileAuditor`] opens files the way [`OpenOptions`] does and returns an
//! [`AuditedFile`] that records reads and writes. Code that wants its file I/O
//! in the audit trail opens files through the auditor instead of
//! [`std::fs::File`].
//!
//! Recorded calls:
//!
//! | call | event |
//! |------|-------|
//! | open of a path that did not exist | `FileCreate` |
//! | `write`, `write_all`, `write!`, `write_lines`, `truncate` | `FileWrite` |
//! | `read`, `read_exact`, `read_to_end`, `read_to_string`, `read_all`, `read_line`, `read_lines` | `FileRead` |
//!
//! Seeking, flushing, syncing, metadata access and closing pass through
//! unrecorded.

use crate::event::{EventKind, FILE_RESOURCE_TYPE};
use crate::recorder::AuditRecorder;
use custos_core::{context, AuditSettings, ResourceId};
use std::fmt;
use std::fs::{File, Metadata, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opens files with auditing.
#[derive(Debug, Clone)]
pub struct FileAuditor {
    recorder: Arc<AuditRecorder>,
    enabled: bool,
}

impl FileAuditor {
    /// Creates an auditor with per-call auditing enabled.
    #[must_use]
    pub const fn new(recorder: Arc<AuditRecorder>) -> Self {
        Self {
            recorder,
            enabled: true,
        }
    }

    /// Creates an auditor honouring `settings.file_auditing`.
    #[must_use]
    pub const fn from_settings(recorder: Arc<AuditRecorder>, settings: &AuditSettings) -> Self {
        Self::new(recorder).with_enabled(settings.file_auditing)
    }

    /// Enables or disables per-call read/write events.
    ///
    /// `FileCreate` is recorded on genuine creation either way.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns whether per-call read/write events are recorded.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Opens `path` with `options`.
    ///
    /// Records `FileCreate` if the path did not exist before the call and
    /// exists after it.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying open; nothing is recorded then.
    pub fn open(&self, path: impl AsRef<Path>, options: &OpenOptions) -> io::Result<AuditedFile> {
        let path = path.as_ref();
        let existed = path.exists();
        let file = options.open(path)?;

        let recorder = self.enabled.then(|| Arc::clone(&self.recorder));
        let audited = AuditedFile::new(file, path, recorder);

        if !existed && path.exists() {
            self.recorder.record(
                EventKind::FileCreate,
                FILE_RESOURCE_TYPE,
                Some(ResourceId::from(path)),
                context::current_actor().as_ref(),
            );
        }

        Ok(audited)
    }

    /// Opens `path` read-only.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying open.
    pub fn open_read(&self, path: impl AsRef<Path>) -> io::Result<AuditedFile> {
        self.open(path, OpenOptions::new().read(true))
    }

    /// Opens `path` for reading and writing, creating it if needed and
    /// truncating it otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying open.
    pub fn create(&self, path: impl AsRef<Path>) -> io::Result<AuditedFile> {
        self.open(
            path,
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true),
        )
    }
}

/// A file handle that records reads and writes.
///
/// Reads go through an internal buffer so `read_line` works; the buffer is
/// discarded before every write, truncate and seek so the file position
/// always matches what the caller has consumed.
#[derive(Debug)]
pub struct AuditedFile {
    inner: BufReader<File>,
    path: PathBuf,
    recorder: Option<Arc<AuditRecorder>>,
}

impl AuditedFile {
    /// Wraps an already open file. Events are recorded only when `recorder`
    /// is set.
    #[must_use]
    pub fn new(file: File, path: impl Into<PathBuf>, recorder: Option<Arc<AuditRecorder>>) -> Self {
        Self {
            inner: BufReader::new(file),
            path: path.into(),
            recorder,
        }
    }

    /// Returns the path the file was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying file.
    #[must_use]
    pub fn get_ref(&self) -> &File {
        self.inner.get_ref()
    }

    /// Returns the file metadata.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying call.
    pub fn metadata(&self) -> io::Result<Metadata> {
        self.inner.get_ref().metadata()
    }

    /// Syncs data and metadata to disk.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying call.
    pub fn sync_all(&self) -> io::Result<()> {
        self.inner.get_ref().sync_all()
    }

    /// Writes every line in order. Records one `FileWrite`.
    ///
    /// # Errors
    ///
    /// Returns the first write error; nothing is recorded then.
    pub fn write_lines<I>(&mut self, lines: I) -> io::Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.discard_buffer()?;
        let file = self.inner.get_mut();
        for line in lines {
            file.write_all(line.as_ref())?;
        }
        self.log(EventKind::FileWrite);
        Ok(())
    }

    /// Truncates (or extends) the file to `size` bytes, or to the current
    /// position when `size` is `None`. Returns the new size and records one
    /// `FileWrite`.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying call; nothing is recorded then.
    pub fn truncate(&mut self, size: Option<u64>) -> io::Result<u64> {
        self.discard_buffer()?;
        let size = match size {
            Some(size) => size,
            None => self.inner.stream_position()?,
        };
        self.inner.get_ref().set_len(size)?;
        self.log(EventKind::FileWrite);
        Ok(size)
    }

    /// Reads everything up to end of file. Records one `FileRead`.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying read, including invalid UTF-8.
    pub fn read_all(&mut self) -> io::Result<String> {
        let mut content = String::new();
        self.inner.read_to_string(&mut content)?;
        self.log(EventKind::FileRead);
        Ok(content)
    }

    /// Reads one line, including its terminator. Returns an empty string at
    /// end of file. Records one `FileRead`.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying read.
    pub fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.inner.read_line(&mut line)?;
        self.log(EventKind::FileRead);
        Ok(line)
    }

    /// Reads all remaining lines, each including its terminator. Records one
    /// `FileRead`.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying read.
    pub fn read_lines(&mut self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            if self.inner.read_line(&mut line)? == 0 {
                break;
            }
            lines.push(line);
        }
        self.log(EventKind::FileRead);
        Ok(lines)
    }

    /// Unwraps the handle, leaving the file positioned where the caller
    /// stopped reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be repositioned.
    pub fn into_inner(mut self) -> io::Result<File> {
        self.discard_buffer()?;
        Ok(self.inner.into_inner())
    }

    fn discard_buffer(&mut self) -> io::Result<()> {
        if !self.inner.buffer().is_empty() {
            // Seeking a BufReader drops its buffer and rewinds the file to
            // the logical position.
            self.inner.seek(SeekFrom::Current(0))?;
        }
        Ok(())
    }

    fn log(&self, kind: EventKind) {
        if let Some(recorder) = &self.recorder {
            recorder.record(
                kind,
                FILE_RESOURCE_TYPE,
                Some(ResourceId::from(self.path.as_path())),
                context::current_actor().as_ref(),
            );
        }
    }
}

impl Write for AuditedFile {
    /// Records one `FileWrite` per call.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.discard_buffer()?;
        let written = self.inner.get_mut().write(buf)?;
        self.log(EventKind::FileWrite);
        Ok(written)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.discard_buffer()?;
        self.inner.get_mut().write_all(buf)?;
        self.log(EventKind::FileWrite);
        Ok(())
    }

    /// Records one `FileWrite` for the whole formatted output.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.discard_buffer()?;
        self.inner.get_mut().write_fmt(args)?;
        self.log(EventKind::FileWrite);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.get_mut().flush()
    }
}

impl Read for AuditedFile {
    /// Records one `FileRead` per call.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.log(EventKind::FileRead);
        Ok(read)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.log(EventKind::FileRead);
        Ok(())
    }

    fn read_to_end(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let read = self.inner.read_to_end(buf)?;
        self.log(EventKind::FileRead);
        Ok(read)
    }

    fn read_to_string(&mut self, buf: &mut String) -> io::Result<usize> {
        let read = self.inner.read_to_string(buf)?;
        self.log(EventKind::FileRead);
        Ok(read)
    }
}

impl Seek for AuditedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
