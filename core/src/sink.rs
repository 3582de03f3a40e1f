//! Per-object destination: filesystem file or discard sink, spec §4.5.
//!
//! A sink is used by exactly one streaming GET; concurrent ranged
//! sub-requests for the *same* object write to disjoint offsets of the same
//! sink, so writes must be positional (random-access), not sequential
//! appends. `std::fs::File`'s Unix `write_at` gives us that; we drive it
//! from async code via `spawn_blocking`, the same way the teacher drives
//! blocking filesystem work through `tokio::fs`.

use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

#[async_trait]
pub trait Sink: Send + Sync {
    /// Writes `data` at the given byte offset within the object's stream.
    async fn write_at(&self, offset: u64, data: bytes::Bytes) -> io::Result<()>;

    /// Called once after every range of the object has been written
    /// successfully. No-op for most sinks; exists so a sink can flush or
    /// finalize (e.g. truncate to the declared size for a directory-marker
    /// key with size 0).
    async fn finish(&self, declared_size: u64) -> io::Result<()>;
}

/// Joins `destination` with the object key as a relative path, creating any
/// missing parent directory (recursively — spec §9 calls out the source's
/// non-recursive `mkdir` as a bug to not repeat), truncating on open.
///
/// Path safety: the key is joined as-is. Keys beginning with `/` or
/// containing `..` are not rewritten or rejected — see SECURITY.md.
pub struct FileSink {
    file: Arc<std::fs::File>,
}

impl FileSink {
    pub async fn create(destination: &Path, key: &str) -> io::Result<(Self, PathBuf)> {
        // A key ending in `/` (logical directory marker, spec §4.3) cannot be
        // opened as a regular file on POSIX — the kernel requires a path
        // with a trailing slash to resolve to a directory. We trim exactly
        // one trailing slash so `D/K` still yields a plain file at the
        // expected nested location rather than erroring on every such key.
        let trimmed = key.trim_end_matches('/');
        let local_path = if trimmed.is_empty() {
            destination.join(key)
        } else {
            destination.join(trimmed)
        };
        let local_path_parent = local_path.clone();
        if let Some(parent) = local_path_parent.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let path_for_open = local_path.clone();
        let file = tokio::task::spawn_blocking(move || {
            std::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path_for_open)
        })
        .await
        .expect("blocking open task panicked")?;

        Ok((
            Self {
                file: Arc::new(file),
            },
            local_path,
        ))
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write_at(&self, offset: u64, data: bytes::Bytes) -> io::Result<()> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.write_all_at(&data, offset))
            .await
            .expect("blocking write task panicked")
    }

    async fn finish(&self, declared_size: u64) -> io::Result<()> {
        // A key ending in `/` (logical directory marker) declares size 0 and
        // never has a range written; set_len makes sure the file still
        // exists with the declared (zero) length rather than being empty by
        // accident of never being opened for write.
        if declared_size == 0 {
            let file = self.file.clone();
            tokio::task::spawn_blocking(move || file.set_len(0)).await.expect("blocking set_len task panicked")
        } else {
            Ok(())
        }
    }
}

/// A sink whose writes accept bytes and drop them. Used in benchmark mode to
/// measure network throughput without storage pressure.
#[derive(Default)]
pub struct DiscardSink;

#[async_trait]
impl Sink for DiscardSink {
    async fn write_at(&self, _offset: u64, _data: bytes::Bytes) -> io::Result<()> {
        Ok(())
    }

    async fn finish(&self, _declared_size: u64) -> io::Result<()> {
        Ok(())
    }
}

/// Builds the sink for a given job before the GET is issued, so directory
/// creation failures surface synchronously (spec §4.5).
pub enum SinkFactory {
    Filesystem { destination: PathBuf },
    Discard,
}

pub enum AnySink {
    File(FileSink),
    Discard(DiscardSink),
}

#[async_trait]
impl Sink for AnySink {
    async fn write_at(&self, offset: u64, data: bytes::Bytes) -> io::Result<()> {
        match self {
            AnySink::File(s) => s.write_at(offset, data).await,
            AnySink::Discard(s) => s.write_at(offset, data).await,
        }
    }

    async fn finish(&self, declared_size: u64) -> io::Result<()> {
        match self {
            AnySink::File(s) => s.finish(declared_size).await,
            AnySink::Discard(s) => s.finish(declared_size).await,
        }
    }
}

impl SinkFactory {
    pub fn filesystem(destination: PathBuf) -> Self {
        Self::Filesystem { destination }
    }

    pub fn discard() -> Self {
        Self::Discard
    }

    pub async fn create(&self, key: &str) -> io::Result<AnySink> {
        match self {
            SinkFactory::Filesystem { destination } => {
                let (sink, _path) = FileSink::create(destination, key).await?;
                Ok(AnySink::File(sink))
            }
            SinkFactory::Discard => Ok(AnySink::Discard(DiscardSink)),
        }
    }
}
