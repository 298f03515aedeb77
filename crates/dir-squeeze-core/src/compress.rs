use crate::error::Error;
use crate::filter::FileRecord;
use flate2::{Compression, GzBuilder};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const COMPRESSED_SUFFIX: &str = ".gz";

/// Result of one compress-then-delete transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub compressed_path: PathBuf,
    /// Original size minus compressed size. Always 0 in dry-run mode and
    /// negative when gzip output is larger than its input.
    pub size_delta: i64,
}

/// `name.ext` -> `name.ext.gz`, next to the original.
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

/// Replace `file` with a gzip sibling, or only log the intent when `dry_run`.
///
/// The two steps are not atomic: if the process dies after the sibling is
/// written but before the original is removed, both files remain.
pub fn compress_file(file: &FileRecord, dry_run: bool) -> Result<TransitionOutcome, Error> {
    transition(file, dry_run, |path| fs::remove_file(path))
}

fn transition<F>(
    file: &FileRecord,
    dry_run: bool,
    remove_original: F,
) -> Result<TransitionOutcome, Error>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let target = compressed_path(&file.path);

    if dry_run {
        info!(
            "Creating compressed file: [dry run, nothing written] {}",
            target.display()
        );
        return Ok(TransitionOutcome {
            compressed_path: target,
            size_delta: 0,
        });
    }

    let compression_error = |source| Error::Compression {
        path: target.clone(),
        source,
    };

    // Nothing is written until the source is known to be readable, so a
    // pre-existing sibling survives a vanished or unreadable original.
    let reader = File::open(&file.path).map_err(compression_error)?;

    info!("Creating compressed file: {}", target.display());
    let out = File::create(&target).map_err(compression_error)?;
    if let Err(source) = write_gzip(reader, &file.path, out) {
        if let Err(e) = fs::remove_file(&target) {
            warn!("Unable to remove partial file {}: {}", target.display(), e);
        }
        return Err(compression_error(source));
    }

    let compressed_size = fs::metadata(&target).map_err(compression_error)?.len();

    info!("Removing original file: {}", file.path.display());
    remove_original(&file.path).map_err(|source| Error::Deletion {
        path: file.path.clone(),
        source,
    })?;

    Ok(TransitionOutcome {
        compressed_path: target,
        size_delta: file.size as i64 - compressed_size as i64,
    })
}

fn write_gzip(source: File, source_path: &Path, target: File) -> io::Result<()> {
    let mut reader = BufReader::new(source);
    let out = BufWriter::new(target);

    let mut builder = GzBuilder::new();
    if let Some(name) = source_path.file_name() {
        builder = builder.filename(name.to_string_lossy().into_owned());
    }
    let mut encoder = builder.write(out, Compression::default());
    io::copy(&mut reader, &mut encoder)?;

    let mut out = encoder.finish()?;
    out.flush()?;
    out.get_ref().sync_all()
}
