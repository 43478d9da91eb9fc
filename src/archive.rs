use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::context::ShellContext;
use crate::error::{Result, ShellError};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ArchiveKind {
    Zip,
    /// gzip-compressed tarball
    TarGz,
}

impl ArchiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }
}

/// Packs `folder` into `name`, returning the archive actually written.
pub fn pack_archive(
    ctx: &ShellContext,
    kind: ArchiveKind,
    folder: &str,
    name: &str,
) -> Result<PathBuf> {
    let folder_path = ctx.resolve(folder);
    if !folder_path.is_dir() {
        return Err(ShellError::NotADirectory(folder_path));
    }
    let archive_path = match kind {
        ArchiveKind::Zip => ctx.resolve(name).with_extension("zip"),
        ArchiveKind::TarGz => ctx.resolve(name),
    };

    match kind {
        ArchiveKind::Zip => write_zip(&folder_path, &archive_path),
        ArchiveKind::TarGz => write_tar_gz(&folder_path, &archive_path),
    }
    .map_err(|err| {
        ShellError::collaborator(format!("cannot create {} archive: {}", kind.as_str(), err))
    })?;
    Ok(archive_path)
}

/// Extracts `name` into the working directory.
pub fn unpack_archive(ctx: &ShellContext, kind: ArchiveKind, name: &str) -> Result<PathBuf> {
    let archive_path = ctx.resolve(name);
    if !archive_path.is_file() {
        return Err(ShellError::NotFound(archive_path));
    }

    match kind {
        ArchiveKind::Zip => extract_zip(&archive_path, &ctx.cwd),
        ArchiveKind::TarGz => extract_tar_gz(&archive_path, &ctx.cwd),
    }
    .map_err(|err| {
        ShellError::collaborator(format!("cannot extract {} archive: {}", kind.as_str(), err))
    })?;
    Ok(archive_path)
}

// Entries are stored relative to the folder itself.
fn write_zip(folder: &Path, archive: &Path) -> anyhow::Result<()> {
    let mut writer = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(folder).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.path() == archive {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(folder)?
            .to_string_lossy()
            .replace('\\', "/");
        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            io::copy(&mut File::open(entry.path())?, &mut writer)?;
        }
    }
    writer.finish()?;
    Ok(())
}

// The tarball keeps the folder's own name as its top-level entry.
fn write_tar_gz(folder: &Path, archive: &Path) -> anyhow::Result<()> {
    let top = folder
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let encoder = GzEncoder::new(File::create(archive)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(top, folder)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

fn extract_zip(archive: &Path, dest: &Path) -> anyhow::Result<()> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    zip.extract(dest)?;
    Ok(())
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> anyhow::Result<()> {
    let mut tar = tar::Archive::new(GzDecoder::new(File::open(archive)?));
    tar.unpack(dest)?;
    Ok(())
}
