//! Filesystem primitives behind the `ls`, `cd`, `cat`, `cp` and `mv` verbs.
//!
//! Every function takes the shell context explicitly and resolves user paths against
//! its working directory; none of them touch the process working directory.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use walkdir::WalkDir;

use crate::context::ShellContext;
use crate::error::{Result, ShellError};

#[cfg(unix)]
const CROSS_DEVICE: Option<i32> = Some(18); // EXDEV
#[cfg(windows)]
const CROSS_DEVICE: Option<i32> = Some(17); // ERROR_NOT_SAME_DEVICE
#[cfg(not(any(unix, windows)))]
const CROSS_DEVICE: Option<i32> = None;

pub fn list_dir(ctx: &ShellContext, raw: Option<&str>, detailed: bool) -> Result<Vec<String>> {
    let dir = ctx.resolve(raw.unwrap_or("."));
    if !dir.exists() {
        return Err(ShellError::NotFound(dir));
    }
    if !dir.is_dir() {
        return Err(ShellError::NotADirectory(dir));
    }

    let mut entries = fs::read_dir(&dir)
        .map_err(|err| ShellError::io(&dir, err))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|err| ShellError::io(&dir, err))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if !detailed {
            lines.push(name);
            continue;
        }
        let path = entry.path();
        let meta = fs::metadata(&path)
            .or_else(|_| fs::symlink_metadata(&path))
            .map_err(|err| ShellError::io(&path, err))?;
        let modified = meta
            .modified()
            .map(|time| DateTime::<Local>::from(time).format("%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| "--    --:--".to_string());
        lines.push(format!(
            "{} {:>10} {} {}",
            mode_string(&meta),
            meta.len(),
            modified,
            name
        ));
    }
    Ok(lines)
}

/// Validates the target and returns the canonical directory that becomes the new cwd.
pub fn change_dir(ctx: &ShellContext, raw: Option<&str>) -> Result<PathBuf> {
    let target = ctx.resolve(raw.unwrap_or("~"));
    if !target.exists() {
        return Err(ShellError::NotFound(target));
    }
    if !target.is_dir() {
        return Err(ShellError::NotADirectory(target));
    }
    fs::canonicalize(&target).map_err(|err| ShellError::io(&target, err))
}

pub fn read_file(ctx: &ShellContext, raw: &str) -> Result<String> {
    let path = ctx.resolve(raw);
    if !path.exists() {
        return Err(ShellError::NotFound(path));
    }
    if path.is_dir() {
        return Err(ShellError::IsADirectory(path));
    }
    fs::read_to_string(&path).map_err(|err| ShellError::io(&path, err))
}

/// Copies a file, or with `recursive` a whole directory tree. Returns the destination written.
pub fn copy_path(ctx: &ShellContext, src: &str, dst: &str, recursive: bool) -> Result<PathBuf> {
    let src_path = ctx.resolve(src);
    let dst_path = ctx.resolve(dst);
    if !src_path.exists() {
        return Err(ShellError::NotFound(src_path));
    }

    if recursive {
        if !src_path.is_dir() {
            return Err(ShellError::NotADirectory(src_path));
        }
        if dst_path.exists() {
            return Err(ShellError::AlreadyExists(dst_path));
        }
        if dst_path.starts_with(&src_path) {
            return Err(ShellError::collaborator(format!(
                "cannot copy {} into itself",
                src_path.display()
            )));
        }
        copy_tree(&src_path, &dst_path)?;
        return Ok(dst_path);
    }

    if src_path.is_dir() {
        return Err(ShellError::NeedsRecursive(src_path));
    }
    let target = into_dir_target(&src_path, dst_path);
    // fs::copy truncates the destination before reading the source
    if same_file(&src_path, &target) {
        return Err(ShellError::collaborator(format!(
            "{} and {} are the same file",
            src_path.display(),
            target.display()
        )));
    }
    fs::copy(&src_path, &target).map_err(|err| ShellError::io(&target, err))?;
    Ok(target)
}

/// True when both paths name the same filesystem entry, following symlinks.
pub fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Moves or renames `src`; an existing directory `dst` receives the source inside it.
pub fn move_path(ctx: &ShellContext, src: &str, dst: &str) -> Result<PathBuf> {
    let src_path = ctx.resolve(src);
    let dst_path = ctx.resolve(dst);
    if !src_path.exists() {
        return Err(ShellError::NotFound(src_path));
    }
    let target = into_dir_target(&src_path, dst_path);
    if src_path.is_dir() && target.starts_with(&src_path) {
        return Err(ShellError::collaborator(format!(
            "cannot move {} into itself",
            src_path.display()
        )));
    }
    relocate(&src_path, &target)?;
    Ok(target)
}

/// Renames `from` to `to`, copying and removing when they live on different filesystems.
pub fn relocate(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if CROSS_DEVICE.is_some() && err.raw_os_error() == CROSS_DEVICE => {
            if from.is_dir() {
                copy_tree(from, to)?;
                fs::remove_dir_all(from).map_err(|err| ShellError::io(from, err))
            } else {
                fs::copy(from, to).map_err(|err| ShellError::io(to, err))?;
                fs::remove_file(from).map_err(|err| ShellError::io(from, err))
            }
        }
        Err(err) => Err(ShellError::io(from, err)),
    }
}

pub fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(from).to_path_buf();
            match err.into_io_error() {
                Some(io_err) => ShellError::io(path, io_err),
                None => ShellError::collaborator(format!("filesystem loop at {}", path.display())),
            }
        })?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|err| ShellError::collaborator(err.to_string()))?;
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| ShellError::io(&target, err))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|err| ShellError::io(&target, err))?;
        }
    }
    Ok(())
}

fn into_dir_target(src: &Path, dst: PathBuf) -> PathBuf {
    match src.file_name() {
        Some(name) if dst.is_dir() => dst.join(name),
        _ => dst,
    }
}

#[cfg(unix)]
fn mode_string(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut out = String::with_capacity(10);
    out.push(if meta.is_dir() {
        'd'
    } else if meta.file_type().is_symlink() {
        'l'
    } else {
        '-'
    });
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn mode_string(meta: &Metadata) -> String {
    let kind = if meta.is_dir() { 'd' } else { '-' };
    let write = if meta.permissions().readonly() { '-' } else { 'w' };
    format!("{kind}r{write}-r{write}-r{write}-")
}
