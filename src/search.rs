use std::fs;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use walkdir::WalkDir;

use crate::context::ShellContext;
use crate::error::{Result, ShellError};

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub recursive: bool,
    pub ignore_case: bool,
}

/// Searches a file or directory for lines matching `pattern`.
///
/// Returns one `path: line: text` entry per hit. A file that cannot be read
/// contributes an `ERROR:` entry instead of aborting the search.
pub fn search_text(
    ctx: &ShellContext,
    pattern: &str,
    raw_path: &str,
    options: SearchOptions,
) -> Result<Vec<String>> {
    let root = ctx.resolve(raw_path);
    if !root.exists() {
        return Err(ShellError::NotFound(root));
    }
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(options.ignore_case)
        .build()
        .map_err(|err| ShellError::collaborator(format!("invalid pattern: {}", err)))?;

    let files = if root.is_file() {
        vec![root]
    } else if root.is_dir() {
        collect_files(&root, options.recursive)?
    } else {
        return Err(ShellError::collaborator(format!(
            "{} is neither a file nor a directory",
            root.display()
        )));
    };

    let mut results = Vec::new();
    for file in files {
        search_file(&regex, &file, &mut results);
    }
    Ok(results)
}

fn collect_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            match err.into_io_error() {
                Some(io_err) => ShellError::io(path, io_err),
                None => ShellError::collaborator(format!("filesystem loop at {}", path.display())),
            }
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn search_file(regex: &Regex, file: &Path, results: &mut Vec<String>) {
    match fs::read_to_string(file) {
        Ok(content) => {
            for (idx, line) in content.lines().enumerate() {
                if regex.is_match(line) {
                    results.push(format!("{}: {}: {}", file.display(), idx + 1, line.trim()));
                }
            }
        }
        Err(err) => {
            results.push(format!("ERROR: cannot read file {}: {}", file.display(), err));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, ShellContext) {
        let dir = tempfile::tempdir().unwrap();
        let cwd = fs::canonicalize(dir.path()).unwrap();
        let ctx = ShellContext::new(cwd.clone(), cwd.clone());
        (dir, ctx)
    }

    #[test]
    fn finds_lines_in_a_file() {
        let (_dir, ctx) = setup();
        fs::write(ctx.cwd.join("test.txt"), "Hello World\nbye\n  Hello again  ").unwrap();

        let hits = search_text(&ctx, "Hello", "test.txt", SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].ends_with("test.txt: 1: Hello World"));
        assert!(hits[1].ends_with("test.txt: 3: Hello again"));
    }

    #[test]
    fn ignore_case_and_recursion() {
        let (_dir, ctx) = setup();
        fs::create_dir_all(ctx.cwd.join("sub")).unwrap();
        fs::write(ctx.cwd.join("top.txt"), "UPPERCASE pattern").unwrap();
        fs::write(ctx.cwd.join("sub/deep.txt"), "pattern below").unwrap();

        let flat = search_text(&ctx, "pattern", ".", SearchOptions::default()).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = search_text(
            &ctx,
            "pattern",
            ".",
            SearchOptions { recursive: true, ignore_case: false },
        )
        .unwrap();
        assert_eq!(deep.len(), 2);

        let insensitive = search_text(
            &ctx,
            "uppercase",
            "top.txt",
            SearchOptions { recursive: false, ignore_case: true },
        )
        .unwrap();
        assert!(insensitive[0].contains("UPPERCASE"));
    }

    #[test]
    fn unreadable_file_becomes_an_error_line() {
        let (_dir, ctx) = setup();
        fs::write(ctx.cwd.join("bin.dat"), [0xff, 0xfe, 0x00]).unwrap();
        let hits = search_text(&ctx, "x", "bin.dat", SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].starts_with("ERROR:"));
    }

    #[test]
    fn reports_missing_path_and_bad_pattern() {
        let (_dir, ctx) = setup();
        assert!(matches!(
            search_text(&ctx, "x", "missing", SearchOptions::default()),
            Err(ShellError::NotFound(_))
        ));
        fs::write(ctx.cwd.join("a"), "").unwrap();
        assert!(matches!(
            search_text(&ctx, "(", "a", SearchOptions::default()),
            Err(ShellError::Collaborator(_))
        ));
    }
}
