//! Run command - apply codemods to JavaScript and JSX sources

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use ciseau_atelier::{
    run_pipeline, source_type_for_path, Codemod, CodemodError, CodemodRegistry,
    PipelineOutput, TransformOptions,
};
use clap::Args;
use glob::glob;
use ignore::Walk;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use super::OutputFormat;
use crate::config::load_config;

/// File extensions the runner picks up
const EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx"];

#[derive(Args)]
pub struct RunArgs {
    /// Files, directories or glob patterns to transform
    #[arg(default_value = ".")]
    pub patterns: Vec<String>,

    /// Codemod to run; repeat to run several (default: all built-in codemods)
    #[arg(short = 'm', long = "codemod")]
    pub codemods: Vec<String>,

    /// Write transformed output back to the files
    #[arg(short, long)]
    pub write: bool,

    /// Check without writing (exit with error if files would change)
    #[arg(long)]
    pub check: bool,

    /// Config file path (default: ./ciseau.config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            patterns: vec![".".to_string()],
            codemods: Vec::new(),
            write: false,
            check: false,
            config: None,
            format: OutputFormat::Text,
        }
    }
}

/// Per-file failures
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to write file: {0}")]
    Write(std::io::Error),

    #[error(transparent)]
    Codemod(#[from] CodemodError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum FileStatus {
    Changed,
    Unchanged,
    Error,
}

/// Outcome of one file, as reported in JSON output
#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    applied: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    files: Vec<FileReport>,
    changed: usize,
    unchanged: usize,
    errored: usize,
    written: bool,
}

pub fn run(args: RunArgs) {
    let start = Instant::now();

    let config = match load_config(args.config.as_deref(), None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let names = if args.codemods.is_empty() {
        &config.codemods
    } else {
        &args.codemods
    };
    let registry = CodemodRegistry::builtin();
    let codemods = match registry.ordered(names) {
        Ok(codemods) => codemods,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let files = collect_files(&args.patterns);
    if files.is_empty() {
        eprintln!("No source files found matching patterns: {:?}", args.patterns);
        return;
    }

    let text = args.format == OutputFormat::Text;
    if text {
        eprintln!(
            "Running {} codemod(s) over {} file(s)",
            codemods.len(),
            files.len()
        );
    }

    let write = args.write && !args.check;
    let cwd = std::env::current_dir().unwrap_or_default();
    let files_changed = AtomicUsize::new(0);
    let files_unchanged = AtomicUsize::new(0);
    let files_errored = AtomicUsize::new(0);

    // Each file is parsed into its own allocator, so files share nothing
    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| {
            let display = path.display().to_string();
            match process_file(path, &cwd, &codemods, &config.transform, write) {
                Ok(output) if output.did_transform() => {
                    files_changed.fetch_add(1, Ordering::Relaxed);
                    if text {
                        let verb = if write { "Transformed" } else { "Would transform" };
                        eprintln!("{verb}: {display} ({})", output.applied.join(", "));
                    }
                    FileReport {
                        path: display,
                        status: FileStatus::Changed,
                        applied: output.applied,
                        error: None,
                    }
                }
                Ok(_) => {
                    files_unchanged.fetch_add(1, Ordering::Relaxed);
                    FileReport {
                        path: display,
                        status: FileStatus::Unchanged,
                        applied: Vec::new(),
                        error: None,
                    }
                }
                Err(err) => {
                    files_errored.fetch_add(1, Ordering::Relaxed);
                    if text {
                        eprintln!("Error transforming {display}: {err}");
                    }
                    FileReport {
                        path: display,
                        status: FileStatus::Error,
                        applied: Vec::new(),
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect();

    let changed = files_changed.load(Ordering::Relaxed);
    let unchanged = files_unchanged.load(Ordering::Relaxed);
    let errored = files_errored.load(Ordering::Relaxed);

    match args.format {
        OutputFormat::Json => {
            let report = RunReport {
                files: reports,
                changed,
                unchanged,
                errored,
                written: write,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("Error serializing report: {e}"),
            }
        }
        OutputFormat::Text => {
            eprintln!();
            if write {
                eprintln!("Transformed {} file(s)", files.len());
                if changed > 0 {
                    eprintln!("  {changed} file(s) rewritten");
                }
            } else if args.check {
                eprintln!("Checked {} file(s)", files.len());
                if changed > 0 {
                    eprintln!("  {changed} file(s) would change");
                }
            } else {
                eprintln!(
                    "Checked {} file(s) (use --write to apply changes)",
                    files.len()
                );
                if changed > 0 {
                    eprintln!("  {changed} file(s) would change");
                }
            }
            if unchanged > 0 {
                eprintln!("  {unchanged} file(s) unchanged");
            }
            if errored > 0 {
                eprintln!("  {errored} file(s) had errors");
            }
            eprintln!("  done in {:.2?}", start.elapsed());
        }
    }

    if errored > 0 || (args.check && changed > 0) {
        std::process::exit(1);
    }
}

/// Read, transform and optionally write back one file
fn process_file(
    path: &Path,
    base: &Path,
    codemods: &[&dyn Codemod],
    options: &TransformOptions,
    write: bool,
) -> Result<PipelineOutput, FileError> {
    let source = fs::read_to_string(path).map_err(FileError::Read)?;
    let relative = filter_path(path, base);
    let output = run_pipeline(
        codemods,
        &source,
        &relative,
        source_type_for_path(path),
        options,
    )?;

    if write && output.did_transform() {
        fs::write(path, &output.code).map_err(FileError::Write)?;
    }
    Ok(output)
}

/// The path codemod path filters see: relative to `base` when inside it
fn filter_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
        && !path
            .components()
            .any(|component| component.as_os_str() == "node_modules")
}

/// Expand patterns into a sorted, deduplicated file list.
///
/// Glob patterns go through `glob`; plain paths are walked with `ignore`, so
/// `.gitignore` is respected.
fn collect_files(patterns: &[String]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = patterns
        .iter()
        .flat_map(|pattern| {
            if pattern.contains(['*', '?', '[']) {
                glob(pattern)
                    .ok()
                    .into_iter()
                    .flatten()
                    .filter_map(Result::ok)
                    .filter(|path| is_source_file(path))
                    .collect::<Vec<_>>()
            } else {
                Walk::new(pattern)
                    .filter_map(Result::ok)
                    .map(|entry| entry.into_path())
                    .filter(|path| path.is_file() && is_source_file(path))
                    .collect::<Vec<_>>()
            }
        })
        .collect();

    files.sort();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_filters_extensions() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("src/App.jsx"), "").unwrap();
        fs::write(root.join("src/util.ts"), "").unwrap();
        fs::write(root.join("src/styles.css"), "").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();

        let files = collect_files(&[root.to_string_lossy().to_string()]);
        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["App.jsx", "util.ts"]);
    }

    #[test]
    fn test_collect_files_accepts_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("one.js");
        fs::write(&file, "").unwrap();
        let files = collect_files(&[file.to_string_lossy().to_string()]);
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_process_file_writes_changes() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("App.jsx");
        fs::write(&file, "function f(){ return this.props.x; }").unwrap();

        let registry = CodemodRegistry::builtin();
        let codemods = registry
            .ordered(&["props-to-destructuring".to_string()])
            .unwrap();
        let output = process_file(
            &file,
            dir.path(),
            &codemods,
            &TransformOptions::default(),
            true,
        )
        .unwrap();

        assert_eq!(output.applied, vec!["props-to-destructuring"]);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "function f(){ const { x } = this.props; return x; }"
        );
    }

    #[test]
    fn test_process_file_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.js");
        fs::write(&file, "function (").unwrap();

        let registry = CodemodRegistry::builtin();
        let codemods = registry.ordered(&[]).unwrap();
        let err = process_file(
            &file,
            dir.path(),
            &codemods,
            &TransformOptions::default(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, FileError::Codemod(CodemodError::Parse { .. })));
        assert_eq!(fs::read_to_string(&file).unwrap(), "function (");
    }

    #[test]
    fn test_filter_path_is_relative_to_base() {
        let base = Path::new("/work/app");
        assert_eq!(
            filter_path(Path::new("/work/app/src/components/Item.jsx"), base),
            "src/components/Item.jsx"
        );
        assert_eq!(
            filter_path(Path::new("/elsewhere/Item.jsx"), base),
            "/elsewhere/Item.jsx"
        );
        assert_eq!(filter_path(Path::new("src/Item.jsx"), base), "src/Item.jsx");
    }

    #[test]
    fn test_path_filters_match_absolute_input() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/legacy")).unwrap();
        let file = dir.path().join("src/legacy/App.jsx");
        let source = "function f(){ return this.props.x; }";
        fs::write(&file, source).unwrap();

        let mut options = TransformOptions::default();
        options.paths.insert(
            "props-to-destructuring".to_string(),
            vec!["src/legacy/*.jsx".to_string()],
        );
        let registry = CodemodRegistry::builtin();
        let codemods = registry
            .ordered(&["props-to-destructuring".to_string()])
            .unwrap();

        let output = process_file(&file, dir.path(), &codemods, &options, false).unwrap();
        assert_eq!(output.applied, vec!["props-to-destructuring"]);
        assert_eq!(fs::read_to_string(&file).unwrap(), source);
    }
}
