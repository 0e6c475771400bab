//! Codemod runner.
//!
//! Parses a source file, hands it to one or more codemods and applies the
//! returned edits. Each call owns its allocator; nothing outlives the call
//! except the output text.

use std::path::Path;

use ciseau_carton::{apply_edits, PrintOptions, TextEdit};
use glob::{MatchOptions, Pattern};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::codemod::{Codemod, CodemodContext, TransformOptions};
use crate::error::CodemodError;

/// Result of running one codemod over one file
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// The rewritten (or untouched) source
    pub code: String,
    /// The edits the codemod asked for
    pub edits: Vec<TextEdit>,
    /// Print options in effect for synthesized code
    pub print_options: PrintOptions,
    changed: bool,
}

impl TransformOutput {
    /// Whether the output text differs from the input
    #[inline]
    pub fn did_transform(&self) -> bool {
        self.changed
    }
}

/// Result of running a sequence of codemods over one file
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Final source text
    pub code: String,
    /// Codemods that changed the text, in run order
    pub applied: Vec<&'static str>,
    /// Codemods whose path filters rejected the file
    pub filtered: Vec<&'static str>,
    changed: bool,
}

impl PipelineOutput {
    /// Whether the final text differs from the input
    #[inline]
    pub fn did_transform(&self) -> bool {
        self.changed
    }
}

/// Parse `source` and run a single codemod over it.
///
/// Parse failures abort before the codemod runs; the caller keeps the
/// original text.
pub fn run_codemod(
    codemod: &dyn Codemod,
    source: &str,
    source_type: SourceType,
    options: &TransformOptions,
) -> Result<TransformOutput, CodemodError> {
    let allocator = Allocator::default();
    let program = parse(&allocator, source, source_type)?;

    let ctx = CodemodContext::new(source, &program, source_type, options);
    let edits = codemod.transform(&ctx);
    let code = apply_edits(source, &edits);
    let changed = code != source;

    tracing::debug!(
        codemod = codemod.meta().name,
        edits = edits.len(),
        changed,
        "codemod finished"
    );

    Ok(TransformOutput {
        code,
        edits,
        print_options: options.print_options.clone(),
        changed,
    })
}

/// Run `codemods` in order over one file, re-parsing between them.
///
/// Codemods whose path filters reject `path` are skipped. The first parse
/// failure aborts the whole pipeline.
pub fn run_pipeline(
    codemods: &[&dyn Codemod],
    source: &str,
    path: &str,
    source_type: SourceType,
    options: &TransformOptions,
) -> Result<PipelineOutput, CodemodError> {
    let mut code = source.to_string();
    let mut applied = Vec::new();
    let mut filtered = Vec::new();

    for codemod in codemods {
        let name = codemod.meta().name;
        if !path_matches(&options.paths_for(*codemod), path) {
            tracing::trace!(codemod = name, path, "path filter rejected file");
            filtered.push(name);
            continue;
        }

        let output = run_codemod(*codemod, &code, source_type, options)?;
        if output.did_transform() {
            applied.push(name);
            code = output.code;
        }
    }

    let changed = code != source;
    Ok(PipelineOutput {
        code,
        applied,
        filtered,
        changed,
    })
}

fn parse<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    source_type: SourceType,
) -> Result<Program<'a>, CodemodError> {
    let ret = Parser::new(allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let mut diagnostics: Vec<String> = ret.errors.iter().map(ToString::to_string).collect();
        if diagnostics.is_empty() {
            diagnostics.push("parser aborted".to_string());
        }
        return Err(CodemodError::Parse { diagnostics });
    }
    Ok(ret.program)
}

/// Source type for a file path.
///
/// JSX is enabled for every non-TypeScript extension; `.tsx` carries it
/// already.
pub fn source_type_for_path(path: &Path) -> SourceType {
    let source_type = SourceType::from_path(path).unwrap_or_default();
    if source_type.is_typescript() {
        source_type
    } else {
        source_type.with_jsx(true)
    }
}

/// Whether `path` passes a codemod's path filters.
///
/// An empty filter list matches everything. Each entry is either a glob
/// (`src/**/*.jsx`), a directory (`components/`, matched as a path segment
/// run) or a file path suffix (`App.js`, `src/App.js`).
pub fn path_matches<S: AsRef<str>>(patterns: &[S], path: &str) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let normalized = path.replace('\\', "/");
    let normalized = normalized.trim_start_matches("./");

    patterns.iter().any(|pattern| {
        let pattern = pattern.as_ref().trim_start_matches("./");
        if pattern.contains(['*', '?', '[']) {
            glob_matches(pattern, normalized)
        } else {
            literal_matches(pattern, normalized)
        }
    })
}

fn glob_matches(pattern: &str, path: &str) -> bool {
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };
    match Pattern::new(pattern) {
        Ok(glob) => glob.matches_with(path, options),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid path filter");
            false
        }
    }
}

fn literal_matches(pattern: &str, path: &str) -> bool {
    let rooted = format!("/{path}");
    match pattern.strip_suffix('/') {
        Some(dir) => rooted.contains(&format!("/{dir}/")),
        None => rooted.ends_with(&format!("/{pattern}")),
    }
}
