//! Plan execution: walking the source tree and emitting assets.
//!
//! A resolved [`BuildPlan`] says which rule owns each file and how its
//! output should be named. This module carries the plan out: entry points
//! are written through the output filename template, asset rules either
//! inline small files as data URIs or write them under content-addressed
//! names, and rules without an output block hand their files to the
//! processor chain (counted, not written here).

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use packline_config::{BuildPlan, OutputTemplate, UnmatchedPolicy};
use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// An asset written to the output directory.
#[derive(Debug, Clone)]
pub struct EmittedAsset {
    /// Source file, relative to the project root.
    pub source: PathBuf,
    /// Destination file, relative to the output directory.
    pub path: PathBuf,
}

/// An asset inlined as a data URI instead of being written to disk.
#[derive(Debug, Clone)]
pub struct InlinedAsset {
    pub source: PathBuf,
    pub data_uri: String,
}

/// Outcome of executing a build plan.
#[derive(Debug, Default)]
pub struct EmitReport {
    pub emitted: Vec<EmittedAsset>,
    pub inlined: Vec<InlinedAsset>,
    /// Files claimed by a rule with no output block. Their processor
    /// chains fold them into the bundle rather than standalone files.
    pub delegated: usize,
    /// Files no rule claimed, under the warn policy.
    pub skipped: Vec<PathBuf>,
    /// Per-file errors collected when not failing fast.
    pub failures: Vec<BuildError>,
}

impl EmitReport {
    pub fn total_processed(&self) -> usize {
        self.emitted.len() + self.inlined.len() + self.delegated
    }
}

/// Execute a resolved plan against the project rooted at `root`.
///
/// With `fail_fast` set, the first per-file error aborts the run. Without
/// it (watch mode), errors are collected in the report so one broken file
/// does not stop the rebuild loop.
pub fn execute_plan(plan: &BuildPlan, root: &Path, fail_fast: bool) -> Result<EmitReport> {
    let out_dir = root.join(&plan.output.dir);
    let mut report = EmitReport::default();

    for entry in &plan.entries {
        let entry_path = root.join(entry);
        if !entry_path.is_file() {
            return Err(BuildError::AssetNotFound(entry_path).into());
        }
        emit_entry(plan, root, &out_dir, entry, &mut report)?;
    }

    let src_root = root.join(&plan.src_dir);
    if !src_root.is_dir() {
        tracing::debug!(dir = %src_root.display(), "source directory missing, nothing to walk");
        return Ok(report);
    }

    for dirent in WalkDir::new(&src_root).into_iter().filter_map(|e| e.ok()) {
        if !dirent.file_type().is_file() {
            continue;
        }
        let path = dirent.path();
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();

        // Entry points were already emitted through the filename template.
        if plan.entries.iter().any(|e| *e == relative) {
            continue;
        }

        match process_file(plan, root, &out_dir, &relative, &mut report) {
            Ok(()) => {}
            Err(crate::error::CliError::Build(err)) if !fail_fast => {
                tracing::warn!(file = %relative.display(), error = %err, "asset failed");
                report.failures.push(err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}

fn emit_entry(
    plan: &BuildPlan,
    root: &Path,
    out_dir: &Path,
    entry: &Path,
    report: &mut EmitReport,
) -> Result<()> {
    let bytes = read_asset(root, entry, "emit")?;
    let name = file_stem(entry);
    let ext = file_ext(entry);

    // Validated at resolve time, so a parse failure here is a config bug.
    let template = OutputTemplate::parse(&plan.output.filename)?;
    let rendered = template.render(&name, &ext, &bytes);

    write_asset(out_dir, Path::new(&rendered), &bytes)?;
    report.emitted.push(EmittedAsset {
        source: entry.to_path_buf(),
        path: PathBuf::from(rendered),
    });
    Ok(())
}

fn process_file(
    plan: &BuildPlan,
    root: &Path,
    out_dir: &Path,
    relative: &Path,
    report: &mut EmitReport,
) -> Result<()> {
    let rule = match plan.rule_for(relative)? {
        Some(rule) => rule,
        None => {
            return match plan.unmatched {
                UnmatchedPolicy::Warn => {
                    tracing::warn!(file = %relative.display(), "no rule matched, skipping");
                    report.skipped.push(relative.to_path_buf());
                    Ok(())
                }
                UnmatchedPolicy::Error => {
                    Err(BuildError::Unmatched(relative.to_path_buf()).into())
                }
            };
        }
    };

    let output = match &rule.output {
        Some(output) => output,
        None => {
            tracing::debug!(
                file = %relative.display(),
                rule = %rule.display_name(),
                "delegated to processor chain"
            );
            report.delegated += 1;
            return Ok(());
        }
    };

    let step = rule
        .steps
        .first()
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "emit".to_string());
    let bytes = read_asset(root, relative, &step)?;
    let ext = file_ext(relative);

    // The inline threshold is checked against the actual byte length at
    // execution time, never against cached metadata.
    if let Some(limit) = output.inline_limit {
        if bytes.len() as u64 <= limit {
            let data_uri = format!(
                "data:{};base64,{}",
                content_type_for(&ext),
                BASE64.encode(&bytes)
            );
            report.inlined.push(InlinedAsset {
                source: relative.to_path_buf(),
                data_uri,
            });
            return Ok(());
        }
    }

    let template = OutputTemplate::parse(&output.name)?;
    let rendered = template.render(&file_stem(relative), &ext, &bytes);
    let dest = match &output.dir {
        Some(dir) => dir.join(&rendered),
        None => PathBuf::from(&rendered),
    };

    write_asset(out_dir, &dest, &bytes)?;
    report.emitted.push(EmittedAsset {
        source: relative.to_path_buf(),
        path: dest,
    });
    Ok(())
}

fn read_asset(root: &Path, relative: &Path, step: &str) -> Result<Vec<u8>> {
    let full = root.join(relative);
    if !full.exists() {
        return Err(BuildError::AssetNotFound(full).into());
    }
    fs::read(&full).map_err(|e| {
        BuildError::TransformFailure {
            file: relative.to_path_buf(),
            step: step.to_string(),
            error: e.to_string(),
        }
        .into()
    })
}

fn write_asset(out_dir: &Path, dest: &Path, bytes: &[u8]) -> Result<()> {
    let full = out_dir.join(dest);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent)
            .map_err(|_| BuildError::OutputNotWritable(parent.to_path_buf()))?;
    }
    fs::write(&full, bytes).map_err(|e| {
        BuildError::AssetWriteFailed {
            path: full.clone(),
            error: e.to_string(),
        }
        .into()
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string())
}

fn file_ext(path: &Path) -> String {
    path.extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// MIME type for a data URI, keyed by file extension.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "json" => "application/json",
        "css" => "text/css",
        "js" => "text/javascript",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
