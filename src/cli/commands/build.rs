//! `olive build`: rewrite every file of a source tree into its output tree.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::cli::args::BuildCommand;
use crate::cli::exit_status::ExitStatus;
use crate::cli::report;
use crate::config::load_config;
use crate::hosts::{Transformer, host_for_path};

/// Probed in order when no directory is given; the first that exists wins.
pub const DEFAULT_SOURCE_DIRS: [&str; 4] = ["olive_src", "_src", "src_olive", "src_"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirMapping {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// Comments were merged into attributes.
    Transformed { merged: usize, unresolved: usize },
    /// Handled by a host but nothing to merge.
    Unchanged { unresolved: usize },
    /// No host for this file; copied verbatim.
    Copied,
    /// No host for this file and copying is disabled.
    Skipped,
    /// Transform failed; the original was copied instead.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Path relative to the source directory.
    pub path: PathBuf,
    pub action: FileAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub mapping: DirMapping,
    pub files: Vec<FileOutcome>,
    pub dry_run: bool,
}

impl BuildSummary {
    fn count(&self, pred: impl Fn(&FileAction) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.action)).count()
    }

    pub fn transformed(&self) -> usize {
        self.count(|a| matches!(a, FileAction::Transformed { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|a| matches!(a, FileAction::Unchanged { .. }))
    }

    pub fn copied(&self) -> usize {
        self.count(|a| matches!(a, FileAction::Copied))
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, FileAction::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|a| matches!(a, FileAction::Failed(_)))
    }

    /// Comments left in place because no element could be found for them.
    pub fn unresolved(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.action {
                FileAction::Transformed { unresolved, .. } | FileAction::Unchanged { unresolved } => {
                    unresolved
                }
                _ => 0,
            })
            .sum()
    }
}

pub fn build(cmd: BuildCommand) -> Result<ExitStatus> {
    let root = env::current_dir().context("Failed to read the working directory")?;
    let config = load_config(&root)?.config;
    let options = BuildOptions {
        transformer: Transformer::new(config.transform_options()),
        ignores: config.ignore_patterns()?,
        copy_unsupported: config.copy_unsupported,
        dry_run: cmd.dry_run,
    };

    let mut status = ExitStatus::Success;
    for mapping in resolve_mappings(&cmd, &root)? {
        let summary = build_dir(&root, mapping, &options)?;
        report::print_build(&summary, cmd.verbose);
        if summary.failed() > 0 {
            status = ExitStatus::Failure;
        }
    }
    Ok(status)
}

/// `olive_X`/`_X` → `X`, `X_olive`/`X_` → `X`, next to the source.
pub fn output_dir_for(source: &Path) -> Option<PathBuf> {
    let name = source.file_name()?.to_str()?;
    let stripped = name
        .strip_prefix("olive_")
        .or_else(|| name.strip_prefix('_'))
        .or_else(|| name.strip_suffix("_olive"))
        .or_else(|| name.strip_suffix('_'))?;
    if stripped.is_empty() {
        return None;
    }
    Some(source.with_file_name(stripped))
}

/// Pair every source directory with its output directory.
///
/// Paths stay as the user wrote them; `root` only anchors existence checks.
pub fn resolve_mappings(cmd: &BuildCommand, root: &Path) -> Result<Vec<DirMapping>> {
    let dirs = if cmd.dirs.is_empty() {
        let Some(found) = DEFAULT_SOURCE_DIRS.iter().find(|d| root.join(d).is_dir()) else {
            bail!(
                "No source directory found (looked for {})",
                DEFAULT_SOURCE_DIRS.join(", ")
            );
        };
        vec![PathBuf::from(found)]
    } else {
        cmd.dirs.clone()
    };

    if cmd.out_dir.is_some() && dirs.len() != 1 {
        bail!("--out-dir needs exactly one source directory");
    }

    dirs.into_iter()
        .map(|source| {
            if !root.join(&source).is_dir() {
                bail!("Source directory {} does not exist", source.display());
            }
            let Some(output) = cmd.out_dir.clone().or_else(|| output_dir_for(&source)) else {
                bail!(
                    "Cannot derive an output directory from {} (name it olive_X, _X, X_olive or X_, or pass --out-dir)",
                    source.display()
                );
            };
            if root.join(&output).starts_with(root.join(&source)) {
                bail!(
                    "Output directory {} must be outside the source directory {}",
                    output.display(),
                    source.display()
                );
            }
            Ok(DirMapping { source, output })
        })
        .collect()
}

struct BuildOptions {
    transformer: Transformer,
    ignores: Vec<Pattern>,
    copy_unsupported: bool,
    dry_run: bool,
}

fn collect_files(source: &Path, ignores: &[Pattern]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        if ignores.iter().any(|p| p.matches_path(rel)) {
            debug!(path = %rel.display(), "ignored");
            continue;
        }
        files.push(rel.to_path_buf());
    }
    Ok(files)
}

fn build_dir(root: &Path, mapping: DirMapping, options: &BuildOptions) -> Result<BuildSummary> {
    let source = root.join(&mapping.source);
    let output = root.join(&mapping.output);
    debug!(source = %mapping.source.display(), output = %mapping.output.display(), "building");

    let files = collect_files(&source, &options.ignores)?;
    let mut outcomes = files
        .par_iter()
        .map(|rel| -> Result<FileOutcome> {
            let action = build_file(&mapping.source.join(rel), &source.join(rel), &output.join(rel), options)?;
            Ok(FileOutcome {
                path: rel.clone(),
                action,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(BuildSummary {
        mapping,
        files: outcomes,
        dry_run: options.dry_run,
    })
}

fn write_output(target: &Path, content: &[u8], dry_run: bool) -> Result<()> {
    if dry_run {
        return Ok(());
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(target, content).with_context(|| format!("Failed to write file: {}", target.display()))
}

/// `label` is the path shown to the user, `input`/`target` are the real paths.
fn build_file(label: &Path, input: &Path, target: &Path, options: &BuildOptions) -> Result<FileAction> {
    if host_for_path(input).is_none() {
        if !options.copy_unsupported {
            return Ok(FileAction::Skipped);
        }
        let bytes = fs::read(input).with_context(|| format!("Failed to read file: {}", input.display()))?;
        write_output(target, &bytes, options.dry_run)?;
        return Ok(FileAction::Copied);
    }

    let bytes = fs::read(input).with_context(|| format!("Failed to read file: {}", input.display()))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            write_output(target, err.as_bytes(), options.dry_run)?;
            return Ok(FileAction::Failed(format!("{}: not valid UTF-8", label.display())));
        }
    };

    let label = label.to_string_lossy();
    match options.transformer.transform_with_report(&text, &label) {
        Ok(transformed) => {
            write_output(target, transformed.code.as_bytes(), options.dry_run)?;
            let unresolved = transformed.report.unresolved;
            Ok(if transformed.code == text {
                FileAction::Unchanged { unresolved }
            } else {
                FileAction::Transformed {
                    merged: transformed.report.merged,
                    unresolved,
                }
            })
        }
        Err(err) => {
            write_output(target, text.as_bytes(), options.dry_run)?;
            Ok(FileAction::Failed(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn command(dirs: &[&str], out_dir: Option<&str>) -> BuildCommand {
        BuildCommand {
            dirs: dirs.iter().map(PathBuf::from).collect(),
            out_dir: out_dir.map(PathBuf::from),
            dry_run: false,
            verbose: false,
        }
    }

    fn options(dry_run: bool) -> BuildOptions {
        BuildOptions {
            transformer: Transformer::default(),
            ignores: vec![Pattern::new("drafts/**").unwrap()],
            copy_unsupported: true,
            dry_run,
        }
    }

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_output_dir_naming_convention() {
        let out = |s: &str| output_dir_for(Path::new(s)).map(|p| p.display().to_string());
        assert_eq!(out("olive_src"), Some("src".into()));
        assert_eq!(out("_site"), Some("site".into()));
        assert_eq!(out("web/pages_olive"), Some("web/pages".into()));
        assert_eq!(out("pages_"), Some("pages".into()));
        assert_eq!(out("src"), None);
        assert_eq!(out("_"), None);
    }

    #[test]
    fn test_default_source_dir_is_probed() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("src_")).unwrap();
        fs::create_dir_all(root.path().join("_src")).unwrap();
        let mappings = resolve_mappings(&command(&[], None), root.path()).unwrap();
        assert_eq!(
            mappings,
            vec![DirMapping {
                source: "_src".into(),
                output: "src".into(),
            }]
        );
    }

    #[test]
    fn test_mapping_errors() {
        let root = tempdir().unwrap();
        for dir in ["olive_a", "olive_b", "plain"] {
            fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        let err = |cmd: BuildCommand| resolve_mappings(&cmd, root.path()).unwrap_err().to_string();

        assert!(err(command(&[], None)).contains("No source directory found"));
        assert!(err(command(&["olive_a", "olive_b"], Some("out"))).contains("exactly one"));
        assert!(err(command(&["missing_"], None)).contains("does not exist"));
        assert!(err(command(&["plain"], None)).contains("Cannot derive"));
        assert!(err(command(&["olive_a"], Some("olive_a"))).contains("outside the source"));
        assert!(err(command(&["olive_a"], Some("olive_a/dist"))).contains("outside the source"));

        let ok = resolve_mappings(&command(&["plain"], Some("dist")), root.path()).unwrap();
        assert_eq!(ok[0].output, PathBuf::from("dist"));
    }

    #[test]
    fn test_build_dir_writes_every_kind_of_file() {
        let root = tempdir().unwrap();
        write(root.path(), "olive_src/index.html", "<p></p><!-- lead -->");
        write(root.path(), "olive_src/about/team.html", "<p></p>");
        write(root.path(), "olive_src/app.css", "p { margin: 0 }");
        write(root.path(), "olive_src/broken.html", "<p>\n<!-- open");
        write(root.path(), "olive_src/drafts/wip.html", "<p></p><!-- wip -->");

        let mapping = DirMapping {
            source: "olive_src".into(),
            output: "src".into(),
        };
        let summary = build_dir(root.path(), mapping, &options(false)).unwrap();

        let out = root.path().join("src");
        assert_eq!(fs::read_to_string(out.join("index.html")).unwrap(), r#"<p class="lead"></p>"#);
        assert_eq!(fs::read_to_string(out.join("about/team.html")).unwrap(), "<p></p>");
        assert_eq!(fs::read_to_string(out.join("app.css")).unwrap(), "p { margin: 0 }");
        assert_eq!(fs::read_to_string(out.join("broken.html")).unwrap(), "<p>\n<!-- open");
        assert!(!out.join("drafts").exists());

        assert_eq!(summary.files.len(), 4);
        assert_eq!(summary.transformed(), 1);
        assert_eq!(summary.unchanged(), 1);
        assert_eq!(summary.copied(), 1);
        assert_eq!(summary.failed(), 1);
        let FileAction::Failed(message) = &summary.files[2].action else {
            panic!("expected broken.html to fail, got {:?}", summary.files[2]);
        };
        assert!(message.starts_with("olive_src/broken.html:2:1"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let root = tempdir().unwrap();
        write(root.path(), "_site/index.html", "<p></p><!-- lead -->");
        let mapping = DirMapping {
            source: "_site".into(),
            output: "site".into(),
        };
        let summary = build_dir(root.path(), mapping, &options(true)).unwrap();
        assert_eq!(summary.transformed(), 1);
        assert!(!root.path().join("site").exists());
    }

    #[test]
    fn test_unsupported_files_can_be_skipped() {
        let root = tempdir().unwrap();
        write(root.path(), "_site/app.css", "p {}");
        let mapping = DirMapping {
            source: "_site".into(),
            output: "site".into(),
        };
        let options = BuildOptions {
            copy_unsupported: false,
            ..options(false)
        };
        let summary = build_dir(root.path(), mapping, &options).unwrap();
        assert_eq!(summary.skipped(), 1);
        assert!(!root.path().join("site/app.css").exists());
    }
}
