//! Native target compilation.
//!
//! One [`Compile::compile`] call per target per build pass, producing exactly
//! one [`CompilationResult`]. The default implementation shells out to
//! `wasm-pack build`; the trait seam exists so the build graph can be driven
//! by a stub in tests.

use crate::diagnostics::{self, Diagnostic};
use crate::error::{BuildError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tandem_config::{BuildMode, TargetDescriptor};
use tokio::process::Command;

/// Outcome of one compilation attempt.
///
/// Created once per attempt and never mutated; a retry produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationResult {
    /// Id of the compiled target (or pass, e.g. `ui`)
    pub target_id: String,
    /// Whether the invocation produced a usable artifact
    pub success: bool,
    /// Files emitted into the output directory, absolute paths
    pub emitted_files: Vec<PathBuf>,
    /// Messages captured from the invocation, in emission order
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationResult {
    /// A successful result with the given emitted files.
    pub fn success(target_id: impl Into<String>, emitted_files: Vec<PathBuf>) -> Self {
        Self {
            target_id: target_id.into(),
            success: true,
            emitted_files,
            diagnostics: vec![],
        }
    }

    /// A failed result carrying diagnostics.
    pub fn failure(target_id: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            target_id: target_id.into(),
            success: false,
            emitted_files: vec![],
            diagnostics,
        }
    }
}

/// Seam between the build graph and the native compiler.
#[async_trait]
pub trait Compile: Send + Sync {
    /// Compile one target in the given mode.
    ///
    /// Compilation failure is captured in the result, never as an `Err`; the
    /// only error case is an unusable toolchain, which is fatal for the whole
    /// process.
    async fn compile(
        &self,
        descriptor: &TargetDescriptor,
        mode: BuildMode,
    ) -> Result<CompilationResult>;
}

/// `wasm-pack`-backed compiler.
///
/// Each target is built into `<out_dir>/<id>/`, so the package directory
/// doubles as the manifest bundle layout. `Module` targets use
/// `--target web` (importable via dynamic import), `Global` targets use
/// `--target no-modules` (binds to a global symbol for script-tag or
/// `importScripts` loading); the loader shim wasm-pack emits alongside the
/// wasm preserves that contract verbatim.
pub struct WasmPackCompiler {
    /// Root output directory for all target packages
    out_dir: PathBuf,
    /// Compiler binary, `wasm-pack` unless overridden for tests
    program: String,
}

impl WasmPackCompiler {
    /// Create a compiler writing packages under `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            program: "wasm-pack".to_string(),
        }
    }

    /// Override the compiler binary (integration tests use a shell stub).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Package directory for a target.
    pub fn package_dir(&self, target_id: &str) -> PathBuf {
        self.out_dir.join(target_id)
    }

    fn build_args(&self, descriptor: &TargetDescriptor, mode: BuildMode) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            descriptor.source_dir.display().to_string(),
            "--target".to_string(),
            descriptor.format.wasm_pack_target().to_string(),
            "--out-dir".to_string(),
            self.package_dir(&descriptor.id).display().to_string(),
        ];
        match mode {
            BuildMode::Development => args.push("--dev".to_string()),
            BuildMode::Production => args.push("--release".to_string()),
        }
        args.extend(descriptor.extra_flags.iter().cloned());
        args
    }
}

#[async_trait]
impl Compile for WasmPackCompiler {
    async fn compile(
        &self,
        descriptor: &TargetDescriptor,
        mode: BuildMode,
    ) -> Result<CompilationResult> {
        let args = self.build_args(descriptor, mode);
        tracing::debug!(target_id = %descriptor.id, ?args, "invoking {}", self.program);

        let output = match Command::new(&self.program).args(&args).output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BuildError::ToolchainMissing {
                    command: self.program.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut diags = diagnostics::parse_stderr(&descriptor.id, &stderr);

        if !output.status.success() {
            if diags.is_empty() {
                diags.push(Diagnostic::error(
                    &descriptor.id,
                    format!("{} exited with {}", self.program, output.status),
                ));
            }
            tracing::warn!(target_id = %descriptor.id, "compilation failed");
            return Ok(CompilationResult::failure(&descriptor.id, diags));
        }

        let emitted = collect_emitted_files(&self.package_dir(&descriptor.id))?;
        tracing::info!(
            target_id = %descriptor.id,
            files = emitted.len(),
            "compiled {} target",
            descriptor.format.as_str()
        );

        Ok(CompilationResult {
            target_id: descriptor.id.clone(),
            success: true,
            emitted_files: emitted,
            diagnostics: diags,
        })
    }
}

/// Enumerate the files a compilation emitted, sorted for determinism.
pub(crate) fn collect_emitted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_config::OutputFormat;

    fn descriptor(id: &str, format: OutputFormat) -> TargetDescriptor {
        TargetDescriptor {
            id: id.to_string(),
            source_dir: PathBuf::from("/project/client/bin").join(id),
            format,
            extra_flags: vec!["--no-typescript".to_string()],
            watch_paths: vec![],
        }
    }

    #[test]
    fn test_build_args_module_development() {
        let compiler = WasmPackCompiler::new("/project/dist");
        let args = compiler.build_args(&descriptor("app", OutputFormat::Module), BuildMode::Development);
        assert_eq!(
            args,
            vec![
                "build",
                "/project/client/bin/app",
                "--target",
                "web",
                "--out-dir",
                "/project/dist/app",
                "--dev",
                "--no-typescript",
            ]
        );
    }

    #[test]
    fn test_build_args_global_production() {
        let compiler = WasmPackCompiler::new("/project/dist");
        let args =
            compiler.build_args(&descriptor("worker", OutputFormat::Global), BuildMode::Production);
        assert!(args.contains(&"no-modules".to_string()));
        assert!(args.contains(&"--release".to_string()));
        assert!(!args.contains(&"--dev".to_string()));
    }

    #[test]
    fn test_extra_flags_appended_last_in_order() {
        let compiler = WasmPackCompiler::new("/dist");
        let mut desc = descriptor("app", OutputFormat::Module);
        desc.extra_flags = vec!["--a".into(), "--b".into()];
        let args = compiler.build_args(&desc, BuildMode::Production);
        let len = args.len();
        assert_eq!(&args[len - 2..], &["--a".to_string(), "--b".to_string()]);
    }

    #[test]
    fn test_collect_emitted_files_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.js"), "b").unwrap();
        std::fs::write(tmp.path().join("a.wasm"), "a").unwrap();
        std::fs::create_dir(tmp.path().join("snippets")).unwrap();
        std::fs::write(tmp.path().join("snippets/c.js"), "c").unwrap();

        let files = collect_emitted_files(tmp.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_missing_toolchain_is_fatal() {
        let compiler =
            WasmPackCompiler::new("/tmp/out").with_program("tandem-test-no-such-binary");
        let err = compiler
            .compile(&descriptor("app", OutputFormat::Module), BuildMode::Development)
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::ToolchainMissing { .. }));
    }

    #[tokio::test]
    async fn test_failed_compile_is_data_not_error() {
        // `false` exits non-zero without output; failure must come back as a
        // CompilationResult, not an Err.
        let compiler = WasmPackCompiler::new("/tmp/out").with_program("false");
        let result = compiler
            .compile(&descriptor("app", OutputFormat::Module), BuildMode::Development)
            .await
            .unwrap();
        assert!(!result.success);
        assert!(!result.diagnostics.is_empty());
    }
}
