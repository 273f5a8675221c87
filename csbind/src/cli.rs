//! Command line interface of the generator.

use crate::c_parser;
use crate::config::{load_config_file, GeneratorOptions};
use crate::cs_generator::Generator;
use crate::lib_configs;
use clap::Parser;
use csbind_common::errors::{bail, Result, ResultExt};
use csbind_common::file_utils::{canonicalize, current_exe_dir};
use csbind_common::target::current_target;
use flexi_logger::{Logger, LoggerHandle};
use log::{error, info};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the directory all targets are generated into.
pub const GENERATED_DIR_NAME: &str = "Generated";

#[derive(Debug, Parser)]
/// Generates C# interop bindings from C headers of native libraries.
pub struct Options {
    /// Output directory. Relative paths are resolved against the directory
    /// of the executable. "Generated" is appended unless it's already the last component.
    pub output_dir: Option<PathBuf>,
}

/// Starts logging to stderr. The filter is taken from `RUST_LOG`,
/// `info` by default. Logging stops when the returned handle is dropped.
pub fn init_logger() -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str("info")
        .with_context(|_| "invalid log specification")?
        .start()
        .with_context(|_| "logger initialization failed")?;
    Ok(handle)
}

/// Returns the root directory for generated files.
pub fn output_root(output_dir: Option<&Path>, exe_dir: &Path) -> PathBuf {
    let path = match output_dir {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => exe_dir.join(dir),
        None => exe_dir.to_path_buf(),
    };
    if path.file_name().map_or(false, |name| name == GENERATED_DIR_NAME) {
        path
    } else {
        path.join(GENERATED_DIR_NAME)
    }
}

/// Returns the absolute directory relative header paths are resolved against:
/// `headers_dir` if it's set, the "headers" dir next to the executable otherwise.
pub fn resolve_headers_dir(headers_dir: Option<&Path>, exe_dir: &Path) -> Result<PathBuf> {
    let path = match headers_dir {
        Some(dir) => dir.to_path_buf(),
        None => exe_dir.join("headers"),
    };
    Ok(canonicalize(&path).with_context(|_| "headers directory is not available")?)
}

/// Returns options of all targets: from the file named by `CSBIND_CONFIG`
/// if it's set, built-in presets otherwise.
fn load_targets() -> Result<Vec<GeneratorOptions>> {
    match env::var_os("CSBIND_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            info!("Loading targets from {}", path.display());
            load_config_file(&path)
        }
        None => Ok(lib_configs::all_targets()),
    }
}

/// Parses headers of one target and writes its bindings.
/// Returns the number of written files.
pub fn generate_target(
    mut options: GeneratorOptions,
    headers_dir: &Path,
    output_root: &Path,
) -> Result<usize> {
    options.resolve_paths(headers_dir);
    options.validate()?;
    let parse_result = c_parser::parse(&options)?;
    if parse_result.has_errors() {
        for diagnostic in parse_result.errors() {
            error!("{}", diagnostic);
        }
        bail!("failed to parse headers of {}", options.name());
    }
    let output_dir = if options.output_path().as_os_str().is_empty() {
        output_root.join(options.name())
    } else {
        output_root.join(options.output_path())
    };
    let generator = Generator::new(&options, &parse_result.header)?;
    generator.generate(&output_dir)
}

pub fn run(options: Options) -> Result<()> {
    let exe_dir = current_exe_dir()?;
    let output_root = output_root(options.output_dir.as_deref(), &exe_dir);
    let headers_dir = env::var_os("CSBIND_HEADERS_DIR").map(PathBuf::from);
    let headers_dir = resolve_headers_dir(headers_dir.as_deref(), &exe_dir)?;
    let target = current_target();
    match target.runtime_identifier() {
        Some(rid) => info!("Current target: {} ({})", target.short_text(), rid),
        None => info!("Current target: {}", target.short_text()),
    }
    info!("Headers: {}", headers_dir.display());
    info!("Output: {}", output_root.display());

    let mut written = 0;
    for target in load_targets()? {
        let name = target.name().to_string();
        written += generate_target(target, &headers_dir, &output_root)
            .with_context(|_| format!("failed to generate bindings for {}", name))?;
    }
    info!("csbind finished: {} file(s) written", written);
    Ok(())
}

pub fn run_from_args() -> Result<()> {
    run(Options::parse())
}
