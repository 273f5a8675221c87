//! Error handling types based on `failure` crate.

pub type Result<T> = std::result::Result<T, failure::Error>;
pub use failure::{bail, ensure, err_msg, format_err, Error, ResultExt};
use itertools::Itertools;
use log::log;
use std::env;

/// Marker line of the backtrace frames that belong to `failure` itself.
const FAILURE_BACKTRACE_MARKER: &str = "failure::backtrace::Backtrace::new::";
/// Marker line of the first frame after `main`.
const LANG_START_MARKER: &str = "std::rt::lang_start::";

pub trait FancyUnwrap {
    type Output;
    fn fancy_unwrap(self) -> Self::Output;
}

/// Returns messages of `err` and all its causes, outermost first.
pub fn causes(err: &failure::Error) -> Vec<String> {
    err.iter_chain().map(|cause| cause.to_string()).collect()
}

/// Drops the frames of `failure` and of the runtime from `backtrace`.
fn short_backtrace(backtrace: &str) -> String {
    let mut lines = backtrace.split('\n').collect_vec();
    if let Some(position) = lines
        .iter()
        .position(|line| line.contains(LANG_START_MARKER))
    {
        lines.truncate(position);
    }
    if let Some(position) = lines
        .iter()
        .position(|line| line.contains(FAILURE_BACKTRACE_MARKER))
    {
        lines.drain(0..position + 2);
    }
    lines.join("\n")
}

/// Writes the cause chain of `err` (and a backtrace, if captured)
/// to the log with `log_level`.
pub fn print_trace(err: &failure::Error, log_level: log::Level) {
    log!(log_level, "");
    log!(log_level, "csbind failed:");
    for cause in causes(err) {
        log!(log_level, "   {}", cause);
    }
    let backtrace = err.backtrace().to_string();
    if backtrace.is_empty() {
        return;
    }
    if env::var("RUST_BACKTRACE").as_ref().map(|v| v.as_str()) == Ok("full") {
        log!(log_level, "{}", backtrace);
    } else {
        log!(log_level, "Short backtrace:");
        log!(log_level, "{}", short_backtrace(&backtrace));
    }
}

impl<T> FancyUnwrap for Result<T> {
    type Output = T;

    fn fancy_unwrap(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                print_trace(&err, log::Level::Error);
                std::process::exit(1);
            }
        }
    }
}
