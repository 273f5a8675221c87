//! Generator of C# bindings for the supported native libraries.

use csbind::cli;
use csbind_common::errors::FancyUnwrap;

pub fn main() {
    let _logger = cli::init_logger().fancy_unwrap();
    cli::run_from_args().fancy_unwrap();
}
