//! Library side of the `entityset` command-line tool.

pub mod logging;
pub mod pipeline;
pub mod spec_file;
