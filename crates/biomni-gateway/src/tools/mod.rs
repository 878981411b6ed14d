// Bundled tool handlers

mod support;

pub use support::{support_handlers, ReadFunctionSourceCode, RunPythonRepl};
