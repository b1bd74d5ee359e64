//! Tools for watching the processor at work and for reporting what it found.

pub mod config;
mod consolewriter;
mod jsonwriter;
mod tracer;

pub use consolewriter::ConsoleWriter;
pub use jsonwriter::JsonWriter;
