pub mod cli;
pub mod compiler;
pub mod diagnostics;
pub mod io;

pub use cli::*;
pub use compiler::{StringId, StringTable};
pub use io::{read_statements, SourceStatement};
