use crate::compiler::diagnostics::{Diagnostic, Writer};

/// Writes diagnostics to the console, one per line, prefixed with the name of
/// the file they were raised in.
pub struct ConsoleWriter<'a> {
    file: &'a str,
}

impl<'a> ConsoleWriter<'a> {
    pub fn new(file: &'a str) -> ConsoleWriter<'a> {
        ConsoleWriter { file }
    }

    fn render(&self, diag: &Diagnostic) -> String {
        format!(
            "{}:{} {} {}: {}",
            self.file,
            diag.range,
            diag.code.severity(),
            diag.code,
            diag.message()
        )
    }
}

impl<'a> Writer for ConsoleWriter<'a> {
    fn write_diagnostic(&self, diag: &Diagnostic) {
        println!("{}", self.render(diag));
    }
}
