use std::{
    cell::RefCell,
    io::{BufWriter, Write},
};

use log::error;

use crate::compiler::diagnostics::{Diagnostic, Writer};

/// Writes diagnostics as JSON, one object per line.
pub struct JsonWriter<W: Write> {
    /// Output target for the JSON Writer
    writer: RefCell<BufWriter<W>>,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(file: W) -> JsonWriter<W> {
        JsonWriter {
            writer: RefCell::new(BufWriter::new(file)),
        }
    }

    /// Flushes what has been written and returns the underlying target
    pub fn into_inner(self) -> Result<W, String> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| format!("{}", e))
    }
}

impl<W: Write> Writer for JsonWriter<W> {
    fn write_diagnostic(&self, diag: &Diagnostic) {
        let mut w = self.writer.borrow_mut();
        let result = serde_json::to_writer(&mut *w, diag)
            .map_err(|e| format!("{}", e))
            .and_then(|_| w.write_all(b"\n").map_err(|e| format!("{}", e)));
        if let Err(e) = result {
            error!("Failed to write diagnostic {}: {}", diag.code, e);
        }
    }

    fn finish(&self) {
        if let Err(e) = self.writer.borrow_mut().flush() {
            error!("Failed to flush JSON diagnostics: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{diagnostics::DiagCode, source::Range};

    #[test]
    fn one_object_per_line() {
        let writer = JsonWriter::new(vec![]);
        writer.write_diagnostic(&Diagnostic::new(DiagCode::EquWithoutLabel, Range::zero()));
        writer.write_diagnostic(&Diagnostic::with_args(
            DiagCode::UndefinedOperationCode,
            vec!["FOO".into()],
            Range::on_line(1, 0, 3),
        ));
        writer.finish();

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["args"][0], "FOO");
        assert_eq!(second["range"]["start"]["line"], 1);
    }
}
