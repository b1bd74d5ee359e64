#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::compiler::{
        diagnostics::{DiagCode, Diagnostic, Logger, Writer},
        source::Range,
    };

    #[test]
    fn test_write_diagnostic() {
        let mut logger = Logger::new();
        let writer = TestWriter::new();
        logger.add_writer(&writer);

        logger.enable();

        let diag = Diagnostic::with_args(
            DiagCode::SymbolRedefinition,
            vec!["A".into()],
            Range::on_line(2, 0, 1),
        );
        logger.write(&diag);
        assert_eq!("L3:1 E031: Symbol already defined: A;", *writer.buf.borrow());
        assert_eq!(logger.written(), 1);
    }

    #[test]
    fn test_disable() {
        let mut logger = Logger::new();
        let writer = TestWriter::new();
        logger.add_writer(&writer);

        logger.disable();
        logger.write(&Diagnostic::new(DiagCode::UnterminatedMacro, Range::zero()));
        assert_eq!("", *writer.buf.borrow());
        assert_eq!(logger.written(), 0);
    }

    #[test]
    fn test_enable() {
        let mut logger = Logger::new();
        let writer = TestWriter::new();
        logger.add_writer(&writer);

        // First disable the logger and test that writes are blocked
        logger.disable();
        logger.write(&Diagnostic::new(DiagCode::UnterminatedMacro, Range::zero()));
        assert_eq!("", *writer.buf.borrow());

        // Then enable the logger and confirm that writes are now happening
        logger.enable();
        logger.write(&Diagnostic::new(DiagCode::UnterminatedMacro, Range::zero()));
        assert_eq!(
            "L1:1 E046: Macro definition not terminated by MEND;",
            *writer.buf.borrow()
        );
    }

    #[test]
    fn codes_are_distinct() {
        use DiagCode::*;
        let all = [
            UndefinedSymbol,
            DuplicateSymbolicParameter,
            UnknownKeywordParameter,
            SymbolRedefinition,
            CircularDependency,
            MissingMacroName,
            InvalidPrototypeVariable,
            IllegalPrototypeLabel,
            DuplicateSequenceSymbol,
            UnterminatedMacro,
            InvalidPrototypeOperand,
            UndefinedOperationCode,
            EquWithoutLabel,
            InvalidStorageLength,
            InvalidExpression,
            OperandCount,
            RegisterOutOfRange,
            DisplacementOutOfRange,
            ImmediateOutOfRange,
            LengthOutOfRange,
            OperandKind,
        ];
        let mut codes: Vec<_> = all.iter().map(|c| c.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    /// Writer to be used for unit testing
    struct TestWriter {
        buf: RefCell<String>,
    }

    impl TestWriter {
        pub fn new() -> TestWriter {
            TestWriter {
                buf: RefCell::new(String::new()),
            }
        }
    }

    impl Writer for TestWriter {
        fn write_diagnostic(&self, diag: &Diagnostic) {
            self.buf.borrow_mut().push_str(&format!("{};", diag));
        }
    }
}
