#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::compiler::{
        context::*,
        diagnostics::{DiagCode, Diagnostic},
        processing::*,
        semantics::{DeferredStatement, Statement},
        source::Range,
        stringtable::StringId,
        StringTable,
    };

    fn statement(ids: &StringTable, line: u32, label: &str, instr: &str, operands: &str) -> Statement {
        let label_end = label.len() as u32;
        let instr_start = label_end + 1;
        let instr_end = instr_start + instr.len() as u32;
        let op_start = instr_end + 1;
        let op_end = op_start + operands.len() as u32;
        Statement::Deferred(DeferredStatement {
            label: parse_label(label, Range::on_line(line, 0, label_end), ids),
            instruction: parse_instruction(instr, Range::on_line(line, instr_start, instr_end), ids),
            opcode: OpCode::default(),
            operand_field: operands.into(),
            operand_range: Range::on_line(line, op_start, op_end),
            range: Range::on_line(line, 0, op_end),
        })
    }

    fn run(lines: &[(&str, &str, &str)]) -> ProcessingManager {
        let mut mgr = ProcessingManager::new("OPENCODE", Rc::new(SimpleFieldReparser));
        for (idx, (label, instr, operands)) in lines.iter().enumerate() {
            let s = statement(mgr.context().ids(), idx as u32, label, instr, operands);
            mgr.process(s);
        }
        mgr.finish();
        mgr
    }

    fn codes(diags: &[Diagnostic]) -> Vec<DiagCode> {
        diags.iter().map(|d| d.code).collect()
    }

    fn id(mgr: &ProcessingManager, name: &str) -> StringId {
        mgr.context().id(name)
    }

    #[derive(Default)]
    struct Recorder {
        starts: usize,
        results: Vec<MacroDefinitionResult>,
        calls: Vec<MacroInvocation>,
    }

    impl ProcessingStateListener for Recorder {
        fn start_macro_definition(&mut self, _: MacrodefStartData) {
            self.starts += 1;
        }

        fn finish_macro_definition(&mut self, result: MacroDefinitionResult) {
            self.results.push(result);
        }

        fn macro_called(&mut self, invocation: MacroInvocation) {
            self.calls.push(invocation);
        }
    }

    #[test]
    fn prototype_parameters() {
        let mgr = run(&[
            ("", "MACRO", ""),
            ("&NAME", "MAC", "&A,&B=1,,&B"),
            ("", "LR", "1,2"),
            ("", "MEND", ""),
        ]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::DuplicateSymbolicParameter]);

        let def = mgr.context().macros.get(id(&mgr, "MAC")).unwrap();
        assert_eq!(def.prototype.name_param, Some(id(&mgr, "NAME")));
        assert_eq!(
            def.prototype.symbolic_params,
            vec![
                MacroParam::positional(id(&mgr, "A")),
                MacroParam::keyword(id(&mgr, "B"), MacroData::Single("1".into())),
                MacroParam::placeholder(),
                MacroParam::placeholder(),
            ]
        );
        assert_eq!(def.body.len(), 1);
    }

    #[test]
    fn prototype_keyword_duplicate() {
        let mgr = run(&[
            ("", "MACRO", ""),
            ("", "KW", "&A=1,&A=2,&B=(X,(Y,Z))"),
            ("", "MEND", ""),
        ]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::DuplicateSymbolicParameter]);

        let def = mgr.context().macros.get(id(&mgr, "KW")).unwrap();
        let single = |s: &str| MacroData::Single(s.into());
        assert_eq!(
            def.prototype.symbolic_params,
            vec![
                MacroParam::keyword(id(&mgr, "A"), single("1")),
                MacroParam::placeholder(),
                MacroParam::keyword(
                    id(&mgr, "B"),
                    MacroData::Composite(vec![
                        single("X"),
                        MacroData::Composite(vec![single("Y"), single("Z")]),
                    ])
                ),
            ]
        );
        assert!(def.prototype.symbolic_params[1].is_placeholder());
        assert!(!def.prototype.symbolic_params[0].is_placeholder());
    }

    #[test]
    fn prototype_errors_leave_placeholders() {
        let mgr = run(&[
            ("", "MACRO", ""),
            ("LBL", "BAD", "&A(1),X,&C"),
            ("", "MEND", ""),
        ]);

        assert_eq!(
            codes(mgr.diags()),
            vec![
                DiagCode::IllegalPrototypeLabel,
                DiagCode::InvalidPrototypeVariable,
                DiagCode::InvalidPrototypeOperand,
            ]
        );
        let def = mgr.context().macros.get(id(&mgr, "BAD")).unwrap();
        assert_eq!(def.prototype.name_param, None);
        assert_eq!(
            def.prototype.symbolic_params,
            vec![
                MacroParam::placeholder(),
                MacroParam::placeholder(),
                MacroParam::positional(id(&mgr, "C")),
            ]
        );
    }

    #[test]
    fn prototype_without_name() {
        let mgr = run(&[("", "MACRO", ""), ("", "", "&A"), ("", "MEND", "")]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::MissingMacroName]);
        assert!(mgr.context().macros.contains(id(&mgr, "ASPACE")));
    }

    #[test]
    fn nested_definition_depths() {
        let mut ctx = HlasmContext::new("OPENCODE");
        let mut recorder = Recorder::default();
        let mut proc = MacrodefProcessor::new(
            MacrodefStartData {
                location: ctx.current_location(),
            },
            Rc::new(SimpleFieldReparser),
        );

        let lines = [
            ("OUTER", 1, false),
            ("MACRO", 2, false),
            ("INNER", 2, false),
            ("MEND", 1, false),
            ("MEND", 0, true),
        ];
        for (line, (instr, depth, finished)) in lines.iter().enumerate() {
            let mut s = statement(ctx.ids(), line as u32 + 1, "", instr, "");
            let (_, opcode) = proc.get_processing_status(s.instruction(), &ctx);
            s.set_opcode(opcode);
            proc.process_statement(s, &mut ctx, &mut recorder);
            assert_eq!(proc.nest_depth(), *depth, "{}", line);
            assert_eq!(proc.finished(), *finished, "{}", line);
        }

        proc.end_processing(&mut ctx, &mut recorder);
        proc.end_processing(&mut ctx, &mut recorder);
        assert_eq!(recorder.results.len(), 1);
        assert_eq!(recorder.starts, 0);
        assert!(recorder.calls.is_empty());
        assert!(proc.collect_diags().is_empty());

        // The inner MACRO, its prototype and its MEND
        let result = &recorder.results[0];
        assert_eq!(result.definition.len(), 3);
        assert_eq!(result.prototype.macro_name, Some(ctx.id("OUTER")));
    }

    #[test]
    fn body_statements_are_classified() {
        let mut ctx = HlasmContext::new("OPENCODE");
        let mut proc = MacrodefProcessor::new(
            MacrodefStartData {
                location: ctx.current_location(),
            },
            Rc::new(SimpleFieldReparser),
        );

        let s = statement(ctx.ids(), 0, "", "M", "");
        let (format, opcode) = proc.get_processing_status(s.instruction(), &ctx);
        assert_eq!(format.form, ProcessingForm::Mac);
        assert_eq!(opcode.ty, InstructionType::Mac);

        let mut recorder = Recorder::default();
        proc.process_statement(s, &mut ctx, &mut recorder);

        let anop = parse_instruction("ANOP", Range::zero(), ctx.ids());
        let (format, opcode) = proc.get_processing_status(&anop, &ctx);
        assert_eq!(format.form, ProcessingForm::Ca);
        assert_eq!(format.occurrence, OperandOccurrence::Absent);
        assert_eq!(opcode.ty, InstructionType::Ca);

        let seta = parse_instruction("SETA", Range::zero(), ctx.ids());
        let (format, _) = proc.get_processing_status(&seta, &ctx);
        assert_eq!(format.occurrence, OperandOccurrence::Present);

        let lr = parse_instruction("LR", Range::zero(), ctx.ids());
        let (format, opcode) = proc.get_processing_status(&lr, &ctx);
        assert_eq!(format.kind, ProcessingKind::Macro);
        assert_eq!(format.form, ProcessingForm::Deferred);
        assert_eq!(opcode, OpCode::default());
    }

    #[test]
    fn unterminated_definition() {
        let mgr = run(&[("", "MACRO", ""), ("", "M1", ""), ("", "LR", "1,2")]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::UnterminatedMacro]);
        assert_eq!(mgr.diags()[0].args, vec!["M1".to_string()]);
        let def = mgr.context().macros.get(id(&mgr, "M1")).unwrap();
        assert_eq!(def.body.len(), 1);
        assert_eq!(mgr.depth(), 0);
    }

    #[test]
    fn duplicate_sequence_symbol() {
        let mgr = run(&[
            ("", "MACRO", ""),
            ("", "M2", ""),
            (".A", "ANOP", ""),
            (".A", "ANOP", ""),
            (".B", "ANOP", ""),
            ("", "MEND", ""),
        ]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::DuplicateSequenceSymbol]);
        assert_eq!(mgr.diags()[0].range.start.line, 3);

        let def = mgr.context().macros.get(id(&mgr, "M2")).unwrap();
        assert_eq!(def.sequence_symbol(id(&mgr, "A")).unwrap().offset, 0);
        assert_eq!(def.sequence_symbol(id(&mgr, "B")).unwrap().offset, 2);
        assert_eq!(def.body.len(), 3);
    }

    #[test]
    fn macro_call() {
        let mgr = run(&[
            ("", "MACRO", ""),
            ("&NAME", "MAC", "&A,&B=1,&C"),
            ("", "MEND", ""),
            ("LBL", "MAC", "X,B=(1,2),Y,Z"),
            ("", "MAC", "Q=5"),
        ]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::UnknownKeywordParameter]);

        let calls = mgr.state().invocations();
        assert_eq!(calls.len(), 2);

        let first = &calls[0];
        assert_eq!(first.param(id(&mgr, "NAME")), Some(&MacroData::Single("LBL".into())));
        assert_eq!(first.param(id(&mgr, "A")), Some(&MacroData::Single("X".into())));
        assert_eq!(first.param(id(&mgr, "C")), Some(&MacroData::Single("Y".into())));
        assert_eq!(
            first.param(id(&mgr, "B")),
            Some(&MacroData::Composite(vec![
                MacroData::Single("1".into()),
                MacroData::Single("2".into())
            ]))
        );
        assert_eq!(first.syslist.len(), 4);
        assert_eq!(first.syslist[3], MacroData::Single("Z".into()));

        let second = &calls[1];
        assert_eq!(second.param(id(&mgr, "NAME")), Some(&MacroData::Dummy));
        assert_eq!(second.param(id(&mgr, "A")), Some(&MacroData::Single("Q=5".into())));
        assert_eq!(second.param(id(&mgr, "B")), Some(&MacroData::Single("1".into())));
        assert_eq!(second.param(id(&mgr, "C")), Some(&MacroData::Dummy));
    }

    #[test]
    fn machine_labels() {
        let mgr = run(&[
            ("FIRST", "LR", "1,2"),
            ("SECOND", "L", "1,FIRST"),
            ("FIRST", "LR", "1,2"),
        ]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::SymbolRedefinition]);
        assert_eq!(mgr.diags()[0].args, vec!["FIRST".to_string()]);

        let ord = &mgr.context().ord_ctx;
        let second = ord.get_symbol(id(&mgr, "SECOND")).unwrap();
        assert_eq!(second.value, SymbolValue::Relocatable(Address::new(2)));
        assert_eq!(second.attributes.length, Some(4));
        assert_eq!(second.attributes.ty, 'I');
        assert_eq!(ord.loctr(), Address::new(8));
    }

    #[test]
    fn operand_checks() {
        let mgr = run(&[
            ("", "LR", "1,16"),
            ("", "LR", "1"),
            ("", "MVC", "0(257,1),0(1)"),
            ("", "L", "1,4096"),
            ("", "BR", "14"),
        ]);

        assert_eq!(
            codes(mgr.diags()),
            vec![
                DiagCode::RegisterOutOfRange,
                DiagCode::OperandCount,
                DiagCode::LengthOutOfRange,
                DiagCode::DisplacementOutOfRange,
            ]
        );
    }

    #[test]
    fn postponed_statements_replay_in_order() {
        let mgr = run(&[("", "LR", "X,1"), ("", "LR", "X,2"), ("X", "EQU", "16")]);

        let diags = mgr.diags();
        assert_eq!(
            codes(diags),
            vec![DiagCode::RegisterOutOfRange, DiagCode::RegisterOutOfRange]
        );
        assert_eq!(diags[0].range.start.line, 0);
        assert_eq!(diags[1].range.start.line, 1);
    }

    #[test]
    fn equ_chain_releases_statement() {
        let mgr = run(&[
            ("", "LR", "A,B"),
            ("A", "EQU", "B+1"),
            ("B", "EQU", "2"),
        ]);

        assert!(mgr.diags().is_empty(), "{:?}", mgr.diags());
        let ord = &mgr.context().ord_ctx;
        assert_eq!(ord.get_symbol(id(&mgr, "A")).unwrap().value, SymbolValue::Absolute(3));
        assert!(!ord.has_pending());
    }

    #[test]
    fn equ_errors() {
        let mgr = run(&[
            ("", "EQU", "1"),
            ("A", "EQU", "B"),
            ("B", "EQU", "A"),
            ("C", "EQU", "UNDEF"),
        ]);

        let codes = codes(mgr.diags());
        assert_eq!(codes[0], DiagCode::EquWithoutLabel);
        assert!(codes.contains(&DiagCode::CircularDependency));
        assert_eq!(
            codes.iter().filter(|c| **c == DiagCode::UndefinedSymbol).count(),
            1
        );
    }

    #[test]
    fn storage_with_forward_length() {
        let mgr = run(&[
            ("BUF", "DS", "LEN"),
            ("AFTER", "LR", "1,2"),
            ("LEN", "EQU", "6"),
        ]);

        assert!(mgr.diags().is_empty(), "{:?}", mgr.diags());
        let ord = &mgr.context().ord_ctx;
        match &ord.get_symbol(id(&mgr, "AFTER")).unwrap().value {
            SymbolValue::Relocatable(addr) => assert_eq!(ord.normalize(addr), Address::new(6)),
            other => panic!("Expected an address, got {:?}", other),
        }
        assert_eq!(
            ord.get_symbol(id(&mgr, "BUF")).unwrap().value,
            SymbolValue::Relocatable(Address::new(0))
        );
    }

    #[test]
    fn undefined_length_is_not_a_cycle() {
        let mgr = run(&[
            ("BUF", "DS", "LEN"),
            ("AFTER", "LR", "1,2"),
            ("", "L", "1,AFTER"),
        ]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::UndefinedSymbol; 3]);
        for diag in mgr.diags() {
            assert_eq!(diag.args, vec!["LEN".to_string()]);
        }
    }

    #[test]
    fn alignment_only_for_new_labels() {
        let mgr = run(&[
            ("A", "EQU", "5"),
            ("", "DS", "1"),
            ("A", "LR", "1,2"),
        ]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::SymbolRedefinition]);
        assert_eq!(mgr.context().ord_ctx.loctr(), Address::new(3));

        let mgr = run(&[("", "DS", "1"), ("", "LR", "1,2"), ("B", "LR", "1,2")]);
        assert!(mgr.diags().is_empty(), "{:?}", mgr.diags());
        let ord = &mgr.context().ord_ctx;
        assert_eq!(
            ord.get_symbol(id(&mgr, "B")).unwrap().value,
            SymbolValue::Relocatable(Address::new(4))
        );
        assert_eq!(ord.loctr(), Address::new(6));
    }

    #[test]
    fn undefined_operation_code() {
        let mgr = run(&[("", "FOO", "1")]);

        assert_eq!(codes(mgr.diags()), vec![DiagCode::UndefinedOperationCode]);
        assert_eq!(mgr.diags()[0].args, vec!["FOO".to_string()]);
    }

    #[test]
    fn deferred_statement_is_reparsed() {
        let table = StringTable::new();
        let s = statement(&table, 0, "", "LR", "1,2");
        let (resolved, diags) =
            resolve_statement(&SimpleFieldReparser, s, ProcessingForm::Mach, &table);

        assert!(diags.is_empty());
        assert_eq!(resolved.operands.len(), 2);
        assert!(resolved.operands.iter().all(|op| op.access_expr().is_some()));
    }
}
