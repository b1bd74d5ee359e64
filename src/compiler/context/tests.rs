#[cfg(test)]
mod tests {
    use crate::compiler::{
        context::*,
        diagnostics::DiagCode,
        expressions::{MachExpr, MachOp},
        processing::OpCode,
        semantics::{ConcatPoint, InstructionField, Label, ResolvedStatement},
        source::{Location, Range},
        stringtable::StringId,
        StringTable,
    };

    fn sym(id: StringId) -> MachExpr {
        MachExpr::Symbol(id, Range::zero())
    }

    fn num(i: i32) -> MachExpr {
        MachExpr::Constant(i, Range::zero())
    }

    fn postponed(line: u32) -> PostponedStatement {
        PostponedStatement::new(
            ResolvedStatement {
                label: Label::Empty,
                instruction: InstructionField::Empty(Range::zero()),
                opcode: OpCode::default(),
                operands: vec![],
                range: Range::on_line(line, 0, 1),
            },
            vec![],
        )
    }

    #[test]
    fn create_and_redefine() {
        let table = StringTable::new();
        let a = table.insert("A");
        let mut ctx = OrdinalContext::new();

        assert!(!ctx.symbol_defined(a));
        ctx.create_symbol(a, SymbolValue::Absolute(5), SymbolAttributes::equ(None), Location::default())
            .unwrap();
        assert!(ctx.symbol_defined(a));
        assert_eq!(ctx.get_symbol(a).unwrap().value, SymbolValue::Absolute(5));

        let err = ctx
            .create_symbol(a, SymbolValue::Absolute(6), SymbolAttributes::equ(None), Location::default())
            .unwrap_err();
        assert_eq!(err, OrdinalError::Redefinition(a));
        assert_eq!(ctx.get_symbol(a).unwrap().value, SymbolValue::Absolute(5));
    }

    #[test]
    fn reserve_and_align() {
        let mut ctx = OrdinalContext::new();
        assert_eq!(ctx.reserve_storage_area(1, NO_ALIGN), Address::new(0));
        assert_eq!(ctx.reserve_storage_area(4, FULLWORD), Address::new(4));
        assert_eq!(ctx.loctr(), Address::new(8));
        assert_eq!(ctx.align(DOUBLEWORD), Address::new(8));
        ctx.reserve_storage_area(2, HALFWORD);
        assert_eq!(ctx.align(DOUBLEWORD), Address::new(16));
    }

    #[test]
    fn replay_in_registration_order() {
        let table = StringTable::new();
        let x = table.insert("X");
        let mut ctx = OrdinalContext::new();

        ctx.add_dependency(
            Range::on_line(0, 0, 1),
            None,
            vec![Dependable::Expr(sym(x))],
            Some(postponed(0)),
        );
        ctx.add_dependency(
            Range::on_line(1, 0, 1),
            None,
            vec![Dependable::Expr(sym(x))],
            Some(postponed(1)),
        );
        assert!(ctx.take_ready().is_empty());

        ctx.create_symbol(x, SymbolValue::Absolute(1), SymbolAttributes::equ(None), Location::default())
            .unwrap();
        let ready = ctx.take_ready();
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0].statement.range.start.line, 0);
        assert_eq!(ready[1].statement.range.start.line, 1);

        // Nothing is replayed twice
        assert!(ctx.take_ready().is_empty());
        assert!(!ctx.has_pending());
    }

    #[test]
    fn equ_chain_resolves() {
        let table = StringTable::new();
        let (a, b, c) = (table.insert("A"), table.insert("B"), table.insert("C"));
        let mut ctx = OrdinalContext::new();

        // A EQU B+1 ; B EQU C*2 ; C EQU 3
        ctx.create_symbol(a, SymbolValue::Undefined, SymbolAttributes::equ(None), Location::default())
            .unwrap();
        ctx.add_dependency(
            Range::zero(),
            Some(a),
            vec![Dependable::Expr(MachExpr::Binary(
                MachOp::Add,
                Box::new(sym(b)),
                Box::new(num(1)),
                Range::zero(),
            ))],
            None,
        );
        ctx.create_symbol(b, SymbolValue::Undefined, SymbolAttributes::equ(None), Location::default())
            .unwrap();
        ctx.add_dependency(
            Range::zero(),
            Some(b),
            vec![Dependable::Expr(MachExpr::Binary(
                MachOp::Mul,
                Box::new(sym(c)),
                Box::new(num(2)),
                Range::zero(),
            ))],
            None,
        );
        ctx.create_symbol(c, SymbolValue::Absolute(3), SymbolAttributes::equ(None), Location::default())
            .unwrap();

        assert_eq!(ctx.get_symbol(b).unwrap().value, SymbolValue::Absolute(6));
        assert_eq!(ctx.get_symbol(a).unwrap().value, SymbolValue::Absolute(7));
        assert!(!ctx.has_pending());
    }

    #[test]
    fn cycle_rejected_at_registration() {
        let table = StringTable::new();
        let (a, b) = (table.insert("A"), table.insert("B"));
        let mut ctx = OrdinalContext::new();

        ctx.create_symbol(a, SymbolValue::Undefined, SymbolAttributes::equ(None), Location::default())
            .unwrap();
        ctx.add_dependency(Range::on_line(0, 0, 1), Some(a), vec![Dependable::Expr(sym(b))], None);
        ctx.create_symbol(b, SymbolValue::Undefined, SymbolAttributes::equ(None), Location::default())
            .unwrap();
        ctx.add_dependency(Range::on_line(1, 0, 1), Some(b), vec![Dependable::Expr(sym(a))], None);

        let diags = ctx.take_diags(&table);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagCode::CircularDependency);
        assert_eq!(diags[0].args, vec!["B".to_string()]);

        // The surviving half of the cycle is abandoned at the end
        ctx.finish();
        let diags = ctx.take_diags(&table);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagCode::CircularDependency);
        assert_eq!(diags[0].range, Range::on_line(0, 0, 1));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let table = StringTable::new();
        let a = table.insert("A");
        let mut ctx = OrdinalContext::new();

        ctx.create_symbol(a, SymbolValue::Undefined, SymbolAttributes::equ(None), Location::default())
            .unwrap();
        ctx.add_dependency(
            Range::zero(),
            Some(a),
            vec![Dependable::Expr(MachExpr::Binary(
                MachOp::Add,
                Box::new(sym(a)),
                Box::new(num(1)),
                Range::zero(),
            ))],
            None,
        );

        let diags = ctx.take_diags(&table);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagCode::CircularDependency);
        assert!(!ctx.has_pending());
    }

    #[test]
    fn finish_reports_undefined_symbols() {
        let table = StringTable::new();
        let x = table.insert("X");
        let mut ctx = OrdinalContext::new();

        ctx.add_dependency(
            Range::on_line(4, 0, 1),
            None,
            vec![Dependable::Expr(sym(x))],
            Some(postponed(4)),
        );
        ctx.finish();

        let diags = ctx.take_diags(&table);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagCode::UndefinedSymbol);
        assert_eq!(diags[0].args, vec!["X".to_string()]);
        assert!(ctx.take_ready().is_empty());
    }

    #[test]
    fn finish_traces_undefined_symbols_through_spaces() {
        let table = StringTable::new();
        let (len, after) = (table.insert("LEN"), table.insert("AFTER"));
        let mut ctx = OrdinalContext::new();

        ctx.reserve_deferred_storage_area(sym(len), NO_ALIGN, Range::on_line(0, 0, 1));
        let addr = ctx.align(HALFWORD);
        ctx.create_symbol(
            after,
            SymbolValue::Relocatable(addr.clone()),
            SymbolAttributes::machine(2),
            Location::default(),
        )
        .unwrap();
        ctx.add_dependency(
            Range::on_line(1, 0, 1),
            Some(after),
            vec![Dependable::Address(addr)],
            None,
        );
        ctx.add_dependency(
            Range::on_line(2, 0, 1),
            None,
            vec![Dependable::Expr(sym(after))],
            Some(postponed(2)),
        );
        ctx.finish();

        // LEN is never defined: nothing here is a cycle
        let diags = ctx.take_diags(&table);
        assert_eq!(diags.len(), 3);
        for (line, diag) in diags.iter().enumerate() {
            assert_eq!(diag.code, DiagCode::UndefinedSymbol);
            assert_eq!(diag.args, vec!["LEN".to_string()]);
            assert_eq!(diag.range.start.line, line as u32);
        }
        assert!(ctx.take_ready().is_empty());
        assert!(!ctx.has_pending());
    }

    #[test]
    fn deferred_storage_resolves_later_labels() {
        let table = StringTable::new();
        let (len, after) = (table.insert("LEN"), table.insert("AFTER"));
        let mut ctx = OrdinalContext::new();

        ctx.reserve_storage_area(2, NO_ALIGN);
        ctx.reserve_deferred_storage_area(sym(len), NO_ALIGN, Range::zero());

        // AFTER is behind a space until LEN is known
        let addr = ctx.align(FULLWORD);
        assert!(addr.has_spaces());
        ctx.create_symbol(
            after,
            SymbolValue::Relocatable(addr.clone()),
            SymbolAttributes::machine(4),
            Location::default(),
        )
        .unwrap();
        ctx.add_dependency(Range::zero(), Some(after), vec![Dependable::Address(addr)], None);

        ctx.create_symbol(len, SymbolValue::Absolute(3), SymbolAttributes::equ(None), Location::default())
            .unwrap();

        // 2 + 3 bytes, aligned to a fullword
        assert_eq!(
            ctx.get_symbol(after).unwrap().value,
            SymbolValue::Relocatable(Address::new(8))
        );
        assert!(!ctx.has_pending());
        assert!(ctx.take_diags(&table).is_empty());
    }

    #[test]
    fn relocatable_difference() {
        let table = StringTable::new();
        let (a, b) = (table.insert("A"), table.insert("B"));
        let mut ctx = OrdinalContext::new();

        ctx.create_symbol(a, SymbolValue::Relocatable(Address::new(4)), SymbolAttributes::machine(4), Location::default())
            .unwrap();
        ctx.create_symbol(b, SymbolValue::Relocatable(Address::new(16)), SymbolAttributes::machine(4), Location::default())
            .unwrap();

        let diff = MachExpr::Binary(MachOp::Sub, Box::new(sym(b)), Box::new(sym(a)), Range::zero());
        assert_eq!(diff.evaluate(&ctx), Ok(SymbolValue::Absolute(12)));

        let prod = MachExpr::Binary(MachOp::Mul, Box::new(sym(b)), Box::new(num(2)), Range::zero());
        assert!(prod.evaluate(&ctx).is_err());
    }

    #[test]
    fn macro_data_from_chain() {
        let table = StringTable::new();

        let single = vec![ConcatPoint::Str("1".into())];
        assert_eq!(
            MacroData::from_chain(&single, &table).unwrap(),
            MacroData::Single("1".into())
        );
        assert_eq!(
            MacroData::from_chain(&[], &table).unwrap(),
            MacroData::Single("".into())
        );

        let nested = vec![ConcatPoint::Sublist(vec![
            vec![ConcatPoint::Str("A".into())],
            vec![ConcatPoint::Sublist(vec![
                vec![ConcatPoint::Str("B".into())],
                vec![ConcatPoint::Str("C".into())],
            ])],
        ])];
        let data = MacroData::from_chain(&nested, &table).unwrap();
        assert_eq!(
            data,
            MacroData::Composite(vec![
                MacroData::Single("A".into()),
                MacroData::Composite(vec![
                    MacroData::Single("B".into()),
                    MacroData::Single("C".into())
                ]),
            ])
        );
        assert_eq!(data.get_value(), "(A,(B,C))");
        assert_eq!(data.number(), 2);
        assert_eq!(data.get_ith(2).and_then(|d| d.get_ith(1)), Some(&MacroData::Single("B".into())));
        assert_eq!(data.get_ith(3), None);

        // A sublist followed by more text is plain text
        let mixed = vec![
            ConcatPoint::Sublist(vec![vec![ConcatPoint::Str("A".into())]]),
            ConcatPoint::Str("B".into()),
        ];
        assert_eq!(
            MacroData::from_chain(&mixed, &table).unwrap(),
            MacroData::Single("(A)B".into())
        );
    }

    #[test]
    fn macro_call_binding() {
        let table = StringTable::new();
        let (mac, lbl, p1, key, p2) = (
            table.insert("MAC"),
            table.insert("LBL"),
            table.insert("P1"),
            table.insert("KEY"),
            table.insert("P2"),
        );
        let other = table.insert("OTHER");

        let result = MacroDefinitionResult {
            prototype: MacroPrototype {
                macro_name: Some(mac),
                name_param: Some(lbl),
                symbolic_params: vec![
                    MacroParam::positional(p1),
                    MacroParam::keyword(key, MacroData::Single("DEF".into())),
                    MacroParam::placeholder(),
                    MacroParam::positional(p2),
                ],
            },
            ..Default::default()
        };
        let mut registry = MacroRegistry::new();
        assert_eq!(registry.add(result), Some(mac));
        let def = registry.get(mac).unwrap();

        let (call, diags) = def.call(
            MacroData::Single("HERE".into()),
            vec![(MacroArg::Positional(MacroData::Single("X".into())), Range::zero())],
            &table,
        );
        assert!(diags.is_empty());
        assert_eq!(call.param(lbl), Some(&MacroData::Single("HERE".into())));
        assert_eq!(call.param(p1), Some(&MacroData::Single("X".into())));
        assert_eq!(call.param(key), Some(&MacroData::Single("DEF".into())));
        assert_eq!(call.param(p2), Some(&MacroData::Dummy));
        assert_eq!(call.syslist.len(), 2);

        let (call, diags) = def.call(
            MacroData::Dummy,
            vec![
                (MacroArg::Keyword(key, MacroData::Single("NEW".into())), Range::zero()),
                (MacroArg::Positional(MacroData::Single("X".into())), Range::zero()),
                (MacroArg::Positional(MacroData::Dummy), Range::zero()),
                (MacroArg::Positional(MacroData::Single("Y".into())), Range::zero()),
                (MacroArg::Keyword(other, MacroData::Single("1".into())), Range::on_line(0, 9, 16)),
            ],
            &table,
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagCode::UnknownKeywordParameter);
        assert_eq!(call.param(key), Some(&MacroData::Single("NEW".into())));
        assert_eq!(call.param(p2), Some(&MacroData::Single("Y".into())));
        assert_eq!(call.syslist[4], MacroData::Single("OTHER=1".into()));
    }
}
