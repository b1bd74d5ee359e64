#[cfg(test)]
mod tests {
    use crate::compiler::{
        expressions::{CaExpr, MachExpr},
        semantics::*,
        source::Range,
        StringTable,
    };

    #[test]
    fn basic_variable() {
        let table = StringTable::new();
        let name = table.insert("PARM");
        let var = VariableSymbol::basic(name, vec![], Range::on_line(0, 0, 5));

        assert!(!var.is_created());
        assert_eq!(var.access_basic(), Some(name));
        assert_eq!(var.access_created(), None);
        assert!(var.subscript().is_empty());
        assert_eq!(var.range(), Range::on_line(0, 0, 5));
    }

    #[test]
    fn created_variable() {
        let table = StringTable::new();
        let inner = VariableSymbol::basic(table.insert("X"), vec![], Range::zero());
        let chain = vec![ConcatPoint::Str("P".into()), ConcatPoint::Var(inner)];
        let var = VariableSymbol::created(
            chain.clone(),
            vec![CaExpr::Constant(1, Range::zero())],
            Range::zero(),
        );

        assert!(var.is_created());
        assert_eq!(var.access_basic(), None);
        assert_eq!(var.access_created(), Some(&chain));
        assert_eq!(var.subscript().len(), 1);
    }

    #[test]
    fn clear_removes_empty_text() {
        let table = StringTable::new();
        let var = VariableSymbol::basic(table.insert("A"), vec![], Range::zero());
        let mut chain = vec![
            ConcatPoint::Str("".into()),
            ConcatPoint::Var(var.clone()),
            ConcatPoint::Str("".into()),
            ConcatPoint::Sublist(vec![vec![ConcatPoint::Str("".into()), ConcatPoint::Str("X".into())]]),
        ];
        clear_concat_chain(&mut chain);

        assert_eq!(
            chain,
            vec![
                ConcatPoint::Var(var),
                ConcatPoint::Sublist(vec![vec![ConcatPoint::Str("X".into())]]),
            ]
        );
    }

    #[test]
    fn chain_to_string() {
        let table = StringTable::new();
        let var = VariableSymbol::basic(table.insert("KEY"), vec![], Range::zero());
        let chain = vec![
            ConcatPoint::Var(var),
            ConcatPoint::Equals,
            ConcatPoint::Sublist(vec![
                vec![ConcatPoint::Str("A".into())],
                vec![ConcatPoint::Str("B".into()), ConcatPoint::Dot, ConcatPoint::Str("C".into())],
            ]),
        ];

        assert_eq!(concat_chain_to_string(&chain, &table).unwrap(), "&KEY=(A,B.C)");
    }

    #[test]
    fn address_operand_expressions() {
        let table = StringTable::new();
        let op = MachineOperand::Address {
            displacement: MachExpr::Constant(4, Range::zero()),
            first: None,
            second: Some(MachExpr::Symbol(table.insert("BASE"), Range::zero())),
        };
        let exprs = op.expressions();
        assert_eq!(exprs.len(), 2);
        assert_eq!(*exprs[0], MachExpr::Constant(4, Range::zero()));
    }

    #[test]
    fn statement_accessors() {
        let table = StringTable::new();
        let mut stmt = Statement::Deferred(DeferredStatement {
            label: Label::Empty,
            instruction: InstructionField::Ordinary(table.insert("LR"), Range::on_line(0, 1, 3)),
            opcode: Default::default(),
            operand_field: "1,2".into(),
            operand_range: Range::on_line(0, 4, 7),
            range: Range::on_line(0, 0, 7),
        });

        assert!(stmt.access_resolved().is_none());
        assert_eq!(stmt.access_deferred().unwrap().operand_field, "1,2");
        assert_eq!(stmt.label().range(), None);

        let opcode = crate::compiler::processing::OpCode {
            value: Some(table.insert("LR")),
            ty: crate::compiler::processing::InstructionType::Mach,
        };
        stmt.set_opcode(opcode);
        assert_eq!(stmt.opcode(), opcode);
    }
}
