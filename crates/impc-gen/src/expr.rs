//! Expression code generation.

use impc_par::ast::{BinaryOp, Expr, Type, UnaryOp};
use impc_util::Symbol;
use inkwell::values::BasicValueEnum;
use inkwell::IntPredicate;

use crate::llvm::Generator;

impl<'ctx, 'a> Generator<'ctx, 'a> {
    pub(crate) fn gen_expr(&mut self, expr: &Expr) -> BasicValueEnum<'ctx> {
        match expr {
            Expr::Number { value, .. } => self.gen_number(*value),
            Expr::Boolean { value, .. } => self.context.bool_type().const_int(*value as u64, false).into(),
            Expr::Identifier { name, .. } => self.read_identifier(*name),
            Expr::FieldAccess { path, .. } => self.read_path(path),
            Expr::FunctionCall { name, args, .. } => self.gen_call(None, *name, args),
            Expr::MethodCall {
                receiver_path,
                method,
                args,
                ..
            } => self.gen_method_call(receiver_path, *method, args),
            Expr::StructInit { name, fields, .. } => self.gen_struct_init(*name, fields),
            Expr::Unary { op: UnaryOp::Not, operand, .. } => {
                let value = self.gen_expr(operand);
                self.builder
                    .build_not(value.into_int_value(), "nottmp")
                    .expect("boolean negation")
                    .into()
            }
            Expr::Binary { op, lhs, rhs, .. } => self.gen_binary(*op, lhs, rhs),
        }
    }

    fn gen_number(&self, value: i64) -> BasicValueEnum<'ctx> {
        if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
            self.context.i32_type().const_int(value as u64, true).into()
        } else {
            self.context.i64_type().const_int(value as u64, true).into()
        }
    }

    fn gen_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> BasicValueEnum<'ctx> {
        let lhs_ty = self.value_type(lhs);
        let rhs_ty = self.value_type(rhs);
        let lhs_val = self.gen_expr(lhs);
        let rhs_val = self.gen_expr(rhs);

        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                let result_ty = self.binary_result_type(op, lhs_ty, rhs_ty);
                let lhs_val = self.coerce(lhs_val, lhs_ty, result_ty).into_int_value();
                let rhs_val = self.coerce(rhs_val, rhs_ty, result_ty).into_int_value();
                match op {
                    BinaryOp::Add => self.builder.build_int_add(lhs_val, rhs_val, "addtmp"),
                    BinaryOp::Sub => self.builder.build_int_sub(lhs_val, rhs_val, "subtmp"),
                    BinaryOp::Mul => self.builder.build_int_mul(lhs_val, rhs_val, "multmp"),
                    _ => unreachable!(),
                }
                .expect("integer arithmetic on validated operands")
                .into()
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                // `icmp` requires equal-width operands; booleans are already
                // equal-width (i1) by construction, integers may need one
                // side widened to the other's width first.
                let widened_ty = if lhs_ty.is_numeric() {
                    if lhs_ty == Type::I64 || rhs_ty == Type::I64 {
                        Type::I64
                    } else {
                        Type::I32
                    }
                } else {
                    Type::Bool
                };
                let lhs_val = self.coerce(lhs_val, lhs_ty, widened_ty).into_int_value();
                let rhs_val = self.coerce(rhs_val, rhs_ty, widened_ty).into_int_value();
                let predicate = if op == BinaryOp::Eq {
                    IntPredicate::EQ
                } else {
                    IntPredicate::NE
                };
                self.builder
                    .build_int_compare(predicate, lhs_val, rhs_val, "cmptmp")
                    .expect("comparison on validated, equal-width operands")
                    .into()
            }
        }
    }

    fn gen_call(&mut self, scope_key: Option<Symbol>, name: Symbol, args: &[Expr]) -> BasicValueEnum<'ctx> {
        let mangled = match scope_key {
            Some(struct_name) => format!("{}_{}", struct_name.as_str(), name.as_str()),
            None => name.as_str().to_string(),
        };
        let function = self
            .module
            .get_function(&mangled)
            .unwrap_or_else(|| panic!("function '{mangled}' is emitted before any call to it"));
        let sig = self
            .model
            .functions
            .get(&scope_key)
            .and_then(|fns| fns.get(&name))
            .expect("called function is registered")
            .clone();

        let mut arg_values = Vec::with_capacity(args.len());
        for (arg, param_ty) in args.iter().zip(sig.params.iter()) {
            let found_ty = self.value_type(arg);
            let value = self.gen_expr(arg);
            arg_values.push(self.coerce(value, found_ty, *param_ty).into());
        }

        self.builder
            .build_call(function, &arg_values, "calltmp")
            .expect("call to a validated, arity-matched function")
            .try_as_basic_value()
            .left()
            .expect("non-void function call yields a value")
    }

    fn gen_method_call(&mut self, receiver_path: &[Symbol], method: Symbol, args: &[Expr]) -> BasicValueEnum<'ctx> {
        let (receiver_ptr, receiver_ty) = self.gep_chain(receiver_path);
        let struct_name = match receiver_ty {
            Type::Named(s) => s,
            _ => unreachable!("method call receiver is always struct-typed"),
        };
        let mangled = format!("{}_{}", struct_name.as_str(), method.as_str());
        let function = self
            .module
            .get_function(&mangled)
            .unwrap_or_else(|| panic!("method '{mangled}' is emitted before any call to it"));
        let sig = self
            .model
            .functions
            .get(&Some(struct_name))
            .and_then(|fns| fns.get(&method))
            .expect("called method is registered")
            .clone();

        let mut arg_values = vec![receiver_ptr.into()];
        for (arg, param_ty) in args.iter().zip(sig.params.iter()) {
            let found_ty = self.value_type(arg);
            let value = self.gen_expr(arg);
            arg_values.push(self.coerce(value, found_ty, *param_ty).into());
        }

        self.builder
            .build_call(function, &arg_values, "calltmp")
            .expect("call to a validated, arity-matched method")
            .try_as_basic_value()
            .left()
            .expect("non-void method call yields a value")
    }

    pub(crate) fn gen_struct_init(&mut self, name: Symbol, fields: &[Expr]) -> BasicValueEnum<'ctx> {
        let struct_ty = self.types.struct_type(name);
        let ptr = self
            .builder
            .build_alloca(struct_ty, name.as_str())
            .expect("struct literal storage");
        let info = self
            .model
            .structs
            .get(&name)
            .expect("struct type reaching codegen is always registered")
            .clone();
        for (index, (expr, (field_name, field))) in fields.iter().zip(info.fields.iter()).enumerate() {
            let found_ty = self.value_type(expr);
            let value = self.gen_expr(expr);
            let coerced = self.coerce(value, found_ty, field.ty);
            let gep = self
                .builder
                .build_struct_gep(struct_ty, ptr, index as u32, field_name.as_str())
                .expect("field index is in range");
            self.builder.build_store(gep, coerced).expect("store of a validated field");
        }
        ptr.into()
    }
}
