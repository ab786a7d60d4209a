//! Expression type-checking.

use impc_par::ast::{BinaryOp, Expr, Type, UnaryOp};
use impc_util::Symbol;

use crate::scope::VarInfo;
use crate::{describe_type, is_assignable, number_literal_type, Analyzer, SemanticError};

impl<'a> Analyzer<'a> {
    /// Checks `expr` and returns its type. `Expr::Binary` nodes get their
    /// result type stashed in their `ty` cell as a side effect, for the
    /// generator to read back without re-deriving it.
    pub(crate) fn check_expr(&mut self, expr: &Expr) -> Result<Type, SemanticError> {
        match expr {
            Expr::Number { value, .. } => Ok(number_literal_type(*value)),
            Expr::Boolean { .. } => Ok(Type::Bool),
            Expr::Identifier { name, span } => {
                let line = span.line;
                let info = self.lookup_var(*name, line)?;
                Ok(info.ty)
            }
            Expr::FieldAccess { path, span } => self.resolve_path_type(path, span.line),
            Expr::FunctionCall { name, args, span } => {
                self.check_call(None, *name, args, span.line)
            }
            Expr::MethodCall {
                receiver_path,
                method,
                args,
                span,
            } => {
                let line = span.line;
                let receiver_ty = self.resolve_path_type(receiver_path, line)?;
                let struct_name = match receiver_ty {
                    Type::Named(s) => s,
                    _ => {
                        return Err(self.emit(SemanticError::FieldNotFound {
                            name: method.as_str().to_string(),
                            line,
                        }))
                    }
                };
                self.check_call(Some(struct_name), *method, args, line)
            }
            Expr::StructInit { name, fields, span } => self.check_struct_init(*name, fields, span.line),
            Expr::Unary { op: UnaryOp::Not, operand, span } => {
                let line = span.line;
                let ty = self.check_expr(operand)?;
                if ty != Type::Bool {
                    return Err(self.emit(SemanticError::TypeMismatch {
                        expected: "bool".to_string(),
                        found: describe_type(ty),
                        line,
                    }));
                }
                Ok(Type::Bool)
            }
            Expr::Binary {
                op,
                lhs,
                rhs,
                span,
                ty,
            } => {
                let line = span.line;
                let lhs_ty = self.check_expr(lhs)?;
                let rhs_ty = self.check_expr(rhs)?;
                let result = self.check_binary(*op, lhs_ty, rhs_ty, line)?;
                ty.set(Some(result));
                Ok(result)
            }
        }
    }

    fn check_binary(
        &self,
        op: BinaryOp,
        lhs_ty: Type,
        rhs_ty: Type,
        line: u32,
    ) -> Result<Type, SemanticError> {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                if !lhs_ty.is_numeric() || !rhs_ty.is_numeric() {
                    return Err(self.emit(SemanticError::TypeMismatch {
                        expected: "two numeric operands".to_string(),
                        found: format!("{} and {}", describe_type(lhs_ty), describe_type(rhs_ty)),
                        line,
                    }));
                }
                Ok(if lhs_ty == Type::I64 || rhs_ty == Type::I64 {
                    Type::I64
                } else {
                    Type::I32
                })
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                let both_bool = lhs_ty == Type::Bool && rhs_ty == Type::Bool;
                let both_numeric = lhs_ty.is_numeric() && rhs_ty.is_numeric();
                if !both_bool && !both_numeric {
                    return Err(self.emit(SemanticError::TypeMismatch {
                        expected: "two bools or two integers".to_string(),
                        found: format!("{} and {}", describe_type(lhs_ty), describe_type(rhs_ty)),
                        line,
                    }));
                }
                Ok(Type::Bool)
            }
        }
    }

    fn check_struct_init(
        &mut self,
        name: Symbol,
        fields: &[Expr],
        line: u32,
    ) -> Result<Type, SemanticError> {
        let info = self.structs.get(&name).cloned().ok_or_else(|| {
            self.emit(SemanticError::Internal(format!(
                "unknown struct '{}' reached a struct literal",
                name.as_str()
            )))
        })?;
        if fields.len() != info.fields.len() {
            return Err(self.emit(SemanticError::ArityMismatch {
                name: name.as_str().to_string(),
                expected: info.fields.len(),
                found: fields.len(),
                line,
            }));
        }
        for (expr, (_, field)) in fields.iter().zip(info.fields.iter()) {
            let found = self.check_expr(expr)?;
            self.require_assignable(field.ty, found, line)?;
        }
        Ok(Type::Named(name))
    }

    /// Resolves the type of a dotted read chain (`a.b.c`), requiring every
    /// intermediate segment to itself be a struct-typed field.
    pub(crate) fn resolve_path_type(&mut self, path: &[Symbol], line: u32) -> Result<Type, SemanticError> {
        let base = path[0];
        let info = self.lookup_var(base, line)?;
        let mut ty = info.ty;
        for field_name in &path[1..] {
            let struct_name = match ty {
                Type::Named(s) => s,
                _ => {
                    return Err(self.emit(SemanticError::FieldNotFound {
                        name: field_name.as_str().to_string(),
                        line,
                    }))
                }
            };
            let struct_info = self
                .structs
                .get(&struct_name)
                .cloned()
                .expect("struct type reaching analysis is always registered");
            let field = struct_info.field(*field_name).ok_or_else(|| {
                self.emit(SemanticError::FieldNotFound {
                    name: field_name.as_str().to_string(),
                    line,
                })
            })?;
            ty = field.ty;
        }
        Ok(ty)
    }

    pub(crate) fn lookup_var(&self, name: Symbol, line: u32) -> Result<VarInfo, SemanticError> {
        let info = self.scopes.lookup(name).ok_or_else(|| {
            self.emit(SemanticError::UndeclaredName {
                name: name.as_str().to_string(),
                line,
            })
        })?;
        if info.initializing {
            return Err(self.emit(SemanticError::UseWhileInitializing {
                name: name.as_str().to_string(),
                line,
            }));
        }
        Ok(info)
    }

    pub(crate) fn check_call(
        &mut self,
        scope_key: Option<Symbol>,
        name: Symbol,
        args: &[Expr],
        line: u32,
    ) -> Result<Type, SemanticError> {
        let sig = self
            .functions
            .get(&scope_key)
            .and_then(|fns| fns.get(&name))
            .cloned()
            .ok_or_else(|| {
                self.emit(SemanticError::UndeclaredFunction {
                    name: name.as_str().to_string(),
                    line,
                })
            })?;
        if sig.params.len() != args.len() {
            return Err(self.emit(SemanticError::ArityMismatch {
                name: name.as_str().to_string(),
                expected: sig.params.len(),
                found: args.len(),
                line,
            }));
        }
        for (param_ty, arg) in sig.params.iter().zip(args.iter()) {
            let found = self.check_expr(arg)?;
            self.require_assignable(*param_ty, found, line)?;
        }
        Ok(sig.return_type)
    }

    pub(crate) fn require_assignable(
        &self,
        target: Type,
        found: Type,
        line: u32,
    ) -> Result<(), SemanticError> {
        if is_assignable(target, found) {
            Ok(())
        } else {
            Err(self.emit(SemanticError::TypeMismatch {
                expected: describe_type(target),
                found: describe_type(found),
                line,
            }))
        }
    }
}
