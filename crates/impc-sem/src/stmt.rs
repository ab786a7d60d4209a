//! Statement checking: variable declarations, assignments, and `if`.

use impc_par::ast::{Assign, Block, Expr, If, Stmt, Type, VarDecl};

use crate::scope::VarInfo;
use crate::{Analyzer, SemanticError};

impl<'a> Analyzer<'a> {
    pub(crate) fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::VarDecl(decl) => self.check_var_decl(decl),
            Stmt::Assign(assign) => self.check_assign(assign),
            Stmt::If(if_stmt) => self.check_if(if_stmt),
        }
    }

    /// Checks every statement in `block` and, if present, its tail
    /// expression, returning that expression's type so the caller (a
    /// function body or the top-level body) can decide what to do with it.
    /// `if`/`else` branches discard the returned type: a `return` nested in
    /// a conditional block doesn't propagate out of the enclosing function.
    pub(crate) fn check_block(&mut self, block: &Block) -> Result<Option<Type>, SemanticError> {
        for stmt in &block.statements {
            self.check_stmt(stmt)?;
        }
        match &block.tail_return {
            Some(expr) => Ok(Some(self.check_expr(expr)?)),
            None => Ok(None),
        }
    }

    fn check_var_decl(&mut self, decl: &VarDecl) -> Result<(), SemanticError> {
        let line = decl.span.line;
        match decl.ty {
            Type::Named(struct_name) => {
                let info = self.structs.get(&struct_name).cloned().ok_or_else(|| {
                    self.emit(SemanticError::Internal(format!(
                        "unknown struct type '{}' reached semantic analysis",
                        struct_name.as_str()
                    )))
                })?;
                if decl.init.len() != info.fields.len() {
                    return Err(self.emit(SemanticError::ArityMismatch {
                        name: decl.name.as_str().to_string(),
                        expected: info.fields.len(),
                        found: decl.init.len(),
                        line,
                    }));
                }
                self.declare(decl.name, decl.ty, decl.mutable, line)?;
                for (expr, (_, field)) in decl.init.iter().zip(info.fields.iter()) {
                    let found = self.check_expr(expr)?;
                    self.require_assignable(field.ty, found, line)?;
                }
                self.scopes.finish_initializing(decl.name);
            }
            prim => {
                if decl.init.len() != 1 {
                    return Err(self.emit(SemanticError::ArityMismatch {
                        name: decl.name.as_str().to_string(),
                        expected: 1,
                        found: decl.init.len(),
                        line,
                    }));
                }
                self.declare(decl.name, decl.ty, decl.mutable, line)?;
                let found = self.check_expr(&decl.init[0])?;
                self.require_assignable(prim, found, line)?;
                self.scopes.finish_initializing(decl.name);
            }
        }
        Ok(())
    }

    fn declare(&mut self, name: impc_util::Symbol, ty: Type, mutable: bool, line: u32) -> Result<(), SemanticError> {
        self.scopes
            .declare(
                name,
                VarInfo {
                    ty,
                    mutable,
                    initializing: true,
                },
            )
            .map_err(|_| {
                self.emit(SemanticError::DuplicateName {
                    name: name.as_str().to_string(),
                    line,
                })
            })
    }

    fn check_assign(&mut self, assign: &Assign) -> Result<(), SemanticError> {
        let line = assign.span.line;
        let base = assign.path[0];

        if assign.path.len() == 1 {
            if let Expr::Identifier { name, .. } = &assign.value {
                if *name == base {
                    return Err(self.emit(SemanticError::SelfAssignment {
                        name: base.as_str().to_string(),
                        line,
                    }));
                }
            }
        }

        let info = self.lookup_var(base, line)?;
        if !info.mutable {
            return Err(self.emit(SemanticError::ImmutableAssignment {
                name: base.as_str().to_string(),
                line,
            }));
        }

        let mut target_ty = info.ty;
        for field_name in &assign.path[1..] {
            let struct_name = match target_ty {
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
            if !field.mutable {
                return Err(self.emit(SemanticError::ImmutableField {
                    field: field_name.as_str().to_string(),
                    line,
                }));
            }
            target_ty = field.ty;
        }

        let found = self.check_expr(&assign.value)?;
        self.require_assignable(target_ty, found, line)
    }

    fn check_if(&mut self, if_stmt: &If) -> Result<(), SemanticError> {
        let line = if_stmt.span.line;
        let cond_ty = self.check_expr(&if_stmt.condition)?;
        if cond_ty != Type::Bool {
            return Err(self.emit(SemanticError::NonBooleanCondition { line }));
        }

        self.scopes.push();
        self.check_block(&if_stmt.then_block)?;
        self.scopes.pop();

        if let Some(else_block) = &if_stmt.else_block {
            self.scopes.push();
            self.check_block(else_block)?;
            self.scopes.pop();
        }

        Ok(())
    }
}
