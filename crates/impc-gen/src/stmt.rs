//! Statement code generation: variable declarations, assignments, and
//! `if`/`else` with the reference generator's snapshot-and-restore block
//! scoping (see [`Generator::gen_if`]).

use impc_par::ast::{Assign, Block, If, Stmt, Type, VarDecl};

use crate::llvm::{Binding, Generator};
use crate::Result;

impl<'ctx, 'a> Generator<'ctx, 'a> {
    pub(crate) fn gen_block(&mut self, block: &Block) -> Result<()> {
        for stmt in &block.statements {
            self.gen_stmt(stmt)?;
        }
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.gen_var_decl(decl),
            Stmt::Assign(assign) => self.gen_assign(assign),
            Stmt::If(if_stmt) => self.gen_if(if_stmt),
        }
    }

    fn gen_var_decl(&mut self, decl: &VarDecl) -> Result<()> {
        match decl.ty {
            Type::Named(struct_name) => {
                let struct_ty = self.types.struct_type(struct_name);
                let ptr = self
                    .builder
                    .build_alloca(struct_ty, decl.name.as_str())
                    .expect("struct local storage");
                let info = self
                    .model
                    .structs
                    .get(&struct_name)
                    .expect("struct type reaching codegen is always registered")
                    .clone();
                for (index, (expr, (field_name, field))) in decl.init.iter().zip(info.fields.iter()).enumerate() {
                    let found_ty = self.value_type(expr);
                    let value = self.gen_expr(expr);
                    let coerced = self.coerce(value, found_ty, field.ty);
                    let gep = self
                        .builder
                        .build_struct_gep(struct_ty, ptr, index as u32, field_name.as_str())
                        .expect("field index is in range");
                    self.builder.build_store(gep, coerced).expect("store of a validated field");
                }
                self.env.insert(
                    decl.name,
                    Binding::StructPtr {
                        ptr,
                        ty: decl.ty,
                        mutable: decl.mutable,
                    },
                );
            }
            prim => {
                let found_ty = self.value_type(&decl.init[0]);
                let value = self.gen_expr(&decl.init[0]);
                let coerced = self.coerce(value, found_ty, prim);
                self.bind_scalar_write(decl.name, coerced, prim, decl.mutable);
            }
        }
        Ok(())
    }

    fn gen_assign(&mut self, assign: &Assign) -> Result<()> {
        let base = assign.path[0];
        if assign.path.len() == 1 {
            match self.env[&base] {
                Binding::Scalar { ty, mutable, .. } => {
                    let found_ty = self.value_type(&assign.value);
                    let value = self.gen_expr(&assign.value);
                    let coerced = self.coerce(value, found_ty, ty);
                    self.bind_scalar_write(base, coerced, ty, mutable);
                }
                Binding::StructPtr { ty, mutable, .. } => {
                    // Whole-struct reassignment: re-point the variable at
                    // whatever storage the right-hand side already lives
                    // in, rather than copying field by field.
                    let value = self.gen_expr(&assign.value);
                    self.env.insert(
                        base,
                        Binding::StructPtr {
                            ptr: value.into_pointer_value(),
                            ty,
                            mutable,
                        },
                    );
                }
                Binding::ReceiverField {
                    base: this_ptr,
                    struct_name,
                    index,
                    ty,
                    ..
                } => {
                    let found_ty = self.value_type(&assign.value);
                    let value = self.gen_expr(&assign.value);
                    let coerced = self.coerce(value, found_ty, ty);
                    let struct_ty = self.types.struct_type(struct_name);
                    let gep = self
                        .builder
                        .build_struct_gep(struct_ty, this_ptr, index, base.as_str())
                        .expect("receiver field index is in range");
                    self.builder
                        .build_store(gep, coerced)
                        .expect("store of a validated receiver field");
                }
            }
        } else {
            let (ptr, target_ty) = self.gep_chain(&assign.path);
            let found_ty = self.value_type(&assign.value);
            let value = self.gen_expr(&assign.value);
            let coerced = self.coerce(value, found_ty, target_ty);
            self.builder.build_store(ptr, coerced).expect("store of a validated field chain");
        }
        Ok(())
    }

    /// Emits `if`/`else` by snapshotting the variable environment before
    /// each branch and restoring it afterward — a write inside a branch
    /// never becomes visible once the branch closes, matching the
    /// reference generator's documented lack of `phi` nodes. With no
    /// `else` clause the false edge of the conditional branch targets
    /// `end_N` directly rather than an empty `else_N` block.
    fn gen_if(&mut self, if_stmt: &If) -> Result<()> {
        let label = self.fresh_label("if");
        let cond = self.gen_expr(&if_stmt.condition).into_int_value();

        let function = self
            .builder
            .get_insert_block()
            .expect("builder is positioned inside a function")
            .get_parent()
            .expect("block belongs to a function");

        let then_bb = self.context.append_basic_block(function, &format!("then_{label}"));
        let end_bb = self.context.append_basic_block(function, &format!("end_{label}"));
        let else_bb = if if_stmt.else_block.is_some() {
            Some(self.context.append_basic_block(function, &format!("else_{label}")))
        } else {
            None
        };

        self.builder
            .build_conditional_branch(cond, then_bb, else_bb.unwrap_or(end_bb))
            .expect("conditional branch on a validated bool");

        let outer_env = self.env.clone();
        let outer_versions = self.versions.clone();

        self.builder.position_at_end(then_bb);
        self.gen_block(&if_stmt.then_block)?;
        if self.builder.get_insert_block().unwrap().get_terminator().is_none() {
            self.builder.build_unconditional_branch(end_bb).expect("branch to end block");
        }
        self.env = outer_env.clone();
        self.versions = outer_versions.clone();

        if let (Some(else_bb), Some(else_block)) = (else_bb, &if_stmt.else_block) {
            self.builder.position_at_end(else_bb);
            self.gen_block(else_block)?;
            if self.builder.get_insert_block().unwrap().get_terminator().is_none() {
                self.builder.build_unconditional_branch(end_bb).expect("branch to end block");
            }
        }
        self.env = outer_env;
        self.versions = outer_versions;

        self.builder.position_at_end(end_bb);
        Ok(())
    }
}
