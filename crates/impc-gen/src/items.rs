//! Function, method, and top-level body emission.

use impc_par::ast::{FunctionDecl, Program, Type};
use inkwell::types::{BasicMetadataTypeEnum, PointerType};
use inkwell::values::BasicValueEnum;

use crate::llvm::{Binding, Generator};
use crate::Result;

impl<'ctx, 'a> Generator<'ctx, 'a> {
    /// `%struct.T*` for a struct-typed parameter, matching the by-reference
    /// calling convention every struct argument uses; the scalar types map
    /// through as-is.
    fn param_llvm_type(&self, ty: Type, ptr_ty: PointerType<'ctx>) -> BasicMetadataTypeEnum<'ctx> {
        match ty {
            Type::Named(_) => ptr_ty.into(),
            prim => self.types.map(prim).into(),
        }
    }

    /// Emits a standalone function (`receiver: None`) or a struct method
    /// (`receiver: Some(struct_name)`), the latter lowered to
    /// `StructName_methodName` with an implicit receiver pointer prepended
    /// to the parameter list.
    pub(crate) fn emit_function(&mut self, receiver: Option<impc_util::Symbol>, f: &FunctionDecl) -> Result<()> {
        let mangled = match receiver {
            Some(struct_name) => format!("{}_{}", struct_name.as_str(), f.name.as_str()),
            None => f.name.as_str().to_string(),
        };

        let receiver_ptr_ty = self.context.ptr_type(inkwell::AddressSpace::default());
        let param_types: Vec<_> = f
            .params
            .iter()
            .map(|p| self.param_llvm_type(p.ty, receiver_ptr_ty))
            .collect();
        let mut all_param_types = Vec::with_capacity(f.params.len() + 1);
        if receiver.is_some() {
            all_param_types.push(receiver_ptr_ty.into());
        }
        all_param_types.extend(param_types);

        let return_ty = self.types.map(f.return_type);
        let fn_type = return_ty.fn_type(&all_param_types, false);
        let function = self.module.add_function(&mangled, fn_type, None);

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        self.env.clear();
        self.versions.clear();

        let mut param_index = 0;
        if let Some(struct_name) = receiver {
            let this_ptr = function
                .get_nth_param(0)
                .expect("receiver pointer is always the first parameter")
                .into_pointer_value();
            this_ptr.set_name("this");
            let info = self
                .model
                .structs
                .get(&struct_name)
                .expect("receiver struct is always registered")
                .clone();
            for (index, (field_name, field)) in info.fields.iter().enumerate() {
                self.env.insert(
                    *field_name,
                    Binding::ReceiverField {
                        base: this_ptr,
                        struct_name,
                        index: index as u32,
                        ty: field.ty,
                        mutable: field.mutable,
                    },
                );
            }
            param_index = 1;
        }

        for param in &f.params {
            let value = function
                .get_nth_param(param_index)
                .expect("parameter count matches the declared signature");
            value.set_name(param.name.as_str());
            let binding = match param.ty {
                Type::Named(_) => Binding::StructPtr {
                    ptr: value.into_pointer_value(),
                    ty: param.ty,
                    mutable: false,
                },
                prim => Binding::Scalar {
                    value,
                    ty: prim,
                    mutable: false,
                },
            };
            self.env.insert(param.name, binding);
            param_index += 1;
        }

        self.gen_block(&f.body)?;

        let tail = f
            .body
            .tail_return
            .as_ref()
            .expect("a function body that passed analysis always ends in a return");
        let found_ty = self.value_type(tail);
        let value = self.gen_expr(tail);
        let coerced = self.coerce(value, found_ty, f.return_type);
        self.builder.build_return(Some(&coerced)).expect("return of a validated value");

        Ok(())
    }

    /// `define i32 @main() { ... }`. The top-level body's tail return is
    /// coerced down to `i32` regardless of its declared type, printed
    /// through `printResult`, then returned as the process exit code.
    pub(crate) fn emit_main(&mut self, program: &Program) -> Result<()> {
        let i32_type = self.context.i32_type();
        let fn_type = i32_type.fn_type(&[], false);
        let function = self.module.add_function("main", fn_type, None);

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        self.env.clear();
        self.versions.clear();

        self.gen_block(&program.body)?;

        let tail = program
            .body
            .tail_return
            .as_ref()
            .expect("a top-level body that passed analysis always ends in a return");
        let found_ty = self.value_type(tail);
        let value = self.gen_expr(tail);
        let result = self.coerce_to_i32(value, found_ty);

        self.builder
            .build_call(self.print_result_fn, &[result.into()], "")
            .expect("call to printResult");
        self.builder.build_return(Some(&result)).expect("main returns its exit code");

        Ok(())
    }

    fn coerce_to_i32(&self, value: BasicValueEnum<'ctx>, from: Type) -> inkwell::values::IntValue<'ctx> {
        match from {
            Type::I32 => value.into_int_value(),
            Type::I64 => self
                .builder
                .build_int_truncate(value.into_int_value(), self.context.i32_type(), "trunc")
                .expect("truncation of a validated top-level i64 return"),
            Type::Bool => self
                .builder
                .build_int_z_extend(value.into_int_value(), self.context.i32_type(), "zext")
                .expect("zero-extend of a validated top-level bool return"),
            Type::Named(_) => unreachable!("analyzer rejects a struct-typed top-level return"),
        }
    }
}
