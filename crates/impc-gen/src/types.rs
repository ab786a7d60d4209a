//! Mapping from source types to LLVM IR types, plus struct type layout.

use std::collections::HashMap;

use impc_par::ast::{Program, Type};
use impc_sem::StructTable;
use impc_util::Symbol;
use inkwell::context::Context;
use inkwell::types::{BasicTypeEnum, StructType};

/// Named LLVM struct types for every source struct, keyed by struct name.
/// Built in two passes so that a field whose type is another struct —
/// declared earlier or later in the source — always resolves: every
/// struct gets an opaque named type first, and only once all of them
/// exist does any type get its field body filled in.
///
/// Iterates `program.structs` rather than the analyzer's hash-keyed
/// [`StructTable`] so struct type definitions come out in declaration
/// order, matching the required prelude layout and keeping output
/// deterministic across runs.
pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
    struct_types: HashMap<Symbol, StructType<'ctx>>,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn build(context: &'ctx Context, program: &Program, structs: &StructTable) -> Self {
        let mut struct_types = HashMap::new();
        for decl in &program.structs {
            let llvm_name = format!("struct.{}", decl.name.as_str());
            struct_types.insert(decl.name, context.opaque_struct_type(&llvm_name));
        }

        let mapper = Self {
            context,
            struct_types,
        };

        for decl in &program.structs {
            let info = structs
                .get(&decl.name)
                .expect("every declared struct is registered by the analyzer");
            let field_types: Vec<BasicTypeEnum<'ctx>> =
                info.fields.iter().map(|(_, field)| mapper.map(field.ty)).collect();
            mapper.struct_types[&decl.name].set_body(&field_types, false);
        }

        mapper
    }

    pub fn map(&self, ty: Type) -> BasicTypeEnum<'ctx> {
        match ty {
            Type::I32 => self.context.i32_type().into(),
            Type::I64 => self.context.i64_type().into(),
            Type::Bool => self.context.bool_type().into(),
            Type::Named(name) => (*self
                .struct_types
                .get(&name)
                .expect("struct type registered before any reference to it is generated"))
            .into(),
        }
    }

    pub fn struct_type(&self, name: Symbol) -> StructType<'ctx> {
        *self
            .struct_types
            .get(&name)
            .expect("struct type registered before any reference to it is generated")
    }
}
