//! The generator's core state: module setup, the fixed prelude, struct type
//! emission, `main`, and the small shared helpers every other module in
//! this crate (`expr`, `stmt`, `items`) reaches into through `pub(crate)`.

use std::collections::HashMap;

use impc_par::ast::{BinaryOp, Expr, Program, Type, UnaryOp};
use impc_sem::SemanticModel;
use impc_util::Symbol;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::BasicType;
use inkwell::values::{BasicValueEnum, FunctionValue, PointerValue};
use inkwell::AddressSpace;

use crate::error::{CodeGenError, Result};
use crate::types::TypeMapper;

/// What a bound name resolves to while walking a function or top-level
/// body. Primitives live directly in SSA registers; everything
/// struct-shaped — locals, by-pointer parameters, and the fields of an
/// implicit method receiver — is a pointer into storage the caller or a
/// local `alloca` owns.
#[derive(Clone, Copy)]
pub(crate) enum Binding<'ctx> {
    Scalar {
        value: BasicValueEnum<'ctx>,
        ty: Type,
        mutable: bool,
    },
    StructPtr {
        ptr: PointerValue<'ctx>,
        ty: Type,
        mutable: bool,
    },
    /// A bare field name inside a member function body standing in for the
    /// receiver field it names, since the grammar has no `self`/`this`.
    ReceiverField {
        base: PointerValue<'ctx>,
        struct_name: Symbol,
        index: u32,
        ty: Type,
        mutable: bool,
    },
}

impl<'ctx> Binding<'ctx> {
    pub(crate) fn ty(&self) -> Type {
        match self {
            Binding::Scalar { ty, .. } => *ty,
            Binding::StructPtr { ty, .. } => *ty,
            Binding::ReceiverField { ty, .. } => *ty,
        }
    }

    pub(crate) fn mutable(&self) -> bool {
        match self {
            Binding::Scalar { mutable, .. } => *mutable,
            Binding::StructPtr { mutable, .. } => *mutable,
            Binding::ReceiverField { mutable, .. } => *mutable,
        }
    }
}

pub(crate) struct Generator<'ctx, 'a> {
    pub(crate) context: &'ctx Context,
    pub(crate) module: Module<'ctx>,
    pub(crate) builder: Builder<'ctx>,
    pub(crate) types: TypeMapper<'ctx>,
    pub(crate) model: &'a SemanticModel,
    pub(crate) env: HashMap<Symbol, Binding<'ctx>>,
    /// Per-variable SSA version counter. Read by [`Generator::next_version_name`]
    /// every time a scalar variable is (re-)written.
    pub(crate) versions: HashMap<Symbol, u32>,
    pub(crate) print_result_fn: FunctionValue<'ctx>,
    label_counter: u32,
}

impl<'ctx, 'a> Generator<'ctx, 'a> {
    pub(crate) fn new(
        context: &'ctx Context,
        module_name: &str,
        program: &Program,
        model: &'a SemanticModel,
    ) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        let types = TypeMapper::build(context, program, &model.structs);

        let printf_fn = declare_printf(context, &module);
        let print_result_fn = define_print_result(context, &module, &builder, printf_fn);

        Self {
            context,
            module,
            builder,
            types,
            model,
            env: HashMap::new(),
            versions: HashMap::new(),
            print_result_fn,
            label_counter: 0,
        }
    }

    pub(crate) fn run(&mut self, program: &Program) -> Result<()> {
        for f in &program.functions {
            self.emit_function(None, f)?;
        }
        for s in &program.structs {
            for m in &s.methods {
                self.emit_function(Some(s.name), m)?;
            }
        }
        self.emit_main(program)?;
        Ok(())
    }

    pub(crate) fn emit_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub(crate) fn fresh_label(&mut self, prefix: &str) -> String {
        let id = self.label_counter;
        self.label_counter += 1;
        format!("{prefix}_{id}")
    }

    /// Allocates the next SSA name for a write to `name` — `x` on the
    /// first write, `x.1`, `x.2`, … after that — matching the reference
    /// generator's per-variable version counter.
    pub(crate) fn next_version_name(&mut self, name: Symbol) -> String {
        let counter = self.versions.entry(name).or_insert(0);
        let version = *counter;
        *counter += 1;
        if version == 0 {
            name.as_str().to_string()
        } else {
            format!("{}.{}", name.as_str(), version)
        }
    }

    /// `i32 -> i64` sign extension; a no-op for identical types. Assignability
    /// as checked by the analyzer permits no other coercion.
    pub(crate) fn coerce(&self, value: BasicValueEnum<'ctx>, from: Type, to: Type) -> BasicValueEnum<'ctx> {
        if from == to {
            return value;
        }
        match (from, to) {
            (Type::I32, Type::I64) => self
                .builder
                .build_int_s_extend(value.into_int_value(), self.context.i64_type(), "widen")
                .expect("sign-extend of a validated i32->i64 widening")
                .into(),
            _ => unreachable!("analyzer only permits identical types or i32->i64 widening"),
        }
    }

    /// Re-derives the static type of an already-analyzed expression.
    /// Mirrors the analyzer's type rules exactly; safe to call without
    /// re-validating since the program already passed analysis.
    pub(crate) fn value_type(&self, expr: &Expr) -> Type {
        match expr {
            Expr::Number { value, .. } => number_literal_type(*value),
            Expr::Boolean { .. } => Type::Bool,
            Expr::Identifier { name, .. } => self.env[name].ty(),
            Expr::FieldAccess { path, .. } => self.path_type(path),
            Expr::FunctionCall { name, .. } => self
                .model
                .functions
                .get(&None)
                .and_then(|fns| fns.get(name))
                .expect("called function is registered")
                .return_type,
            Expr::MethodCall {
                receiver_path, method, ..
            } => {
                let struct_name = match self.path_type(receiver_path) {
                    Type::Named(s) => s,
                    _ => unreachable!("method call receiver is always struct-typed"),
                };
                self.model
                    .functions
                    .get(&Some(struct_name))
                    .and_then(|fns| fns.get(method))
                    .expect("called method is registered")
                    .return_type
            }
            Expr::StructInit { name, .. } => Type::Named(*name),
            Expr::Unary { op: UnaryOp::Not, .. } => Type::Bool,
            Expr::Binary { ty, .. } => ty.get().expect("binary node is type-annotated after analysis"),
        }
    }

    fn path_type(&self, path: &[Symbol]) -> Type {
        let mut ty = self.env[&path[0]].ty();
        for field_name in &path[1..] {
            let struct_name = match ty {
                Type::Named(s) => s,
                _ => unreachable!("field access base is always struct-typed"),
            };
            let info = self
                .model
                .structs
                .get(&struct_name)
                .expect("struct type reaching codegen is always registered");
            ty = info
                .field(*field_name)
                .expect("field reaching codegen always exists")
                .ty;
        }
        ty
    }

    /// Binary arithmetic/comparison result type per the analyzer's rules,
    /// also returned here so `gen_binary` can decide how to widen operands
    /// without re-deriving it twice.
    pub(crate) fn binary_result_type(&self, op: BinaryOp, lhs_ty: Type, rhs_ty: Type) -> Type {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                if lhs_ty == Type::I64 || rhs_ty == Type::I64 {
                    Type::I64
                } else {
                    Type::I32
                }
            }
            BinaryOp::Eq | BinaryOp::Ne => Type::Bool,
        }
    }

    /// Walks a dotted field chain to a pointer to its final segment,
    /// GEP-ing through an implicit receiver's storage first if the chain's
    /// base is one of the receiver's own fields.
    pub(crate) fn gep_chain(&mut self, path: &[Symbol]) -> (PointerValue<'ctx>, Type) {
        let base_name = path[0];
        let (mut ptr, mut ty) = match self.env[&base_name] {
            Binding::StructPtr { ptr, ty, .. } => (ptr, ty),
            Binding::ReceiverField {
                base,
                struct_name,
                index,
                ty,
                ..
            } => {
                let struct_ty = self.types.struct_type(struct_name);
                let gep = self
                    .builder
                    .build_struct_gep(struct_ty, base, index, "recv_field")
                    .expect("receiver field index is in range");
                (gep, ty)
            }
            Binding::Scalar { .. } => unreachable!("field access base is always struct-typed"),
        };
        for field_name in &path[1..] {
            let struct_name = match ty {
                Type::Named(s) => s,
                _ => unreachable!("field access base is always struct-typed"),
            };
            let info = self
                .model
                .structs
                .get(&struct_name)
                .expect("struct type reaching codegen is always registered");
            let index = info
                .fields
                .iter()
                .position(|(name, _)| name == field_name)
                .expect("field reaching codegen always exists") as u32;
            let field_ty = info.fields[index as usize].1.ty;
            let struct_ty = self.types.struct_type(struct_name);
            ptr = self
                .builder
                .build_struct_gep(struct_ty, ptr, index, field_name.as_str())
                .expect("field index is in range");
            ty = field_ty;
        }
        (ptr, ty)
    }

    /// Reads a dotted chain: the final field's value if primitive, or the
    /// pointer to it if struct-shaped, mirroring how a struct variable's
    /// own "value" is always its pointer.
    pub(crate) fn read_path(&mut self, path: &[Symbol]) -> BasicValueEnum<'ctx> {
        let (ptr, ty) = self.gep_chain(path);
        match ty {
            Type::Named(_) => ptr.into(),
            prim => self
                .builder
                .build_load(self.types.map(prim), ptr, "load")
                .expect("load of a validated field")
                .into(),
        }
    }

    pub(crate) fn read_identifier(&mut self, name: Symbol) -> BasicValueEnum<'ctx> {
        match self.env[&name] {
            Binding::Scalar { value, .. } => value,
            Binding::StructPtr { ptr, .. } => ptr.into(),
            Binding::ReceiverField {
                base,
                struct_name,
                index,
                ty,
                ..
            } => {
                let struct_ty = self.types.struct_type(struct_name);
                let gep = self
                    .builder
                    .build_struct_gep(struct_ty, base, index, name.as_str())
                    .expect("receiver field index is in range");
                match ty {
                    Type::Named(_) => gep.into(),
                    prim => self
                        .builder
                        .build_load(self.types.map(prim), gep, "load")
                        .expect("load of a validated receiver field")
                        .into(),
                }
            }
        }
    }

    /// Records a (re-)write to a scalar local or parameter under the next
    /// SSA version name for `name`.
    pub(crate) fn bind_scalar_write(&mut self, name: Symbol, value: BasicValueEnum<'ctx>, ty: Type, mutable: bool) {
        let versioned = self.next_version_name(name);
        value.set_name(&versioned);
        self.env.insert(name, Binding::Scalar { value, ty, mutable });
    }
}

fn number_literal_type(value: i64) -> Type {
    if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
        Type::I32
    } else {
        Type::I64
    }
}

fn declare_printf<'ctx>(context: &'ctx Context, module: &Module<'ctx>) -> FunctionValue<'ctx> {
    let i32_type = context.i32_type();
    let str_ptr_type = context.ptr_type(AddressSpace::default());
    let printf_type = i32_type.fn_type(&[str_ptr_type.into()], true);
    module.add_function("printf", printf_type, Some(inkwell::module::Linkage::External))
}

/// `define void @printResult(i32 %v) { ... call printf ... ret void }`.
fn define_print_result<'ctx>(
    context: &'ctx Context,
    module: &Module<'ctx>,
    builder: &Builder<'ctx>,
    printf_fn: FunctionValue<'ctx>,
) -> FunctionValue<'ctx> {
    let i32_type = context.i32_type();
    let void_type = context.void_type();
    let fn_type = void_type.fn_type(&[i32_type.into()], false);
    let function = module.add_function("printResult", fn_type, None);

    let entry = context.append_basic_block(function, "entry");
    builder.position_at_end(entry);

    let format = builder
        .build_global_string_ptr("Program exit with result %d\n", "fmt")
        .expect("global string constant");
    let value = function.get_nth_param(0).expect("printResult takes one i32");
    builder
        .build_call(printf_fn, &[format.as_pointer_value().into(), value.into()], "")
        .expect("call to printf");
    builder.build_return(None).expect("void return");

    function
}
