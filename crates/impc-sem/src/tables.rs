//! Struct and function signature tables built by the registration pass and
//! consulted by the checking pass.

use std::collections::HashMap;

use impc_par::ast::Type;
use impc_util::Symbol;

#[derive(Clone, Copy, Debug)]
pub struct FieldInfo {
    pub ty: Type,
    pub mutable: bool,
}

#[derive(Clone, Debug, Default)]
pub struct StructInfo {
    pub fields: Vec<(Symbol, FieldInfo)>,
}

impl StructInfo {
    pub fn field(&self, name: Symbol) -> Option<&FieldInfo> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, info)| info)
    }
}

pub type StructTable = HashMap<Symbol, StructInfo>;

#[derive(Clone, Debug)]
pub struct FnSig {
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// Two-level mapping mirroring the receiver model: `None` is the global,
/// receiver-less scope; `Some(struct_name)` is that struct's member
/// functions. A free function and a method never collide even if they
/// share a name, since they live in different inner maps.
pub type FunctionTable = HashMap<Option<Symbol>, HashMap<Symbol, FnSig>>;
