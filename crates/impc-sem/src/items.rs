//! Struct and function registration, and the top-level checking entry
//! points that drive the checking pass.

use impc_par::ast::{FunctionDecl, Program, Type};
use impc_util::Symbol;

use crate::scope::VarInfo;
use crate::tables::{FieldInfo, FnSig, StructInfo};
use crate::{describe_type, Analyzer, SemanticError};

impl<'a> Analyzer<'a> {
    /// Registers every struct name first, so a field type can name a struct
    /// declared later in the file, then validates each struct's own
    /// fields against the now-complete name set.
    pub(crate) fn register_structs(&mut self, program: &Program) -> Result<(), SemanticError> {
        for decl in &program.structs {
            if self.structs.contains_key(&decl.name) {
                return Err(self.emit(SemanticError::DuplicateStruct {
                    name: decl.name.as_str().to_string(),
                    line: decl.span.line,
                }));
            }
            self.structs.insert(decl.name, StructInfo::default());
        }

        for decl in &program.structs {
            let mut fields: Vec<(Symbol, FieldInfo)> = Vec::new();
            for field in &decl.fields {
                if fields.iter().any(|(n, _)| *n == field.name) {
                    return Err(self.emit(SemanticError::DuplicateField {
                        name: decl.name.as_str().to_string(),
                        field: field.name.as_str().to_string(),
                        line: field.span.line,
                    }));
                }
                if let Type::Named(referenced) = field.ty {
                    if !self.structs.contains_key(&referenced) {
                        return Err(self.emit(SemanticError::UnknownFieldType {
                            name: decl.name.as_str().to_string(),
                            field: field.name.as_str().to_string(),
                            line: field.span.line,
                        }));
                    }
                }
                fields.push((
                    field.name,
                    FieldInfo {
                        ty: field.ty,
                        mutable: field.mutable,
                    },
                ));
            }
            self.structs.insert(decl.name, StructInfo { fields });
        }
        Ok(())
    }

    /// Registers every free function under the global scope key and every
    /// struct's methods under that struct's key, so calls and method calls
    /// resolve regardless of declaration order.
    pub(crate) fn register_functions(&mut self, program: &Program) -> Result<(), SemanticError> {
        for f in &program.functions {
            self.register_one_function(None, f)?;
        }
        for s in &program.structs {
            for m in &s.methods {
                self.register_one_function(Some(s.name), m)?;
            }
        }
        Ok(())
    }

    fn register_one_function(
        &mut self,
        scope_key: Option<Symbol>,
        f: &FunctionDecl,
    ) -> Result<(), SemanticError> {
        let table = self.functions.entry(scope_key).or_default();
        if table.contains_key(&f.name) {
            return Err(self.emit(SemanticError::DuplicateName {
                name: f.name.as_str().to_string(),
                line: f.span.line,
            }));
        }
        let sig = FnSig {
            params: f.params.iter().map(|p| p.ty).collect(),
            return_type: f.return_type,
        };
        table.insert(f.name, sig);
        Ok(())
    }

    pub(crate) fn check_functions(&mut self, program: &Program) -> Result<(), SemanticError> {
        for f in &program.functions {
            self.check_function(None, f)?;
        }
        for s in &program.structs {
            for m in &s.methods {
                self.check_function(Some(s.name), m)?;
            }
        }
        Ok(())
    }

    /// Checks one function body. A member function's scope is pre-seeded
    /// with its receiver struct's own fields, standing in for the `self`
    /// the closed token set has no keyword for: the body reads and writes
    /// them exactly as if they were locals declared before its parameters.
    fn check_function(&mut self, receiver: Option<Symbol>, f: &FunctionDecl) -> Result<(), SemanticError> {
        self.scopes.push();

        if let Some(struct_name) = receiver {
            let info = self
                .structs
                .get(&struct_name)
                .cloned()
                .expect("receiver struct is always registered before its methods are checked");
            for (field_name, field) in &info.fields {
                self.scopes
                    .declare(
                        *field_name,
                        VarInfo {
                            ty: field.ty,
                            mutable: field.mutable,
                            initializing: false,
                        },
                    )
                    .expect("a fresh function scope has no prior bindings to collide with");
            }
        }

        for param in &f.params {
            self.scopes
                .declare(
                    param.name,
                    VarInfo {
                        ty: param.ty,
                        mutable: false,
                        initializing: false,
                    },
                )
                .map_err(|_| {
                    self.emit(SemanticError::DuplicateName {
                        name: param.name.as_str().to_string(),
                        line: param.span.line,
                    })
                })?;
        }

        let tail_ty = self.check_block(&f.body)?;
        match tail_ty {
            Some(found) => self.require_assignable(f.return_type, found, f.span.line)?,
            None => {
                return Err(self.emit(SemanticError::MissingReturn {
                    name: f.name.as_str().to_string(),
                }))
            }
        }

        self.scopes.pop();
        Ok(())
    }

    pub(crate) fn check_top_level(&mut self, program: &Program) -> Result<(), SemanticError> {
        self.scopes.push();
        let tail_ty = self.check_block(&program.body)?;
        match tail_ty {
            Some(found) => {
                if !matches!(found, Type::I32 | Type::I64 | Type::Bool) {
                    return Err(self.emit(SemanticError::InvalidTopLevelReturn {
                        found: describe_type(found),
                    }));
                }
            }
            None => return Err(self.emit(SemanticError::MissingTopLevelReturn)),
        }
        self.scopes.pop();
        Ok(())
    }
}
