//! Declaration AST nodes

use super::{Block, Expr, NodeId, TypeName};
use crate::common::Span;

/// Identifier with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// The single contract of a compilation
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: NodeId,
    pub name: Ident,
    pub fields: Vec<FieldDecl>,
    pub structs: Vec<StructDecl>,
    pub constructor: Option<ConstructorDecl>,
    pub functions: Vec<FunctionDecl>,
    pub span: Span,
}

impl Contract {
    pub fn new(id: NodeId, name: Ident, span: Span) -> Self {
        Self {
            id,
            name,
            fields: Vec::new(),
            structs: Vec::new(),
            constructor: None,
            functions: Vec::new(),
            span,
        }
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_struct(mut self, decl: StructDecl) -> Self {
        self.structs.push(decl);
        self
    }

    pub fn with_constructor(mut self, ctor: ConstructorDecl) -> Self {
        self.constructor = Some(ctor);
        self
    }

    pub fn with_function(mut self, func: FunctionDecl) -> Self {
        self.functions.push(func);
        self
    }

    /// Constructor first, then functions in declaration order
    pub fn callables(&self) -> impl Iterator<Item = Callable<'_>> {
        self.constructor
            .iter()
            .map(Callable::from)
            .chain(self.functions.iter().map(Callable::from))
    }
}

/// Field of a contract or struct: `int total = 0`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub id: NodeId,
    pub name: Ident,
    pub ty: TypeName,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Struct type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub id: NodeId,
    pub name: Ident,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// Contract constructor
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub id: NodeId,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// Function declaration: `function (int, bool) f(int a) { .. }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub id: NodeId,
    pub name: Ident,
    pub returns: Vec<TypeName>,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub name: Ident,
    pub ty: TypeName,
    pub span: Span,
}

/// Borrowed view over the constructor or a function
#[derive(Debug, Clone, Copy)]
pub struct Callable<'a> {
    pub id: NodeId,
    /// `None` for the constructor
    pub name: Option<&'a Ident>,
    pub returns: &'a [TypeName],
    pub params: &'a [Param],
    pub body: &'a Block,
    pub span: Span,
}

impl<'a> From<&'a ConstructorDecl> for Callable<'a> {
    fn from(ctor: &'a ConstructorDecl) -> Self {
        Self {
            id: ctor.id,
            name: None,
            returns: &[],
            params: &ctor.params,
            body: &ctor.body,
            span: ctor.span,
        }
    }
}

impl<'a> From<&'a FunctionDecl> for Callable<'a> {
    fn from(func: &'a FunctionDecl) -> Self {
        Self {
            id: func.id,
            name: Some(&func.name),
            returns: &func.returns,
            params: &func.params,
            body: &func.body,
            span: func.span,
        }
    }
}
