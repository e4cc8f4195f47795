//! Symbol table: scopes, symbols, and the node annotation maps
//!
//! Every association is keyed by an id (`NodeId` for syntax, `SymbolId` and
//! `ScopeId` for the arenas), so nothing here holds references into the tree.

use std::collections::{HashMap, HashSet};
use std::fmt;

use string_interner::DefaultStringInterner;

use super::scope::{Scope, ScopeId, ScopeKind, SymbolId};
use super::symbol::{BasicType, ContractInfo, FunctionInfo, Name, Symbol, SymbolKind};
use crate::ast::{NodeId, TypeName, TypeNameKind};
use crate::common::Span;

/// Name of the constructor symbol; no source identifier can spell it
pub const CONSTRUCTOR_NAME: &str = "<constructor>";

#[derive(Debug, Clone, Copy)]
struct Builtins {
    bool_ty: SymbolId,
    char_ty: SymbolId,
    int_ty: SymbolId,
    string_ty: SymbolId,
    null_ty: SymbolId,
    void_ty: SymbolId,
    length: SymbolId,
}

/// All symbols and scopes of one compilation
pub struct SymbolTable {
    interner: DefaultStringInterner,
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    global: ScopeId,
    builtins: Builtins,
    contract: Option<SymbolId>,
    array_types: HashMap<SymbolId, SymbolId>,
    map_types: HashMap<(SymbolId, SymbolId), SymbolId>,
    node_symbols: HashMap<NodeId, SymbolId>,
    symbol_nodes: HashMap<SymbolId, NodeId>,
    designators: HashMap<NodeId, SymbolId>,
    expr_types: HashMap<NodeId, SymbolId>,
}

impl SymbolTable {
    /// Create a table holding the global scope and the built-ins
    ///
    /// `bool`, `char`, `int`, `string`, `true`, `false` and `null` are
    /// declared in the global scope. The null and void types and the array
    /// `length` field exist but cannot be found by name.
    pub fn new() -> Self {
        let mut interner = DefaultStringInterner::default();
        let mut symbols = Vec::new();
        let mut global_scope = Scope::new(ScopeKind::Global, None);
        let global = ScopeId::from_raw(0);

        let mut add = |name: &str, kind: SymbolKind, listed: bool| {
            let id = SymbolId::from_raw(symbols.len() as u32);
            let name = interner.get_or_intern(name);
            symbols.push(Symbol { name, scope: global, span: Span::default(), kind });
            if listed {
                global_scope.push(name, id);
            }
            id
        };

        let bool_ty = add("bool", SymbolKind::Basic(BasicType::Bool), true);
        let char_ty = add("char", SymbolKind::Basic(BasicType::Char), true);
        let int_ty = add("int", SymbolKind::Basic(BasicType::Int), true);
        let string_ty = add("string", SymbolKind::Basic(BasicType::String), true);
        let null_ty = add("null", SymbolKind::Basic(BasicType::Null), false);
        let void_ty = add("void", SymbolKind::Basic(BasicType::Void), false);
        add("true", SymbolKind::Constant { ty: bool_ty }, true);
        add("false", SymbolKind::Constant { ty: bool_ty }, true);
        add("null", SymbolKind::Constant { ty: null_ty }, true);
        let length = add("length", SymbolKind::Field { ty: Some(int_ty) }, false);

        Self {
            interner,
            symbols,
            scopes: vec![global_scope],
            global,
            builtins: Builtins { bool_ty, char_ty, int_ty, string_ty, null_ty, void_ty, length },
            contract: None,
            array_types: HashMap::new(),
            map_types: HashMap::new(),
            node_symbols: HashMap::new(),
            symbol_nodes: HashMap::new(),
            designators: HashMap::new(),
            expr_types: HashMap::new(),
        }
    }

    // ==================== Built-ins ====================

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn bool_type(&self) -> SymbolId {
        self.builtins.bool_ty
    }

    pub fn char_type(&self) -> SymbolId {
        self.builtins.char_ty
    }

    pub fn int_type(&self) -> SymbolId {
        self.builtins.int_ty
    }

    pub fn string_type(&self) -> SymbolId {
        self.builtins.string_ty
    }

    pub fn null_type(&self) -> SymbolId {
        self.builtins.null_ty
    }

    pub fn void_type(&self) -> SymbolId {
        self.builtins.void_ty
    }

    /// The `length` member of every array type
    pub fn length_field(&self) -> SymbolId {
        self.builtins.length
    }

    // ==================== Names ====================

    pub fn intern(&mut self, name: &str) -> Name {
        self.interner.get_or_intern(name)
    }

    pub fn resolve_name(&self, name: Name) -> &str {
        self.interner.resolve(name).unwrap_or("<unknown>")
    }

    pub fn name_of(&self, symbol: SymbolId) -> &str {
        self.resolve_name(self.symbol(symbol).name)
    }

    // ==================== Scopes and symbols ====================

    pub fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::from_raw(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, parent));
        id
    }

    pub fn set_scope_owner(&mut self, scope: ScopeId, owner: SymbolId) {
        self.scopes[scope.index()].owner = Some(owner);
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(i, s)| (ScopeId::from_raw(i as u32), s))
    }

    /// Create a symbol and append it to `scope`'s declaration list
    pub fn declare(&mut self, scope: ScopeId, name: &str, span: Span, kind: SymbolKind) -> SymbolId {
        let id = self.add_symbol(scope, name, span, kind);
        let name = self.symbols[id.index()].name;
        self.scopes[scope.index()].push(name, id);
        id
    }

    /// Create a symbol owned by `scope` without making it findable by name
    fn add_symbol(&mut self, scope: ScopeId, name: &str, span: Span, kind: SymbolKind) -> SymbolId {
        let id = SymbolId::from_raw(self.symbols.len() as u32);
        let name = self.intern(name);
        self.symbols.push(Symbol { name, scope, span, kind });
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId::from_raw(i as u32), s))
    }

    pub fn set_contract(&mut self, contract: SymbolId) {
        self.contract = Some(contract);
    }

    pub fn contract(&self) -> Option<SymbolId> {
        self.contract
    }

    pub fn contract_info(&self) -> Option<&ContractInfo> {
        match &self.symbol(self.contract?).kind {
            SymbolKind::Contract(info) => Some(info),
            _ => None,
        }
    }

    pub fn contract_info_mut(&mut self) -> Option<&mut ContractInfo> {
        let contract = self.contract?;
        match &mut self.symbol_mut(contract).kind {
            SymbolKind::Contract(info) => Some(info),
            _ => None,
        }
    }

    /// Scope that type names and contract members are searched from
    pub fn contract_scope(&self) -> ScopeId {
        self.contract_info().map_or(self.global, |info| info.scope)
    }

    pub fn function(&self, id: SymbolId) -> Option<&FunctionInfo> {
        match &self.symbol(id).kind {
            SymbolKind::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn function_mut(&mut self, id: SymbolId) -> Option<&mut FunctionInfo> {
        match &mut self.symbol_mut(id).kind {
            SymbolKind::Function(info) => Some(info),
            _ => None,
        }
    }

    /// Record the resolved type of a field, parameter or local variable
    pub fn set_value_type(&mut self, id: SymbolId, resolved: SymbolId) {
        match &mut self.symbol_mut(id).kind {
            SymbolKind::Field { ty } | SymbolKind::Parameter { ty } | SymbolKind::Local { ty, .. } => {
                *ty = Some(resolved);
            }
            _ => {}
        }
    }

    pub fn value_type(&self, id: SymbolId) -> Option<SymbolId> {
        self.symbol(id).kind.value_type()
    }

    /// Whether a local variable may be referenced from `stmt`
    pub fn is_visible_in(&self, local: SymbolId, stmt: NodeId) -> bool {
        match &self.symbol(local).kind {
            SymbolKind::Local { visibility, .. } => visibility.contains(&stmt),
            _ => true,
        }
    }

    // ==================== Lookup ====================

    /// First declaration named `name` in `scope` or its enclosing scopes
    pub fn find(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let name = self.interner.get(name)?;
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(found) = scope.lookup_local(name) {
                return Some(found);
            }
            current = scope.parent;
        }
        None
    }

    /// Every direct declaration of `scope` named `name`
    pub fn find_in(&self, scope: ScopeId, name: &str) -> Vec<SymbolId> {
        match self.interner.get(name) {
            Some(name) => self.scope(scope).lookup_all(name).collect(),
            None => Vec::new(),
        }
    }

    /// Resolve a type annotation to a type symbol
    ///
    /// Named types are searched from the contract scope. Array and map
    /// annotations are interned, so equal shapes yield the same symbol.
    pub fn find_type_by_name(&mut self, ty: &TypeName) -> Option<SymbolId> {
        match &ty.kind {
            TypeNameKind::Named(name) => {
                let found = self.find(self.contract_scope(), name)?;
                self.symbol(found).kind.is_type().then_some(found)
            }
            TypeNameKind::Array(element) => {
                let element = self.find_type_by_name(element)?;
                Some(self.array_type(element))
            }
            TypeNameKind::Map { key, value } => {
                let key = self.find_type_by_name(key)?;
                let value = self.find_type_by_name(value)?;
                Some(self.map_type(key, value))
            }
            TypeNameKind::Void => None,
        }
    }

    pub fn array_type(&mut self, element: SymbolId) -> SymbolId {
        if let Some(&id) = self.array_types.get(&element) {
            return id;
        }
        let name = format!("{}[]", self.type_name(element));
        let id = self.add_symbol(self.global, &name, Span::default(), SymbolKind::Array { element });
        self.array_types.insert(element, id);
        id
    }

    pub fn map_type(&mut self, key: SymbolId, value: SymbolId) -> SymbolId {
        if let Some(&id) = self.map_types.get(&(key, value)) {
            return id;
        }
        let name = format!("mapping({} => {})", self.type_name(key), self.type_name(value));
        let id = self.add_symbol(self.global, &name, Span::default(), SymbolKind::Map { key, value });
        self.map_types.insert((key, value), id);
        id
    }

    /// Element type if `ty` is an array type
    pub fn element_type(&self, ty: SymbolId) -> Option<SymbolId> {
        match self.symbol(ty).kind {
            SymbolKind::Array { element } => Some(element),
            _ => None,
        }
    }

    pub fn type_name(&self, ty: SymbolId) -> &str {
        self.name_of(ty)
    }

    // ==================== Node associations ====================

    /// Link a declaration node and the symbol it produced
    pub fn associate(&mut self, node: NodeId, symbol: SymbolId) {
        self.node_symbols.insert(node, symbol);
        self.symbol_nodes.insert(symbol, node);
    }

    pub fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    pub fn node_of(&self, symbol: SymbolId) -> Option<NodeId> {
        self.symbol_nodes.get(&symbol).copied()
    }

    /// Record what a designator node refers to
    pub fn bind_designator(&mut self, node: NodeId, symbol: SymbolId) {
        self.designators.insert(node, symbol);
    }

    pub fn declaration_of(&self, node: NodeId) -> Option<SymbolId> {
        self.designators.get(&node).copied()
    }

    pub fn designator_bindings(&self) -> &HashMap<NodeId, SymbolId> {
        &self.designators
    }

    /// Record the type of an expression or designator node
    pub fn annotate_type(&mut self, node: NodeId, ty: SymbolId) {
        self.expr_types.insert(node, ty);
    }

    pub fn type_of(&self, node: NodeId) -> Option<SymbolId> {
        self.expr_types.get(&node).copied()
    }

    pub fn expression_types(&self) -> &HashMap<NodeId, SymbolId> {
        &self.expr_types
    }

    /// Statements a local variable is visible in, empty for other symbols
    pub fn visibility(&self, local: SymbolId) -> HashSet<NodeId> {
        match &self.symbol(local).kind {
            SymbolKind::Local { visibility, .. } => visibility.clone(),
            _ => HashSet::new(),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.symbols.len())
            .field("scopes", &self.scopes.len())
            .field("designators", &self.designators.len())
            .field("expr_types", &self.expr_types.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, scope) in self.scopes() {
            let owner = scope.owner.map_or("<global>", |o| self.name_of(o));
            writeln!(f, "scope {} {:?} {}", id.to_raw(), scope.kind, owner)?;
            for sym in scope.declarations() {
                let symbol = self.symbol(sym);
                write!(f, "  {} {}", symbol.kind.describe(), self.name_of(sym))?;
                match &symbol.kind {
                    SymbolKind::Function(info) => {
                        let returns: Vec<_> = info.returns.iter().map(|r| self.type_name(*r)).collect();
                        write!(f, " -> ({})", returns.join(", "))?;
                    }
                    kind => {
                        if let Some(ty) = kind.value_type() {
                            write!(f, ": {}", self.type_name(ty))?;
                        }
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
