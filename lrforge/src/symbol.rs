//! Grammar symbols and their registry.
//!
//! The [`SymbolTable`] owns every terminal and nonterminal of a grammar and
//! hands out dense [`SymbolId`] indices. Everything else (sequences, rules,
//! items, states) refers to symbols by id only, so the registry must outlive
//! the grammars built on it; [`Grammar`](crate::Grammar) borrows it for that
//! reason.

use crate::token::TokenKind;
use crate::ConfigError;
use indexmap::IndexMap;
use smartstring::alias::String;
use std::fmt;

/// The most symbols a single registry may hold, including the two it
/// pre-registers.
pub const MAX_SYMBOLS: usize = 64;

/// Dense index of a symbol within its [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u8);

impl SymbolId {
    /// The pre-registered end-of-input terminal.
    pub const END: SymbolId = SymbolId(0);
    /// The pre-registered synthetic start nonterminal.
    pub const START: SymbolId = SymbolId(1);

    /// # Panics
    /// If `index` is not below [`MAX_SYMBOLS`].
    #[inline]
    pub fn new(index: usize) -> Self {
        assert!(index < MAX_SYMBOLS, "symbol index {} out of range", index);
        SymbolId(index as u8)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<SymbolId> for usize {
    fn from(id: SymbolId) -> Self {
        id.index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// A token kind; carries the token type id.
    Terminal(u32),
    NonTerminal,
}

/// A registered symbol: display name plus kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal(_))
    }

    /// Token type id of a terminal.
    pub fn terminal_type(&self) -> Option<u32> {
        match self.kind {
            SymbolKind::Terminal(t) => Some(t),
            SymbolKind::NonTerminal => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Append-only registry of grammar symbols.
///
/// Names are unique: registering a name again with the same kind returns the
/// existing id, with another kind it is an error. Index 0 is always the
/// end-of-input terminal and index 1 the synthetic start nonterminal.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    by_name: IndexMap<String, Symbol>,
    by_type: IndexMap<u32, SymbolId>,
}

impl SymbolTable {
    pub const START_NAME: &'static str = "$start";

    pub fn new() -> Self {
        let mut tab = Self {
            by_name: IndexMap::new(),
            by_type: IndexMap::new(),
        };
        let end = TokenKind::End;
        tab.insert(end.name().into(), SymbolKind::Terminal(end.type_id()));
        tab.insert(Self::START_NAME.into(), SymbolKind::NonTerminal);
        tab
    }

    /// Registers the terminal for token type `ttype` under its default
    /// display name.
    pub fn terminal(&mut self, ttype: u32) -> Result<SymbolId, ConfigError> {
        self.terminal_named(ttype, &default_name(ttype))
    }

    /// Registers the terminal for token type `ttype` with an explicit
    /// display name.
    pub fn terminal_named(&mut self, ttype: u32, name: &str) -> Result<SymbolId, ConfigError> {
        if let Some(&id) = self.by_type.get(&ttype) {
            return if self.name(id) == name {
                Ok(id)
            } else {
                Err(ConfigError::DuplicateSymbol { name: name.into() })
            };
        }
        self.register(name, SymbolKind::Terminal(ttype))
    }

    pub fn nonterminal(&mut self, name: &str) -> Result<SymbolId, ConfigError> {
        self.register(name, SymbolKind::NonTerminal)
    }

    fn register(&mut self, name: &str, kind: SymbolKind) -> Result<SymbolId, ConfigError> {
        if let Some((index, _, sym)) = self.by_name.get_full(name) {
            return if sym.kind == kind {
                Ok(SymbolId::new(index))
            } else {
                Err(ConfigError::DuplicateSymbol { name: name.into() })
            };
        }
        if self.by_name.len() >= MAX_SYMBOLS {
            return Err(ConfigError::TooManySymbols { max: MAX_SYMBOLS });
        }
        Ok(self.insert(name.into(), kind))
    }

    fn insert(&mut self, name: String, kind: SymbolKind) -> SymbolId {
        let id = SymbolId::new(self.by_name.len());
        if let SymbolKind::Terminal(ttype) = kind {
            self.by_type.insert(ttype, id);
        }
        log::trace!("symbol {} = {:?} {:?}", id.index(), name, kind);
        self.by_name.insert(name.clone(), Symbol { name, kind });
        id
    }

    /// # Panics
    /// If `id` was not issued by this table.
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.by_name[id.index()]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).name()
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.get(id).is_terminal()
    }

    /// Terminal registered for a token type.
    pub fn by_type(&self, ttype: u32) -> Option<SymbolId> {
        self.by_type.get(&ttype).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get_index_of(name).map(SymbolId::new)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.by_name
            .values()
            .enumerate()
            .map(|(i, sym)| (SymbolId::new(i), sym))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

fn default_name(ttype: u32) -> String {
    if let Some(kind) = TokenKind::from_type_id(ttype) {
        return kind.name().into();
    }
    match char::from_u32(ttype) {
        Some(ch) if ttype < crate::token::FIRST_KIND_TYPE => {
            let mut s = String::new();
            s.push(ch);
            s
        }
        _ => format!("t{}", ttype).into(),
    }
}
