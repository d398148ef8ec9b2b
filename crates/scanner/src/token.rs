use crate::keywords::Keyword;
use crate::location::Location;
use crate::name::NameId;

/// The comparison family recognized by the analyzer's query-graph step
/// (see `sqlsight_analyzer::query_graph`). Kept narrow on purpose: only
/// equality/inequality and ordering comparisons produce join-graph edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    Comparison(Comparison),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolKind {
    Keyword(Keyword),
    Identifier(NameId),
    NumericLiteral,
    StringLiteral,
    HexLiteral,
    BitLiteral,
    Dot,
    Comma,
    LParen,
    RParen,
    Semicolon,
    Operator(Operator),
    Whitespace,
    Comment,
    Newline,
    Unlexable,
    EndOfFile,
}

impl SymbolKind {
    /// Structural punctuators that short-circuit completion: commas,
    /// brackets, statement terminators, arithmetic and comparison
    /// operators.
    pub const fn is_structural_punctuator(self) -> bool {
        matches!(
            self,
            SymbolKind::Comma
                | SymbolKind::LParen
                | SymbolKind::RParen
                | SymbolKind::Semicolon
                | SymbolKind::Operator(_)
        )
    }

    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            SymbolKind::Whitespace | SymbolKind::Comment | SymbolKind::Newline
        )
    }

    pub const fn is_dot(self) -> bool {
        matches!(self, SymbolKind::Dot)
    }

    pub const fn is_identifier_like(self) -> bool {
        matches!(self, SymbolKind::Identifier(_))
            || matches!(self, SymbolKind::Keyword(k) if !k.is_scope_introducing())
    }
}

/// A single lexical token: a kind plus its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol {
    pub kind: SymbolKind,
    pub location: Location,
}

impl Symbol {
    pub const fn new(kind: SymbolKind, location: Location) -> Self {
        Self { kind, location }
    }
}
