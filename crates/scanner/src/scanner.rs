use sqlsight_helpers::ChunkedVec;

use crate::error::ScanError;
use crate::keywords::Keyword;
use crate::location::Location;
use crate::name::{NameRegistry, NameTags};
use crate::token::{Comparison, Operator, Symbol, SymbolKind};

/// Two sentinel bytes conceptually appended past the user's text, per the
/// scanner's data model. Rust slices don't need a physical sentinel to be
/// memory-safe, so this is tracked only as a length used to clamp
/// [`ScannedScript::find_symbol`] queries.
pub const SENTINEL_LEN: u32 = 2;

/// The output of [`scan`]: everything downstream stages need and nothing
/// that requires re-lexing to recover (line breaks, comments, a restartable
/// symbol stream, and the script's name registry).
#[derive(Debug, Clone)]
pub struct ScannedScript {
    text: String,
    pub errors: Vec<ScanError>,
    pub line_breaks: Vec<Location>,
    pub comments: Vec<Location>,
    pub names: NameRegistry,
    symbols: ChunkedVec<Symbol>,
}

impl ScannedScript {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbol(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn read_text_at(&self, location: Location) -> &str {
        &self.text[location.offset as usize..location.end() as usize]
    }

    /// Maps a byte offset to the last symbol whose location begins at or
    /// before that offset, plus the offset's position relative to it.
    /// Offsets past the end of the user text are clamped to
    /// `text.len() - SENTINEL_LEN` to skip the sentinel region.
    pub fn find_symbol(&self, text_offset: u32) -> LocationInfo {
        let clamp = (self.text.len() as u32).saturating_sub(SENTINEL_LEN);
        let offset = text_offset.min(clamp);

        if self.symbols.is_empty() {
            return LocationInfo {
                symbol_index: None,
                relative_position: crate::location::RelativePosition::NewSymbolAfter,
                at_eof: true,
            };
        }

        // Index of the last symbol starting at or before `offset`.
        let mut idx = self
            .symbols
            .partition_point_by_chunk(|sym| sym.location.offset <= offset);
        // partition_point_by_chunk returns the index of the first element
        // that does NOT satisfy the predicate; step back one to land on
        // the last satisfying element.
        if idx == 0 {
            let first = &self.symbols[0];
            let relative_position = if offset < first.location.offset {
                crate::location::RelativePosition::NewSymbolBefore
            } else if offset == first.location.offset {
                crate::location::RelativePosition::BeginOfSymbol
            } else {
                crate::location::RelativePosition::MidOfSymbol
            };
            return LocationInfo {
                symbol_index: Some(0),
                relative_position,
                at_eof: matches!(first.kind, SymbolKind::EndOfFile),
            };
        }
        idx -= 1;
        let symbol = &self.symbols[idx];
        let relative_position = if offset == symbol.location.offset {
            crate::location::RelativePosition::BeginOfSymbol
        } else if offset == symbol.location.end() {
            crate::location::RelativePosition::EndOfSymbol
        } else if offset < symbol.location.end() {
            crate::location::RelativePosition::MidOfSymbol
        } else {
            crate::location::RelativePosition::NewSymbolAfter
        };
        LocationInfo {
            symbol_index: Some(idx),
            relative_position,
            at_eof: matches!(symbol.kind, SymbolKind::EndOfFile),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationInfo {
    pub symbol_index: Option<usize>,
    pub relative_position: crate::location::RelativePosition,
    pub at_eof: bool,
}

/// One raw lexical element, before whitespace/comments are split off into
/// side lists and keywords are promoted using one token of lookahead.
struct RawToken {
    kind: SymbolKind,
    location: Location,
    keyword: Option<Keyword>,
}

/// Scans `text`, producing a restartable symbol stream plus a name
/// registry. Lexical errors are collected but never abort scanning.
pub fn scan(text: &str) -> ScannedScript {
    log::debug!("scanning script of {} bytes", text.len());
    let mut names = NameRegistry::new();
    let mut errors = Vec::new();
    let mut line_breaks = Vec::new();
    let mut comments = Vec::new();
    let mut raw: Vec<RawToken> = Vec::new();

    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut pos = 0usize;
    let mut fold_buf = String::with_capacity(64);

    while pos < len {
        let ch = bytes[pos] as char;

        if ch == '\n' {
            line_breaks.push(Location::new(pos as u32, 1));
            pos += 1;
            continue;
        }
        if ch.is_whitespace() {
            pos += 1;
            continue;
        }
        if ch == '-' && bytes.get(pos + 1) == Some(&b'-') {
            let start = pos;
            while pos < len && bytes[pos] != b'\n' {
                pos += 1;
            }
            comments.push(Location::new(start as u32, (pos - start) as u32));
            continue;
        }
        if ch == '/' && bytes.get(pos + 1) == Some(&b'*') {
            let start = pos;
            pos += 2;
            while pos < len && !(bytes[pos] == b'*' && bytes.get(pos + 1) == Some(&b'/')) {
                pos += 1;
            }
            let end = (pos + 2).min(len);
            comments.push(Location::new(start as u32, (end - start) as u32));
            pos = end;
            continue;
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = pos;
            fold_buf.clear();
            while pos < len {
                let c = bytes[pos] as char;
                if c.is_ascii_alphanumeric() || c == '_' {
                    fold_buf.push(c.to_ascii_lowercase());
                    pos += 1;
                } else {
                    break;
                }
            }
            let location = Location::new(start as u32, (pos - start) as u32);
            let raw_text = &text[start..pos];
            if let Some(keyword) = Keyword::from_folded(&fold_buf) {
                // Keywords are also registered under their exact spelling,
                // tagged `KEYWORD`, so the parser can accept one where an
                // identifier is grammatically legal (e.g. a column named
                // `key`) and later resolution can still look its text up.
                names.register(raw_text, location, NameTags::KEYWORD);
                raw.push(RawToken {
                    kind: SymbolKind::Keyword(keyword),
                    location,
                    keyword: Some(keyword),
                });
            } else {
                let id = names.register(raw_text, location, NameTags::empty());
                raw.push(RawToken {
                    kind: SymbolKind::Identifier(id),
                    location,
                    keyword: None,
                });
            }
            continue;
        }
        if ch == '"' {
            let start = pos;
            pos += 1;
            while pos < len && bytes[pos] != b'"' {
                pos += 1;
            }
            let closed = pos < len;
            if closed {
                pos += 1;
            } else {
                errors.push(ScanError::new(
                    "unterminated quoted identifier",
                    Location::new(start as u32, (pos - start) as u32),
                ));
            }
            let inner_start = start + 1;
            let inner_end = if closed { pos - 1 } else { pos };
            let inner = text[inner_start..inner_end].trim();
            let location = Location::new(start as u32, (pos - start) as u32);
            let id = names.register(inner, location, NameTags::empty());
            raw.push(RawToken {
                kind: SymbolKind::Identifier(id),
                location,
                keyword: None,
            });
            continue;
        }
        if ch == '\'' {
            let start = pos;
            pos += 1;
            while pos < len && bytes[pos] != b'\'' {
                pos += 1;
            }
            if pos < len {
                pos += 1;
            } else {
                errors.push(ScanError::new(
                    "unterminated string literal",
                    Location::new(start as u32, (pos - start) as u32),
                ));
            }
            let end = trim_trailing_whitespace_end(text, start, pos);
            raw.push(RawToken {
                kind: SymbolKind::StringLiteral,
                location: Location::new(start as u32, (end - start) as u32),
                keyword: None,
            });
            continue;
        }
        if ch.is_ascii_digit() {
            let start = pos;
            while pos < len && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                pos += 1;
            }
            let end = trim_trailing_whitespace_end(text, start, pos);
            raw.push(RawToken {
                kind: SymbolKind::NumericLiteral,
                location: Location::new(start as u32, (end - start) as u32),
                keyword: None,
            });
            continue;
        }

        let (kind, width) = match ch {
            '.' => (SymbolKind::Dot, 1),
            ',' => (SymbolKind::Comma, 1),
            '(' => (SymbolKind::LParen, 1),
            ')' => (SymbolKind::RParen, 1),
            ';' => (SymbolKind::Semicolon, 1),
            '+' => (SymbolKind::Operator(Operator::Plus), 1),
            '-' => (SymbolKind::Operator(Operator::Minus), 1),
            '*' => (SymbolKind::Operator(Operator::Star), 1),
            '/' => (SymbolKind::Operator(Operator::Slash), 1),
            '%' => (SymbolKind::Operator(Operator::Percent), 1),
            '=' => (SymbolKind::Operator(Operator::Comparison(Comparison::Equal)), 1),
            '<' => match bytes.get(pos + 1) {
                Some(b'=') => (
                    SymbolKind::Operator(Operator::Comparison(Comparison::LessEqual)),
                    2,
                ),
                Some(b'>') => (
                    SymbolKind::Operator(Operator::Comparison(Comparison::NotEqual)),
                    2,
                ),
                _ => (SymbolKind::Operator(Operator::Comparison(Comparison::Less)), 1),
            },
            '>' => match bytes.get(pos + 1) {
                Some(b'=') => (
                    SymbolKind::Operator(Operator::Comparison(Comparison::GreaterEqual)),
                    2,
                ),
                _ => (
                    SymbolKind::Operator(Operator::Comparison(Comparison::Greater)),
                    1,
                ),
            },
            '!' if bytes.get(pos + 1) == Some(&b'=') => (
                SymbolKind::Operator(Operator::Comparison(Comparison::NotEqual)),
                2,
            ),
            _ => {
                errors.push(ScanError::new(
                    format!("unexpected character '{ch}'"),
                    Location::at(pos as u32),
                ));
                (SymbolKind::Unlexable, ch.len_utf8())
            }
        };
        raw.push(RawToken {
            kind,
            location: Location::new(pos as u32, width as u32),
            keyword: None,
        });
        pos += width;
    }

    let mut symbols = ChunkedVec::new();
    for i in 0..raw.len() {
        let kind = match raw[i].keyword {
            Some(keyword) => {
                let next_keyword = raw[i + 1..].iter().find_map(|t| t.keyword);
                SymbolKind::Keyword(keyword.promote(next_keyword))
            }
            None => raw[i].kind,
        };
        symbols.push(Symbol::new(kind, raw[i].location));
    }
    let eof_offset = len as u32;
    symbols.push(Symbol::new(SymbolKind::EndOfFile, Location::at(eof_offset)));

    ScannedScript {
        text: text.to_owned(),
        errors,
        line_breaks,
        comments,
        names,
        symbols,
    }
}

fn trim_trailing_whitespace_end(text: &str, start: usize, end: usize) -> usize {
    let mut e = end;
    while e > start && text.as_bytes()[e - 1].is_ascii_whitespace() {
        e -= 1;
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::RelativePosition;

    #[test]
    fn scans_simple_select() {
        let scanned = scan("select a from t");
        let kinds: Vec<_> = scanned.symbols().map(|s| s.kind).collect();
        assert!(matches!(kinds[0], SymbolKind::Keyword(Keyword::Select)));
        assert!(matches!(kinds[1], SymbolKind::Identifier(_)));
        assert!(matches!(kinds[2], SymbolKind::Keyword(Keyword::From)));
        assert!(matches!(kinds[3], SymbolKind::Identifier(_)));
        assert!(matches!(kinds.last().unwrap(), SymbolKind::EndOfFile));
    }

    #[test]
    fn promotes_not_between() {
        let scanned = scan("where a not between 1 and 2");
        let kinds: Vec<_> = scanned.symbols().map(|s| s.kind).collect();
        assert!(matches!(
            kinds[2],
            SymbolKind::Keyword(Keyword::NotLookahead)
        ));
    }

    #[test]
    fn quoted_identifier_trims_quotes_and_whitespace() {
        let scanned = scan(r#"select "My Col" from t"#);
        let name = scanned.names.iter().find(|n| n.text() == "My Col");
        assert!(name.is_some());
    }

    #[test]
    fn find_symbol_reports_relative_position() {
        let scanned = scan("select a");
        let info = scanned.find_symbol(0);
        assert_eq!(info.relative_position, RelativePosition::BeginOfSymbol);

        let info_mid = scanned.find_symbol(2);
        assert_eq!(info_mid.relative_position, RelativePosition::MidOfSymbol);

        let info_after = scanned.find_symbol(6);
        // offset 6 is the space between "select" and "a" -> after token 0
        assert_eq!(info_after.relative_position, RelativePosition::EndOfSymbol);
    }

    #[test]
    fn find_symbol_clamps_past_sentinel() {
        let scanned = scan("a");
        let far = scanned.find_symbol(10_000);
        assert!(far.symbol_index.is_some());
    }

    #[test]
    fn unlexable_character_is_recorded_but_scanning_continues() {
        let scanned = scan("select a ? from t");
        assert_eq!(scanned.errors.len(), 1);
        let kinds: Vec<_> = scanned.symbols().map(|s| s.kind).collect();
        assert!(matches!(kinds.last().unwrap(), SymbolKind::EndOfFile));
    }
}
