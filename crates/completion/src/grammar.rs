//! Keyword lookahead for the cursor's enclosing grammar position.
//!
//! A true restartable parse would re-run the parser from the cursor and
//! collect every [`sqlsight_ast::ExpectedSymbol`] it accepted along the
//! way. Nothing here does that; instead each clause/expression node type
//! carries a fixed table of the keywords that can legally follow it, read
//! straight off the grammar the internal parser implements. This covers
//! every position the parser itself understands and degrades to "no
//! keyword expected" elsewhere, which just means fewer suggestions, not a
//! wrong one.

use sqlsight_ast::{Ast, NodeId, NodeType};
use sqlsight_scanner::Keyword;

use crate::cursor::ScriptCursor;

/// Keywords legal to type at the cursor, nearest grammar context first.
/// Never empty unless the cursor sits mid-identifier with nothing left to
/// structure.
pub fn expected_keywords(cursor: &ScriptCursor, ast: &Ast) -> Vec<Keyword> {
    for &ancestor in cursor.path_to_root.iter().rev() {
        let keywords = keywords_for(ast, ancestor);
        if !keywords.is_empty() {
            return keywords;
        }
    }
    vec![Keyword::Select, Keyword::Create]
}

fn keywords_for(ast: &Ast, node: NodeId) -> Vec<Keyword> {
    match ast.node(node).node_type {
        NodeType::SelectClause | NodeType::SelectClauseElement | NodeType::Star => {
            vec![Keyword::As, Keyword::From]
        }
        NodeType::FromClause | NodeType::FromItem | NodeType::TableRef => vec![
            Keyword::As,
            Keyword::Join,
            Keyword::Inner,
            Keyword::Left,
            Keyword::Right,
            Keyword::Full,
            Keyword::On,
            Keyword::Where,
        ],
        NodeType::WhereClause | NodeType::AndExpression | NodeType::OrExpression | NodeType::ComparisonExpression => {
            vec![Keyword::And, Keyword::Or]
        }
        NodeType::ColumnDefList | NodeType::ColumnDef | NodeType::TypeName => {
            vec![Keyword::Not, Keyword::Default, Keyword::Primary, Keyword::Unique]
        }
        NodeType::CreateTableStatement => vec![Keyword::As],
        _ => Vec::new(),
    }
}

/// Canonical lower-case SQL spelling of a keyword, used as completion
/// candidate text.
pub fn keyword_text(keyword: Keyword) -> String {
    keyword.to_string().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsight_analyzer::{analyze, NameDefaults};
    use sqlsight_ast::parse;
    use sqlsight_catalog::{Catalog, EntryId};
    use sqlsight_scanner::scan;

    use crate::cursor::build_cursor;

    #[test]
    fn after_select_list_expects_from() {
        let sql = "select a from orders";
        let mut scanned = scan(sql);
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        let mut catalog = Catalog::new();
        let analyzed = analyze(&mut scanned, &ast, &mut catalog, EntryId::new(0), &NameDefaults::default());
        let offset = sql.find('a').unwrap() as u32 + 1;
        let cursor = build_cursor(&scanned, &ast, &analyzed, offset).unwrap();
        let keywords = expected_keywords(&cursor, &ast);
        assert!(keywords.contains(&Keyword::From));
    }

    #[test]
    fn inside_where_clause_expects_and_or() {
        let sql = "select a from orders where a = 1";
        let mut scanned = scan(sql);
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        let mut catalog = Catalog::new();
        let analyzed = analyze(&mut scanned, &ast, &mut catalog, EntryId::new(0), &NameDefaults::default());
        let offset = sql.len() as u32;
        let cursor = build_cursor(&scanned, &ast, &analyzed, offset).unwrap();
        let keywords = expected_keywords(&cursor, &ast);
        assert!(keywords.contains(&Keyword::And));
        assert!(keywords.contains(&Keyword::Or));
    }

    #[test]
    fn keyword_text_is_lowercased() {
        assert_eq!(keyword_text(Keyword::Select), "select");
    }
}
