use sqlsight_scanner::{Keyword, Location, ScannedScript, Symbol, SymbolKind};

use crate::builder::AstBuilder;
use crate::error::ParseError;
use crate::node::{Attribute, NodeId, NodeType, StatementKind};
use crate::tree::Ast;

/// Parses every statement in `scanned`, producing a flat [`Ast`] and the
/// recoverable errors encountered along the way. A statement that fails to
/// parse contributes no nodes to the tree; the parser resynchronizes at the
/// next `;` (or end of file) and keeps going.
pub fn parse(scanned: &ScannedScript) -> (Ast, Vec<ParseError>) {
    let mut parser = Parser::new(scanned);
    parser.parse_script();
    (parser.builder.build(), parser.errors)
}

struct Parser<'a> {
    scanned: &'a ScannedScript,
    pos: usize,
    builder: AstBuilder,
    errors: Vec<ParseError>,
}

type PResult<T> = Result<T, ParseError>;

impl<'a> Parser<'a> {
    fn new(scanned: &'a ScannedScript) -> Self {
        Self {
            scanned,
            pos: 0,
            builder: AstBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn parse_script(&mut self) {
        loop {
            self.skip_semicolons();
            if self.at_eof() {
                break;
            }
            let nodes_begin = self.builder.next_node_index();
            let children_begin = self.builder.next_child_index();
            match self.parse_statement() {
                Ok((root, kind)) => self.builder.finish_statement(kind, root, nodes_begin),
                Err(err) => {
                    self.builder.truncate_to(nodes_begin, children_begin);
                    self.errors.push(err);
                    self.resynchronize();
                }
            }
        }
    }

    /// Skips tokens up to and including the next `;`, or to end of file.
    fn resynchronize(&mut self) {
        while !self.at_eof() {
            let was_semicolon = matches!(self.peek_kind(), Some(SymbolKind::Semicolon));
            self.pos += 1;
            if was_semicolon {
                break;
            }
        }
    }

    fn skip_semicolons(&mut self) {
        while matches!(self.peek_kind(), Some(SymbolKind::Semicolon)) {
            self.pos += 1;
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), Some(SymbolKind::EndOfFile) | None)
    }

    fn peek(&self) -> Option<&'a Symbol> {
        self.scanned.symbol(self.pos)
    }

    fn peek_kind(&self) -> Option<SymbolKind> {
        self.peek().map(|s| s.kind)
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        match self.peek_kind() {
            Some(SymbolKind::Keyword(k)) => Some(k),
            _ => None,
        }
    }

    fn current_location(&self) -> Location {
        self.peek().map(|s| s.location).unwrap_or_default()
    }

    fn bump(&mut self) -> Symbol {
        let symbol = *self.peek().expect("bump called at end of stream");
        self.pos += 1;
        symbol
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek_keyword() == Some(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> PResult<Location> {
        if self.peek_keyword() == Some(keyword) {
            Ok(self.bump().location)
        } else {
            Err(self.error(format!("expected '{keyword}'")))
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current_location())
    }

    fn span_from(&self, start: Location) -> Location {
        let end = if self.pos == 0 {
            start.end()
        } else {
            self.scanned
                .symbol(self.pos - 1)
                .map(|s| s.location.end())
                .unwrap_or(start.end())
        };
        Location::new(start.offset, end.saturating_sub(start.offset))
    }

    // ---- statements ----------------------------------------------------

    fn parse_statement(&mut self) -> PResult<(NodeId, StatementKind)> {
        match self.peek_keyword() {
            Some(Keyword::Select) => {
                let node = self.parse_select_statement()?;
                Ok((node, StatementKind::Select))
            }
            Some(Keyword::Create) => self.parse_create_statement(),
            _ => Err(self.error("expected a statement ('SELECT' or 'CREATE TABLE')")),
        }
    }

    fn parse_select_statement(&mut self) -> PResult<NodeId> {
        let start = self.expect_keyword(Keyword::Select)?;
        self.eat_keyword(Keyword::Distinct);

        let select_clause = self.parse_select_clause()?;
        let mut children = vec![select_clause];

        if self.eat_keyword(Keyword::From) {
            children.push(self.parse_from_clause()?);
        }
        if self.eat_keyword(Keyword::Where) {
            children.push(self.parse_where_clause()?);
        }

        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::SelectStatement, location, Attribute::None, &children))
    }

    fn parse_create_statement(&mut self) -> PResult<(NodeId, StatementKind)> {
        let start = self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;
        if self.eat_keyword(Keyword::If) {
            if !self.eat_keyword(Keyword::Not) {
                return Err(self.error("expected 'NOT' after 'IF'"));
            }
            if !self.eat_keyword(Keyword::Exists) {
                return Err(self.error("expected 'EXISTS' after 'IF NOT'"));
            }
        }

        let table_ref = self.parse_qualified_table_name(false)?;

        if self.eat_keyword(Keyword::As) {
            let select = self.parse_select_statement()?;
            let location = self.span_from(start);
            let node = self.builder.push_parent(
                NodeType::CreateTableAsStatement,
                location,
                Attribute::None,
                &[table_ref, select],
            );
            return Ok((node, StatementKind::CreateTableAs));
        }

        let columns = self.parse_column_def_list()?;
        let location = self.span_from(start);
        let node = self.builder.push_parent(
            NodeType::CreateTableStatement,
            location,
            Attribute::None,
            &[table_ref, columns],
        );
        Ok((node, StatementKind::CreateTable))
    }

    // ---- select list -----------------------------------------------------

    fn parse_select_clause(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        let mut children = vec![self.parse_select_clause_element()?];
        while matches!(self.peek_kind(), Some(SymbolKind::Comma)) {
            self.bump();
            children.push(self.parse_select_clause_element()?);
        }
        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::SelectClause, location, Attribute::None, &children))
    }

    fn parse_select_clause_element(&mut self) -> PResult<NodeId> {
        let start = self.current_location();

        if matches!(self.peek_kind(), Some(SymbolKind::Operator(sqlsight_scanner::Operator::Star))) {
            let star = self.bump();
            let star_node = self.builder.push_leaf(NodeType::Star, star.location, Attribute::None);
            return Ok(self.builder.push_parent(
                NodeType::SelectClauseElement,
                star.location,
                Attribute::None,
                &[star_node],
            ));
        }

        let expr = self.parse_scalar_expression()?;
        let mut children = vec![expr];
        if self.eat_keyword(Keyword::As) {
            children.push(self.parse_alias()?);
        }
        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::SelectClauseElement, location, Attribute::None, &children))
    }

    fn parse_alias(&mut self) -> PResult<NodeId> {
        let (name, location) = self.expect_name()?;
        Ok(self.builder.push_leaf(NodeType::Alias, location, Attribute::Name(name)))
    }

    // ---- from / join -------------------------------------------------------

    fn parse_from_clause(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        let mut children = vec![self.parse_from_item(false)?];

        loop {
            if matches!(self.peek_kind(), Some(SymbolKind::Comma)) {
                self.bump();
                children.push(self.parse_from_item(false)?);
                continue;
            }
            if let Some(join_kind) = self.peek_join_keyword() {
                self.consume_join_keyword(join_kind);
                children.push(self.parse_from_item(true)?);
                continue;
            }
            break;
        }

        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::FromClause, location, Attribute::None, &children))
    }

    fn peek_join_keyword(&self) -> Option<Keyword> {
        match self.peek_keyword() {
            Some(k @ (Keyword::Inner | Keyword::Left | Keyword::Right | Keyword::Full | Keyword::Join)) => Some(k),
            _ => None,
        }
    }

    fn consume_join_keyword(&mut self, first: Keyword) {
        if first != Keyword::Join {
            self.bump();
        }
        self.eat_keyword(Keyword::Join);
    }

    fn parse_from_item(&mut self, joined: bool) -> PResult<NodeId> {
        let start = self.current_location();
        let table_ref = self.parse_qualified_table_name(true)?;
        let mut children = vec![table_ref];

        if joined && self.eat_keyword(Keyword::On) {
            children.push(self.parse_condition_expression()?);
        }

        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::FromItem, location, Attribute::None, &children))
    }

    /// Parses a `[db.][schema.]name` path, optionally followed by an alias
    /// (`AS name`, or a bare trailing identifier).
    fn parse_qualified_table_name(&mut self, allow_alias: bool) -> PResult<NodeId> {
        let start = self.current_location();
        let mut children = self.parse_name_path()?;

        if allow_alias {
            if self.eat_keyword(Keyword::As) {
                children.push(self.parse_alias()?);
            } else if matches!(self.peek_kind(), Some(SymbolKind::Identifier(_))) {
                children.push(self.parse_alias()?);
            }
        }

        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::TableRef, location, Attribute::None, &children))
    }

    /// Parses `name[.name[.name]]`, returning one `NamePathComponent` leaf
    /// per segment.
    fn parse_name_path(&mut self) -> PResult<Vec<NodeId>> {
        let mut parts = Vec::with_capacity(3);
        let (first, loc) = self.expect_name()?;
        parts.push(
            self.builder
                .push_leaf(NodeType::NamePathComponent, loc, Attribute::Name(first)),
        );
        while matches!(self.peek_kind(), Some(SymbolKind::Dot)) && parts.len() < 3 {
            self.bump();
            let (name, loc) = self.expect_name()?;
            parts.push(
                self.builder
                    .push_leaf(NodeType::NamePathComponent, loc, Attribute::Name(name)),
            );
        }
        Ok(parts)
    }

    /// Any identifier, or a non-reserved keyword used where an identifier
    /// is grammatically legal (e.g. a column literally named `key`).
    /// Clause-structuring keywords (`FROM`, `WHERE`, `AND`, ...) are never
    /// accepted here, even though the scanner tags them as identifier-like,
    /// since treating them as names would silently swallow malformed
    /// clauses instead of reporting them.
    fn expect_name(&mut self) -> PResult<(sqlsight_scanner::NameId, Location)> {
        match self.peek_kind() {
            Some(SymbolKind::Identifier(id)) => {
                let loc = self.bump().location;
                Ok((id, loc))
            }
            Some(SymbolKind::Keyword(k)) if k.can_be_name() => {
                let loc = self.current_location();
                let text = self.scanned.read_text_at(loc);
                self.bump();
                let id = self
                    .scanned
                    .names
                    .lookup_text(text)
                    .ok_or_else(|| ParseError::new("keyword used as name has no registry entry", loc))?;
                Ok((id, loc))
            }
            _ => Err(self.error("expected a name")),
        }
    }

    // ---- where / expressions --------------------------------------------

    fn parse_where_clause(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        let expr = self.parse_condition_expression()?;
        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::WhereClause, location, Attribute::None, &[expr]))
    }

    fn parse_condition_expression(&mut self) -> PResult<NodeId> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        let mut children = vec![self.parse_and_expression()?];
        while self.eat_keyword(Keyword::Or) {
            children.push(self.parse_and_expression()?);
        }
        if children.len() == 1 {
            return Ok(children.pop().unwrap());
        }
        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::OrExpression, location, Attribute::None, &children))
    }

    fn parse_and_expression(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        let mut children = vec![self.parse_comparison()?];
        while self.eat_keyword(Keyword::And) {
            children.push(self.parse_comparison()?);
        }
        if children.len() == 1 {
            return Ok(children.pop().unwrap());
        }
        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::AndExpression, location, Attribute::None, &children))
    }

    fn parse_comparison(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        let lhs = self.parse_operand()?;
        if let Some(SymbolKind::Operator(sqlsight_scanner::Operator::Comparison(cmp))) = self.peek_kind() {
            self.bump();
            let rhs = self.parse_operand()?;
            let location = self.span_from(start);
            return Ok(self.builder.push_parent(
                NodeType::ComparisonExpression,
                location,
                Attribute::Comparison(cmp),
                &[lhs, rhs],
            ));
        }
        Ok(lhs)
    }

    fn parse_operand(&mut self) -> PResult<NodeId> {
        match self.peek_kind() {
            Some(SymbolKind::Identifier(_)) => self.parse_column_ref(),
            Some(SymbolKind::Keyword(k)) if k.can_be_name() => self.parse_column_ref(),
            Some(SymbolKind::NumericLiteral) | Some(SymbolKind::StringLiteral) => {
                let symbol = self.bump();
                Ok(self
                    .builder
                    .push_leaf(NodeType::Literal, symbol.location, Attribute::None))
            }
            Some(SymbolKind::LParen) => {
                self.bump();
                let inner = self.parse_or_expression()?;
                if !matches!(self.peek_kind(), Some(SymbolKind::RParen)) {
                    return Err(self.error("expected ')'"));
                }
                self.bump();
                Ok(inner)
            }
            Some(
                SymbolKind::EndOfFile
                | SymbolKind::Semicolon
                | SymbolKind::Comma
                | SymbolKind::RParen
                | SymbolKind::Keyword(_),
            )
            | None => Err(self.error("expected an expression")),
            _ => {
                // Anything else (function calls, arithmetic, ...) is kept
                // as a single opaque token; name resolution only needs to
                // discover column references, not evaluate expressions.
                let symbol = self.bump();
                Ok(self
                    .builder
                    .push_leaf(NodeType::OpaqueExpression, symbol.location, Attribute::None))
            }
        }
    }

    fn parse_column_ref(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        let children = self.parse_name_path()?;
        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::ColumnRef, location, Attribute::None, &children))
    }

    fn parse_scalar_expression(&mut self) -> PResult<NodeId> {
        self.parse_operand()
    }

    // ---- column definitions ------------------------------------------------

    fn parse_column_def_list(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        if !matches!(self.peek_kind(), Some(SymbolKind::LParen)) {
            return Err(self.error("expected '(' to begin column list"));
        }
        self.bump();

        let mut children = vec![self.parse_column_def()?];
        while matches!(self.peek_kind(), Some(SymbolKind::Comma)) {
            self.bump();
            children.push(self.parse_column_def()?);
        }

        if !matches!(self.peek_kind(), Some(SymbolKind::RParen)) {
            return Err(self.error("expected ')' to close column list"));
        }
        self.bump();

        let location = self.span_from(start);
        Ok(self
            .builder
            .push_parent(NodeType::ColumnDefList, location, Attribute::None, &children))
    }

    fn parse_column_def(&mut self) -> PResult<NodeId> {
        let start = self.current_location();
        let (name, name_loc) = self.expect_name()?;
        let name_node = self
            .builder
            .push_leaf(NodeType::NamePathComponent, name_loc, Attribute::Name(name));

        let type_node = self.parse_type_name()?;

        // Trailing column constraints (`NOT NULL`, `PRIMARY KEY`, `DEFAULT
        // ...`) are skipped token-by-token; they don't affect name
        // resolution.
        self.skip_column_constraints();

        let location = self.span_from(start);
        Ok(self.builder.push_parent(
            NodeType::ColumnDef,
            location,
            Attribute::None,
            &[name_node, type_node],
        ))
    }

    fn parse_type_name(&mut self) -> PResult<NodeId> {
        let keyword = match self.peek_keyword() {
            Some(
                k @ (Keyword::Int
                | Keyword::Integer
                | Keyword::Bigint
                | Keyword::Varchar
                | Keyword::Text
                | Keyword::Boolean
                | Keyword::Float
                | Keyword::Double),
            ) => k,
            _ => return Err(self.error("expected a column type")),
        };
        let location = self.bump().location;
        if keyword == Keyword::Double {
            self.eat_keyword(Keyword::Precision);
        }
        // Optional precision/size argument, e.g. `varchar(255)`.
        if matches!(self.peek_kind(), Some(SymbolKind::LParen)) {
            self.skip_balanced_parens();
        }
        Ok(self
            .builder
            .push_leaf(NodeType::TypeName, location, Attribute::Keyword(keyword)))
    }

    fn skip_balanced_parens(&mut self) {
        debug_assert!(matches!(self.peek_kind(), Some(SymbolKind::LParen)));
        let mut depth = 0i32;
        loop {
            match self.peek_kind() {
                Some(SymbolKind::LParen) => {
                    depth += 1;
                    self.bump();
                }
                Some(SymbolKind::RParen) => {
                    depth -= 1;
                    self.bump();
                    if depth == 0 {
                        break;
                    }
                }
                Some(SymbolKind::EndOfFile) | None => break,
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn skip_column_constraints(&mut self) {
        loop {
            match self.peek_kind() {
                Some(SymbolKind::Comma) | Some(SymbolKind::RParen) | Some(SymbolKind::EndOfFile) | None => break,
                Some(SymbolKind::LParen) => self.skip_balanced_parens(),
                _ => {
                    self.bump();
                }
            }
        }
    }
}

/// A grammar terminal the parser would have accepted at a given symbol
/// index, used by the completion engine's restartable-lookahead step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedSymbol {
    Keyword(Keyword),
    Name,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlsight_scanner::scan;

    #[test]
    fn parses_simple_select() {
        let scanned = scan("select a, b from t");
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        assert_eq!(ast.statements.len(), 1);
        let stmt = ast.statements[0];
        assert_eq!(stmt.kind, StatementKind::Select);
        assert_eq!(ast.node(stmt.root).node_type, NodeType::SelectStatement);
    }

    #[test]
    fn parses_select_star_with_join_and_where() {
        let scanned = scan(
            "select * from orders o join customers c on o.customer_id = c.id where c.active = 1",
        );
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        assert_eq!(ast.statements.len(), 1);

        let select = ast.node(ast.statements[0].root);
        let top_children = ast.children(ast.statements[0].root);
        assert_eq!(select.node_type, NodeType::SelectStatement);
        // select-clause, from-clause, where-clause
        assert_eq!(top_children.len(), 3);

        let from_clause = top_children[1];
        let items = ast.children(from_clause);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn parses_create_table() {
        let scanned = scan("create table db.s.orders (id int, name varchar(64))");
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        assert_eq!(ast.statements.len(), 1);
        assert_eq!(ast.statements[0].kind, StatementKind::CreateTable);
    }

    #[test]
    fn parses_create_table_as_select() {
        let scanned = scan("create table s.derived as select a from t");
        let (ast, errors) = parse(&scanned);
        assert!(errors.is_empty());
        assert_eq!(ast.statements[0].kind, StatementKind::CreateTableAs);
        let node = ast.node(ast.statements[0].root);
        assert_eq!(node.node_type, NodeType::CreateTableAsStatement);
    }

    #[test]
    fn malformed_statement_recovers_at_next_semicolon() {
        let scanned = scan("select from where; select a from t");
        let (ast, errors) = parse(&scanned);
        assert_eq!(errors.len(), 1);
        assert_eq!(ast.statements.len(), 1);
        assert_eq!(ast.statements[0].kind, StatementKind::Select);
    }
}
