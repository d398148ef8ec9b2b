use strum_macros::Display;

/// Recognized keywords, including the lookahead-promoted compound forms
/// described by the scanner's algorithmic contract (`NOT BETWEEN`,
/// `NULLS FIRST`/`NULLS LAST`, `WITH TIME ZONE`/`WITH ORDINALITY`).
///
/// Promoted variants are only ever produced by [`promote`]; the scanner
/// never emits them directly from the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::upper_case_acronyms)]
pub enum Keyword {
    Select,
    Distinct,
    From,
    Where,
    As,
    Join,
    Inner,
    Left,
    Right,
    Full,
    On,
    Using,
    Create,
    Table,
    If,
    Not,
    NotLookahead,
    Exists,
    And,
    Or,
    Null,
    Nulls,
    NullsLookahead,
    With,
    WithLookahead,
    Between,
    In,
    Like,
    Ilike,
    Similar,
    First,
    Last,
    Time,
    Ordinality,
    Asc,
    Desc,
    Group,
    By,
    Order,
    Having,
    Limit,
    Into,
    Values,
    Int,
    Integer,
    Bigint,
    Varchar,
    Text,
    Boolean,
    Float,
    Double,
    Precision,
    Default,
    Primary,
    Key,
    Unique,
    References,
    Cascade,
    Schema,
    Database,
    Insert,
    Update,
    Delete,
    Set,
    Alter,
    Drop,
    Add,
    Column,
    View,
}

impl Keyword {
    /// Looks up a keyword by its lower-cased spelling, as produced by the
    /// scanner's fixed-capacity case-folding scratch buffer.
    pub fn from_folded(folded: &str) -> Option<Keyword> {
        use Keyword::*;
        Some(match folded {
            "select" => Select,
            "distinct" => Distinct,
            "from" => From,
            "where" => Where,
            "as" => As,
            "join" => Join,
            "inner" => Inner,
            "left" => Left,
            "right" => Right,
            "full" => Full,
            "on" => On,
            "using" => Using,
            "create" => Create,
            "table" => Table,
            "if" => If,
            "not" => Not,
            "exists" => Exists,
            "and" => And,
            "or" => Or,
            "null" => Null,
            "nulls" => Nulls,
            "with" => With,
            "between" => Between,
            "in" => In,
            "like" => Like,
            "ilike" => Ilike,
            "similar" => Similar,
            "first" => First,
            "last" => Last,
            "time" => Time,
            "ordinality" => Ordinality,
            "asc" => Asc,
            "desc" => Desc,
            "group" => Group,
            "by" => By,
            "order" => Order,
            "having" => Having,
            "limit" => Limit,
            "into" => Into,
            "values" => Values,
            "int" => Int,
            "integer" => Integer,
            "bigint" => Bigint,
            "varchar" => Varchar,
            "text" => Text,
            "boolean" => Boolean,
            "float" => Float,
            "double" => Double,
            "precision" => Precision,
            "default" => Default,
            "primary" => Primary,
            "key" => Key,
            "unique" => Unique,
            "references" => References,
            "cascade" => Cascade,
            "schema" => Schema,
            "database" => Database,
            "insert" => Insert,
            "update" => Update,
            "delete" => Delete,
            "set" => Set,
            "alter" => Alter,
            "drop" => Drop,
            "add" => Add,
            "column" => Column,
            "view" => View,
            _ => return None,
        })
    }

    /// Rewrites an ambiguous keyword using one token of lookahead, per the
    /// scanner's contract: `NOT` followed by `BETWEEN`/`IN`/`LIKE`/`ILIKE`/
    /// `SIMILAR` becomes [`Keyword::NotLookahead`]; `NULLS` followed by
    /// `FIRST`/`LAST` becomes [`Keyword::NullsLookahead`]; `WITH` followed
    /// by `TIME`/`ORDINALITY` becomes [`Keyword::WithLookahead`]. Every
    /// other keyword (including the lookahead token itself) is returned
    /// unchanged.
    pub fn promote(self, next: Option<Keyword>) -> Keyword {
        match (self, next) {
            (
                Keyword::Not,
                Some(Keyword::Between | Keyword::In | Keyword::Like | Keyword::Ilike | Keyword::Similar),
            ) => Keyword::NotLookahead,
            (Keyword::Nulls, Some(Keyword::First | Keyword::Last)) => Keyword::NullsLookahead,
            (Keyword::With, Some(Keyword::Time | Keyword::Ordinality)) => Keyword::WithLookahead,
            _ => self,
        }
    }

    /// Whether this keyword introduces a scope (used by the parser to
    /// decide where to root a [`crate` ... ] name scope).
    pub const fn is_scope_introducing(self) -> bool {
        matches!(self, Keyword::Select | Keyword::Create)
    }

    /// Whether this keyword may stand in for an identifier (an unquoted
    /// non-reserved word, e.g. a column named `key` or `text`). Keywords
    /// that structure a clause (`FROM`, `WHERE`, `AND`, `JOIN`, ...) are
    /// reserved and never count as a name.
    pub const fn can_be_name(self) -> bool {
        !matches!(
            self,
            Keyword::Select
                | Keyword::From
                | Keyword::Where
                | Keyword::Join
                | Keyword::Inner
                | Keyword::Left
                | Keyword::Right
                | Keyword::Full
                | Keyword::On
                | Keyword::Using
                | Keyword::Create
                | Keyword::Table
                | Keyword::If
                | Keyword::Not
                | Keyword::NotLookahead
                | Keyword::Exists
                | Keyword::And
                | Keyword::Or
                | Keyword::As
                | Keyword::With
                | Keyword::WithLookahead
                | Keyword::Group
                | Keyword::By
                | Keyword::Order
                | Keyword::Having
                | Keyword::Limit
                | Keyword::Into
                | Keyword::Values
                | Keyword::Insert
                | Keyword::Update
                | Keyword::Delete
                | Keyword::Set
                | Keyword::Alter
                | Keyword::Drop
                | Keyword::Add
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_insensitively_via_caller_lowercasing() {
        assert_eq!(Keyword::from_folded("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_folded("nonexistent"), None);
    }

    #[test]
    fn promotes_not_between_but_not_bare_not() {
        assert_eq!(
            Keyword::Not.promote(Some(Keyword::Between)),
            Keyword::NotLookahead
        );
        assert_eq!(Keyword::Not.promote(Some(Keyword::Null)), Keyword::Not);
        assert_eq!(Keyword::Not.promote(None), Keyword::Not);
    }

    #[test]
    fn promotes_nulls_and_with() {
        assert_eq!(
            Keyword::Nulls.promote(Some(Keyword::First)),
            Keyword::NullsLookahead
        );
        assert_eq!(
            Keyword::With.promote(Some(Keyword::Ordinality)),
            Keyword::WithLookahead
        );
        assert_eq!(Keyword::With.promote(Some(Keyword::Select)), Keyword::With);
    }
}
