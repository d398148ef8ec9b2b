use sqlsight_scanner::{Keyword, NameTags};

use crate::cursor::CursorContext;

/// Which name tags a candidate's text carries are scored differently
/// depending on what kind of reference the cursor sits inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Default,
    TableRef,
    ColumnRef,
}

impl Strategy {
    pub fn from_context(context: CursorContext) -> Strategy {
        match context {
            CursorContext::None => Strategy::Default,
            CursorContext::TableRef(_) => Strategy::TableRef,
            CursorContext::ColumnRef(_) => Strategy::ColumnRef,
        }
    }
}

pub const IGNORE: u32 = 0;
pub const UNLIKELY: u32 = 10;
pub const LIKELY: u32 = 100;

/// Added to a keyword candidate's base score so common keywords
/// (`SELECT`, `FROM`) outrank rare ones (`ILIKE`, `ORDINALITY`) when
/// several are expected at the same cursor position. Kept an order of
/// magnitude below the gap between [`UNLIKELY`] and [`LIKELY`] so
/// prevalence can never push an unlikely tag above a likely one.
pub const PREVALENCE_DEFAULT: u32 = 0;
pub const PREVALENCE_POPULAR: u32 = 1;
pub const PREVALENCE_VERY_POPULAR: u32 = 2;

pub const PREFIX_BONUS: u32 = 5;
pub const SUBSTRING_BONUS: u32 = 1;

/// The base score a strategy assigns to a single name tag. Candidates
/// whose text carries several tags (e.g. a table named the same as a
/// column) take the max across their set tags, computed by
/// [`base_score`].
fn base_score_for_tag(strategy: Strategy, tag: NameTags) -> u32 {
    match strategy {
        Strategy::Default => match tag {
            NameTags::KEYWORD => LIKELY,
            NameTags::TABLE_NAME | NameTags::COLUMN_NAME => UNLIKELY,
            _ => IGNORE,
        },
        Strategy::TableRef => match tag {
            NameTags::TABLE_NAME => LIKELY,
            NameTags::SCHEMA_NAME => LIKELY,
            NameTags::DATABASE_NAME => UNLIKELY,
            NameTags::KEYWORD => UNLIKELY,
            _ => IGNORE,
        },
        Strategy::ColumnRef => match tag {
            NameTags::COLUMN_NAME => LIKELY,
            NameTags::TABLE_ALIAS => UNLIKELY,
            NameTags::KEYWORD => UNLIKELY,
            _ => IGNORE,
        },
    }
}

const ALL_TAGS: [NameTags; 6] = [
    NameTags::KEYWORD,
    NameTags::DATABASE_NAME,
    NameTags::SCHEMA_NAME,
    NameTags::TABLE_NAME,
    NameTags::TABLE_ALIAS,
    NameTags::COLUMN_NAME,
];

/// The score a strategy assigns to a candidate carrying `tags`: the max
/// across every tag the candidate's name has been seen with.
pub fn base_score(strategy: Strategy, tags: NameTags) -> u32 {
    ALL_TAGS
        .iter()
        .filter(|&&tag| tags.intersects(tag))
        .map(|&tag| base_score_for_tag(strategy, tag))
        .max()
        .unwrap_or(IGNORE)
}

/// Popularity tier for a keyword candidate produced by the grammar-driven
/// lookahead step, used only as a tiebreak among keywords expected at the
/// same position.
pub fn keyword_prevalence(keyword: Keyword) -> u32 {
    match keyword {
        Keyword::Select | Keyword::From | Keyword::Where | Keyword::Create | Keyword::Table | Keyword::Join => {
            PREVALENCE_VERY_POPULAR
        }
        Keyword::And | Keyword::Or | Keyword::On | Keyword::As | Keyword::Into | Keyword::Values => {
            PREVALENCE_POPULAR
        }
        _ => PREVALENCE_DEFAULT,
    }
}

/// Scores how well `candidate_text` matches the in-progress `needle`
/// (fuzzy-case-insensitive), per the completion flow's prefix-vs-substring
/// rule. Returns `None` when it doesn't match at all; an empty needle
/// matches everything at the lowest (substring) tier.
pub fn match_bonus(candidate_text: &str, needle: &str) -> Option<u32> {
    if needle.is_empty() {
        return Some(SUBSTRING_BONUS);
    }
    let candidate = candidate_text.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    if candidate.starts_with(&needle) {
        Some(PREFIX_BONUS)
    } else if candidate.contains(&needle) {
        Some(SUBSTRING_BONUS)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_outranks_column_name_in_table_ref_strategy() {
        let table_score = base_score(Strategy::TableRef, NameTags::TABLE_NAME);
        let column_score = base_score(Strategy::TableRef, NameTags::COLUMN_NAME);
        assert!(table_score > column_score);
    }

    #[test]
    fn tags_combine_via_max() {
        let both = NameTags::TABLE_NAME.union(NameTags::COLUMN_NAME);
        assert_eq!(
            base_score(Strategy::ColumnRef, both),
            base_score(Strategy::ColumnRef, NameTags::COLUMN_NAME)
        );
    }

    #[test]
    fn prevalence_never_crosses_into_the_likely_band() {
        assert!(UNLIKELY + PREVALENCE_VERY_POPULAR < LIKELY);
    }

    #[test]
    fn prefix_match_outranks_substring_match() {
        assert!(match_bonus("orders", "ord").unwrap() > match_bonus("orders", "der").unwrap());
        assert!(match_bonus("orders", "zzz").is_none());
    }
}
