use smol_str::SmolStr;
use sqlsight_catalog::CatalogTableId;
use sqlsight_scanner::{Keyword, NameTags};

/// The catalog/script object(s) a candidate's text resolves to, carried
/// along so a caller can jump straight to what it names without a second
/// lookup by text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CandidateObject {
    Keyword(Keyword),
    Database,
    Schema,
    Table(CatalogTableId),
    Column(CatalogTableId, u32),
}

/// One ranked completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub text: SmolStr,
    pub tags: NameTags,
    pub score: u32,
    pub objects: Vec<CandidateObject>,
}

impl Candidate {
    pub fn new(text: impl Into<SmolStr>, tags: NameTags, score: u32) -> Self {
        Self {
            text: text.into(),
            tags,
            score,
            objects: Vec::new(),
        }
    }

    pub fn with_object(mut self, object: CandidateObject) -> Self {
        self.objects.push(object);
        self
    }

    /// Merges `other` into `self` as the completion flow's duplicate-name
    /// merge rule requires: tags union, objects appended, score the max of
    /// the two (candidates are re-scored before merging so this never
    /// discards a stronger signal).
    pub fn merge(&mut self, other: Candidate) {
        self.tags.insert(other.tags);
        self.score = self.score.max(other.score);
        for object in other.objects {
            if !self.objects.contains(&object) {
                self.objects.push(object);
            }
        }
    }
}
