use smol_str::SmolStr;
use sqlsight_helpers::{Id, IndexMap};

use crate::location::Location;

/// A bitmask of roles a registered [`Name`] has played in the script.
///
/// `KEYWORD` is set by the scanner itself (a keyword spelled out where an
/// identifier was also grammatically legal, e.g. used as a column alias).
/// The remaining tags are set by the analyzer's name-resolution pass via
/// [`NameRegistry::tag`] and are reset on every re-analysis, per the data
/// model's lifecycle rule that "resolved tags ... are cleared and rebuilt
/// on every re-analysis".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameTags(u8);

impl NameTags {
    pub const NONE: NameTags = NameTags(0);
    pub const KEYWORD: NameTags = NameTags(1 << 0);
    pub const DATABASE_NAME: NameTags = NameTags(1 << 1);
    pub const SCHEMA_NAME: NameTags = NameTags(1 << 2);
    pub const TABLE_NAME: NameTags = NameTags(1 << 3);
    pub const TABLE_ALIAS: NameTags = NameTags(1 << 4);
    pub const COLUMN_NAME: NameTags = NameTags(1 << 5);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: NameTags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: NameTags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: NameTags) {
        self.0 |= other.0;
    }

    pub const fn union(self, other: NameTags) -> NameTags {
        NameTags(self.0 | other.0)
    }

    /// Keeps only the tags that survive a re-analysis (currently just
    /// `KEYWORD`, which is a property of the spelling, not of how the
    /// analyzer used it).
    pub const fn retain_unresolved(self) -> NameTags {
        NameTags(self.0 & NameTags::KEYWORD.0)
    }
}

impl std::ops::BitOr for NameTags {
    type Output = NameTags;
    fn bitor(self, rhs: NameTags) -> NameTags {
        self.union(rhs)
    }
}

/// Marker type for [`Id<Name>`].
pub struct NameMarker;
pub type NameId = Id<NameMarker>;

/// A deduplicated identifier text registered in a script's [`NameRegistry`].
#[derive(Debug, Clone)]
pub struct Name {
    id: NameId,
    text: SmolStr,
    location: Location,
    tags: NameTags,
    occurrences: u32,
}

impl Name {
    pub fn id(&self) -> NameId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Location of the *first* occurrence; later occurrences only bump
    /// [`Name::occurrences`].
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn tags(&self) -> NameTags {
        self.tags
    }

    pub fn occurrences(&self) -> u32 {
        self.occurrences
    }
}

/// Per-script deduplicated store of identifier texts.
///
/// Case-sensitive: `Foo` and `foo` are distinct entries, matching the
/// scanner's contract that folding only happens for keyword lookup, not
/// for the registered name text itself.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    by_text: IndexMap<SmolStr, NameId>,
    names: Vec<Name>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `text` if not already present; otherwise merges `tags`
    /// into the existing entry and increments its occurrence count. Either
    /// way returns the name's stable id.
    pub fn register(&mut self, text: &str, location: Location, tags: NameTags) -> NameId {
        if let Some(&id) = self.by_text.get(text) {
            let name = &mut self.names[id.index()];
            name.tags.insert(tags);
            name.occurrences += 1;
            return id;
        }
        let id = NameId::new(self.names.len() as u32);
        self.names.push(Name {
            id,
            text: SmolStr::new(text),
            location,
            tags,
            occurrences: 1,
        });
        self.by_text.insert(SmolStr::new(text), id);
        id
    }

    pub fn tag(&mut self, id: NameId, tags: NameTags) {
        self.names[id.index()].tags.insert(tags);
    }

    pub fn get(&self, id: NameId) -> &Name {
        &self.names[id.index()]
    }

    pub fn lookup_text(&self, text: &str) -> Option<NameId> {
        self.by_text.get(text).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Name> {
        self.names.iter()
    }

    /// Clears every tag bit the analyzer is responsible for, ahead of a
    /// fresh name-resolution pass. `KEYWORD` (a scanning-time fact) is
    /// preserved.
    pub fn reset_resolved_tags(&mut self) {
        for name in &mut self.names {
            name.tags = name.tags.retain_unresolved();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_dedups_and_merges_tags() {
        let mut reg = NameRegistry::new();
        let a = reg.register("foo", Location::new(0, 3), NameTags::TABLE_NAME);
        let b = reg.register("foo", Location::new(10, 3), NameTags::COLUMN_NAME);
        assert_eq!(a, b);
        let name = reg.get(a);
        assert!(name.tags().contains(NameTags::TABLE_NAME));
        assert!(name.tags().contains(NameTags::COLUMN_NAME));
        assert_eq!(name.occurrences(), 2);
        // first occurrence's location is kept
        assert_eq!(name.location(), Location::new(0, 3));
    }

    #[test]
    fn reset_resolved_tags_keeps_keyword_only() {
        let mut reg = NameRegistry::new();
        let id = reg.register("limit", Location::new(0, 5), NameTags::KEYWORD);
        reg.tag(id, NameTags::COLUMN_NAME);
        reg.reset_resolved_tags();
        let tags = reg.get(id).tags();
        assert!(tags.contains(NameTags::KEYWORD));
        assert!(!tags.contains(NameTags::COLUMN_NAME));
    }
}
