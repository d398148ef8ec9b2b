use smol_str::SmolStr;

/// A stable snapshot for external consumers: four flat arrays, one per
/// kind, with child rows carrying a `parent_idx` back-reference into their
/// parent's array rather than nesting. Names are deduplicated into `names`;
/// every other field refers to them by index so the snapshot serializes
/// compactly.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatCatalog {
    pub names: Vec<SmolStr>,
    pub databases: Vec<FlatDatabase>,
    pub schemas: Vec<FlatSchema>,
    pub tables: Vec<FlatTable>,
    pub columns: Vec<FlatColumn>,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatDatabase {
    pub name_index: u32,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatSchema {
    pub name_index: u32,
    /// Index into `FlatCatalog::databases`.
    pub flat_parent_idx: u32,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatTable {
    pub name_index: u32,
    /// Index into `FlatCatalog::schemas`.
    pub flat_parent_idx: u32,
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatColumn {
    pub name_index: u32,
    /// Index into `FlatCatalog::tables`.
    pub flat_parent_idx: u32,
}
