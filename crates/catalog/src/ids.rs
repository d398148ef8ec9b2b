/// Low values are reserved for sentinels/defaults; real allocations start
/// above these.
pub const DATABASE_ID_START: u32 = 1 << 8;
pub const SCHEMA_ID_START: u32 = 1 << 16;

macro_rules! newtype_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

newtype_id!(DatabaseId);
newtype_id!(SchemaId);
/// The external id a caller (typically the engine, keyed by script id)
/// assigns to a catalog entry; descriptor pools get one too.
newtype_id!(EntryId);

/// `(owning-entry-id, local-index)`, per the table-declaration data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogTableId {
    pub entry_id: EntryId,
    pub local_index: u32,
}
