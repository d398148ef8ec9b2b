use smol_str::SmolStr;

/// Default database/schema names used to qualify a bare or
/// partially-qualified table name during resolution.
#[derive(Debug, Clone)]
pub struct NameDefaults {
    pub database: SmolStr,
    pub schema: SmolStr,
}

impl Default for NameDefaults {
    fn default() -> Self {
        Self {
            database: SmolStr::new("default"),
            schema: SmolStr::new("public"),
        }
    }
}
