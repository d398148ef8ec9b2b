use smol_str::SmolStr;
use sqlsight_analyzer::NameDefaults;
use sqlsight_helpers::Config;

/// Small embedder-facing configuration threaded through a [`Script`](crate::Script)
/// and the catalog it analyzes against: default qualification names and the
/// completion result bound.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    pub default_database: SmolStr,
    pub default_schema: SmolStr,
    /// Upper bound on candidates returned by a single `complete_at_cursor` call.
    pub completion_limit: usize,
    /// Reserved for a future fuzzy-match budget; unused by the current
    /// prefix/substring scoring in `sqlsight-completion`.
    pub fuzzy_edit_distance: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_database: SmolStr::new("default"),
            default_schema: SmolStr::new("default"),
            completion_limit: 50,
            fuzzy_edit_distance: 2,
        }
    }
}

impl EngineConfig {
    pub fn name_defaults(&self) -> NameDefaults {
        NameDefaults {
            database: self.default_database.clone(),
            schema: self.default_schema.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_usable_without_overrides() {
        let config = EngineConfig::default();
        assert_eq!(config.default_database.as_str(), "default");
        assert_eq!(config.completion_limit, 50);
    }

    #[test]
    fn config_builder_overrides_fields_in_place() {
        let config = EngineConfig::default().config(|c| {
            c.default_database = SmolStr::new("mydb");
            c.completion_limit = 10;
        });
        assert_eq!(config.default_database.as_str(), "mydb");
        assert_eq!(config.completion_limit, 10);
    }
}
