use std::time::Duration;

/// Memory/timing counters for a single pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StageStats {
    pub wall_time_micros: u64,
    pub symbol_count: u32,
    pub node_count: u32,
    pub table_count: u32,
}

impl StageStats {
    pub fn with_wall_time(mut self, elapsed: Duration) -> Self {
        self.wall_time_micros = elapsed.as_micros() as u64;
        self
    }
}

/// The three pipeline stages' stats, as returned by `Script::get_statistics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptStatistics {
    pub scan: StageStats,
    pub parse: StageStats,
    pub analyze: StageStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_time_is_recorded_in_micros() {
        let stats = StageStats::default().with_wall_time(Duration::from_micros(42));
        assert_eq!(stats.wall_time_micros, 42);
    }
}
