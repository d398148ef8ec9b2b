use sqlsight_catalog::{Catalog, EntryId};
use sqlsight_engine::{EngineConfig, Script};

use crate::commands::StatsArgs;
use crate::input::read_script;

pub fn run(args: &StatsArgs) -> i32 {
    let text = match read_script(&args.path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("failed to read {}: {err}", args.path.display());
            return 1;
        }
    };

    let mut script = Script::new(EntryId::new(1), text, EngineConfig::default());
    let mut catalog = Catalog::new();
    script.scan();
    script.parse();
    script.analyze(&mut catalog);

    let packed = script.get_statistics();
    match String::from_utf8(packed.bytes) {
        Ok(json) => println!("{json}"),
        Err(_) => eprintln!("statistics payload was not valid utf-8"),
    }
    0
}
