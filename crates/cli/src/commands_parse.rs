use sqlsight_catalog::{Catalog, EntryId};
use sqlsight_engine::{EngineConfig, Script};

use crate::commands::ParseArgs;
use crate::input::read_script;

pub fn run(args: &ParseArgs) -> i32 {
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
    let status = script.analyze(&mut catalog);

    for err in script.scan_errors() {
        eprintln!("scan error: {err}");
    }
    for err in script.parse_errors() {
        eprintln!("parse error: {err}");
    }

    println!("analyze status: {status:?}");
    0
}
