use sqlsight_catalog::{Catalog, EntryId};
use sqlsight_engine::{EngineConfig, Script, Status};

use crate::commands::CompleteArgs;
use crate::input::read_script;

pub fn run(args: &CompleteArgs) -> i32 {
    let text = match read_script(&args.path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("failed to read {}: {err}", args.path.display());
            return 1;
        }
    };

    let mut config = EngineConfig::default();
    config.completion_limit = args.limit;
    let mut script = Script::new(EntryId::new(1), text, config);
    let mut catalog = Catalog::new();
    script.scan();
    script.parse();
    script.analyze(&mut catalog);

    if let Some(contribution) = script.contribution(0) {
        let _ = catalog.load_script(contribution);
    }

    let status = script.move_cursor(args.offset);
    if status != Status::Ok {
        eprintln!("could not place cursor: {status:?}");
        return 1;
    }

    let packed = script.complete_at_cursor(&catalog, Some(args.limit));
    if packed.status != Status::Ok {
        eprintln!("completion failed: {:?}", packed.status);
        return 1;
    }
    match String::from_utf8(packed.bytes) {
        Ok(json) => println!("{json}"),
        Err(_) => eprintln!("completion payload was not valid utf-8"),
    }
    0
}
