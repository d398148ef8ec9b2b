/// `--verbose` forces debug-level output; otherwise the level comes from
/// `SQLSIGHT_LOG`, falling back to off so a bare pipeline run stays quiet.
pub(crate) fn init(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        std::env::var("SQLSIGHT_LOG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(log::LevelFilter::Off)
    };

    fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message)))
        .level(level)
        .chain(std::io::stderr())
        .apply()
}
