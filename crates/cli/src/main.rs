pub fn main() {
    std::process::exit(sqlsight_cli::run_with_args(std::env::args_os()));
}
