fn main() {
    if let Err(err) = pathstream::cli::run_cli() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
