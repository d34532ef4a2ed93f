fn main() {
    if let Err(e) = banker_cli::run() {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}
