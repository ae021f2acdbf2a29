fn main() {
    if let Err(err) = record_scrub::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
