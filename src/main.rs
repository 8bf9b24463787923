fn main() {
    if let Err(err) = fare_insights::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
