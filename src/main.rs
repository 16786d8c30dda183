fn main() {
    if let Err(err) = labelkit_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
