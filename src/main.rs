fn main() {
    if let Err(e) = medremind_lib::run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
