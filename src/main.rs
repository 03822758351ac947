fn main() {
    if let Err(err) = dbf_convert::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
