use std::process::exit;

fn main() {
    if let Err(e) = warforger::app::run_cli() {
        warforger::utils::error(&e);
        exit(1);
    }
}
