//! statelog main entrypoint.

use statelog::run;

fn main() {
    if let Err(e) = run() {
        statelog::ui::messages::error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
