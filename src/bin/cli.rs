use stonewall::logger::init_logging;
use stonewall::uci::UciEngine;

fn main() {
    init_logging("logs/stonewall.log", "info");
    UciEngine::new().run();
}
