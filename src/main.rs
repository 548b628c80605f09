//! UCI engine binary.

fn main() {
    env_logger::init();
    if let Err(err) = quill_chess::uci::uci_top::run_stdio_loop() {
        log::error!("UCI loop stopped: {err}");
        std::process::exit(1);
    }
}
