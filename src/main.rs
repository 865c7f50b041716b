//! SkillWise Progress Entry Point

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_logger::init(log::LevelFilter::Info) {
        web_sys::console::warn_1(&format!("[main] Logger not installed: {}", e).into());
    }
    skillwise_progress::start();
}
