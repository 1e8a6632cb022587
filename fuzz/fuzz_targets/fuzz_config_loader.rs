#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validate errors are fine; panics are not.
    if let Ok(cfg) = weigh_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let _ = weigh_core::FirmwareCfg::from(&cfg);
        }
    }
});
