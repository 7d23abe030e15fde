#![no_main]

use libfuzzer_sys::fuzz_target;
use pipecfg::config::{load, to_yaml};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = load(text) else {
        return;
    };

    let yaml = to_yaml(&config).expect("a loaded configuration must serialize");
    let reloaded = load(&yaml).expect("serialized configuration must load");
    assert_eq!(reloaded, config);
});
