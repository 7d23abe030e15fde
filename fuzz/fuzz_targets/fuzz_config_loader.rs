#![no_main]

use libfuzzer_sys::fuzz_target;
use pipecfg::config::loader::ConfigLoader;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        let loader = ConfigLoader::with_defaults();

        // Only panics matter; every input must produce Ok or Err.
        let _ = loader.load_from_str(yaml_str);
        let _ = loader.inspect_str(yaml_str, "fuzz");
    }
});
