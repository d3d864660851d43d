#![no_main]

use dotprof::config::DotConfig;
use dotprof::dot_output::render_profile;
use dotprof::invocation::Profile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and rendering must reject bad profiles without panicking
        if let Ok(profile) = Profile::from_json_str(input) {
            let _ = render_profile(&profile, &DotConfig::default());
        }
    }
});
