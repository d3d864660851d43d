//! Synthetic hash-table workload used by the `dotprof` binary
//!
//! Inserts the hexadecimal spelling of `1..=n` into a map, then looks up
//! the decimal spelling of `n..=1`. Only keys whose decimal and hex forms
//! coincide are found, which keeps the lookup branch cheap but not empty.

use crate::invocation::Profile;
use crate::recorder::Recorder;
use std::collections::HashMap;

/// Run the workload of size `n` under a fresh recorder
pub fn hash_workload(n: u64) -> Profile {
    let mut recorder = Recorder::new();
    let hits = recorder.measure("dotprof::workload#hash_workload", |r| run(r, n));
    tracing::debug!(n, hits, "hash workload finished");
    recorder.finish()
}

fn run(r: &mut Recorder, n: u64) -> u64 {
    let mut table: HashMap<String, u32> = r.measure("std::collections::HashMap#new", |_| HashMap::new());

    r.measure("dotprof::workload#fill", |r| {
        for i in 1..=n {
            let key = r.measure("alloc::fmt#format_hex", |_| format!("{:x}", i));
            r.measure("std::collections::HashMap#insert", |_| table.insert(key, 1));
        }
    });

    r.measure("dotprof::workload#lookup", |r| {
        let mut hits = 0;
        for i in (1..=n).rev() {
            let key = r.measure("alloc::string::ToString#to_string", |_| i.to_string());
            if r.measure("std::collections::HashMap#contains_key", |_| table.contains_key(&key)) {
                hits += 1;
            }
        }
        hits
    })
}
