//! Platform abstraction layer
//!
//! Handles browser/native differences for wall-clock time and run seeding.
//! Everything else the simulation needs arrives through its arguments.

/// Wall-clock time in milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Fresh seed for a new run's generator
pub fn run_seed() -> u64 {
    let seed = rand::random::<u64>();
    log::debug!("Run seed {:#018x}", seed);
    seed
}
