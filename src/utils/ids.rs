//! Identity generation for trips, members, expenses, and requests

use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

/// Length of a trip join code
pub const TRIP_CODE_LEN: usize = 6;

/// Generate a fresh opaque id for members, expenses, and pending requests
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short shareable trip join code (6 alphanumeric characters,
/// uppercased for readability). Uniqueness against stored trips is the
/// caller's concern.
pub fn new_trip_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TRIP_CODE_LEN)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

/// Non-cryptographic fallback id (timestamp plus random suffix) used by the
/// reconciliation engine when a member arrives without one. Fine for a casual
/// low-contention system, not collision-proof under high concurrency.
pub fn fallback_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{millis}-{suffix:04}")
}
