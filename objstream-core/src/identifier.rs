//! Id generation and wall-clock helpers.
//!
//! Both are used only as defaults: the engine accepts caller-supplied
//! `now()` / `generate_id()` hooks so tests can be deterministic.

use uuid::Uuid;

/// Generate a unique stream id, e.g. `strm_4ae81d…`.
#[must_use]
pub fn generate_stream_id() -> String {
    format!("strm_{}", Uuid::new_v4().simple())
}

/// Generate a raw UUID v4 string.
#[must_use]
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_id_prefix() {
        let id = generate_stream_id();
        assert!(id.starts_with("strm_"));
        assert_eq!(id.len(), 37);
    }

    #[test]
    fn test_ids_unique() {
        assert_ne!(generate_stream_id(), generate_stream_id());
    }

    #[test]
    fn test_now_millis_nonzero() {
        assert!(now_millis() > 0);
    }
}
