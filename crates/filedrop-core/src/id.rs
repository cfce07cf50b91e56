//! Identifier generation

use uuid::Uuid;

/// Length of every generated file identifier
pub const FILE_ID_LEN: usize = 32;

/// Generates a fresh random file identifier (32 lowercase hex characters).
///
/// Collisions are treated as impossible; no retry is attempted.
pub fn generate_file_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_fixed_length_hex() {
        let id = generate_file_id();
        assert_eq!(id.len(), FILE_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_ids_do_not_repeat() {
        let ids: HashSet<_> = (0..1000).map(|_| generate_file_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
