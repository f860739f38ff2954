//! Identifier format conversion.
//!
//! Directory records carry dashed UUID-form identifiers while the profile
//! store keys accounts by the raw 32-character form. These helpers convert
//! between the two without imposing a canonical case on either side.

/// Insert dashes into a raw 32-hex identifier at the 8-4-4-4-12 offsets.
///
/// Identifiers that already contain a dash, or that are not a plain
/// 32-character hex string, are returned unchanged.
#[must_use]
pub fn to_dashed(raw: &str) -> String {
    if raw.contains('-') {
        return raw.to_string();
    }
    if raw.len() != 32 || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
        return raw.to_string();
    }
    format!(
        "{}-{}-{}-{}-{}",
        &raw[0..8],
        &raw[8..12],
        &raw[12..16],
        &raw[16..20],
        &raw[20..32]
    )
}

/// Remove every dash from an identifier.
#[must_use]
pub fn strip_dashes(id: &str) -> String {
    id.replace('-', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_dashed_inserts_dashes() {
        assert_eq!(
            to_dashed("0123456789abcdef0123456789abcdef"),
            "01234567-89ab-cdef-0123-456789abcdef"
        );
    }

    #[test]
    fn test_to_dashed_already_dashed_unchanged() {
        let dashed = "01234567-89ab-cdef-0123-456789abcdef";
        assert_eq!(to_dashed(dashed), dashed);
    }

    #[test]
    fn test_to_dashed_preserves_case() {
        assert_eq!(
            to_dashed("0123456789ABCDEF0123456789ABCDEF"),
            "01234567-89AB-CDEF-0123-456789ABCDEF"
        );
    }

    #[test]
    fn test_to_dashed_wrong_length_unchanged() {
        assert_eq!(to_dashed("abc123"), "abc123");
        assert_eq!(to_dashed(""), "");
    }

    #[test]
    fn test_to_dashed_non_hex_unchanged() {
        let not_hex = "z123456789abcdef0123456789abcdef";
        assert_eq!(to_dashed(not_hex), not_hex);
    }

    #[test]
    fn test_strip_dashes() {
        assert_eq!(
            strip_dashes("01234567-89ab-cdef-0123-456789abcdef"),
            "0123456789abcdef0123456789abcdef"
        );
        assert_eq!(strip_dashes("no-dashes-here"), "nodasheshere");
    }

    #[test]
    fn test_round_trip() {
        let raw = "feedface0123456789abcdef01234567";
        assert_eq!(strip_dashes(&to_dashed(raw)), raw);
    }
}
