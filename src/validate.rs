//! Destination file name validation

use crate::os;
use std::path::Path;
use thiserror::Error;

/// Longest file name accepted, in characters
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Device names Windows reserves regardless of extension
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Why a file name was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameViolation {
    #[error("file name contains invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("file name uses the reserved device name {0}")]
    ReservedName(String),

    #[error("file name is {0} characters long, the limit is 255")]
    TooLong(usize),
}

/// Validate a bare file name (no directory part) before it is written.
///
/// Reserved device names are rejected on every platform so that the output
/// tree stays portable to Windows.
pub fn validate_file_name(name: &str) -> Result<(), NameViolation> {
    if let Some(bad) = name.chars().find(|c| os::invalid_file_name_chars().contains(c)) {
        return Err(NameViolation::InvalidCharacter(bad));
    }

    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    if let Some(reserved) = RESERVED_NAMES.iter().find(|r| r.eq_ignore_ascii_case(stem)) {
        return Err(NameViolation::ReservedName((*reserved).to_string()));
    }

    let len = name.chars().count();
    if len > MAX_FILE_NAME_LEN {
        return Err(NameViolation::TooLong(len));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinary_names_pass() {
        assert!(validate_file_name("photo.jpg").is_ok());
        assert!(validate_file_name("IMG_20240101_120000_1.jpeg").is_ok());
        assert!(validate_file_name("console.jpg").is_ok());
        assert!(validate_file_name("COM10.png").is_ok());
    }

    #[test]
    fn test_reserved_names_rejected_case_insensitively() {
        assert_eq!(
            validate_file_name("CON.jpg"),
            Err(NameViolation::ReservedName("CON".into()))
        );
        assert_eq!(
            validate_file_name("nul.png"),
            Err(NameViolation::ReservedName("NUL".into()))
        );
        assert_eq!(
            validate_file_name("Lpt3.mp4"),
            Err(NameViolation::ReservedName("LPT3".into()))
        );
    }

    #[test]
    fn test_invalid_character_is_reported() {
        let err = validate_file_name("bad\0name.jpg").unwrap_err();
        assert_eq!(err, NameViolation::InvalidCharacter('\0'));
        assert!(err.to_string().contains("invalid character"));
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_reserved_characters() {
        assert_eq!(
            validate_file_name("what?.jpg"),
            Err(NameViolation::InvalidCharacter('?'))
        );
    }

    #[test]
    fn test_length_limit() {
        let exact = format!("{}.jpg", "a".repeat(MAX_FILE_NAME_LEN - 4));
        assert!(validate_file_name(&exact).is_ok());

        let long = format!("{}.jpg", "a".repeat(MAX_FILE_NAME_LEN));
        assert_eq!(
            validate_file_name(&long),
            Err(NameViolation::TooLong(MAX_FILE_NAME_LEN + 4))
        );
    }
}
