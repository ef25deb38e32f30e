use std::fmt::Debug;
use std::path::Path;

use mime::Mime;

/// Number of payload bytes handed to a detector
pub const SNIFF_LEN: usize = 8 * 1024;

/// Determines the MIME type of a payload from a prefix of its bytes
///  and a name hint (usually the file name).
pub trait MimeDetector: Send + Sync + Debug + 'static {
    fn detect(&self, prefix: &[u8], name_hint: &str) -> Option<Mime>;
}

/// Guesses from the name hint's extension, then falls back to a
///  text/binary sniff of the payload prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuessingMimeDetector;

impl MimeDetector for GuessingMimeDetector {
    fn detect(&self, prefix: &[u8], name_hint: &str) -> Option<Mime> {
        if let Some(guess) = mime_guess::from_path(Path::new(name_hint)).first() {
            return Some(guess);
        }
        if prefix.is_empty() {
            return None;
        }
        if looks_like_text(prefix) {
            Some(mime::TEXT_PLAIN)
        } else {
            Some(mime::APPLICATION_OCTET_STREAM)
        }
    }
}

fn looks_like_text(prefix: &[u8]) -> bool {
    if prefix.contains(&0) {
        return false;
    }
    match std::str::from_utf8(prefix) {
        Ok(_) => true,
        // a multi-byte char cut off by the prefix boundary is still text
        Err(e) => e.error_len().is_none(),
    }
}
