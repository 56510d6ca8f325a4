//! Lightweight language detection for extracted contract text.
//!
//! The pipeline only needs to distinguish Arabic documents (which are
//! translated before analysis) from everything else, so detection is a
//! script-ratio heuristic over a short prefix rather than a full language
//! identification pass. Undetectable input is assumed to be English.

/// Number of characters inspected from the start of the document.
const DETECTION_PREFIX_CHARS: usize = 500;

/// Minimum share of Arabic-script letters for an "ar" verdict.
const ARABIC_RATIO_THRESHOLD: f64 = 0.3;

/// Detect the document language from its leading text.
///
/// Returns an ISO-639-1 style tag: `"ar"` when the prefix is predominantly
/// Arabic script, `"en"` otherwise (including empty or symbol-only text).
pub fn detect_language(text: &str) -> &'static str {
    let mut arabic = 0usize;
    let mut letters = 0usize;

    for ch in text.chars().take(DETECTION_PREFIX_CHARS) {
        if ch.is_alphabetic() {
            letters += 1;
            if is_arabic_script(ch) {
                arabic += 1;
            }
        }
    }

    if letters == 0 {
        return "en";
    }
    if arabic as f64 / letters as f64 >= ARABIC_RATIO_THRESHOLD {
        "ar"
    } else {
        "en"
    }
}

/// Arabic block plus the supplement and presentation forms used in documents.
fn is_arabic_script(ch: char) -> bool {
    matches!(ch,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{08A0}'..='\u{08FF}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}'
    )
}
