//! Character-budget chunking with natural-boundary preference.
//!
//! Remote generation endpoints truncate long inputs, so documents are split
//! into bounded windows before prompting. A hard cut mid-sentence degrades
//! analysis quality; the splitter looks backward a short distance from each
//! hard boundary for a paragraph, line, or sentence break to cut at instead.

/// How far back, in characters, to search for a preferred separator.
const BOUNDARY_SEARCH_WINDOW: usize = 200;

/// Separators tried in priority order when a boundary would split a sentence.
const PREFERRED_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "; ", "? ", "! "];

/// Split text into chunks of at most `max_chars` characters each.
///
/// The chunks are contiguous substrings of the input; concatenating them
/// reproduces it exactly. Empty input yields a single empty chunk so that
/// callers always receive at least one unit of work.
pub fn chunk_text(text: &str, max_chars: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        max_chars: max_chars.max(1),
        yielded: false,
    }
}

/// Lazy iterator over document chunks produced by [`chunk_text`].
pub struct Chunks<'a> {
    rest: &'a str,
    max_chars: usize,
    yielded: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            if self.yielded {
                return None;
            }
            self.yielded = true;
            return Some("");
        }
        self.yielded = true;

        let hard_end = char_floor(self.rest, self.max_chars);
        if hard_end >= self.rest.len() {
            let chunk = self.rest;
            self.rest = "";
            return Some(chunk);
        }

        let end = preferred_break(&self.rest[..hard_end]).unwrap_or(hard_end);
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

/// Byte offset of the best preferred separator near the end of the window,
/// or `None` when the window contains no separator close enough.
fn preferred_break(window: &str) -> Option<usize> {
    let search_start = char_tail_start(window, BOUNDARY_SEARCH_WINDOW);
    let tail = &window[search_start..];

    for separator in PREFERRED_SEPARATORS {
        if let Some(pos) = tail.rfind(separator) {
            return Some(search_start + pos + separator.len());
        }
    }
    None
}

/// Largest byte index `<= max_chars` chars into `text` that is a char boundary.
fn char_floor(text: &str, max_chars: usize) -> usize {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => offset,
        None => text.len(),
    }
}

/// Byte offset where the last `max_chars` characters of `text` begin.
fn char_tail_start(text: &str, max_chars: usize) -> usize {
    if max_chars == 0 {
        return text.len();
    }
    match text.char_indices().nth_back(max_chars - 1) {
        Some((offset, _)) => offset,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_yields_single_identical_chunk() {
        let chunks: Vec<&str> = chunk_text("a short contract", 4000).collect();
        assert_eq!(chunks, vec!["a short contract"]);
    }

    #[test]
    fn empty_input_yields_one_empty_chunk() {
        let chunks: Vec<&str> = chunk_text("", 4000).collect();
        assert_eq!(chunks, vec![""]);
    }

    #[test]
    fn concatenation_is_lossless() {
        let text = "Clause 1. The parties agree. Clause 2; with terms.\n\nClause 3? Yes! Done."
            .repeat(40);
        for max in [10, 33, 100, 250, 4000] {
            let joined: String = chunk_text(&text, max).collect();
            assert_eq!(joined, text, "lost characters at max_chars={max}");
        }
    }

    #[test]
    fn chunks_respect_the_character_budget() {
        let text = "word ".repeat(500);
        for chunk in chunk_text(&text, 120) {
            assert!(chunk.chars().count() <= 120);
        }
    }

    #[test]
    fn prefers_paragraph_breaks_over_hard_cuts() {
        let first = "First paragraph about the agreement.";
        let text = format!("{first}\n\nSecond paragraph about indemnities and liability caps.");
        let chunks: Vec<&str> = chunk_text(&text, 60).collect();
        assert_eq!(chunks[0], format!("{first}\n\n"));
    }

    #[test]
    fn prefers_sentence_breaks_when_no_newline_is_near() {
        let text = "The supplier shall deliver goods monthly. The buyer shall remit payment within thirty days of each delivery.";
        let chunks: Vec<&str> = chunk_text(text, 70).collect();
        assert_eq!(chunks[0], "The supplier shall deliver goods monthly. ");
    }

    #[test]
    fn falls_back_to_hard_boundary_without_separators() {
        let text = "x".repeat(1000);
        let chunks: Vec<&str> = chunk_text(&text, 300).collect();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].len(), 300);
        assert_eq!(chunks[3].len(), 100);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "بند أول في العقد. ".repeat(100);
        let joined: String = chunk_text(&text, 50).collect();
        assert_eq!(joined, text);
        for chunk in chunk_text(&text, 50) {
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn boundary_search_counts_characters_not_bytes() {
        // The sentence break sits 150 chars before the hard boundary, which
        // is around 300 bytes back in two-byte Arabic script.
        let text = format!("{}. {}", "م".repeat(98), "م".repeat(300));
        let chunks: Vec<&str> = chunk_text(&text, 250).collect();
        assert_eq!(chunks[0], format!("{}. ", "م".repeat(98)));
    }

    #[test]
    fn never_returns_zero_chunks() {
        for input in ["", " ", "\n", "text"] {
            assert!(chunk_text(input, 10).count() >= 1);
        }
    }
}
