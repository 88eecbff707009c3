use unicode_segmentation::UnicodeSegmentation;

/// Keeps at most the last `max_graphemes` graphemes of `text`, never
/// splitting a user-perceived character. Used to bound the stderr excerpts
/// that external tools contribute to error messages.
pub fn tail_graphemes(text: &str, max_graphemes: usize) -> String {
    let text = text.trim();
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max_graphemes {
        return text.to_string();
    }

    let mut clipped = String::with_capacity(max_graphemes * 2 + 3);
    clipped.push_str("...");
    for grapheme in &graphemes[graphemes.len() - max_graphemes..] {
        clipped.push_str(grapheme);
    }
    clipped
}
