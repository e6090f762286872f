//! Groups consecutive paragraphs into passages of roughly `target_words` words.

pub const DEFAULT_TARGET_WORDS: usize = 600;
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Greedy single pass. A paragraph is always added before the threshold is
/// checked, so a paragraph longer than `target_words` still lands whole in one
/// chunk and every sealed chunk except the last holds at least `target_words`.
pub fn chunk_paragraphs<S: AsRef<str>>(paragraphs: &[S], target_words: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut words = 0;

    for paragraph in paragraphs {
        let paragraph = paragraph.as_ref();
        current.push(paragraph);
        words += word_count(paragraph);

        if words >= target_words {
            chunks.push(current.join(PARAGRAPH_SEPARATOR));
            current.clear();
            words = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(PARAGRAPH_SEPARATOR));
    }

    chunks
}
