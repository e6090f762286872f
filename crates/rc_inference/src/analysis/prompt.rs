use serde_json::{json, Value};

pub const PASSAGE_MARKER: &str = "PASSAGE:";

const QUESTION_TYPES: [&str; 4] = [
    "Inference: a conclusion the passage supports without stating it directly",
    "Main idea: the central theme or primary purpose of the passage",
    "Detail: a specific claim or example stated in the passage",
    "Tone or structure: the author's attitude or the way the argument is built",
];

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(passage: &str, question_count: usize) -> String {
    let question_types = QUESTION_TYPES
        .iter()
        .cycle()
        .take(question_count)
        .enumerate()
        .map(|(i, kind)| format!("{}. {}", i + 1, kind))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an exam setter for a verbal ability and reading comprehension test.
Read the passage below and analyse it.

Return ONLY one JSON object, without markdown fences or commentary, with exactly these keys:
- "tone": one or two words describing the author's tone (e.g. "Analytical", "Critical", "Reflective")
- "summary": a one-sentence summary of the passage
- "questions": an array of exactly {count} multiple-choice questions

The questions must cover these types, in order:
{types}

Every question is an object with:
- "question": the question text
- "options": an array of exactly 4 answer strings
- "correct_index": the 0-based index (0 to 3) of the correct option
- "explanation": why the correct option is right and the others are not

{marker}
{passage}"#,
        count = question_count,
        types = question_types,
        marker = PASSAGE_MARKER,
        passage = passage,
    )
}

/// Response schema in the OpenAPI subset accepted by structured-output backends.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "tone": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        },
                        "correct_index": { "type": "INTEGER" },
                        "explanation": { "type": "STRING" }
                    },
                    "required": ["question", "options", "correct_index", "explanation"]
                }
            }
        },
        "required": ["tone", "summary", "questions"]
    })
}
