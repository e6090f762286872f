use rc_core::types::FALLBACK_TONE;
use rc_core::{Analysis, Error, Question, Result};
use serde::Deserialize;

/// Older prompt variants asked for a bare array of questions; both shapes are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawResponse {
    Full(Analysis),
    QuestionsOnly(Vec<Question>),
}

/// Strip markdown code fences and any prose around the outermost JSON value.
pub fn normalize_response(raw: &str) -> String {
    let cleaned = raw
        .replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "");
    let trimmed = cleaned.trim();

    let start = trimmed.find(|c: char| c == '{' || c == '[');
    let end = trimmed.rfind(|c: char| c == '}' || c == ']');
    match (start, end) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

/// Parse and validate one model response.
pub fn parse_analysis(text: &str) -> Result<Analysis> {
    let raw: RawResponse = serde_json::from_str(text)
        .map_err(|e| Error::Schema(format!("response does not match the analysis schema: {}", e)))?;

    let analysis = match raw {
        RawResponse::Full(analysis) => analysis,
        RawResponse::QuestionsOnly(questions) => Analysis {
            tone: FALLBACK_TONE.to_string(),
            summary: String::new(),
            questions,
        },
    };

    if analysis.questions.is_empty() {
        return Err(Error::Schema("response contains no questions".to_string()));
    }
    analysis.validate()?;
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "tone": "Skeptical",
        "summary": "The author doubts that technology alone improves attention.",
        "questions": [
            {
                "question": "Which statement would the author most likely agree with?",
                "options": ["A", "B", "C", "D"],
                "correct_index": 2,
                "explanation": "C follows from the closing paragraph."
            }
        ]
    }"#;

    #[test]
    fn test_normalize_strips_fences() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert_eq!(normalize_response(&fenced), VALID.trim());

        let bare_fence = format!("```\n{}\n```\n", VALID);
        assert_eq!(normalize_response(&bare_fence), VALID.trim());
    }

    #[test]
    fn test_normalize_drops_surrounding_prose() {
        let chatty = format!("Here is the analysis you asked for:\n{}\nLet me know!", VALID);
        assert_eq!(normalize_response(&chatty), VALID.trim());
        assert_eq!(normalize_response("no json here"), "no json here");
    }

    #[test]
    fn test_parse_valid_object() {
        let analysis = parse_analysis(VALID).unwrap();
        assert_eq!(analysis.tone, "Skeptical");
        assert_eq!(analysis.questions.len(), 1);
        assert_eq!(analysis.questions[0].correct_index, 2);
    }

    #[test]
    fn test_parse_bare_question_array() {
        let text = r#"[{"question": "Q?", "options": ["a","b","c","d"], "correct_index": 0, "explanation": "e"}]"#;
        let analysis = parse_analysis(text).unwrap();
        assert_eq!(analysis.tone, "Analytical");
        assert_eq!(analysis.summary, "");
        assert_eq!(analysis.questions.len(), 1);
    }

    #[test]
    fn test_parse_rejects_schema_violations() {
        let cases = [
            "not json at all",
            r#"{"tone": "x", "summary": "y"}"#,
            r#"{"tone": "x", "summary": "y", "questions": []}"#,
            r#"{"tone": "x", "summary": "y", "questions": [{"question": "Q", "options": ["a","b","c"], "correct_index": 0, "explanation": "e"}]}"#,
            r#"{"tone": "x", "summary": "y", "questions": [{"question": "Q", "options": ["a","b","c","d"], "correct_index": 4, "explanation": "e"}]}"#,
            r#"{"tone": "x", "summary": "y", "questions": [{"question": "Q", "options": ["a","b","c","d"], "correct_index": -1, "explanation": "e"}]}"#,
            r#"{"tone": 3, "summary": "y", "questions": [{"question": "Q", "options": ["a","b","c","d"], "correct_index": 1, "explanation": "e"}]}"#,
        ];
        for case in cases {
            let err = parse_analysis(case).unwrap_err();
            assert!(matches!(err, Error::Schema(_)), "{}: {}", case, err);
        }
    }
}
