use chrono::NaiveDate;
use crate::types::{Analysis, Dataset, Metadata, Passage};

/// Zip chunk texts with their analyses into the persisted dataset.
/// Passage ids run from 1 in chunk order.
pub fn assemble<I>(title: &str, source: &str, date: NaiveDate, passages: I) -> Dataset
where
    I: IntoIterator<Item = (String, Analysis)>,
{
    let passages = passages
        .into_iter()
        .enumerate()
        .map(|(i, (text, analysis))| Passage {
            id: i + 1,
            text,
            tone: analysis.tone,
            summary: analysis.summary,
            questions: analysis.questions,
        })
        .collect();

    Dataset {
        metadata: Metadata {
            title: title.to_string(),
            source: source.to_string(),
            date_scraped: date,
        },
        passages,
    }
}
