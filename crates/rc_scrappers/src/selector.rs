use rand::seq::SliceRandom;
use rand::Rng;
use rc_core::{EssayCandidate, Error, Result};
use tracing::info;

/// Picks the essay for this run so that a feed which has not advanced since
/// the previous run does not produce the same dataset again.
pub struct EssaySelector;

impl EssaySelector {
    pub fn select<'a, R: Rng + ?Sized>(
        candidates: &'a [EssayCandidate],
        previous_source: Option<&str>,
        rng: &mut R,
    ) -> Result<&'a EssayCandidate> {
        let (latest, older) = candidates.split_first().ok_or(Error::NoCandidates)?;

        if previous_source != Some(latest.link.as_str()) {
            info!("🆕 Latest essay selected: {}", latest.title);
            return Ok(latest);
        }

        match older.choose(rng) {
            Some(choice) => {
                info!(
                    "🔁 Latest essay was already used, picked {} from {} older candidates",
                    choice.title,
                    older.len()
                );
                Ok(choice)
            }
            None => {
                info!("⏭️ Only one candidate available, reusing {}", latest.title);
                Ok(latest)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidates() -> Vec<EssayCandidate> {
        vec![
            EssayCandidate::new("https://aeon.co/essays/a", "A"),
            EssayCandidate::new("https://aeon.co/essays/b", "B"),
            EssayCandidate::new("https://aeon.co/essays/c", "C"),
        ]
    }

    #[test]
    fn test_empty_candidates() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = EssaySelector::select(&[], None, &mut rng);
        assert!(matches!(result, Err(Error::NoCandidates)));
    }

    #[test]
    fn test_fresh_feed_returns_latest() {
        let candidates = candidates();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let selected = EssaySelector::select(&candidates, None, &mut rng).unwrap();
            assert_eq!(selected, &candidates[0]);
        }

        let selected =
            EssaySelector::select(&candidates, Some("https://aeon.co/essays/z"), &mut rng).unwrap();
        assert_eq!(selected, &candidates[0]);
    }

    #[test]
    fn test_repeat_is_avoided() {
        let candidates = candidates();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..100 {
            let selected =
                EssaySelector::select(&candidates, Some(&candidates[0].link), &mut rng).unwrap();
            assert_ne!(selected, &candidates[0]);
            seen.insert(selected.link.clone());
        }
        // both older candidates are reachable
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_single_candidate_is_reused() {
        let candidates = vec![EssayCandidate::new("https://aeon.co/essays/only", "Only")];
        let mut rng = StdRng::seed_from_u64(1);
        let selected =
            EssaySelector::select(&candidates, Some("https://aeon.co/essays/only"), &mut rng).unwrap();
        assert_eq!(selected, &candidates[0]);
    }
}
