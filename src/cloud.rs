//! Word cloud aggregation over response lists.

use std::collections::HashMap;

use crate::types::Response;

/// Cap on distinct phrases returned.
pub const MAX_PHRASES: usize = 150;

/// One phrase and how often it was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub text: String,
    pub count: usize,
}

/// Aggregate responses into ranked phrases.
///
/// Each response counts as one whole phrase, with casing and
/// punctuation preserved. Hidden responses and blank texts are
/// skipped. The result is ordered by count, descending; ties keep
/// first-encounter order.
pub fn word_cloud(responses: &[Response]) -> Vec<WordEntry> {
    let mut entries: Vec<WordEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for response in responses {
        if response.is_moderated {
            continue;
        }
        let phrase = response.text.trim();
        if phrase.is_empty() {
            continue;
        }
        match index.get(phrase) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(phrase.to_string(), entries.len());
                entries.push(WordEntry {
                    text: phrase.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Vec::sort_by is stable, so equal counts stay in insertion order.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(MAX_PHRASES);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(text: &str) -> Response {
        Response::new(text, false, None)
    }

    fn hidden(text: &str) -> Response {
        let mut r = response(text);
        r.is_moderated = true;
        r
    }

    #[test]
    fn counts_whole_phrases() {
        let responses = vec![
            response("more coffee"),
            response("more coffee"),
            response("standups too long"),
        ];
        let cloud = word_cloud(&responses);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud[0].text, "more coffee");
        assert_eq!(cloud[0].count, 2);
        assert_eq!(cloud[1].count, 1);
    }

    #[test]
    fn casing_and_punctuation_distinguish_phrases() {
        let responses = vec![
            response("More coffee"),
            response("more coffee"),
            response("more coffee!"),
        ];
        let cloud = word_cloud(&responses);
        assert_eq!(cloud.len(), 3);
        assert!(cloud.iter().all(|w| w.count == 1));
    }

    #[test]
    fn moderated_responses_never_count() {
        let responses = vec![
            response("fine"),
            hidden("fine"),
            hidden("awful"),
        ];
        let cloud = word_cloud(&responses);
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud[0].text, "fine");
        assert_eq!(cloud[0].count, 1);
    }

    #[test]
    fn blank_texts_are_skipped() {
        let responses = vec![response("   "), response("")];
        assert!(word_cloud(&responses).is_empty());
    }

    #[test]
    fn ties_keep_first_encounter_order() {
        let responses = vec![
            response("alpha"),
            response("beta"),
            response("gamma"),
            response("beta"),
            response("gamma"),
            response("alpha"),
        ];
        let cloud = word_cloud(&responses);
        let texts: Vec<_> = cloud.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn higher_counts_rank_first_and_list_is_capped() {
        let mut responses = vec![response("popular"); 3];
        for i in 0..(MAX_PHRASES + 10) {
            responses.push(response(&format!("phrase {i}")));
        }
        let cloud = word_cloud(&responses);
        assert_eq!(cloud.len(), MAX_PHRASES);
        assert_eq!(cloud[0].text, "popular");
        assert_eq!(cloud[0].count, 3);
    }

    #[test]
    fn trims_before_grouping() {
        let responses = vec![response("  spaced  "), response("spaced")];
        let cloud = word_cloud(&responses);
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud[0].count, 2);
    }
}
