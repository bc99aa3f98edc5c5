use crate::error::CompareError;
use crate::models::{DocContext, Document, SearchCandidate, SelectedSources};
use tracing::debug;

pub const REQUIRED_SOURCES: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctSourceSelector;

impl DistinctSourceSelector {
    pub fn new() -> Self {
        Self
    }

    pub fn select(
        &self,
        pre_supplied: &[Document],
        candidates: &[SearchCandidate],
    ) -> Result<DocContext, CompareError> {
        let mut context = DocContext::new();

        for document in pre_supplied {
            context.insert(document.source.as_str(), document.content.as_str());
        }

        let mut scanned = 0usize;
        for candidate in candidates {
            if context.len() >= REQUIRED_SOURCES {
                break;
            }
            scanned += 1;
            context.insert(candidate.source.as_str(), candidate.content.as_str());
        }

        debug!(
            pre_supplied = pre_supplied.len(),
            candidates = candidates.len(),
            scanned,
            distinct_sources = context.len(),
            "distinct source selection finished"
        );

        if context.len() < REQUIRED_SOURCES {
            return Err(CompareError::InsufficientSources);
        }

        context.truncate(REQUIRED_SOURCES);
        Ok(context)
    }

    pub fn select_pair(
        &self,
        pre_supplied: &[Document],
        candidates: &[SearchCandidate],
    ) -> Result<SelectedSources, CompareError> {
        let context = self.select(pre_supplied, candidates)?;
        let mut picks = context
            .iter()
            .map(|(source, content)| Document::new(source, content));

        match (picks.next(), picks.next()) {
            (Some(first), Some(second)) => Ok(SelectedSources { first, second }),
            _ => Err(CompareError::InsufficientSources),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DistinctSourceSelector;
    use crate::error::CompareError;
    use crate::models::{Document, SearchCandidate};

    fn candidate(content: &str, source: &str, distance: f64) -> SearchCandidate {
        SearchCandidate::new(content, source, distance)
    }

    #[test]
    fn two_pre_supplied_documents_need_no_candidates() {
        let selector = DistinctSourceSelector::new();
        let pre_supplied = vec![
            Document::new("manual.pdf", "manual text"),
            Document::new("datasheet.pdf", "datasheet text"),
        ];

        let context = selector
            .select(&pre_supplied, &[])
            .expect("two documents are enough");

        assert_eq!(context.keys().collect::<Vec<_>>(), vec!["manual.pdf", "datasheet.pdf"]);
        assert_eq!(context.get("manual.pdf"), Some("manual text"));
        assert_eq!(context.get("datasheet.pdf"), Some("datasheet text"));
    }

    #[test]
    fn duplicate_source_hits_are_skipped() {
        let selector = DistinctSourceSelector::new();
        let candidates = vec![
            candidate("c1", "docA", 0.1),
            candidate("c2", "docA", 0.2),
            candidate("c3", "docB", 0.3),
        ];

        let context = selector.select(&[], &candidates).expect("two sources exist");

        assert_eq!(context.keys().collect::<Vec<_>>(), vec!["docA", "docB"]);
        assert_eq!(context.get("docA"), Some("c1"));
        assert_eq!(context.get("docB"), Some("c3"));
    }

    #[test]
    fn single_source_fails_with_insufficient_sources() {
        let selector = DistinctSourceSelector::new();
        let candidates = vec![
            candidate("c1", "docA", 0.1),
            candidate("c2", "docA", 0.2),
            candidate("c3", "docA", 0.3),
        ];

        let result = selector.select(&[], &candidates);
        assert!(matches!(result, Err(CompareError::InsufficientSources)));
    }

    #[test]
    fn no_documents_at_all_fails() {
        let selector = DistinctSourceSelector::new();
        assert!(matches!(
            selector.select(&[], &[]),
            Err(CompareError::InsufficientSources)
        ));
    }

    #[test]
    fn pre_supplied_content_is_never_overwritten() {
        let selector = DistinctSourceSelector::new();
        let pre_supplied = vec![Document::new("docX", "uploaded text")];
        let candidates = vec![
            candidate("indexed x", "docX", 0.05),
            candidate("indexed y", "docY", 0.2),
        ];

        let context = selector
            .select(&pre_supplied, &candidates)
            .expect("docX and docY are distinct");

        assert_eq!(context.keys().collect::<Vec<_>>(), vec!["docX", "docY"]);
        assert_eq!(context.get("docX"), Some("uploaded text"));
        assert_eq!(context.get("docY"), Some("indexed y"));
    }

    #[test]
    fn pre_supplied_duplicate_of_only_candidate_source_fails() {
        let selector = DistinctSourceSelector::new();
        let pre_supplied = vec![Document::new("docX", "uploaded text")];
        let candidates = vec![candidate("indexed x", "docX", 0.05)];

        assert!(matches!(
            selector.select(&pre_supplied, &candidates),
            Err(CompareError::InsufficientSources)
        ));
    }

    #[test]
    fn only_first_two_pre_supplied_documents_are_kept() {
        let selector = DistinctSourceSelector::new();
        let pre_supplied = vec![
            Document::new("one.pdf", "1"),
            Document::new("two.pdf", "2"),
            Document::new("three.pdf", "3"),
        ];
        let candidates = vec![candidate("c", "four.pdf", 0.1)];

        let pair = selector
            .select_pair(&pre_supplied, &candidates)
            .expect("enough documents");

        assert_eq!(pair.source_ids(), vec!["one.pdf".to_string(), "two.pdf".to_string()]);
        assert_eq!(pair.first.content, "1");
        assert_eq!(pair.second.content, "2");
    }

    #[test]
    fn ranking_order_decides_between_new_sources() {
        let selector = DistinctSourceSelector::new();
        let candidates = vec![
            candidate("best", "docA", 0.1),
            candidate("second", "docB", 0.2),
            candidate("third", "docC", 0.3),
        ];

        let pair = selector.select_pair(&[], &candidates).expect("three sources");
        assert_eq!(pair.first.source, "docA");
        assert_eq!(pair.second.source, "docB");
    }
}
