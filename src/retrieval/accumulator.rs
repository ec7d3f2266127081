use std::collections::HashSet;

use crate::models::Article;

/// Fold `batch` into a running result set
///
/// Articles are taken in order. With `deduplicate`, an article whose id is
/// already in `seen_ids` is skipped; articles without an id are never
/// duplicates. Processing stops once `max_articles` is reached.
///
/// Returns the accepted articles, the new count and whether the caller
/// should keep fetching.
pub fn process_articles(
    batch: Vec<Article>,
    seen_ids: &mut HashSet<String>,
    deduplicate: bool,
    max_articles: usize,
    current_count: usize,
) -> (Vec<Article>, usize, bool) {
    let mut accepted = Vec::new();
    let mut count = current_count;

    for article in batch {
        if count >= max_articles {
            break;
        }

        if deduplicate {
            if let Some(id) = &article.id {
                if !seen_ids.insert(id.clone()) {
                    continue;
                }
            }
        }

        accepted.push(article);
        count += 1;
    }

    (accepted, count, count < max_articles)
}

/// Articles collected by one retrieval call
#[derive(Debug)]
pub(crate) struct ResultAccumulator {
    articles: Vec<Article>,
    seen_ids: HashSet<String>,
    deduplicate: bool,
    max_articles: usize,
}

impl ResultAccumulator {
    pub(crate) fn new(max_articles: usize, deduplicate: bool) -> Self {
        Self {
            articles: Vec::new(),
            seen_ids: HashSet::new(),
            deduplicate,
            max_articles,
        }
    }

    /// Add a page of articles, returning how many were accepted
    pub(crate) fn extend(&mut self, batch: Vec<Article>) -> usize {
        let (accepted, count, _) = process_articles(
            batch,
            &mut self.seen_ids,
            self.deduplicate,
            self.max_articles,
            self.articles.len(),
        );
        let added = count - self.articles.len();
        self.articles.extend(accepted);
        added
    }

    pub(crate) fn is_full(&self) -> bool {
        self.articles.len() >= self.max_articles
    }

    pub(crate) fn len(&self) -> usize {
        self.articles.len()
    }

    pub(crate) fn into_articles(self) -> Vec<Article> {
        self.articles
    }
}
