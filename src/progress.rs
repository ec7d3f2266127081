//! Console progress for bulk retrieval

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::info;

/// Progress over the chunks of one retrieval call
///
/// Hidden unless enabled, so callers can drive it unconditionally.
pub(crate) struct ChunkProgress {
    bar: ProgressBar,
    label: &'static str,
    enabled: bool,
}

impl ChunkProgress {
    pub(crate) fn new(total_chunks: usize, label: &'static str, enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new(total_chunks as u64);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({msg})",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        } else {
            ProgressBar::with_draw_target(Some(total_chunks as u64), ProgressDrawTarget::hidden())
        };
        bar.set_message(format!("Fetching {label} chunks"));

        Self {
            bar,
            label,
            enabled,
        }
    }

    pub(crate) fn chunk_done(&self, article_count: usize) {
        self.bar.inc(1);
        self.bar
            .set_message(format!("{article_count} {}s", self.label));
    }

    pub(crate) fn limit_reached(&self, max_articles: usize) {
        if self.enabled {
            self.bar.println(format!(
                "Reached maximum article limit ({max_articles}). Stopping."
            ));
        }
    }

    pub(crate) fn finish(&self, article_count: usize) {
        if self.enabled {
            self.bar
                .finish_with_message(format!("Retrieved {article_count} articles"));
            info!(articles = article_count, "Retrieved {} articles", article_count);
        } else {
            self.bar.finish_and_clear();
        }
    }
}
