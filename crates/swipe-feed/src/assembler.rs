//! Turns a page of parsed works into decorated feed cards.

use std::sync::Arc;

use futures::future::join_all;
use rand::Rng;
use swipe_topics::TopicColorAssigner;
use tracing::debug;

use crate::background::BackgroundPicker;
use crate::openalex::WorksPage;
use crate::paper::{FeedPage, FeedPaper};

/// Builds feed pages from source works.
///
/// Topic colors for a page are requested concurrently; the assigner keeps
/// them consistent when the same new topic shows up on several cards.
pub struct FeedAssembler {
    assigner: Arc<TopicColorAssigner>,
    picker: BackgroundPicker,
}

impl FeedAssembler {
    pub fn new(assigner: Arc<TopicColorAssigner>) -> Self {
        Self::with_picker(assigner, BackgroundPicker::default())
    }

    pub fn with_picker(assigner: Arc<TopicColorAssigner>, picker: BackgroundPicker) -> Self {
        Self { assigner, picker }
    }

    pub fn assigner(&self) -> &Arc<TopicColorAssigner> {
        &self.assigner
    }

    /// Decorate `works` as feed page `page`.
    pub async fn build_page<R: Rng + ?Sized>(
        &self,
        page: u32,
        works: WorksPage,
        rng: &mut R,
    ) -> FeedPage {
        let has_more = works.has_more();

        let colors = join_all(
            works
                .works
                .iter()
                .map(|work| self.assigner.assign_color(Some(&work.topic))),
        )
        .await;

        let mut papers: Vec<FeedPaper> = works
            .works
            .into_iter()
            .zip(colors)
            .map(|(work, color)| FeedPaper::new(work, color))
            .collect();
        self.picker.decorate(&mut papers, rng);

        debug!(page, cards = papers.len(), has_more, "Built feed page");

        FeedPage {
            papers,
            next_page: page.saturating_add(1),
            has_more,
        }
    }
}
