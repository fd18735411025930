//! Card backgrounds.
//!
//! Adjacent cards should not look alike: a card never reuses either of the
//! two previous cards' backgrounds.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::paper::FeedPaper;

/// Default card gradients.
pub const DEFAULT_BACKGROUNDS: &[&str] = &[
    "linear-gradient(90deg, rgb(245,152,168) 0%, rgb(246,237,178) 100%)",
    "linear-gradient(180deg, rgb(254,100,121) 0%, rgb(251,221,186) 100%)",
    "linear-gradient(102.3deg, rgba(147,39,143,1) 5.9%, rgba(234,172,232,1) 64%, rgba(246,219,245,1) 89%)",
    "linear-gradient(111.4deg, rgba(238,113,113,1) 1%, rgba(246,215,148,1) 58%)",
    "linear-gradient(225deg, #FFE29F 0%, #FFA99F 48%, #FF719A 100%)",
    "linear-gradient(to right, #ffc3a0 0%, #ffafbd 100%)",
];

/// How many preceding cards a new background must differ from.
pub const RECENT_WINDOW: usize = 2;

/// Picks card backgrounds that avoid the recent ones.
#[derive(Debug, Clone)]
pub struct BackgroundPicker {
    backgrounds: Vec<String>,
    window: usize,
}

impl BackgroundPicker {
    pub fn new(backgrounds: Vec<String>, window: usize) -> Self {
        Self {
            backgrounds,
            window,
        }
    }

    pub fn backgrounds(&self) -> &[String] {
        &self.backgrounds
    }

    /// Pick a background not used by the last `window` entries of `previous`.
    ///
    /// If every background is recent, any background may be picked. Returns
    /// an empty string only when the picker has no backgrounds at all.
    pub fn pick<R: Rng + ?Sized>(&self, previous: &[&str], rng: &mut R) -> String {
        let recent = &previous[previous.len().saturating_sub(self.window)..];
        let fresh: Vec<&String> = self
            .backgrounds
            .iter()
            .filter(|bg| !recent.contains(&bg.as_str()))
            .collect();

        let chosen = if fresh.is_empty() {
            self.backgrounds.choose(rng)
        } else {
            fresh.choose(rng).copied()
        };
        chosen.cloned().unwrap_or_default()
    }

    /// Fill in backgrounds for a page of cards, in order.
    pub fn decorate<R: Rng + ?Sized>(&self, papers: &mut [FeedPaper], rng: &mut R) {
        for i in 0..papers.len() {
            let background = {
                let previous: Vec<&str> = papers[..i].iter().map(|p| p.background.as_str()).collect();
                self.pick(&previous, rng)
            };
            papers[i].background = background;
        }
    }
}

impl Default for BackgroundPicker {
    fn default() -> Self {
        Self::new(
            DEFAULT_BACKGROUNDS.iter().map(|b| b.to_string()).collect(),
            RECENT_WINDOW,
        )
    }
}
