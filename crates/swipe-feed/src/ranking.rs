//! Relevance ranking over precomputed embeddings.
//!
//! Each candidate carries three vectors (abstract, title, keywords). The
//! query vector comes from the caller's interests; producing embeddings is
//! outside this crate.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// Cards returned by the ranked feed.
pub const DEFAULT_FEED_SIZE: usize = 15;

/// Weight of each embedding in the relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceWeights {
    pub abstract_weight: f32,
    pub title_weight: f32,
    pub keywords_weight: f32,
}

impl Default for RelevanceWeights {
    fn default() -> Self {
        Self {
            abstract_weight: 0.5,
            title_weight: 0.3,
            keywords_weight: 0.2,
        }
    }
}

/// An item with its embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct RankCandidate<T> {
    pub item: T,
    pub abstract_vector: Vec<f32>,
    pub title_vector: Vec<f32>,
    pub keywords_vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub score: f32,
}

impl RelevanceWeights {
    pub fn score<T>(&self, candidate: &RankCandidate<T>, query: &[f32]) -> Result<f32, FeedError> {
        Ok(self.abstract_weight * dot(&candidate.abstract_vector, query)?
            + self.title_weight * dot(&candidate.title_vector, query)?
            + self.keywords_weight * dot(&candidate.keywords_vector, query)?)
    }
}

/// Rank with the default weights.
pub fn rank_by_relevance<T>(
    candidates: Vec<RankCandidate<T>>,
    query: &[f32],
    limit: usize,
) -> Result<Vec<Ranked<T>>, FeedError> {
    rank_with_weights(candidates, query, limit, RelevanceWeights::default())
}

/// Score every candidate and keep the best `limit`, highest first.
///
/// Equal scores keep their input order. A candidate whose vectors do not
/// match the query's dimension fails the whole ranking.
pub fn rank_with_weights<T>(
    candidates: Vec<RankCandidate<T>>,
    query: &[f32],
    limit: usize,
    weights: RelevanceWeights,
) -> Result<Vec<Ranked<T>>, FeedError> {
    let mut ranked = candidates
        .into_iter()
        .map(|c| {
            let score = weights.score(&c, query)?;
            Ok(Ranked {
                item: c.item,
                score,
            })
        })
        .collect::<Result<Vec<_>, FeedError>>()?;

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);
    Ok(ranked)
}

fn dot(a: &[f32], b: &[f32]) -> Result<f32, FeedError> {
    if a.len() != b.len() {
        return Err(FeedError::DimensionMismatch {
            expected: b.len(),
            actual: a.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &'static str, a: [f32; 2], t: [f32; 2], k: [f32; 2]) -> RankCandidate<&'static str> {
        RankCandidate {
            item: name,
            abstract_vector: a.to_vec(),
            title_vector: t.to_vec(),
            keywords_vector: k.to_vec(),
        }
    }

    #[test]
    fn abstract_outweighs_title_and_keywords() {
        let query = [1.0, 0.0];
        let candidates = vec![
            candidate("title-only", [0.0, 1.0], [1.0, 0.0], [0.0, 1.0]),
            candidate("abstract-only", [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]),
            candidate("keywords-only", [0.0, 1.0], [0.0, 1.0], [1.0, 0.0]),
        ];

        let ranked = rank_by_relevance(candidates, &query, DEFAULT_FEED_SIZE).unwrap();
        let order: Vec<_> = ranked.iter().map(|r| r.item).collect();
        assert_eq!(order, vec!["abstract-only", "title-only", "keywords-only"]);
        assert!((ranked[0].score - 0.5).abs() < 1e-6);
        assert!((ranked[1].score - 0.3).abs() < 1e-6);
        assert!((ranked[2].score - 0.2).abs() < 1e-6);
    }

    #[test]
    fn limit_truncates() {
        let query = [1.0, 0.0];
        let candidates = (0..20)
            .map(|i| RankCandidate {
                item: i,
                abstract_vector: vec![i as f32, 0.0],
                title_vector: vec![0.0, 0.0],
                keywords_vector: vec![0.0, 0.0],
            })
            .collect();

        let ranked = rank_by_relevance(candidates, &query, DEFAULT_FEED_SIZE).unwrap();
        assert_eq!(ranked.len(), DEFAULT_FEED_SIZE);
        assert_eq!(ranked[0].item, 19);
        assert_eq!(ranked[14].item, 5);
    }

    #[test]
    fn ties_keep_input_order() {
        let query = [1.0, 1.0];
        let candidates = vec![
            candidate("first", [1.0, 0.0], [0.0, 0.0], [0.0, 0.0]),
            candidate("second", [0.0, 1.0], [0.0, 0.0], [0.0, 0.0]),
        ];
        let ranked = rank_by_relevance(candidates, &query, 10).unwrap();
        assert_eq!(ranked[0].item, "first");
        assert_eq!(ranked[1].item, "second");
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let candidates = vec![RankCandidate {
            item: (),
            abstract_vector: vec![1.0, 0.0, 0.0],
            title_vector: vec![1.0, 0.0],
            keywords_vector: vec![1.0, 0.0],
        }];
        let err = rank_by_relevance(candidates, &[1.0, 0.0], 5).unwrap_err();
        assert!(matches!(
            err,
            FeedError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }
}
