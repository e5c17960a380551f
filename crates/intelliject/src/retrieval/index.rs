//! In-memory cosine similarity index over question vectors

use std::cmp::Ordering;

use crate::types::{Pyq, ScoredPyq};

/// Cosine similarity; `0.0` for mismatched dimensions or zero-norm vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Flat index of questions and their vectors
#[derive(Debug, Default, Clone)]
pub struct QuestionIndex {
    entries: Vec<(Pyq, Vec<f32>)>,
}

impl QuestionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pyq: Pyq, vector: Vec<f32>) {
        self.entries.push((pyq, vector));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `k` questions, most similar first; ties go to the lower id
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredPyq> {
        let mut scored: Vec<ScoredPyq> = self
            .entries
            .iter()
            .map(|(pyq, vector)| ScoredPyq {
                pyq: pyq.clone(),
                similarity: cosine_similarity(query, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.pyq.id.cmp(&b.pyq.id))
        });
        scored.truncate(k);
        scored
    }
}

impl FromIterator<(Pyq, Vec<f32>)> for QuestionIndex {
    fn from_iter<I: IntoIterator<Item = (Pyq, Vec<f32>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pyq(id: i64, question: &str) -> Pyq {
        Pyq {
            id,
            subject: "Cyber Security".to_string(),
            sub_topic: String::new(),
            question: question.to_string(),
            marks: 5.0,
            year: "2023".to_string(),
            semester: None,
            branch: None,
            unit: None,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index: QuestionIndex = vec![
            (pyq(1, "far"), vec![0.0, 1.0]),
            (pyq(2, "near"), vec![1.0, 0.1]),
            (pyq(3, "middle"), vec![1.0, 1.0]),
        ]
        .into_iter()
        .collect();

        let hits = index.search(&[1.0, 0.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].pyq.id, 2);
        assert_eq!(hits[1].pyq.id, 3);
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[test]
    fn test_ties_break_by_id() {
        let mut index = QuestionIndex::new();
        index.insert(pyq(9, "b"), vec![1.0, 0.0]);
        index.insert(pyq(4, "a"), vec![2.0, 0.0]);

        let hits = index.search(&[1.0, 0.0], 5);
        assert_eq!(hits.iter().map(|h| h.pyq.id).collect::<Vec<_>>(), vec![4, 9]);
    }

    #[test]
    fn test_mismatched_dimension_scores_zero() {
        let mut index = QuestionIndex::new();
        index.insert(pyq(1, "short"), vec![1.0]);
        index.insert(pyq(2, "ok"), vec![0.5, 0.5]);

        let hits = index.search(&[1.0, 0.0], 2);
        assert_eq!(hits[0].pyq.id, 2);
        assert_eq!(hits[1].similarity, 0.0);
    }

    #[test]
    fn test_empty_index() {
        assert!(QuestionIndex::new().search(&[1.0], 3).is_empty());
    }
}
