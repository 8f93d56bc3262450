//! CART (Classification and Regression Tree) builder
//!
//! Implements deterministic exact-greedy classification tree construction
//! with Gini impurity. Candidate thresholds are midpoints between
//! consecutive distinct values; rows with `value <= threshold` go left.

use serde::{Deserialize, Serialize};

use crate::deterministic::SplitTieBreaker;

/// Training parameters for a single tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Tree node. Leaves have `left == right == 0`; every node keeps the class
/// counts of the training rows that reached it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub feature_index: usize,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
    pub class_counts: Vec<usize>,
}

impl Node {
    fn leaf(class_counts: Vec<usize>) -> Self {
        Self {
            feature_index: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            class_counts,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left == 0 && self.right == 0
    }

    /// Class counts normalised to probabilities
    pub fn probabilities(&self) -> Vec<f64> {
        let total: usize = self.class_counts.iter().sum();
        if total == 0 {
            let n = self.class_counts.len().max(1) as f64;
            return vec![1.0 / n; self.class_counts.len()];
        }
        self.class_counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }
}

/// Fitted classification tree stored as a flat node array (root at 0)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub n_classes: usize,
    pub n_features: usize,
}

impl Tree {
    /// Leaf reached by `features`
    pub fn leaf_for(&self, features: &[f64]) -> &Node {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node;
            }
            idx = if features[node.feature_index] <= node.threshold {
                node.left
            } else {
                node.right
            };
        }
    }

    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        self.leaf_for(features).probabilities()
    }

    /// Index of the most probable class; ties go to the lower index
    pub fn predict(&self, features: &[f64]) -> usize {
        argmax(&self.leaf_for(features).class_counts)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((node.left, depth + 1));
                stack.push((node.right, depth + 1));
            }
        }
        max_depth
    }
}

pub(crate) fn argmax(values: &[usize]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

/// Build a classification tree using exact-greedy CART algorithm
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [usize],
    n_classes: usize,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<f64>],
        targets: &'a [usize],
        n_classes: usize,
        config: TreeConfig,
    ) -> Self {
        debug_assert_eq!(features.len(), targets.len());

        let feature_count = features.first().map(Vec::len).unwrap_or(0);

        Self {
            config,
            features,
            targets,
            n_classes,
            feature_count,
        }
    }

    /// Build tree and return nodes
    pub fn build(&self) -> Tree {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..self.features.len()).collect();

        self.build_node(&indices, 0, &mut nodes, 0);

        Tree {
            nodes,
            n_classes: self.n_classes,
            n_features: self.feature_count,
        }
    }

    /// Recursively build tree nodes
    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        node_id: usize,
    ) -> usize {
        let current_idx = nodes.len();
        let counts = self.class_counts(indices);

        // Check stopping conditions
        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
            || counts.iter().filter(|&&c| c > 0).count() <= 1
        {
            nodes.push(Node::leaf(counts));
            return current_idx;
        }

        let split = match self.find_best_split(indices, &counts, node_id) {
            Some(s) => s,
            None => {
                nodes.push(Node::leaf(counts));
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        // Reserve space for current node
        nodes.push(Node {
            feature_index: split.feature_idx,
            threshold: split.threshold,
            left: 0,
            right: 0,
            class_counts: counts,
        });

        let child_id = node_id.wrapping_mul(2);
        let left_idx = self.build_node(&left_indices, depth + 1, nodes, child_id.wrapping_add(1));
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, child_id.wrapping_add(2));

        nodes[current_idx].left = left_idx;
        nodes[current_idx].right = right_idx;

        current_idx
    }

    /// Find the split with the largest Gini decrease
    fn find_best_split(
        &self,
        indices: &[usize],
        parent_counts: &[usize],
        node_id: usize,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let parent_gini = gini(parent_counts, n);
        let mut best_split: Option<SplitCandidate> = None;

        for feature_idx in 0..self.feature_count {
            let mut sorted: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.features[i][feature_idx], self.targets[i]))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.to_vec();
            let mut candidate_idx = 0usize;

            for pos in 0..n - 1 {
                let (value, class) = sorted[pos];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next_value = sorted[pos + 1].0;
                if next_value <= value {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.config.min_samples_leaf || n_right < self.config.min_samples_leaf {
                    continue;
                }

                let threshold = midpoint(value, next_value);
                let child_gini = (n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right))
                    / n as f64;
                let gain = parent_gini - child_gini;

                let candidate = SplitCandidate {
                    feature_idx,
                    threshold,
                    gain,
                    tie_breaker: SplitTieBreaker::new(feature_idx, candidate_idx, node_id),
                };
                candidate_idx += 1;

                if gain <= 0.0 {
                    continue;
                }

                best_split = match best_split {
                    None => Some(candidate),
                    Some(current) => {
                        // Deterministic tie-breaking
                        if gain > current.gain
                            || (gain == current.gain && candidate.tie_breaker < current.tie_breaker)
                        {
                            Some(candidate)
                        } else {
                            Some(current)
                        }
                    }
                };
            }
        }

        best_split
    }

    /// Split samples based on threshold
    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .copied()
            .partition(|&idx| self.features[idx][feature_idx] <= threshold)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &idx in indices {
            counts[self.targets[idx]] += 1;
        }
        counts
    }
}

/// Gini impurity: 1 - sum(p_k^2)
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Midpoint between two adjacent distinct values, never equal to `hi`
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= hi {
        lo
    } else {
        mid
    }
}
