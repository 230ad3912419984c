//! Дерево регрессии (CART) по градиентам и гессианам.
//!
//! Лист хранит вес `-G / (H + lambda)`, выигрыш разбиения
//! `G_L^2 / (H_L + lambda) + G_R^2 / (H_R + lambda) - G^2 / (H + lambda)`.
//! При `g = -y`, `h = 1`, `lambda = 0` это обычное дерево по MSE: лист равен
//! среднему, выигрыш равен снижению суммы квадратов.

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// None - без ограничения глубины
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Минимальная сумма гессианов в потомке
    pub min_child_weight: f64,
    /// L2-регуляризация весов листьев
    pub lambda: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            min_child_weight: 0.0,
            lambda: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    params: TreeParams,
    n_features: usize,
    root: Option<TreeNode>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            n_features: 0,
            root: None,
        }
    }

    /// Обычное дерево по MSE на строках `indices` (повторы допустимы - бутстрап)
    pub fn fit_targets(&mut self, X: &Array2<f64>, y: &Array1<f64>, indices: Vec<usize>) -> Result<()> {
        let grad = y.mapv(|v| -v);
        let hess = Array1::ones(y.len());
        self.fit_gradients(X, &grad, &hess, indices)
    }

    pub fn fit_gradients(
        &mut self,
        X: &Array2<f64>,
        grad: &Array1<f64>,
        hess: &Array1<f64>,
        indices: Vec<usize>,
    ) -> Result<()> {
        if X.nrows() == 0 || indices.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }
        if grad.len() != X.nrows() || hess.len() != X.nrows() {
            return Err(PipelineError::ShapeMismatch {
                expected: X.nrows(),
                actual: grad.len().min(hess.len()),
            });
        }

        self.n_features = X.ncols();
        self.root = Some(self.build_tree(X, grad, hess, indices, 0));
        Ok(())
    }

    fn build_tree(
        &self,
        X: &Array2<f64>,
        grad: &Array1<f64>,
        hess: &Array1<f64>,
        indices: Vec<usize>,
        depth: usize,
    ) -> TreeNode {
        let g_sum: f64 = indices.iter().map(|&i| grad[i]).sum();
        let h_sum: f64 = indices.iter().map(|&i| hess[i]).sum();
        let leaf = TreeNode::Leaf {
            value: self.leaf_weight(g_sum, h_sum),
        };

        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);
        if depth_reached || indices.len() < self.params.min_samples_split {
            return leaf;
        }

        let best = match self.find_best_split(X, grad, hess, &indices, g_sum, h_sum) {
            Some(best) => best,
            None => return leaf,
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| X[[i, best.feature]] <= best.threshold);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build_tree(X, grad, hess, left_indices, depth + 1)),
            right: Box::new(self.build_tree(X, grad, hess, right_indices, depth + 1)),
        }
    }

    /// Полный перебор порогов: середины между соседними различными значениями
    fn find_best_split(
        &self,
        X: &Array2<f64>,
        grad: &Array1<f64>,
        hess: &Array1<f64>,
        indices: &[usize],
        g_sum: f64,
        h_sum: f64,
    ) -> Option<BestSplit> {
        let lambda = self.params.lambda;
        let parent_score = score(g_sum, h_sum, lambda);
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;

        let mut sorted = indices.to_vec();
        for feature in 0..X.ncols() {
            sorted.sort_by(|&a, &b| X[[a, feature]].total_cmp(&X[[b, feature]]));

            let mut g_left = 0.0;
            let mut h_left = 0.0;
            for pos in 0..sorted.len().saturating_sub(1) {
                let i = sorted[pos];
                g_left += grad[i];
                h_left += hess[i];

                let current = X[[i, feature]];
                let next = X[[sorted[pos + 1], feature]];
                if next <= current {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = sorted.len() - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let g_right = g_sum - g_left;
                let h_right = h_sum - h_left;
                if h_left < self.params.min_child_weight || h_right < self.params.min_child_weight {
                    continue;
                }

                let gain = score(g_left, h_left, lambda) + score(g_right, h_right, lambda) - parent_score;
                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: 0.5 * (current + next),
                        gain,
                    });
                }
            }
        }

        best
    }

    fn leaf_weight(&self, g_sum: f64, h_sum: f64) -> f64 {
        let denom = h_sum + self.params.lambda;
        if denom <= 0.0 {
            0.0
        } else {
            -g_sum / denom
        }
    }

    pub fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(PipelineError::NotFitted("RegressionTree"))?;
        if X.ncols() != self.n_features {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features,
                actual: X.ncols(),
            });
        }

        Ok(X.rows().into_iter().map(|row| predict_single(root, row)).collect())
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map_or(0, walk)
    }
}

fn score(g: f64, h: f64, lambda: f64) -> f64 {
    let denom = h + lambda;
    if denom <= 0.0 {
        0.0
    } else {
        g * g / denom
    }
}

fn predict_single(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
    match node {
        TreeNode::Leaf { value } => *value,
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if sample[*feature] <= *threshold {
                predict_single(left, sample)
            } else {
                predict_single(right, sample)
            }
        }
    }
}
