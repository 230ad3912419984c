//! Детерминированное разбиение train/test

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Индексы обучающей и тестовой частей
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Перемешивает индексы с фиксированным seed; первые `ceil(test_size * n)` идут в тест.
/// Без стратификации.
pub fn train_test_split(n_samples: usize, test_size: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n_samples as f64) * test_size.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = n_test.min(n_samples);
    let train = indices.split_off(n_test);

    SplitIndices {
        train,
        test: indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eighty_twenty() {
        let split = train_test_split(10, 0.2, 42);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_partition() {
        assert_eq!(train_test_split(500, 0.2, 42), train_test_split(500, 0.2, 42));
        assert_ne!(train_test_split(500, 0.2, 42), train_test_split(500, 0.2, 7));
    }

    #[test]
    fn test_size_rounds_up() {
        let split = train_test_split(11, 0.2, 1);
        assert_eq!(split.test.len(), 3);
    }
}
