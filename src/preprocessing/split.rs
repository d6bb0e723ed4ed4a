//! Разделение на train/validation

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{PrepError, Result};

/// Делит строки на обучающую и валидационную части.
///
/// Размер обучающей части `floor(n * train_fraction)`. Без `seed` порядок
/// сохраняется (первые строки идут в train), с `seed` строки перемешиваются
/// детерминированно.
pub fn train_validation_split<T: Clone>(
    rows: &[T],
    train_fraction: f64,
    seed: Option<u64>,
) -> Result<(Vec<T>, Vec<T>)> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(PrepError::InvalidSpec(format!(
            "train fraction must be in (0, 1), got {train_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..rows.len()).collect();
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    }

    let split_idx = (rows.len() as f64 * train_fraction) as usize;
    let train = indices[..split_idx].iter().map(|&i| rows[i].clone()).collect();
    let validation = indices[split_idx..].iter().map(|&i| rows[i].clone()).collect();

    Ok((train, validation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_split_is_eighty_twenty() {
        let rows: Vec<u32> = (0..10).collect();
        let (train, validation) = train_validation_split(&rows, 0.8, None).unwrap();
        assert_eq!(train, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(validation, vec![8, 9]);
    }

    #[test]
    fn seeded_split_is_deterministic_and_complete() {
        let rows: Vec<u32> = (0..50).collect();
        let first = train_validation_split(&rows, 0.8, Some(42)).unwrap();
        let second = train_validation_split(&rows, 0.8, Some(42)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.0.len(), 40);

        let mut all: Vec<u32> = first.0.iter().chain(first.1.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, rows);
    }

    #[test]
    fn rejects_bad_fraction() {
        assert!(train_validation_split(&[1, 2, 3], 1.0, None).is_err());
        assert!(train_validation_split(&[1, 2, 3], 0.0, None).is_err());
        assert!(train_validation_split(&[1, 2, 3], f64::NAN, None).is_err());
    }

    #[test]
    fn empty_input_gives_empty_parts() {
        let (train, validation) = train_validation_split::<u8>(&[], 0.8, None).unwrap();
        assert!(train.is_empty() && validation.is_empty());
    }
}
