//! Стандартизация признаков

use ndarray::ArrayView1;

/// Делитель для стандартизации: нулевое отклонение заменяется на 1.
pub fn safe_divisor(std: f64) -> f64 {
    if std == 0.0 {
        1.0
    } else {
        std
    }
}

/// `(value - mean) / std`. Отсутствующее значение подставляется средним и даёт 0.
pub fn standardize(value: Option<f64>, mean: f64, std: f64) -> f64 {
    let value = value.filter(|v| v.is_finite()).unwrap_or(mean);
    (value - mean) / safe_divisor(std)
}

/// Среднее и стандартное отклонение генеральной совокупности (ddof = 0).
///
/// `None` для пустой выборки.
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }

    let column = ArrayView1::from(values);
    let std = column.std(0.0);
    // постоянная колонка: среднее равно самому значению, без ошибки суммирования
    let mean = if std == 0.0 { values[0] } else { column.mean()? };
    Some((mean, std))
}
