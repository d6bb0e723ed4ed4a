//! One-hot кодирование категориальных колонок

use crate::types::RawValue;

/// Вектор из нулей и единиц длины `categories.len()`.
///
/// Неизвестная или пустая категория даёт вектор из одних нулей, без ошибки.
pub fn one_hot_expand(value: &RawValue, categories: &[String]) -> Vec<f64> {
    let mut encoded = vec![0.0; categories.len()];

    let Some(category) = value.as_category() else {
        return encoded;
    };

    match categories.iter().position(|c| c.as_str() == category.as_ref()) {
        Some(idx) => encoded[idx] = 1.0,
        None => tracing::debug!("Unseen category '{}', encoding as all zeros", category),
    }

    encoded
}

/// Имя one-hot признака в `feature_names`.
pub fn one_hot_feature_name(column: &str, category: &str) -> String {
    format!("{column}_{category}")
}

/// Различные значения колонки в порядке первого появления.
pub fn collect_categories<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a RawValue>,
{
    let mut categories: Vec<String> = Vec::new();
    for value in values {
        if let Some(category) = value.as_category() {
            if !categories.iter().any(|c| c.as_str() == category.as_ref()) {
                categories.push(category.into_owned());
            }
        }
    }
    categories
}
