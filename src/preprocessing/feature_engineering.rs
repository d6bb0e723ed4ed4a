//! Feature engineering для бронирований отелей

use chrono::{Datelike, NaiveDate};

use crate::types::{RawValue, Row};

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Новая строка с производными признаками бронирования.
    ///
    /// Отсутствующие счётчики (children, babies, ...) считаются нулём.
    pub fn derive_booking_features(row: &Row) -> Row {
        let mut derived = row.clone();
        let count = |column: &str| row.get(column).and_then(RawValue::as_number).unwrap_or(0.0);
        let flag = |condition: bool| RawValue::Number(if condition { 1.0 } else { 0.0 });

        // Состав гостей и длительность
        derived.insert(
            "total_guests".to_string(),
            RawValue::Number(count("adults") + count("children") + count("babies")),
        );
        let weekend_nights = count("stays_in_weekend_nights");
        derived.insert(
            "total_nights".to_string(),
            RawValue::Number(weekend_nights + count("stays_in_week_nights")),
        );
        derived.insert("is_weekend_stay".to_string(), flag(weekend_nights > 0.0));
        derived.insert(
            "has_special_requests".to_string(),
            flag(count("total_of_special_requests") > 0.0),
        );
        derived.insert(
            "has_parking".to_string(),
            flag(count("required_car_parking_spaces") > 0.0),
        );

        if let Some(lead_time) = row.get("lead_time").and_then(RawValue::as_number) {
            derived.insert(
                "booking_lead_time_category".to_string(),
                RawValue::from(lead_time_category(lead_time)),
            );
        }

        // Временные признаки из даты заезда
        let arrival = row
            .get("arrival_date")
            .and_then(|v| v.as_category())
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok());
        if let Some(date) = arrival {
            derived.insert("arrival_month".to_string(), RawValue::Number(date.month() as f64));
            derived.insert(
                "arrival_day_of_week".to_string(),
                RawValue::Number(date.weekday().num_days_from_monday() as f64),
            );
            derived.insert(
                "arrival_week_of_year".to_string(),
                RawValue::Number(date.iso_week().week() as f64),
            );
            derived.insert(
                "arrival_quarter".to_string(),
                RawValue::Number(((date.month() - 1) / 3 + 1) as f64),
            );
        } else if row.get("arrival_date").is_some_and(|v| !v.is_missing()) {
            tracing::debug!("Unparseable arrival_date, temporal features skipped");
        }

        let month = derived
            .get("arrival_month")
            .and_then(RawValue::as_number)
            .map(|m| m as u32);
        if let Some(month) = month {
            derived.insert("season".to_string(), RawValue::from(season(month)));
            derived.insert("is_peak_season".to_string(), flag(matches!(month, 7 | 8 | 12)));
        }

        derived
    }

    pub fn derive_all(rows: &[Row]) -> Vec<Row> {
        rows.iter().map(Self::derive_booking_features).collect()
    }
}

pub fn lead_time_category(lead_time: f64) -> &'static str {
    if lead_time <= 7.0 {
        "Last Minute"
    } else if lead_time <= 30.0 {
        "Short"
    } else if lead_time <= 90.0 {
        "Medium"
    } else if lead_time <= 365.0 {
        "Long"
    } else {
        "Very Long"
    }
}

pub fn season(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 => "Winter",
        3..=5 => "Spring",
        6..=8 => "Summer",
        _ => "Fall",
    }
}
