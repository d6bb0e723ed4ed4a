/// Оптимизация цены номера по уверенности в спросе

use crate::types::{DemandForecast, PriceQuote, PriceRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

impl DemandLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.7 {
            DemandLevel::High
        } else if confidence > 0.4 {
            DemandLevel::Medium
        } else {
            DemandLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::High => "High",
            DemandLevel::Medium => "Medium",
            DemandLevel::Low => "Low",
        }
    }
}

impl DemandForecast {
    /// Чем ниже вероятность отмены, тем выше уверенность в спросе.
    pub fn from_cancellation_probability(probability: f64) -> Self {
        let cancellation_probability = probability.clamp(0.0, 1.0);
        let demand_confidence = 1.0 - cancellation_probability;
        Self {
            demand_confidence,
            cancellation_probability,
            demand_level: DemandLevel::from_confidence(demand_confidence).as_str().to_string(),
        }
    }
}

pub struct PricingOptimizer {
    base_price: f64,
    price_elasticity: f64,
    min_price: f64,
    max_price: f64,
}

impl PricingOptimizer {
    pub fn new() -> Self {
        Self {
            base_price: 100.0,
            price_elasticity: -1.8,
            min_price: 50.0,
            max_price: 400.0,
        }
    }

    pub fn optimal_price(&self, request: &PriceRequest) -> PriceQuote {
        let demand = request.demand_confidence.clamp(0.0, 1.0);

        // Базовая цена по типу отеля и номера
        let mut base_price = self.base_price;
        if request.hotel_type == "Resort" {
            base_price *= 1.2;
        }
        let room_multiplier = match request.room_type.as_str() {
            "Deluxe" => 1.3,
            "Suite" => 1.7,
            "Presidential" => 2.5,
            _ => 1.0,
        };
        base_price *= room_multiplier;

        // Спрос
        let demand_multiplier = if demand > 0.8 {
            1.5 + (demand - 0.8) * 2.5
        } else if demand > 0.5 {
            1.0 + (demand - 0.5) * 1.0
        } else {
            0.7 + demand * 0.6
        };

        // Конкуренты
        let competition_ratio = request.competition_price / base_price;
        let competition_adjustment = if competition_ratio < 0.8 {
            1.15
        } else if competition_ratio > 1.2 {
            0.95
        } else {
            1.0 + (competition_ratio - 1.0) * 0.1
        };

        let season_adjustment = 0.8 + request.season_factor * 0.7;

        let raw_price = base_price * demand_multiplier * competition_adjustment * season_adjustment;
        let optimal_price =
            round2(psychological_price(raw_price).clamp(self.min_price, self.max_price));

        PriceQuote {
            optimal_price,
            base_price: round2(base_price),
            demand_multiplier: round2(demand_multiplier),
            competition_adjustment: round2(competition_adjustment),
            season_adjustment: round2(season_adjustment),
            room_multiplier,
            pricing_strategy: pricing_strategy(demand, competition_ratio).to_string(),
            demand_level: DemandLevel::from_confidence(demand).as_str().to_string(),
            expected_occupancy: self.estimate_occupancy(optimal_price, demand, 0.7),
        }
    }

    /// Загрузка номеров с учётом эластичности, в пределах [0.1, 0.95].
    pub fn estimate_occupancy(&self, price: f64, demand_confidence: f64, base_occupancy: f64) -> f64 {
        let price_effect = self.price_elasticity * (price / self.base_price - 1.0);
        let demand_effect = (demand_confidence - 0.5) * 0.4;
        (base_occupancy * (1.0 + price_effect + demand_effect)).clamp(0.1, 0.95)
    }

    pub fn revenue(&self, price: f64, occupancy: f64, total_rooms: u32) -> f64 {
        price * occupancy * total_rooms as f64
    }
}

impl Default for PricingOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// 199.99 вместо 200, 99.95 вместо 100
pub fn psychological_price(price: f64) -> f64 {
    if price >= 100.0 {
        (price - 1.0).round_ties_even() + 0.99
    } else if price >= 50.0 {
        round2(price - 0.05)
    } else {
        round2(price)
    }
}

pub fn pricing_strategy(demand_confidence: f64, competition_ratio: f64) -> &'static str {
    if demand_confidence > 0.8 && competition_ratio < 1.0 {
        "Premium Positioning"
    } else if demand_confidence > 0.6 && competition_ratio <= 1.2 {
        "Market Leadership"
    } else if demand_confidence > 0.4 {
        "Competitive Matching"
    } else {
        "Value Positioning"
    }
}

/// Округление до центов, половины к чётному.
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
