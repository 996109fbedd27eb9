//! Per-leg line-item selections.

use common::Money;
use serde::{Deserialize, Serialize};

/// One directional segment of the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    Outbound,
    Return,
}

impl std::fmt::Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leg::Outbound => write!(f, "outbound"),
            Leg::Return => write!(f, "return"),
        }
    }
}

/// A cabin line item for one leg.
///
/// The unit price was already quoted by the sailing's cabin bucket; the
/// cart sums these, it never prices them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabinSelection {
    pub cabin_id: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub leg: Leg,
}

impl CabinSelection {
    /// Creates a new cabin selection.
    pub fn new(cabin_id: impl Into<String>, quantity: u32, unit_price: Money, leg: Leg) -> Self {
        Self {
            cabin_id: cabin_id.into(),
            quantity,
            unit_price,
            leg,
        }
    }

    /// Returns the total price for this line (quantity x unit price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A meal line item for one leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSelection {
    pub meal_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub leg: Leg,
}

impl MealSelection {
    /// Creates a new meal selection.
    pub fn new(
        meal_id: impl Into<String>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
        leg: Leg,
    ) -> Self {
        Self {
            meal_id: meal_id.into(),
            name: name.into(),
            quantity,
            unit_price,
            leg,
        }
    }

    /// Returns the total price for this line (quantity x unit price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}
