//! Monthly utility consumption and occupancy figures.

use std::ops::{Add, AddAssign};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, ConsumptionId, Month, Resource, TypeConstraintError};

/// Amount of each metered resource, in the unit given by [`Resource::unit`].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceAmounts {
    pub electricity: f64,
    pub water: f64,
    pub natural_gas: f64,
    pub coal: f64,
}

impl ResourceAmounts {
    /// Builds a value, rejecting negative or non-finite amounts.
    pub fn new(
        electricity: f64,
        water: f64,
        natural_gas: f64,
        coal: f64,
    ) -> Result<Self, TypeConstraintError> {
        let amounts = Self {
            electricity,
            water,
            natural_gas,
            coal,
        };
        for resource in Resource::ALL {
            let value = amounts.get(*resource);
            if !value.is_finite() {
                return Err(TypeConstraintError::InvalidValue(format!(
                    "{resource} amount is not a number"
                )));
            }
            if value < 0.0 {
                return Err(TypeConstraintError::NegativeValue);
            }
        }
        Ok(amounts)
    }

    pub fn get(&self, resource: Resource) -> f64 {
        match resource {
            Resource::Electricity => self.electricity,
            Resource::Water => self.water,
            Resource::NaturalGas => self.natural_gas,
            Resource::Coal => self.coal,
        }
    }

    /// Applies `f` to every resource amount.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            electricity: f(self.electricity),
            water: f(self.water),
            natural_gas: f(self.natural_gas),
            coal: f(self.coal),
        }
    }
}

impl Add for ResourceAmounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            electricity: self.electricity + rhs.electricity,
            water: self.water + rhs.water,
            natural_gas: self.natural_gas + rhs.natural_gas,
            coal: self.coal + rhs.coal,
        }
    }
}

impl AddAssign for ResourceAmounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// One client's consumption for a single calendar month.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Consumption {
    pub id: ConsumptionId,
    pub client_id: ClientId,
    pub year: i32,
    pub month: Month,
    #[serde(flatten)]
    pub amounts: ResourceAmounts,
    /// Guest nights for the month; the denominator of per-person figures.
    pub accommodation_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewConsumption {
    pub client_id: ClientId,
    pub year: i32,
    pub month: Month,
    pub amounts: ResourceAmounts,
    pub accommodation_count: i32,
}

/// Replacement figures for an existing monthly record.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateConsumption {
    pub year: i32,
    pub month: Month,
    pub amounts: ResourceAmounts,
    pub accommodation_count: i32,
}

/// Validates a calendar year as accepted by the consumption forms.
pub fn validate_year(year: i32) -> Result<i32, TypeConstraintError> {
    if (2000..=2100).contains(&year) {
        Ok(year)
    } else {
        Err(TypeConstraintError::InvalidValue(format!("year {year}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amounts_are_rejected() {
        assert_eq!(
            ResourceAmounts::new(1.0, -2.0, 0.0, 0.0),
            Err(TypeConstraintError::NegativeValue)
        );
        assert!(ResourceAmounts::new(f64::NAN, 0.0, 0.0, 0.0).is_err());
        assert!(ResourceAmounts::new(1.0, 2.0, 3.0, 4.0).is_ok());
    }

    #[test]
    fn amounts_add_per_resource() {
        let mut total = ResourceAmounts::new(1.0, 2.0, 3.0, 4.0).unwrap();
        total += ResourceAmounts::new(10.0, 20.0, 30.0, 40.0).unwrap();
        assert_eq!(total.get(Resource::Electricity), 11.0);
        assert_eq!(total.get(Resource::Coal), 44.0);
        assert_eq!(total.map(|v| v * 2.0).water, 44.0);
    }

    #[test]
    fn years_must_be_plausible() {
        assert!(validate_year(1999).is_err());
        assert_eq!(validate_year(2024), Ok(2024));
    }
}
