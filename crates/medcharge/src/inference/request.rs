//! A single applicant profile submitted for an estimate.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::data::schema::{N_FEATURES, Sex, Smoker, feature_index};
use crate::error::{ChargeError, Result};

/// Accepted ages, inclusive.
pub const AGE_RANGE: RangeInclusive<u32> = 5..=80;
/// Accepted body-mass indices, inclusive.
pub const BMI_RANGE: RangeInclusive<f32> = 1.0..=80.0;
/// Accepted numbers of dependent children, inclusive.
pub const CHILDREN_RANGE: RangeInclusive<u32> = 0..=10;

/// Predictor values for one estimate, categories already encoded as codes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: u32,
    /// 1 = male, 0 = female.
    pub sex: u8,
    pub bmi: f32,
    pub children: u32,
    /// 1 = smoker, 0 = non-smoker.
    pub smoker: u8,
}

impl PredictionRequest {
    /// Request from raw codes. Not validated until used.
    pub fn new(age: u32, sex: u8, bmi: f32, children: u32, smoker: u8) -> Self {
        Self {
            age,
            sex,
            bmi,
            children,
            smoker,
        }
    }

    /// Request from typed categories.
    pub fn from_categories(age: u32, sex: Sex, bmi: f32, children: u32, smoker: Smoker) -> Self {
        Self::new(age, sex.code(), bmi, children, smoker.code())
    }

    /// Check every field against its domain, in feature order.
    ///
    /// # Errors
    ///
    /// [`ChargeError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(invalid("age", self.age, "[5, 80]"));
        }
        if Sex::from_code(self.sex).is_none() {
            return Err(invalid("sex", self.sex, "{0, 1}"));
        }
        if !BMI_RANGE.contains(&self.bmi) {
            return Err(invalid("bmi", self.bmi, "[1.0, 80.0]"));
        }
        if !CHILDREN_RANGE.contains(&self.children) {
            return Err(invalid("children", self.children, "[0, 10]"));
        }
        if Smoker::from_code(self.smoker).is_none() {
            return Err(invalid("smoker", self.smoker, "{0, 1}"));
        }
        Ok(())
    }

    /// Feature row in `age, sex, bmi, children, smoker` order.
    pub fn to_features(&self) -> [f32; N_FEATURES] {
        let mut row = [0.0; N_FEATURES];
        row[feature_index::AGE] = self.age as f32;
        row[feature_index::SEX] = self.sex as f32;
        row[feature_index::BMI] = self.bmi;
        row[feature_index::CHILDREN] = self.children as f32;
        row[feature_index::SMOKER] = self.smoker as f32;
        row
    }
}

fn invalid(field: &'static str, value: impl ToString, domain: &'static str) -> ChargeError {
    ChargeError::InvalidInput {
        field,
        value: value.to_string(),
        domain,
    }
}
