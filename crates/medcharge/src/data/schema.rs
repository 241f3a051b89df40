//! Column layout and categorical encodings of the insurance dataset.
//!
//! The encodings are total on the known labels and rejected everywhere else:
//!
//! | column   | label    | code |
//! |----------|----------|------|
//! | `sex`    | `male`   | 1    |
//! | `sex`    | `female` | 0    |
//! | `smoker` | `yes`    | 1    |
//! | `smoker` | `no`     | 0    |

use serde::{Deserialize, Serialize};

// =============================================================================
// Column names
// =============================================================================

/// Predictor columns, in the order the model consumes them.
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["age", "sex", "bmi", "children", "smoker"];

/// Number of predictor columns.
pub const N_FEATURES: usize = 5;

/// Target column.
pub const TARGET_NAME: &str = "charges";

/// Columns that must be present but carry no predictive signal.
pub const DROPPED_COLUMNS: [&str; 1] = ["region"];

/// Every column a dataset header must contain.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "age", "sex", "bmi", "children", "smoker", "region", "charges",
];

/// Position of each predictor in a feature row.
pub mod feature_index {
    pub const AGE: usize = 0;
    pub const SEX: usize = 1;
    pub const BMI: usize = 2;
    pub const CHILDREN: usize = 3;
    pub const SMOKER: usize = 4;
}

// =============================================================================
// Categorical encodings
// =============================================================================

/// Biological sex as recorded in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female = 0,
    Male = 1,
}

impl Sex {
    /// Parse a dataset label (`male` / `female`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    /// Parse a form label (`Male` / `Female`).
    pub fn from_display(label: &str) -> Option<Self> {
        match label.trim() {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            _ => None,
        }
    }

    /// Decode a numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            0 => Some(Self::Female),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Dataset label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Form label.
    pub fn display(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Smoking status as recorded in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoker {
    No = 0,
    Yes = 1,
}

impl Smoker {
    /// Parse a dataset label (`yes` / `no`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }

    /// Parse a form label (`Yes` / `No`).
    pub fn from_display(label: &str) -> Option<Self> {
        match label.trim() {
            "Yes" => Some(Self::Yes),
            "No" => Some(Self::No),
            _ => None,
        }
    }

    /// Decode a numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Yes),
            0 => Some(Self::No),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Dataset label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Form label.
    pub fn display(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// One fully typed row of the source dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub age: u32,
    pub sex: Sex,
    pub bmi: f32,
    pub children: u32,
    pub smoker: Smoker,
    /// Kept for completeness; never reaches the model.
    pub region: String,
    pub charges: f32,
}

impl Record {
    /// Encoded predictors in [`FEATURE_NAMES`] order.
    pub fn features(&self) -> [f32; N_FEATURES] {
        [
            self.age as f32,
            self.sex.code() as f32,
            self.bmi,
            self.children as f32,
            self.smoker.code() as f32,
        ]
    }
}
