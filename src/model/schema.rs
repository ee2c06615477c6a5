use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{error::TamarError, features::periods::PeriodTable, features::vector::FEATURE_PREFIXES};

/// Orchard-management keys the regression model was fitted on, in training
/// order.
pub const ORCHARD_KEYS: [&str; 7] = [
    "Age",
    "Bunches",
    "Spadices_Bunch",
    "Fruits_Spadix_Upper",
    "Fruits_Spadix_Center",
    "Fruits_Spadix_Lower",
    "Fruits_Tree",
];

/// The exact input key set of the downstream regression model.
///
/// The model is an opaque artifact fitted outside this crate; feeding it a
/// record with renamed or missing keys is a silent correctness bug, so the
/// schema is declared explicitly and every assembled record is validated
/// against it (name-exact, order-insensitive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSchema {
    keys: Vec<String>,
}

impl ModelSchema {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Schema of the deployed model: orchard keys plus T/H/E for each period
    /// of the given table.
    pub fn for_period_table(table: &PeriodTable) -> Self {
        let mut keys: Vec<String> = ORCHARD_KEYS.iter().map(|k| k.to_string()).collect();
        for name in table.names() {
            for prefix in FEATURE_PREFIXES {
                keys.push(format!("{}_{}", prefix, name));
            }
        }
        Self::new(keys)
    }

    /// Schema matching the canonical three-period table the model was
    /// trained with.
    pub fn canonical() -> Self {
        Self::for_period_table(&PeriodTable::canonical())
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Validates an assembled key set against this schema.
    ///
    /// # Errors
    ///
    /// [`TamarError::FeatureSchemaMismatch`] listing the missing and
    /// unexpected keys (both sorted, for stable messages).
    pub fn validate<'a, I>(&self, assembled: I) -> Result<(), TamarError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let assembled: HashSet<&str> = assembled.into_iter().collect();
        let expected: HashSet<&str> = self.keys.iter().map(String::as_str).collect();

        let mut missing: Vec<String> = expected
            .difference(&assembled)
            .map(|k| k.to_string())
            .collect();
        let mut unexpected: Vec<String> = assembled
            .difference(&expected)
            .map(|k| k.to_string())
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            return Ok(());
        }
        missing.sort();
        unexpected.sort();
        Err(TamarError::FeatureSchemaMismatch {
            missing,
            unexpected,
        })
    }
}
