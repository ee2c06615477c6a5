use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TamarError;

/// A calendar boundary relative to the target year: month, day and a year
/// offset (e.g. offset -1 anchors the rule in the year before the target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub month: u32,
    pub day: u32,
    #[serde(default, rename = "year-offset")]
    pub year_offset: i32,
}

impl DateRule {
    pub const fn new(month: u32, day: u32, year_offset: i32) -> Self {
        Self {
            month,
            day,
            year_offset,
        }
    }

    fn resolve(&self, name: &str, year: i32) -> Result<NaiveDate, TamarError> {
        NaiveDate::from_ymd_opt(year + self.year_offset, self.month, self.day).ok_or_else(|| {
            TamarError::InvalidPeriodRule {
                name: name.to_string(),
                reason: format!(
                    "{:04}-{:02}-{:02} is not a valid calendar date",
                    year + self.year_offset,
                    self.month,
                    self.day
                ),
            }
        })
    }
}

/// One named phenological window, defined by start/end rules that are fixed
/// regardless of data availability. Windows may span a year boundary via the
/// year offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRule {
    pub name: String,
    pub start: DateRule,
    pub end: DateRule,
}

impl PeriodRule {
    pub fn new(name: &str, start: DateRule, end: DateRule) -> Self {
        Self {
            name: name.to_string(),
            start,
            end,
        }
    }
}

/// A period rule resolved against a concrete target year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// Inclusive on both boundaries, matching the calendar-date slicing the
    /// trained model was fitted against.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// An ordered, versionable table of period rules.
///
/// Period boundaries are model-contract configuration, not call-site
/// constants: the same table that produced the training features must be used
/// at prediction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodTable {
    rules: Vec<PeriodRule>,
}

impl PeriodTable {
    pub fn new(rules: Vec<PeriodRule>) -> Self {
        Self { rules }
    }

    /// The three periods the deployed regression model was fitted on.
    pub fn canonical() -> Self {
        Self::new(vec![
            PeriodRule::new(
                "Inf_differentiation",
                DateRule::new(11, 1, -1),
                DateRule::new(2, 10, 0),
            ),
            PeriodRule::new("Flowering", DateRule::new(2, 11, 0), DateRule::new(3, 31, 0)),
            PeriodRule::new("Thinning", DateRule::new(4, 1, 0), DateRule::new(5, 15, 0)),
        ])
    }

    /// The extended seven-period table used elsewhere in the domain.
    /// June_Drop deliberately overlaps Growth.
    pub fn extended() -> Self {
        let mut rules = Self::canonical().rules;
        rules.extend(vec![
            PeriodRule::new("Growth", DateRule::new(5, 16, 0), DateRule::new(7, 31, 0)),
            PeriodRule::new("June_Drop", DateRule::new(6, 1, 0), DateRule::new(6, 30, 0)),
            PeriodRule::new("Ripening", DateRule::new(8, 1, 0), DateRule::new(8, 31, 0)),
            PeriodRule::new("Harvest", DateRule::new(9, 1, 0), DateRule::new(10, 31, 0)),
        ]);
        Self::new(rules)
    }

    pub fn rules(&self) -> &[PeriodRule] {
        &self.rules
    }

    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolves every rule against the target year, validating the table.
    ///
    /// # Errors
    ///
    /// `ConfigError` for an empty table or duplicate/blank names,
    /// `InvalidPeriodRule` for impossible dates or start > end.
    pub fn resolve(&self, year: i32) -> Result<Vec<Period>, TamarError> {
        if self.rules.is_empty() {
            return Err(TamarError::ConfigError(
                "Period table must contain at least one period".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut periods = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if rule.name.trim().is_empty() {
                return Err(TamarError::ConfigError(
                    "Period names cannot be blank".to_string(),
                ));
            }
            if !seen.insert(rule.name.clone()) {
                return Err(TamarError::ConfigError(format!(
                    "Duplicate period name: {}",
                    rule.name
                )));
            }

            let start = rule.start.resolve(&rule.name, year)?;
            let end = rule.end.resolve(&rule.name, year)?;
            if start > end {
                return Err(TamarError::InvalidPeriodRule {
                    name: rule.name.clone(),
                    reason: format!("start {} is after end {}", start, end),
                });
            }
            periods.push(Period {
                name: rule.name.clone(),
                start,
                end,
            });
        }
        Ok(periods)
    }
}
