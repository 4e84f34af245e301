use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One of the eight ABO/Rh blood groups, declared in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    /// Canonical code, e.g. "AB-".
    pub fn code(self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }

    /// Lower-case spoken form, e.g. "ab negative".
    pub fn verbal(self) -> &'static str {
        match self {
            BloodGroup::APositive => "a positive",
            BloodGroup::ANegative => "a negative",
            BloodGroup::BPositive => "b positive",
            BloodGroup::BNegative => "b negative",
            BloodGroup::AbPositive => "ab positive",
            BloodGroup::AbNegative => "ab negative",
            BloodGroup::OPositive => "o positive",
            BloodGroup::ONegative => "o negative",
        }
    }

    /// Lower-case symbolic form, e.g. "ab-".
    pub fn symbolic(self) -> String {
        self.code().to_ascii_lowercase()
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BloodGroup {
    type Err = AppError;

    /// Accepts "AB-", "ab-" and "ab negative" alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        BloodGroup::ALL
            .into_iter()
            .find(|g| normalized == g.symbolic() || normalized == g.verbal())
            .ok_or_else(|| AppError::InvalidBloodGroup(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 4] = [
        UrgencyLevel::Low,
        UrgencyLevel::Medium,
        UrgencyLevel::High,
        UrgencyLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Low => "Low",
            UrgencyLevel::Medium => "Medium",
            UrgencyLevel::High => "High",
            UrgencyLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        UrgencyLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AppError::InvalidUrgency(s.to_string()))
    }
}

/// Units on hand per blood group. Every group always has an entry; groups
/// missing from a source document load as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<BloodGroup, u32>", into = "BTreeMap<BloodGroup, u32>")]
pub struct BloodStock {
    units: [u32; 8],
}

impl BloodStock {
    pub fn get(&self, group: BloodGroup) -> u32 {
        self.units[group.index()]
    }

    pub fn set(&mut self, group: BloodGroup, units: u32) {
        self.units[group.index()] = units;
    }

    /// Entries in canonical group order.
    pub fn iter(&self) -> impl Iterator<Item = (BloodGroup, u32)> + '_ {
        BloodGroup::ALL.into_iter().map(|g| (g, self.get(g)))
    }

    pub fn total(&self) -> u64 {
        self.units.iter().map(|&u| u64::from(u)).sum()
    }
}

impl From<BTreeMap<BloodGroup, u32>> for BloodStock {
    fn from(map: BTreeMap<BloodGroup, u32>) -> Self {
        let mut stock = BloodStock::default();
        for (group, units) in map {
            stock.set(group, units);
        }
        stock
    }
}

impl From<BloodStock> for BTreeMap<BloodGroup, u32> {
    fn from(stock: BloodStock) -> Self {
        stock.iter().collect()
    }
}

impl FromIterator<(BloodGroup, u32)> for BloodStock {
    fn from_iter<I: IntoIterator<Item = (BloodGroup, u32)>>(iter: I) -> Self {
        let mut stock = BloodStock::default();
        for (group, units) in iter {
            stock.set(group, units);
        }
        stock
    }
}

/// Colour band used by the inventory displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    Critical,
    Moderate,
    Healthy,
}

impl StockLevel {
    pub fn classify(units: u32) -> Self {
        if units > 10 {
            StockLevel::Healthy
        } else if units > 5 {
            StockLevel::Moderate
        } else {
            StockLevel::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StockLevel::Critical => "critical",
            StockLevel::Moderate => "moderate",
            StockLevel::Healthy => "healthy",
        }
    }
}

/// A hospital and its blood inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub id: u32,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub blood_stock: BloodStock,
}

/// Filters accumulated over a search session. Each field is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub location: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub urgency: Option<UrgencyLevel>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.blood_group.is_none() && self.urgency.is_none()
    }
}

/// Partial criteria update detected in a transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaDelta {
    pub blood_group: Option<BloodGroup>,
    pub location: Option<String>,
}

impl CriteriaDelta {
    pub fn is_empty(&self) -> bool {
        self.blood_group.is_none() && self.location.is_none()
    }
}
