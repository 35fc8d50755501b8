//! Product categories with a fixed display rank.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rank assigned to categories outside the known set; sorts after all of
/// them.
pub const UNKNOWN_RANK: u16 = 999;

/// The fixed shelf order of the store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Snacks,
    Drinks,
    Condiments,
    Biscuits,
    Candies,
    CannedGoods,
    Noodles,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 7] = [
        Category::Snacks,
        Category::Drinks,
        Category::Condiments,
        Category::Biscuits,
        Category::Candies,
        Category::CannedGoods,
        Category::Noodles,
    ];

    pub fn name(&self) -> &str {
        match self {
            Self::Snacks => "Snacks",
            Self::Drinks => "Drinks",
            Self::Condiments => "Condiments",
            Self::Biscuits => "Biscuits",
            Self::Candies => "Candies",
            Self::CannedGoods => "Canned Goods",
            Self::Noodles => "Noodles",
            Self::Other(name) => name,
        }
    }

    /// Position in the fixed shelf order; unknown categories rank last.
    pub fn rank(&self) -> u16 {
        match self {
            Self::Snacks => 0,
            Self::Drinks => 1,
            Self::Condiments => 2,
            Self::Biscuits => 3,
            Self::Candies => 4,
            Self::CannedGoods => 5,
            Self::Noodles => 6,
            Self::Other(_) => UNKNOWN_RANK,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Snacks" => Self::Snacks,
            "Drinks" => Self::Drinks,
            "Condiments" => Self::Condiments,
            "Biscuits" => Self::Biscuits,
            "Candies" => Self::Candies,
            "Canned Goods" => Self::CannedGoods,
            "Noodles" => Self::Noodles,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
