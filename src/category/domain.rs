//! Domain types for categories.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::{Error, user::UserID};

/// An alias for integer category IDs.
pub type CategoryId = i64;

/// Whether a category (and the transactions that carry it) records money
/// coming in or going out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl CategoryType {
    /// The type as its lowercase string form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            other => Err(Error::Validation(format!(
                "\"{other}\" is not a valid category type, expected \"income\" or \"expense\""
            ))),
        }
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// The name of a category.
///
/// Guaranteed to be non-empty with surrounding whitespace removed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create and validate a category name.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `name` is empty after trimming.
    pub fn new(name: &str) -> Result<Self, Error> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(Error::Validation(
                "the category name cannot be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Create a category name without any validation.
    ///
    /// The caller should ensure the string is non-empty, e.g. because it was
    /// read back from the database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A label a user attaches to their transactions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Category {
    /// The category's ID in the application database.
    pub id: CategoryId,
    /// The user this category belongs to.
    pub user_id: UserID,
    /// The display name.
    pub name: CategoryName,
    /// Whether the category is for income or expense entries.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    /// Whether the category was seeded at registration. Default categories
    /// cannot be renamed or deleted.
    pub is_default: bool,
}

#[cfg(test)]
mod category_name_tests {
    use super::CategoryName;

    #[test]
    fn new_fails_on_empty_string() {
        assert!(CategoryName::new("").is_err());
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert!(CategoryName::new("\n\t \r").is_err());
    }

    #[test]
    fn new_trims_whitespace() {
        let name = CategoryName::new("  Groceries  ").unwrap();

        assert_eq!(name.as_ref(), "Groceries");
    }
}

#[cfg(test)]
mod category_type_tests {
    use super::CategoryType;

    #[test]
    fn parse_round_trips() {
        for category_type in [CategoryType::Income, CategoryType::Expense] {
            let parsed: CategoryType = category_type.as_str().parse().unwrap();

            assert_eq!(parsed, category_type);
        }
    }

    #[test]
    fn parse_rejects_unknown_value() {
        assert!("transfer".parse::<CategoryType>().is_err());
    }

    #[test]
    fn serializes_as_lowercase() {
        let json = serde_json::to_string(&CategoryType::Income).unwrap();

        assert_eq!(json, "\"income\"");
    }
}
