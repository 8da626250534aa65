//! Domain types for ledger transactions.
//!
//! All amounts are integers in minor currency units (cents). No floating
//! point is used for money anywhere in storage or aggregation, so repeated
//! sums never accumulate rounding error.

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    category::{CategoryId, CategoryName, CategoryType},
    user::UserID,
};

/// An alias for integer transaction IDs.
pub type TransactionId = i64;

/// A single income or expense entry in the ledger.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
    /// The transaction's ID in the application database.
    pub id: TransactionId,
    /// The user this transaction belongs to.
    pub user_id: UserID,
    /// Whether the entry records income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: CategoryType,
    /// The amount in minor currency units (cents), always positive.
    pub amount: i64,
    /// An optional free-text note.
    pub description: Option<String>,
    /// The category this entry is filed under.
    pub category_id: CategoryId,
    /// The day the money moved.
    pub date: Date,
    /// When the entry was recorded.
    pub created_at: OffsetDateTime,
    /// When the entry was last changed.
    pub updated_at: OffsetDateTime,
}

/// The fields needed to create a transaction. The amount has already been
/// rounded to a whole number of cents at the API boundary.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    /// Whether the entry records income or an expense.
    pub transaction_type: CategoryType,
    /// The amount in minor currency units, already validated as positive.
    pub amount: i64,
    /// An optional free-text note.
    pub description: Option<String>,
    /// The category this entry is filed under.
    pub category_id: CategoryId,
    /// The day the money moved.
    pub date: Date,
}

/// A partial update for a transaction.
///
/// A field is applied only when it is `Some`; unsupplied fields are left
/// untouched.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    /// Replace the transaction type.
    pub transaction_type: Option<CategoryType>,
    /// Replace the amount (minor units, already validated as positive).
    pub amount: Option<i64>,
    /// Replace the description.
    pub description: Option<String>,
    /// Refile the entry under a different category.
    pub category_id: Option<CategoryId>,
    /// Replace the date.
    pub date: Option<Date>,
}

/// The slice of a category that listings attach to each transaction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySummary {
    /// The category's ID.
    pub id: CategoryId,
    /// The category's display name.
    pub name: CategoryName,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

/// A transaction joined with its category's summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransactionWithCategory {
    /// The ledger entry.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The category it is filed under.
    pub category: CategorySummary,
}
