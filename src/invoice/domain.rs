//! Domain types for invoices and their line items.
//!
//! An invoice's total is never stored. It is always derived from the current
//! line items through [invoice_total], so every view of an invoice agrees on
//! its total by construction.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, user::UserID};

/// An alias for integer invoice IDs.
pub type InvoiceId = i64;

/// Where an invoice sits in its lifecycle.
///
/// The only legal transitions are draft → sent → paid, plus voiding a sent
/// or paid invoice to cancelled. Cancelled and paid are terminal apart from
/// the void transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Still being drafted. The only status allowing edits and deletion.
    Draft,
    /// Sent to the client and awaiting payment.
    Sent,
    /// Paid by the client.
    Paid,
    /// Voided.
    Cancelled,
}

impl InvoiceStatus {
    /// The status as it is stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the invoice's fields and items may still be changed.
    pub fn is_editable(&self) -> bool {
        *self == InvoiceStatus::Draft
    }

    /// Whether the invoice may be voided to cancelled.
    pub fn can_void(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Paid)
    }

    /// Check that moving from `self` to `next` follows the state machine.
    ///
    /// Only draft → sent and sent → paid are allowed here. Voiding is a
    /// separate operation and is not accepted as a plain status change.
    pub fn validate_transition(self, next: InvoiceStatus) -> Result<(), Error> {
        match (self, next) {
            (InvoiceStatus::Draft, InvoiceStatus::Sent)
            | (InvoiceStatus::Sent, InvoiceStatus::Paid) => Ok(()),
            (from, to) => Err(Error::InvalidStatusTransition { from, to }),
        }
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            _ => Err(Error::Validation(format!("invalid invoice status {s:?}"))),
        }
    }
}

impl ToSql for InvoiceStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for InvoiceStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// A client invoice. The items live in [InvoiceItem] rows and the total is
/// derived from them on every read.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Invoice {
    /// The invoice's ID in the application database.
    pub id: InvoiceId,
    /// The user this invoice belongs to.
    pub user_id: UserID,
    /// The per-user sequential number, formatted like `INV-003`.
    pub invoice_number: String,
    /// Who the invoice is billed to.
    pub client_name: String,
    /// The client's email address, if recorded.
    pub client_email: Option<String>,
    /// Where the invoice sits in its lifecycle.
    pub status: InvoiceStatus,
    /// The day the invoice was issued.
    pub issue_date: Date,
    /// The day payment is due.
    pub due_date: Date,
    /// Free-text notes shown on the invoice.
    pub notes: Option<String>,
    /// When the invoice was created.
    pub created_at: OffsetDateTime,
    /// When the invoice was last changed.
    pub updated_at: OffsetDateTime,
}

/// One line on an invoice.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvoiceItem {
    /// The item's ID in the application database.
    pub id: i64,
    /// The invoice this line belongs to.
    pub invoice_id: InvoiceId,
    /// What is being billed.
    pub description: String,
    /// How many units, at least 1.
    pub quantity: i64,
    /// The price per unit in minor currency units, at least 0.
    pub unit_price: i64,
}

/// A line item as supplied by the client when creating or replacing items.
#[derive(Clone, Debug, Deserialize)]
pub struct NewInvoiceItem {
    /// What is being billed.
    pub description: String,
    /// How many units.
    pub quantity: i64,
    /// The price per unit in minor currency units.
    pub unit_price: i64,
}

/// The fields needed to create an invoice, already validated.
#[derive(Clone, Debug)]
pub struct NewInvoice {
    /// Who the invoice is billed to.
    pub client_name: String,
    /// The client's email address, if recorded.
    pub client_email: Option<String>,
    /// The day the invoice was issued.
    pub issue_date: Date,
    /// The day payment is due.
    pub due_date: Date,
    /// Free-text notes shown on the invoice.
    pub notes: Option<String>,
    /// The invoice's line items, at least one.
    pub items: Vec<NewInvoiceItem>,
}

/// A partial update for a draft invoice.
///
/// A field is applied only when it is `Some`. When `items` is supplied, the
/// existing items are replaced wholesale in the same database transaction as
/// the field changes.
#[derive(Clone, Debug, Default)]
pub struct InvoicePatch {
    /// Replace the client name.
    pub client_name: Option<String>,
    /// Replace the client email.
    pub client_email: Option<Option<String>>,
    /// Replace the issue date.
    pub issue_date: Option<Date>,
    /// Replace the due date.
    pub due_date: Option<Date>,
    /// Replace the notes.
    pub notes: Option<Option<String>>,
    /// Replace every line item.
    pub items: Option<Vec<NewInvoiceItem>>,
}

/// An invoice with its items and derived total, as returned by the detail
/// endpoints.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvoiceWithItems {
    /// The invoice header.
    #[serde(flatten)]
    pub invoice: Invoice,
    /// The invoice's line items.
    pub items: Vec<InvoiceItem>,
    /// The derived total in minor currency units.
    pub total: i64,
}

/// An invoice annotated with its derived total, as returned by the listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvoiceSummary {
    /// The invoice header.
    #[serde(flatten)]
    pub invoice: Invoice,
    /// The derived total in minor currency units.
    pub total: i64,
}

/// The derived total over `(quantity, unit_price)` pairs.
///
/// This is the single definition of an invoice total. Every listing, detail
/// view and test computes totals through it.
pub fn invoice_total<I>(items: I) -> i64
where
    I: IntoIterator<Item = (i64, i64)>,
{
    items
        .into_iter()
        .map(|(quantity, unit_price)| quantity * unit_price)
        .sum()
}

/// Check the line-item rules: at least one item, no blank descriptions,
/// quantities at least 1 and unit prices at least 0.
pub fn validate_items(items: &[NewInvoiceItem]) -> Result<(), Error> {
    if items.is_empty() {
        return Err(Error::Validation(
            "an invoice must have at least one item".to_owned(),
        ));
    }

    for item in items {
        if item.description.trim().is_empty() {
            return Err(Error::Validation(
                "invoice item descriptions must not be blank".to_owned(),
            ));
        }

        if item.quantity < 1 {
            return Err(Error::Validation(
                "invoice item quantities must be at least 1".to_owned(),
            ));
        }

        if item.unit_price < 0 {
            return Err(Error::Validation(
                "invoice item unit prices must not be negative".to_owned(),
            ));
        }
    }

    Ok(())
}
