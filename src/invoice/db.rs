//! Database functions for invoices and their line items.

use std::collections::HashMap;

use rusqlite::{Connection, Row, named_params, params};
use time::OffsetDateTime;

use crate::{
    Error,
    invoice::{
        Invoice, InvoiceId, InvoiceItem, InvoicePatch, InvoiceStatus, InvoiceSummary,
        InvoiceWithItems, NewInvoice, NewInvoiceItem, invoice_total, validate_items,
    },
    user::UserID,
};

/// Create the invoice and invoice item tables.
///
/// Line items cascade on invoice deletion. Invoice numbers are unique per
/// user.
pub fn create_invoice_tables(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoice (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id),
            invoice_number TEXT NOT NULL,
            client_name TEXT NOT NULL,
            client_email TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            issue_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(user_id, invoice_number)
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_invoice_user ON invoice(user_id)",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoice_item (
            id INTEGER PRIMARY KEY,
            invoice_id INTEGER NOT NULL REFERENCES invoice(id) ON DELETE CASCADE,
            description TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            unit_price INTEGER NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_invoice_item_invoice ON invoice_item(invoice_id)",
        (),
    )?;

    Ok(())
}

/// Create an invoice and its line items as one atomic operation.
///
/// The invoice number is `INV-` plus the user's existing invoice count plus
/// one, zero-padded to three digits. The count happens inside the same
/// database transaction as the insert.
pub fn create_invoice(
    user_id: UserID,
    new_invoice: NewInvoice,
    connection: &mut Connection,
) -> Result<InvoiceWithItems, Error> {
    if new_invoice.client_name.trim().is_empty() {
        return Err(Error::Validation("client name must not be blank".to_owned()));
    }

    validate_items(&new_invoice.items)?;

    let now = OffsetDateTime::now_utc();

    let transaction = connection.transaction()?;

    let existing_count: i64 = transaction.query_row(
        "SELECT COUNT(*) FROM invoice WHERE user_id = ?1",
        params![user_id.as_i64()],
        |row| row.get(0),
    )?;
    let invoice_number = format!("INV-{:03}", existing_count + 1);

    transaction.execute(
        "INSERT INTO invoice (user_id, invoice_number, client_name, client_email, status,
            issue_date, due_date, notes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user_id.as_i64(),
            invoice_number,
            new_invoice.client_name,
            new_invoice.client_email,
            InvoiceStatus::Draft,
            new_invoice.issue_date,
            new_invoice.due_date,
            new_invoice.notes,
            now,
            now,
        ],
    )?;
    let invoice_id = transaction.last_insert_rowid();

    insert_items(invoice_id, &new_invoice.items, &transaction)?;

    transaction.commit()?;

    get_invoice_with_items(invoice_id, user_id, connection)
}

/// Get an invoice header by its ID, or [Error::NotFound] if it does not
/// exist or belongs to another user.
pub fn get_invoice(
    invoice_id: InvoiceId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Invoice, Error> {
    connection
        .prepare(
            "SELECT id, user_id, invoice_number, client_name, client_email, status,
                issue_date, due_date, notes, created_at, updated_at
            FROM invoice
            WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row(params![invoice_id, user_id.as_i64()], map_invoice_row)
        .map_err(|error| error.into())
}

/// Get an invoice with its items and derived total.
pub fn get_invoice_with_items(
    invoice_id: InvoiceId,
    user_id: UserID,
    connection: &Connection,
) -> Result<InvoiceWithItems, Error> {
    let invoice = get_invoice(invoice_id, user_id, connection)?;
    let items = get_items(invoice_id, connection)?;
    let total = invoice_total(items.iter().map(|item| (item.quantity, item.unit_price)));

    Ok(InvoiceWithItems {
        invoice,
        items,
        total,
    })
}

/// All invoices owned by `user_id`, sorted by issue date descending, each
/// annotated with its derived total.
///
/// Totals come from a `(invoice_id, quantity, unit_price)` projection rather
/// than the full item rows.
pub fn list_invoices(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<InvoiceSummary>, Error> {
    let invoices: Vec<Invoice> = connection
        .prepare(
            "SELECT id, user_id, invoice_number, client_name, client_email, status,
                issue_date, due_date, notes, created_at, updated_at
            FROM invoice
            WHERE user_id = ?1
            ORDER BY issue_date DESC, id DESC",
        )?
        .query_map(params![user_id.as_i64()], map_invoice_row)?
        .collect::<Result<_, _>>()?;

    let mut totals: HashMap<InvoiceId, i64> = HashMap::new();

    let projection: Vec<(InvoiceId, i64, i64)> = connection
        .prepare(
            "SELECT invoice_item.invoice_id, invoice_item.quantity, invoice_item.unit_price
            FROM invoice_item
            INNER JOIN invoice ON invoice.id = invoice_item.invoice_id
            WHERE invoice.user_id = ?1",
        )?
        .query_map(params![user_id.as_i64()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<Result<_, _>>()?;

    for (invoice_id, quantity, unit_price) in projection {
        *totals.entry(invoice_id).or_insert(0) += invoice_total([(quantity, unit_price)]);
    }

    Ok(invoices
        .into_iter()
        .map(|invoice| {
            let total = totals.get(&invoice.id).copied().unwrap_or(0);

            InvoiceSummary { invoice, total }
        })
        .collect())
}

/// Apply a partial update to a draft invoice.
///
/// Fails with [Error::InvoiceNotEditable] unless the invoice is still a
/// draft. When the patch carries items, the old items are deleted and the
/// new set inserted in the same database transaction as the field changes,
/// so a partial replacement is never observable.
pub fn update_invoice(
    invoice_id: InvoiceId,
    user_id: UserID,
    patch: InvoicePatch,
    connection: &mut Connection,
) -> Result<InvoiceWithItems, Error> {
    let existing = get_invoice(invoice_id, user_id, connection)?;

    if !existing.status.is_editable() {
        return Err(Error::InvoiceNotEditable(existing.status));
    }

    if let Some(client_name) = &patch.client_name
        && client_name.trim().is_empty()
    {
        return Err(Error::Validation("client name must not be blank".to_owned()));
    }

    if let Some(items) = &patch.items {
        validate_items(items)?;
    }

    let now = OffsetDateTime::now_utc();

    let transaction = connection.transaction()?;

    transaction.execute(
        "UPDATE invoice
        SET client_name = :client_name, client_email = :client_email,
            issue_date = :issue_date, due_date = :due_date, notes = :notes,
            updated_at = :updated_at
        WHERE id = :id",
        named_params! {
            ":client_name": patch.client_name.unwrap_or(existing.client_name),
            ":client_email": patch.client_email.unwrap_or(existing.client_email),
            ":issue_date": patch.issue_date.unwrap_or(existing.issue_date),
            ":due_date": patch.due_date.unwrap_or(existing.due_date),
            ":notes": patch.notes.unwrap_or(existing.notes),
            ":updated_at": now,
            ":id": invoice_id,
        },
    )?;

    if let Some(items) = &patch.items {
        transaction.execute(
            "DELETE FROM invoice_item WHERE invoice_id = ?1",
            params![invoice_id],
        )?;
        insert_items(invoice_id, items, &transaction)?;
    }

    transaction.commit()?;

    get_invoice_with_items(invoice_id, user_id, connection)
}

/// Advance an invoice's status along the state machine.
///
/// Only draft → sent and sent → paid are accepted; anything else fails with
/// [Error::InvalidStatusTransition]. Use [void_invoice] to cancel.
pub fn update_invoice_status(
    invoice_id: InvoiceId,
    user_id: UserID,
    next_status: InvoiceStatus,
    connection: &Connection,
) -> Result<Invoice, Error> {
    let invoice = get_invoice(invoice_id, user_id, connection)?;

    invoice.status.validate_transition(next_status)?;

    set_status(invoice_id, next_status, connection)?;

    get_invoice(invoice_id, user_id, connection)
}

/// Void a sent or paid invoice, moving it to cancelled.
pub fn void_invoice(
    invoice_id: InvoiceId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Invoice, Error> {
    let invoice = get_invoice(invoice_id, user_id, connection)?;

    if !invoice.status.can_void() {
        return Err(Error::InvalidStatusTransition {
            from: invoice.status,
            to: InvoiceStatus::Cancelled,
        });
    }

    set_status(invoice_id, InvoiceStatus::Cancelled, connection)?;

    get_invoice(invoice_id, user_id, connection)
}

/// Delete a draft invoice. Its line items cascade.
///
/// Fails with [Error::InvoiceNotEditable] for any other status, leaving the
/// invoice queryable.
pub fn delete_invoice(
    invoice_id: InvoiceId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let invoice = get_invoice(invoice_id, user_id, connection)?;

    if !invoice.status.is_editable() {
        return Err(Error::InvoiceNotEditable(invoice.status));
    }

    connection.execute("DELETE FROM invoice WHERE id = ?1", params![invoice_id])?;

    Ok(())
}

fn set_status(
    invoice_id: InvoiceId,
    status: InvoiceStatus,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE invoice SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status, OffsetDateTime::now_utc(), invoice_id],
    )?;

    Ok(())
}

fn get_items(invoice_id: InvoiceId, connection: &Connection) -> Result<Vec<InvoiceItem>, Error> {
    connection
        .prepare(
            "SELECT id, invoice_id, description, quantity, unit_price
            FROM invoice_item
            WHERE invoice_id = ?1
            ORDER BY id ASC",
        )?
        .query_map(params![invoice_id], |row| {
            Ok(InvoiceItem {
                id: row.get(0)?,
                invoice_id: row.get(1)?,
                description: row.get(2)?,
                quantity: row.get(3)?,
                unit_price: row.get(4)?,
            })
        })?
        .map(|result| result.map_err(Error::SqlError))
        .collect()
}

fn insert_items(
    invoice_id: InvoiceId,
    items: &[NewInvoiceItem],
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement = connection.prepare(
        "INSERT INTO invoice_item (invoice_id, description, quantity, unit_price)
        VALUES (?1, ?2, ?3, ?4)",
    )?;

    for item in items {
        statement.execute(params![
            invoice_id,
            item.description,
            item.quantity,
            item.unit_price
        ])?;
    }

    Ok(())
}

fn map_invoice_row(row: &Row) -> Result<Invoice, rusqlite::Error> {
    let raw_user_id: i64 = row.get(1)?;

    Ok(Invoice {
        id: row.get(0)?,
        user_id: UserID::new(raw_user_id),
        invoice_number: row.get(2)?,
        client_name: row.get(3)?,
        client_email: row.get(4)?,
        status: row.get(5)?,
        issue_date: row.get(6)?,
        due_date: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
