//! Filtered queries and aggregate totals over the transaction ledger.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error,
    category::{CategoryId, CategoryName, CategoryType},
    transaction::{CategorySummary, Transaction, TransactionWithCategory, db::map_row},
    user::UserID,
};

/// The optional filters shared by the list and totals queries.
///
/// Date bounds are inclusive. An empty `category_ids` set means "all
/// categories".
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    /// The earliest date to include.
    pub start_date: Option<Date>,
    /// The latest date to include.
    pub end_date: Option<Date>,
    /// Restrict to these categories.
    pub category_ids: Vec<CategoryId>,
}

/// Income and expense sums over a filter set, partitioned by type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TransactionTotals {
    /// The sum of income amounts in minor units.
    pub income: i64,
    /// The sum of expense amounts in minor units.
    pub expenses: i64,
    /// `income - expenses`.
    pub net: i64,
}

/// Count the transactions matching `filter` for `user_id`.
pub fn count_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<i64, Error> {
    let (where_clause, params) = build_filter_clause(user_id, filter);
    let query = format!("SELECT COUNT(*) FROM \"transaction\" t WHERE {where_clause}");

    connection
        .prepare(&query)?
        .query_row(params_from_iter(params), |row| row.get(0))
        .map_err(|error| error.into())
}

/// Get one page of transactions matching `filter`, sorted by date descending,
/// each joined with its category's summary.
///
/// Pages are numbered from 1. Sorting is by date and then ID so that the
/// order stays stable after edits.
pub fn get_transactions_page(
    user_id: UserID,
    filter: &TransactionFilter,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<Vec<TransactionWithCategory>, Error> {
    let (where_clause, mut params) = build_filter_clause(user_id, filter);
    let query = format!(
        "SELECT t.id, t.user_id, t.type, t.amount, t.description, t.category_id, t.date,
            t.created_at, t.updated_at, category.name, category.type
        FROM \"transaction\" t
        INNER JOIN category ON category.id = t.category_id
        WHERE {where_clause}
        ORDER BY t.date DESC, t.id DESC
        LIMIT ? OFFSET ?"
    );

    // page and page_size come straight from query parameters, so the offset
    // arithmetic and the i64 casts must saturate rather than wrap.
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    params.push(Value::from(page_size.min(i64::MAX as u64) as i64));
    params.push(Value::from(offset.min(i64::MAX as u64) as i64));

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_row_with_category)?
        .map(|result| result.map_err(Error::SqlError))
        .collect()
}

/// Compute income/expense/net totals over all transactions matching `filter`.
///
/// The matching rows are fetched and partitioned by type in memory so the
/// result is guaranteed to agree with an unpaginated
/// [get_transactions_page] over the same filter.
pub fn get_transaction_totals(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<TransactionTotals, Error> {
    let (where_clause, params) = build_filter_clause(user_id, filter);
    let query = format!("SELECT t.type, t.amount FROM \"transaction\" t WHERE {where_clause}");

    let rows: Vec<(CategoryType, i64)> = connection
        .prepare(&query)?
        .query_map(params_from_iter(params), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<_, _>>()?;

    Ok(sum_by_type(&rows))
}

/// The `limit` most recently dated transactions, joined with their category.
pub fn get_recent_transactions(
    user_id: UserID,
    limit: u64,
    connection: &Connection,
) -> Result<Vec<TransactionWithCategory>, Error> {
    get_transactions_page(user_id, &TransactionFilter::default(), 1, limit, connection)
}

/// All transactions in the inclusive date range, joined with their category,
/// optionally restricted to one type. Used by the reports, which aggregate
/// the fetched rows in memory.
pub fn get_transactions_in_range(
    user_id: UserID,
    start_date: Date,
    end_date: Date,
    transaction_type: Option<CategoryType>,
    connection: &Connection,
) -> Result<Vec<TransactionWithCategory>, Error> {
    let filter = TransactionFilter {
        start_date: Some(start_date),
        end_date: Some(end_date),
        category_ids: Vec::new(),
    };
    let (where_clause, mut params) = build_filter_clause(user_id, &filter);

    let type_clause = match transaction_type {
        Some(transaction_type) => {
            params.push(Value::from(transaction_type.as_str().to_owned()));
            " AND t.type = ?"
        }
        None => "",
    };

    let query = format!(
        "SELECT t.id, t.user_id, t.type, t.amount, t.description, t.category_id, t.date,
            t.created_at, t.updated_at, category.name, category.type
        FROM \"transaction\" t
        INNER JOIN category ON category.id = t.category_id
        WHERE {where_clause}{type_clause}
        ORDER BY t.date ASC, t.id ASC"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_row_with_category)?
        .map(|result| result.map_err(Error::SqlError))
        .collect()
}

fn sum_by_type(rows: &[(CategoryType, i64)]) -> TransactionTotals {
    let mut income = 0;
    let mut expenses = 0;

    for (transaction_type, amount) in rows {
        match transaction_type {
            CategoryType::Income => income += amount,
            CategoryType::Expense => expenses += amount,
        }
    }

    TransactionTotals {
        income,
        expenses,
        net: income - expenses,
    }
}

/// Build the WHERE clause and parameter list shared by every filtered query.
///
/// Uses unnumbered `?` placeholders, so callers may append further
/// placeholders after the returned parameters.
fn build_filter_clause(user_id: UserID, filter: &TransactionFilter) -> (String, Vec<Value>) {
    let mut conditions = vec!["t.user_id = ?".to_owned()];
    let mut params = vec![Value::from(user_id.as_i64())];

    if let Some(start_date) = filter.start_date {
        conditions.push("t.date >= ?".to_owned());
        params.push(Value::from(start_date.to_string()));
    }

    if let Some(end_date) = filter.end_date {
        conditions.push("t.date <= ?".to_owned());
        params.push(Value::from(end_date.to_string()));
    }

    if !filter.category_ids.is_empty() {
        let placeholders = vec!["?"; filter.category_ids.len()].join(", ");
        conditions.push(format!("t.category_id IN ({placeholders})"));
        params.extend(filter.category_ids.iter().map(|&id| Value::from(id)));
    }

    (conditions.join(" AND "), params)
}

fn map_row_with_category(row: &Row) -> Result<TransactionWithCategory, rusqlite::Error> {
    let transaction: Transaction = map_row(row)?;

    let raw_name: String = row.get(9)?;
    let category = CategorySummary {
        id: transaction.category_id,
        name: CategoryName::new_unchecked(&raw_name),
        category_type: row.get(10)?,
    };

    Ok(TransactionWithCategory {
        transaction,
        category,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        category::CategoryType,
        transaction::{TransactionFilter, db::test_utils::*},
    };

    use super::{
        count_transactions, get_recent_transactions, get_transaction_totals,
        get_transactions_in_range, get_transactions_page,
    };

    #[test]
    fn list_is_sorted_by_date_descending() {
        let (connection, user_id) = get_test_db_connection();
        let category = make_category("Food", CategoryType::Expense, user_id, &connection);

        make_transaction(100, &category, date!(2026 - 06 - 01), user_id, &connection);
        make_transaction(200, &category, date!(2026 - 08 - 01), user_id, &connection);
        make_transaction(300, &category, date!(2026 - 07 - 01), user_id, &connection);

        let page = get_transactions_page(
            user_id,
            &TransactionFilter::default(),
            1,
            20,
            &connection,
        )
        .unwrap();

        let dates: Vec<_> = page.iter().map(|row| row.transaction.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2026 - 08 - 01),
                date!(2026 - 07 - 01),
                date!(2026 - 06 - 01)
            ]
        );
    }

    #[test]
    fn date_filter_bounds_are_inclusive() {
        let (connection, user_id) = get_test_db_connection();
        let category = make_category("Food", CategoryType::Expense, user_id, &connection);

        make_transaction(100, &category, date!(2026 - 06 - 01), user_id, &connection);
        make_transaction(200, &category, date!(2026 - 07 - 01), user_id, &connection);
        make_transaction(300, &category, date!(2026 - 08 - 01), user_id, &connection);

        let filter = TransactionFilter {
            start_date: Some(date!(2026 - 06 - 01)),
            end_date: Some(date!(2026 - 07 - 01)),
            category_ids: Vec::new(),
        };

        assert_eq!(count_transactions(user_id, &filter, &connection), Ok(2));
    }

    #[test]
    fn category_filter_restricts_rows() {
        let (connection, user_id) = get_test_db_connection();
        let food = make_category("Food", CategoryType::Expense, user_id, &connection);
        let rent = make_category("Rent", CategoryType::Expense, user_id, &connection);

        make_transaction(100, &food, date!(2026 - 08 - 01), user_id, &connection);
        make_transaction(200, &rent, date!(2026 - 08 - 02), user_id, &connection);

        let filter = TransactionFilter {
            category_ids: vec![food.id],
            ..Default::default()
        };

        let page = get_transactions_page(user_id, &filter, 1, 20, &connection).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].transaction.amount, 100);
        assert_eq!(page[0].category.name.as_ref(), "Food");
    }

    #[test]
    fn pagination_splits_rows() {
        let (connection, user_id) = get_test_db_connection();
        let category = make_category("Food", CategoryType::Expense, user_id, &connection);

        for day in 1..=5 {
            make_transaction(
                day as i64 * 100,
                &category,
                date!(2026 - 08 - 01).replace_day(day).unwrap(),
                user_id,
                &connection,
            );
        }

        let filter = TransactionFilter::default();
        let first_page = get_transactions_page(user_id, &filter, 1, 2, &connection).unwrap();
        let third_page = get_transactions_page(user_id, &filter, 3, 2, &connection).unwrap();

        assert_eq!(first_page.len(), 2);
        assert_eq!(third_page.len(), 1);
        assert_eq!(count_transactions(user_id, &filter, &connection), Ok(5));
    }

    #[test]
    fn totals_partition_by_type_and_net_is_consistent() {
        let (connection, user_id) = get_test_db_connection();
        let salary = make_category("Salary", CategoryType::Income, user_id, &connection);
        let food = make_category("Food", CategoryType::Expense, user_id, &connection);

        make_transaction(10_000, &salary, date!(2026 - 08 - 01), user_id, &connection);
        make_transaction(20_000, &salary, date!(2026 - 08 - 02), user_id, &connection);
        make_transaction(5_000, &food, date!(2026 - 08 - 03), user_id, &connection);
        make_transaction(15_000, &food, date!(2026 - 08 - 04), user_id, &connection);

        let filter = TransactionFilter::default();
        let totals = get_transaction_totals(user_id, &filter, &connection).unwrap();

        assert_eq!(totals.income, 30_000);
        assert_eq!(totals.expenses, 20_000);
        assert_eq!(totals.net, totals.income - totals.expenses);

        // The totals must agree with summing an unpaginated listing.
        let rows = get_transactions_page(user_id, &filter, 1, u64::MAX, &connection).unwrap();
        let listed_income: i64 = rows
            .iter()
            .filter(|row| row.transaction.transaction_type == CategoryType::Income)
            .map(|row| row.transaction.amount)
            .sum();
        assert_eq!(totals.income, listed_income);
    }

    #[test]
    fn out_of_range_page_numbers_return_an_empty_page() {
        let (connection, user_id) = get_test_db_connection();
        let category = make_category("Food", CategoryType::Expense, user_id, &connection);
        make_transaction(100, &category, date!(2026 - 08 - 01), user_id, &connection);

        let filter = TransactionFilter::default();
        let far_past_the_end =
            get_transactions_page(user_id, &filter, u64::MAX, 20, &connection).unwrap();
        let huge_page_size =
            get_transactions_page(user_id, &filter, u64::MAX, u64::MAX, &connection).unwrap();

        assert!(far_past_the_end.is_empty());
        assert!(huge_page_size.is_empty());
    }

    #[test]
    fn recent_transactions_are_limited() {
        let (connection, user_id) = get_test_db_connection();
        let category = make_category("Food", CategoryType::Expense, user_id, &connection);

        for day in 1..=7 {
            make_transaction(
                100,
                &category,
                date!(2026 - 08 - 01).replace_day(day).unwrap(),
                user_id,
                &connection,
            );
        }

        let recent = get_recent_transactions(user_id, 5, &connection).unwrap();

        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].transaction.date, date!(2026 - 08 - 07));
    }

    #[test]
    fn range_query_can_filter_by_type() {
        let (connection, user_id) = get_test_db_connection();
        let salary = make_category("Salary", CategoryType::Income, user_id, &connection);
        let food = make_category("Food", CategoryType::Expense, user_id, &connection);

        make_transaction(10_000, &salary, date!(2026 - 08 - 01), user_id, &connection);
        make_transaction(5_000, &food, date!(2026 - 08 - 02), user_id, &connection);

        let rows = get_transactions_in_range(
            user_id,
            date!(2026 - 01 - 01),
            date!(2026 - 12 - 31),
            Some(CategoryType::Expense),
            &connection,
        )
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].transaction.transaction_type, CategoryType::Expense);
    }

    #[test]
    fn other_users_rows_are_excluded() {
        let (connection, user_id) = get_test_db_connection();
        let category = make_category("Food", CategoryType::Expense, user_id, &connection);
        make_transaction(100, &category, date!(2026 - 08 - 01), user_id, &connection);

        let other = crate::user::create_user(
            "other@example.com",
            crate::user::PasswordHash::new_unchecked("fakehash"),
            "Other",
            &connection,
        )
        .unwrap();

        assert_eq!(
            count_transactions(other.id, &TransactionFilter::default(), &connection),
            Ok(0)
        );
    }
}
