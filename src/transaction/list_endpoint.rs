//! Endpoint for the filtered, paginated transaction listing.

use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;
use time::Date;

use crate::{
    Error, api,
    category::CategoryId,
    pagination::page_count,
    transaction::{
        TransactionFilter, TransactionState, count_transactions, get_transactions_page,
    },
    user::UserID,
};

/// The query parameters accepted by the listing and totals endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQueryParams {
    /// Only include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    pub end_date: Option<Date>,
    /// A comma-separated list of category IDs to include.
    pub category_ids: Option<String>,
    /// The page number, starting from 1.
    pub page: Option<u64>,
    /// The number of rows per page.
    pub limit: Option<u64>,
}

/// Parse a comma-separated category ID list such as `3,7,12`.
pub(crate) fn parse_category_ids(raw: &str) -> Result<Vec<CategoryId>, Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse().map_err(|_| {
                Error::Validation(format!("invalid category ID {part:?} in category_ids"))
            })
        })
        .collect()
}

pub(super) fn build_filter(params: &TransactionQueryParams) -> Result<TransactionFilter, Error> {
    let category_ids = match &params.category_ids {
        Some(raw) => parse_category_ids(raw)?,
        None => Vec::new(),
    };

    if let (Some(start_date), Some(end_date)) = (params.start_date, params.end_date)
        && start_date > end_date
    {
        return Err(Error::Validation(
            "start_date must not be after end_date".to_owned(),
        ));
    }

    Ok(TransactionFilter {
        start_date: params.start_date,
        end_date: params.end_date,
        category_ids,
    })
}

/// Route handler for the paginated listing, sorted by date descending.
///
/// Each row carries its category summary so clients do not need a second
/// lookup. The response includes `total` and `page_count` for the whole
/// filtered set.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<TransactionQueryParams>,
) -> Result<Response, Error> {
    let filter = build_filter(&params)?;
    let page = params.page.unwrap_or(state.pagination_config.default_page).max(1);
    let limit = params
        .limit
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let total = count_transactions(user_id, &filter, &connection)? as u64;
    let transactions = get_transactions_page(user_id, &filter, page, limit, &connection)?;

    Ok(api::json_ok(
        StatusCode::OK,
        json!({
            "transactions": transactions,
            "total": total,
            "page": page,
            "limit": limit,
            "page_count": page_count(total, limit),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{TransactionQueryParams, build_filter, parse_category_ids};

    #[test]
    fn parses_comma_separated_ids() {
        assert_eq!(parse_category_ids("3,7,12"), Ok(vec![3, 7, 12]));
    }

    #[test]
    fn tolerates_whitespace_and_trailing_commas() {
        assert_eq!(parse_category_ids(" 3, 7 ,"), Ok(vec![3, 7]));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(matches!(
            parse_category_ids("3,abc"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn rejects_inverted_date_range() {
        let params = TransactionQueryParams {
            start_date: Some(time::macros::date!(2026 - 08 - 02)),
            end_date: Some(time::macros::date!(2026 - 08 - 01)),
            ..Default::default()
        };

        assert!(matches!(build_filter(&params), Err(Error::Validation(_))));
    }
}
