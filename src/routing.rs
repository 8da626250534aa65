//! Defines the routes of the JSON API and how they respond to requests.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{delete, get, post, put},
};

use crate::{
    AppState, api,
    auth::{auth_guard, log_in_endpoint, log_out_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        rename_category_endpoint,
    },
    dashboard::dashboard_endpoint,
    endpoints,
    invoice::{
        create_invoice_endpoint, delete_invoice_endpoint, edit_invoice_endpoint,
        get_invoice_endpoint, list_invoices_endpoint, update_invoice_status_endpoint,
        void_invoice_endpoint,
    },
    receipt::{
        MAX_RECEIPT_SIZE, delete_receipt_endpoint, download_receipt_endpoint,
        link_receipt_endpoint, list_transaction_receipts_endpoint, upload_receipt_endpoint,
    },
    report::{category_breakdown_endpoint, income_expense_report_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_transaction_endpoint, list_transactions_endpoint, transaction_totals_endpoint,
    },
    user::register_endpoint,
};

/// The request body limit for the upload route. Larger than the receipt size
/// limit so an oversized upload reaches the size check and gets a JSON error
/// instead of a bare 413.
const UPLOAD_BODY_LIMIT: usize = 4 * MAX_RECEIPT_SIZE;

/// Create the axum router for the JSON API.
///
/// Everything except registration and log-in sits behind the auth guard
/// middleware, which resolves the session cookie to a user ID before any
/// handler runs.
pub fn build_router(state: AppState) -> Router {
    let unprotected = Router::new()
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint));

    let protected = Router::new()
        .route(endpoints::LOG_OUT, post(log_out_endpoint))
        .route(endpoints::DASHBOARD, get(dashboard_endpoint))
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(rename_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_TOTALS, get(transaction_totals_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_RECEIPTS,
            get(list_transaction_receipts_endpoint),
        )
        .route(
            endpoints::INVOICES,
            get(list_invoices_endpoint).post(create_invoice_endpoint),
        )
        .route(
            endpoints::INVOICE,
            get(get_invoice_endpoint)
                .put(edit_invoice_endpoint)
                .delete(delete_invoice_endpoint),
        )
        .route(endpoints::INVOICE_STATUS, put(update_invoice_status_endpoint))
        .route(endpoints::INVOICE_VOID, post(void_invoice_endpoint))
        .route(
            endpoints::RECEIPTS,
            post(upload_receipt_endpoint).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(endpoints::RECEIPT, delete(delete_receipt_endpoint))
        .route(endpoints::RECEIPT_LINK, post(link_receipt_endpoint))
        .route(endpoints::RECEIPT_FILE, get(download_receipt_endpoint))
        .route(
            endpoints::REPORT_INCOME_EXPENSE,
            get(income_expense_report_endpoint),
        )
        .route(
            endpoints::REPORT_CATEGORY_BREAKDOWN,
            get(category_breakdown_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    unprotected
        .merge(protected)
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> Response {
    api::json_error(
        StatusCode::NOT_FOUND,
        "the requested resource could not be found",
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::{
        AppState, PaginationConfig,
        auth::COOKIE_TOKEN,
        endpoints::{self, format_endpoint},
    };

    use super::build_router;

    fn test_server() -> (TestServer, PathBuf) {
        let connection =
            Connection::open_in_memory().expect("Could not create database connection");
        let upload_dir =
            std::env::temp_dir().join(format!("pocketbook-test-{}", Uuid::new_v4()));
        let state = AppState::new(
            connection,
            "averysafeandsecretsecret",
            upload_dir.clone(),
            PaginationConfig::default(),
        )
        .expect("Could not create app state");

        let server = TestServer::new(build_router(state));

        (server, upload_dir)
    }

    async fn register_and_log_in(server: &TestServer) -> Cookie<'static> {
        let response = server
            .post(endpoints::REGISTER)
            .json(&json!({
                "email": "test@example.com",
                "password": "averystrongandsecurepassword",
                "confirm_password": "averystrongandsecurepassword",
                "name": "Test User",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "email": "test@example.com",
                "password": "averystrongandsecurepassword",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        response.cookie(COOKIE_TOKEN)
    }

    fn data(response_json: &Value) -> &Value {
        assert_eq!(response_json["success"], json!(true));

        &response_json["data"]
    }

    #[tokio::test]
    async fn protected_routes_reject_anonymous_requests() {
        let (server, _) = test_server();

        let response = server.get(endpoints::DASHBOARD).await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["success"], json!(false));
    }

    #[tokio::test]
    async fn unknown_routes_get_a_json_not_found() {
        let (server, _) = test_server();

        let response = server.get("/api/does_not_exist").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["success"], json!(false));
    }

    #[tokio::test]
    async fn register_record_income_and_see_it_on_the_dashboard() {
        let (server, _) = test_server();
        let cookie = register_and_log_in(&server).await;

        let response = server
            .get(endpoints::CATEGORIES)
            .add_cookie(cookie.clone())
            .await;
        let body = response.json::<Value>();
        let categories = data(&body).as_array().expect("expected an array").clone();
        assert_eq!(categories.len(), 11);

        let salary = categories
            .iter()
            .find(|category| category["name"] == json!("Salary"))
            .expect("expected a default Salary category");

        let today = OffsetDateTime::now_utc().date();
        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie.clone())
            .json(&json!({
                "type": "income",
                "amount": 500_000,
                "description": "August pay",
                "category_id": salary["id"],
                "date": today.to_string(),
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let response = server
            .get(endpoints::DASHBOARD)
            .add_cookie(cookie)
            .await;
        let body = response.json::<Value>();
        let summary = data(&body);

        assert_eq!(summary["current_month_income"], json!(500_000));
        assert_eq!(summary["current_month_expenses"], json!(0));
        assert_eq!(summary["net_balance"], json!(500_000));
        assert_eq!(summary["recent_transactions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sent_invoices_are_locked_against_edits_and_deletion() {
        let (server, _) = test_server();
        let cookie = register_and_log_in(&server).await;

        let response = server
            .post(endpoints::INVOICES)
            .add_cookie(cookie.clone())
            .json(&json!({
                "client_name": "Acme Pty Ltd",
                "issue_date": "2026-08-01",
                "due_date": "2026-08-15",
                "items": [
                    { "description": "Design", "quantity": 2, "unit_price": 150_000 },
                    { "description": "Support", "quantity": 1, "unit_price": 50_000 },
                ],
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body = response.json::<Value>();
        let invoice = data(&body);
        assert_eq!(invoice["total"], json!(350_000));
        assert_eq!(invoice["invoice_number"], json!("INV-001"));
        assert_eq!(invoice["status"], json!("draft"));
        let invoice_id = invoice["id"].as_i64().unwrap();

        let response = server
            .put(&format_endpoint(endpoints::INVOICE_STATUS, invoice_id))
            .add_cookie(cookie.clone())
            .json(&json!({ "status": "sent" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let response = server
            .put(&format_endpoint(endpoints::INVOICE, invoice_id))
            .add_cookie(cookie.clone())
            .json(&json!({
                "items": [{ "description": "Rework", "quantity": 1, "unit_price": 1 }],
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);

        let response = server
            .delete(&format_endpoint(endpoints::INVOICE, invoice_id))
            .add_cookie(cookie.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);

        // The invoice survives the rejected delete, items intact.
        let response = server
            .get(&format_endpoint(endpoints::INVOICE, invoice_id))
            .add_cookie(cookie)
            .await;
        let body = response.json::<Value>();
        assert_eq!(data(&body)["total"], json!(350_000));
    }

    #[tokio::test]
    async fn categories_in_use_cannot_be_deleted_until_their_transactions_go() {
        let (server, _) = test_server();
        let cookie = register_and_log_in(&server).await;

        let response = server
            .post(endpoints::CATEGORIES)
            .add_cookie(cookie.clone())
            .json(&json!({ "name": "Gifts", "type": "expense" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body = response.json::<Value>();
        let category_id = data(&body)["id"].as_i64().unwrap();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie.clone())
            .json(&json!({
                "type": "expense",
                "amount": 4_500,
                "category_id": category_id,
                "date": "2026-08-20",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body = response.json::<Value>();
        let transaction_id = data(&body)["id"].as_i64().unwrap();

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY, category_id))
            .add_cookie(cookie.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction_id))
            .add_cookie(cookie.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY, category_id))
            .add_cookie(cookie.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let response = server
            .get(endpoints::CATEGORIES)
            .add_cookie(cookie)
            .await;
        let body = response.json::<Value>();
        assert_eq!(data(&body).as_array().unwrap().len(), 11);
    }

    #[tokio::test]
    async fn oversized_and_unsupported_uploads_are_rejected() {
        let (server, upload_dir) = test_server();
        let cookie = register_and_log_in(&server).await;

        let oversized = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![0u8; 6 * 1024 * 1024])
                .file_name("big.pdf")
                .mime_type("application/pdf"),
        );
        let response = server
            .post(endpoints::RECEIPTS)
            .add_cookie(cookie.clone())
            .multipart(oversized)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let unsupported = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"GIF89a".to_vec())
                .file_name("animation.gif")
                .mime_type("image/gif"),
        );
        let response = server
            .post(endpoints::RECEIPTS)
            .add_cookie(cookie)
            .multipart(unsupported)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        // Rejected uploads leave nothing on disk.
        assert!(!upload_dir.exists() || upload_dir.read_dir().unwrap().next().is_none());
    }

    #[tokio::test]
    async fn a_failed_record_insert_removes_the_stored_file() {
        let connection =
            Connection::open_in_memory().expect("Could not create database connection");
        let upload_dir =
            std::env::temp_dir().join(format!("pocketbook-test-{}", Uuid::new_v4()));
        let state = AppState::new(
            connection,
            "averysafeandsecretsecret",
            upload_dir.clone(),
            PaginationConfig::default(),
        )
        .expect("Could not create app state");
        let server = TestServer::new(build_router(state.clone()));
        let cookie = register_and_log_in(&server).await;

        // Poison the database lock so the record insert fails after the
        // file has been written.
        let db_connection = state.db_connection.clone();
        std::thread::spawn(move || {
            let _guard = db_connection.lock().unwrap();
            panic!("poison the database lock");
        })
        .join()
        .unwrap_err();

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("receipt.pdf")
                .mime_type("application/pdf"),
        );
        let response = server
            .post(endpoints::RECEIPTS)
            .add_cookie(cookie)
            .multipart(form)
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!upload_dir.exists() || upload_dir.read_dir().unwrap().next().is_none());
    }

    #[tokio::test]
    async fn uploaded_receipts_can_be_downloaded_and_deleted() {
        let (server, upload_dir) = test_server();
        let cookie = register_and_log_in(&server).await;

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(vec![7u8; 2 * 1024 * 1024])
                .file_name("lunch.png")
                .mime_type("image/png"),
        );
        let response = server
            .post(endpoints::RECEIPTS)
            .add_cookie(cookie.clone())
            .multipart(form)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body = response.json::<Value>();
        let receipt = data(&body);
        assert_eq!(receipt["file_name"], json!("lunch.png"));
        let receipt_id = receipt["id"].as_i64().unwrap();

        let response = server
            .get(&format_endpoint(endpoints::RECEIPT_FILE, receipt_id))
            .add_cookie(cookie.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header("content-type"), "image/png");
        assert_eq!(response.as_bytes().len(), 2 * 1024 * 1024);

        let response = server
            .delete(&format_endpoint(endpoints::RECEIPT, receipt_id))
            .add_cookie(cookie.clone())
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let response = server
            .get(&format_endpoint(endpoints::RECEIPT_FILE, receipt_id))
            .add_cookie(cookie)
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let _ = std::fs::remove_dir_all(upload_dir);
    }

    #[tokio::test]
    async fn logging_out_invalidates_the_session_cookie() {
        let (server, _) = test_server();
        let cookie = register_and_log_in(&server).await;

        let response = server
            .post(endpoints::LOG_OUT)
            .add_cookie(cookie)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let expired = response.cookie(COOKIE_TOKEN);
        let response = server
            .get(endpoints::DASHBOARD)
            .add_cookie(expired)
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}
