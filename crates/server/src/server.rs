use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};

use std::{net::SocketAddr, sync::Arc};

use crate::{accounts, categories, partners, transactions};
use engine::Engine;

static OWNER_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-owner-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Owner every request is scoped to, inserted by the owner middleware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Owner(pub String);

/// `TypedHeader` for the owner header
///
/// Requests must contain a non-empty "x-owner-id" entry in the header.
#[derive(Debug)]
struct OwnerHeader(String);

impl Header for OwnerHeader {
    fn name() -> &'static axum::http::HeaderName {
        &OWNER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(OwnerHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-owner-id header"),
        }
    }
}

async fn owner(
    owner_header: Result<TypedHeader<OwnerHeader>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Ok(TypedHeader(OwnerHeader(owner_id))) = owner_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(Owner(owner_id));
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .patch(accounts::update)
                .delete(accounts::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            axum::routing::patch(categories::update).delete(categories::delete),
        )
        .route("/partners", get(partners::list).post(partners::create))
        .route(
            "/partners/{id}",
            axum::routing::patch(partners::update).delete(partners::delete),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get).delete(transactions::delete),
        )
        .route_layer(middleware::from_fn(owner))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn app() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-owner-id", "alice");
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn missing_owner_header_is_unauthorized() {
        let app = app().await;
        let request = Request::builder()
            .uri("/accounts")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/accounts")
            .header("x-owner-id", "   ")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accounts_roll_up_to_parent() {
        let app = app().await;
        let (status, parent) = send(
            &app,
            "POST",
            "/accounts",
            Some(json!({ "name": "Bank", "kind": "payment" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let parent_id = parent["id"].as_str().unwrap().to_string();

        for (name, balance) in [("Checking", 100), ("Spare", 200)] {
            let (status, _) = send(
                &app,
                "POST",
                "/accounts",
                Some(json!({
                    "name": name,
                    "kind": "payment",
                    "balance_minor": balance,
                    "parent_id": parent_id,
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, "GET", "/accounts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accounts"][0]["root"]["balance_minor"], 300);
        assert_eq!(body["accounts"][0]["children"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, "DELETE", &format!("/accounts/{parent_id}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("has children"));
    }

    #[tokio::test]
    async fn credit_card_over_limit_is_rejected() {
        let app = app().await;
        let (_, card) = send(
            &app,
            "POST",
            "/accounts",
            Some(json!({
                "name": "Visa",
                "kind": "credit_card",
                "currency": "VND",
                "limit_minor": 1_000_000,
            })),
        )
        .await;
        let card_id = card["id"].as_str().unwrap().to_string();
        assert_eq!(card["available_limit_minor"], 1_000_000);

        let (status, body) = send(
            &app,
            "POST",
            "/transactions",
            Some(json!({
                "kind": "expense",
                "amount_minor": 1_200_000,
                "currency": "VND",
                "occurred_at": "2026-03-01T10:00:00+07:00",
                "from_account_id": card_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("credit limit"));

        let (status, body) = send(&app, "GET", &format!("/accounts/{card_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance_minor"], 0);
    }

    #[tokio::test]
    async fn category_delete_with_replacement() {
        let app = app().await;
        let (_, cash) = send(
            &app,
            "POST",
            "/accounts",
            Some(json!({ "name": "Cash", "kind": "payment", "balance_minor": 100 })),
        )
        .await;
        let (_, food) = send(
            &app,
            "POST",
            "/categories",
            Some(json!({ "name": "Food", "kind": "expense" })),
        )
        .await;
        let (_, groceries) = send(
            &app,
            "POST",
            "/categories",
            Some(json!({ "name": "Groceries", "kind": "expense" })),
        )
        .await;
        let food_id = food["id"].as_str().unwrap().to_string();
        let groceries_id = groceries["id"].as_str().unwrap().to_string();

        let (status, tx) = send(
            &app,
            "POST",
            "/transactions",
            Some(json!({
                "kind": "expense",
                "amount_minor": 40,
                "occurred_at": "2026-03-01T10:00:00+01:00",
                "from_account_id": cash["id"],
                "to_category_id": food_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(&app, "DELETE", &format!("/categories/{food_id}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &app,
            "DELETE",
            &format!("/categories/{food_id}?replacement_id={groceries_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let tx_id = tx["id"].as_str().unwrap();
        let (status, body) = send(&app, "GET", &format!("/transactions/{tx_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["to_category_id"], groceries_id.as_str());

        let (_, body) = send(&app, "GET", "/categories", None).await;
        assert_eq!(body["categories"][0]["balance_minor"], -40);
    }

    #[tokio::test]
    async fn deleted_transactions_are_listed_on_request() {
        let app = app().await;
        let (_, cash) = send(
            &app,
            "POST",
            "/accounts",
            Some(json!({ "name": "Cash", "kind": "payment", "balance_minor": 50 })),
        )
        .await;
        let cash_id = cash["id"].as_str().unwrap().to_string();
        let (_, tx) = send(
            &app,
            "POST",
            "/transactions",
            Some(json!({
                "kind": "expense",
                "amount_minor": 20,
                "occurred_at": "2026-03-01T10:00:00Z",
                "from_account_id": cash_id,
                "note": "coffee",
            })),
        )
        .await;
        let tx_id = tx["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "DELETE", &format!("/transactions/{tx_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", &format!("/accounts/{cash_id}"), None).await;
        assert_eq!(body["balance_minor"], 50);

        let (_, body) = send(&app, "GET", "/transactions", None).await;
        assert!(body["transactions"].as_array().unwrap().is_empty());

        let (_, body) = send(
            &app,
            "GET",
            &format!("/transactions?account_id={cash_id}&include_deleted=true"),
            None,
        )
        .await;
        let listed = body["transactions"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0]["deleted_at"].is_null());
        assert_eq!(listed[0]["created_by"], "alice");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = app().await;
        let id = uuid::Uuid::new_v4();
        let (status, _) = send(&app, "GET", &format!("/accounts/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &format!("/partners/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
