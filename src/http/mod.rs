//! REST surface over [`DomainLogic`]

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower::Service;
use tracing::error;

use crate::{
    commands::{self, BoxFuture, DomainLogic, ErrorKind},
    ports::{
        member::MemberPort, password::PasswordPort, preference::PreferencePort, token::TokenPort,
    },
};

pub mod auth;
pub mod member;
pub mod preference;
pub mod validation;

/// Domain logic over type-erased ports, so handlers stay non-generic
pub type SharedLogic =
    DomainLogic<dyn MemberPort, dyn PreferencePort, dyn PasswordPort, dyn TokenPort>;

impl SharedLogic {
    /// Call one command on a fresh clone, skipping `poll_ready` since it is always ready
    pub fn run<R, O>(&self, req: R) -> BoxFuture<O>
    where
        Self: Service<R, Response = O, Error = commands::Error, Future = BoxFuture<O>>,
    {
        self.clone().call(req)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub logic: SharedLogic,
    /// Same port the logic issues tokens with, used by the auth extractors
    pub tokens: Arc<dyn TokenPort>,
}

impl AppState {
    pub fn new(
        member: Arc<dyn MemberPort>,
        preference: Arc<dyn PreferencePort>,
        password: Arc<dyn PasswordPort>,
        tokens: Arc<dyn TokenPort>,
    ) -> Self {
        Self {
            logic: DomainLogic::new(member, preference, password, tokens.clone()),
            tokens,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/member/signup", post(member::signup))
        .route("/member/duplication/email", post(member::duplicate_email))
        .route("/member/duplication/phone", post(member::duplicate_phone))
        .route("/member/login", post(member::login))
        .route("/member/find/email", post(member::find_email))
        .route("/member/find/password", post(member::find_password))
        .route("/member/change/password", post(member::change_password))
        .route("/member/change/address", post(member::change_address))
        .route("/member/point", get(member::point))
        .route("/member/info", get(member::info))
        .route("/member/isLogin", get(member::is_login))
        .route(
            "/preference",
            post(preference::add).get(preference::list),
        )
        .route("/preference/{preference_id}", delete(preference::remove))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Error returned by every handler
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] commands::Error),

    /// Body could not be parsed or failed validation
    #[error("invalid request: {0}")]
    Validation(String),

    /// Missing or invalid bearer token
    #[error("authentication required")]
    Unauthorized,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Domain(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.code(),
            Self::Validation(_) => "INVALID_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            code: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        adapters::{
            database::memory::{tests::item, MemoryDatabase},
            password::Argon2Password,
            token::JwtTokens,
        },
        ports::{member, token},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use rstest::*;
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use speculoos::prelude::*;
    use tower::ServiceExt;

    pub(crate) const ITEM_ID: i64 = 7;

    /// Router over a fresh memory database seeded with one item
    pub(crate) fn app() -> Router {
        let database = Arc::new(MemoryDatabase::default());
        database
            .insert_item(item(ITEM_ID))
            .expect("seeding an item should not fail");
        let tokens = JwtTokens::new(
            &SecretString::from("a-long-and-random-test-signing-key".to_string()),
            chrono::Duration::minutes(30),
        );
        router(AppState::new(
            database.clone(),
            database,
            Arc::new(Argon2Password),
            Arc::new(tokens),
        ))
    }

    /// Send one request and decode the JSON body, `Value::Null` when empty
    pub(crate) async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub(crate) fn signup_body(email: &str, phone: &str) -> Value {
        json!({
            "email": email,
            "password": "asdfasdf@1",
            "name": "testMember",
            "phone": phone,
            "birth": "20000327",
        })
    }

    /// Sign up then log in, returning the bearer token
    pub(crate) async fn login(app: &Router, email: &str, phone: &str) -> String {
        let (status, _) = send(
            app,
            Method::POST,
            "/member/signup",
            None,
            Some(signup_body(email, phone)),
        )
        .await;
        assert_that!(status).is_equal_to(StatusCode::CREATED);

        let (status, body) = send(
            app,
            Method::POST,
            "/member/login",
            None,
            Some(json!({ "email": email, "password": "asdfasdf@1" })),
        )
        .await;
        assert_that!(status).is_equal_to(StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None, None).await;

        assert_that!(status).is_equal_to(StatusCode::OK);
        assert_that!(body).is_equal_to(Value::String("ok".to_string()));
    }

    #[rstest]
    #[case(commands::Error::MemberNotFound(1), StatusCode::NOT_FOUND)]
    #[case(commands::Error::DuplicateEmail("a@b.com".into()), StatusCode::CONFLICT)]
    #[case(commands::Error::InvalidCredentials, StatusCode::UNAUTHORIZED)]
    #[case(
        commands::Error::NotPreferenceOwner { member_id: 1, preference_id: 2 },
        StatusCode::FORBIDDEN
    )]
    #[case(commands::Error::SamePassword, StatusCode::BAD_REQUEST)]
    #[case(
        commands::Error::Member(member::Error::NegativePointsTotal {
            current_points: 0,
            delta_points: -1
        }),
        StatusCode::BAD_REQUEST
    )]
    #[case(
        commands::Error::Token(token::Error::Adapter("boom".into())),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn test_error_status(#[case] error: commands::Error, #[case] expected: StatusCode) {
        let response = ApiError::from(error).into_response();

        assert_that!(response.status()).is_equal_to(expected);
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let error = commands::Error::Token(token::Error::Adapter("secret detail".into()));

        let response = ApiError::from(error).into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_that!(body["code"].as_str()).is_equal_to(Some("INTERNAL_ERROR"));
        assert_that!(body["message"].as_str()).is_equal_to(Some("Internal server error"));
    }
}
