//! Admin login and user listing.
//!
//! The admin account is configured rather than stored; see `AppSettings`.

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AdminCredentials, LoginValidationError, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AdminSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, required_text};

const USERNAME: FieldName = FieldName::new("username");
const PASSWORD: FieldName = FieldName::new("password");

/// Body for `POST /api/admin/login`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginBody {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn admin_credentials(body: AdminLoginBody) -> ApiResult<AdminCredentials> {
    let username = required_text(body.username, USERNAME)?;
    let password = required_text(body.password, PASSWORD)?;
    AdminCredentials::try_from_parts(&username, &password).map_err(|err| match err {
        LoginValidationError::EmptyUsername => invalid_field_error(USERNAME, err),
        other => invalid_field_error(PASSWORD, other),
    })
}

/// Exchange the configured admin credentials for an admin token.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginBody,
    responses(
        (status = 200, description = "Login success", body = AdminToken),
        (status = 400, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Admin login not configured", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    payload: web::Json<AdminLoginBody>,
) -> ApiResult<web::Json<AdminToken>> {
    let credentials = admin_credentials(payload.into_inner())?;
    let issued = state.admin_login.login(credentials).await?;
    Ok(web::Json(AdminToken {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// Every registered shopper.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Registered users", body = [User]),
        (status = 401, description = "Missing or invalid admin token", body = ErrorSchema),
        (status = 403, description = "Token is not an admin token", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _admin: AdminSession,
) -> ApiResult<web::Json<Vec<User>>> {
    Ok(web::Json(state.users.list_users().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Error;
    use crate::domain::ports::{IssuedToken, MockAdminLogin, MockUsersQuery};
    use crate::inbound::http::auth::ADMIN_TOKEN_HEADER;
    use crate::inbound::http::test_utils::{ADMIN_TOKEN, TestState, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn login(state: HttpState, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(test_app(state)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&bytes).expect("JSON body"))
    }

    #[rstest]
    #[actix_web::test]
    async fn admin_login_returns_a_token() {
        let mut admin_login_mock = MockAdminLogin::new();
        admin_login_mock
            .expect_login()
            .withf(|credentials| credentials.username() == "admin")
            .times(1)
            .returning(|_| {
                Ok(IssuedToken {
                    token: "admin-signed".to_owned(),
                    expires_at: Utc.with_ymd_and_hms(2026, 6, 2, 9, 0, 0).single().expect("time"),
                })
            });
        let state = TestState::default().with_admin_login(admin_login_mock).build();

        let (status, body) = login(state, json!({"username": " admin ", "password": "pw"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token"], "admin-signed");
    }

    #[rstest]
    #[actix_web::test]
    async fn wrong_admin_password_is_rejected() {
        let mut admin_login_mock = MockAdminLogin::new();
        admin_login_mock
            .expect_login()
            .returning(|_| Err(Error::invalid_request("Invalid Credentials")));
        let state = TestState::default().with_admin_login(admin_login_mock).build();

        let (status, body) = login(state, json!({"username": "admin", "password": "nope"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["msg"], "Invalid Credentials");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_username_names_the_field() {
        let (status, body) = login(TestState::default().build(), json!({"password": "pw"})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "username");
    }

    #[rstest]
    #[actix_web::test]
    async fn list_users_requires_the_admin_header() {
        let mut users = MockUsersQuery::new();
        users.expect_list_users().times(1).returning(|| Ok(Vec::new()));
        let app = actix_test::init_service(test_app(
            TestState::default().with_users(users).build(),
        ))
        .await;

        let anonymous = actix_test::TestRequest::get().uri("/api/admin/users").to_request();
        let response = actix_test::call_service(&app, anonymous).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let admin = actix_test::TestRequest::get()
            .uri("/api/admin/users")
            .insert_header((ADMIN_TOKEN_HEADER, ADMIN_TOKEN))
            .to_request();
        let response = actix_test::call_service(&app, admin).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON");
        assert_eq!(body, json!([]));
    }
}
