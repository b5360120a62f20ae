//! Shopper account handlers.
//!
//! ```text
//! POST /api/register {"name":"Asha","phone":"9848012345","password":"secret"}
//! POST /api/login {"phone":"9848012345","password":"secret"}
//! GET /api/addresses
//! POST /api/addresses {"label":"Home","value":"Banjara Hills, Hyderabad"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::RegisterRequest;
use crate::domain::{
    LoginCredentials, LoginValidationError, Password, PersonName, Phone, SavedAddress, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::UserSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, required_text};

const NAME: FieldName = FieldName::new("name");
const PHONE: FieldName = FieldName::new("phone");
const PASSWORD: FieldName = FieldName::new("password");
const LABEL: FieldName = FieldName::new("label");
const VALUE: FieldName = FieldName::new("value");

/// Registration body for `POST /api/register`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Login body shared by shoppers and delivery partners.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneLoginBody {
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Address body for `POST /api/addresses`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressBody {
    pub label: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredUser {
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLogin {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

fn password_from(raw: Option<String>) -> ApiResult<Password> {
    let raw = required_text(raw, PASSWORD)?;
    Password::new(&raw).map_err(|err| invalid_field_error(PASSWORD, err))
}

fn map_login_validation_error(err: LoginValidationError) -> crate::domain::Error {
    match err {
        LoginValidationError::Phone(inner) => invalid_field_error(PHONE, inner),
        other => invalid_field_error(PASSWORD, other),
    }
}

/// Parse a phone/password body into login credentials.
pub(crate) fn login_credentials(body: PhoneLoginBody) -> ApiResult<LoginCredentials> {
    let phone = required_text(body.phone, PHONE)?;
    let password = required_text(body.password, PASSWORD)?;
    LoginCredentials::try_from_parts(&phone, &password).map_err(map_login_validation_error)
}

/// Parse the name/phone/password triple shared by shopper and partner sign-up.
pub(crate) fn account_fields(
    name: Option<String>,
    phone: Option<String>,
    password: Option<String>,
) -> ApiResult<(PersonName, Phone, Password)> {
    let name = required_text(name, NAME)?;
    let phone = required_text(phone, PHONE)?;
    let name = PersonName::new(name).map_err(|err| invalid_field_error(NAME, err))?;
    let phone = Phone::new(phone).map_err(|err| invalid_field_error(PHONE, err))?;
    let password = password_from(password)?;
    Ok((name, phone, password))
}

/// Parse a `{label, value}` pair.
pub(crate) fn saved_address(body: AddressBody) -> ApiResult<SavedAddress> {
    let label = required_text(body.label, LABEL)?;
    let value = required_text(body.value, VALUE)?;
    SavedAddress::new(label, value).map_err(|err| invalid_field_error(VALUE, err))
}

/// Create a shopper account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = RegisteredUser),
        (status = 400, description = "Missing fields or phone already registered", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let RegisterBody {
        name,
        phone,
        password,
    } = payload.into_inner();
    let (name, phone, password) = account_fields(name, phone, password)?;
    let user = state
        .accounts
        .register(RegisterRequest {
            name,
            phone,
            password,
        })
        .await?;
    Ok(HttpResponse::Created().json(RegisteredUser { user }))
}

/// Exchange a phone number and password for a shopper token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = PhoneLoginBody,
    responses(
        (status = 200, description = "Login success", body = UserLogin),
        (status = 400, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<PhoneLoginBody>,
) -> ApiResult<web::Json<UserLogin>> {
    let credentials = login_credentials(payload.into_inner())?;
    let response = state.accounts.login(credentials).await?;
    Ok(web::Json(UserLogin {
        token: response.token.token,
        expires_at: response.token.expires_at,
        user: response.user,
    }))
}

/// Saved addresses of the calling shopper.
#[utoipa::path(
    get,
    path = "/api/addresses",
    responses(
        (status = 200, description = "Saved addresses", body = [SavedAddress]),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "listAddresses"
)]
#[get("/addresses")]
pub async fn list_addresses(
    state: web::Data<HttpState>,
    session: UserSession,
) -> ApiResult<web::Json<Vec<SavedAddress>>> {
    let addresses = state.accounts.list_addresses(session.0).await?;
    Ok(web::Json(addresses))
}

/// Append an address and return the full list.
#[utoipa::path(
    post,
    path = "/api/addresses",
    request_body = AddressBody,
    responses(
        (status = 200, description = "Updated addresses", body = [SavedAddress]),
        (status = 400, description = "Invalid address", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "addAddress"
)]
#[post("/addresses")]
pub async fn add_address(
    state: web::Data<HttpState>,
    session: UserSession,
    payload: web::Json<AddressBody>,
) -> ApiResult<web::Json<Vec<SavedAddress>>> {
    let address = saved_address(payload.into_inner())?;
    let addresses = state.accounts.add_address(session.0, address).await?;
    Ok(web::Json(addresses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{IssuedToken, LoginResponse, MockAccountCommand};
    use crate::domain::{Error, UserDraft, UserId};
    use crate::inbound::http::auth::USER_TOKEN_HEADER;
    use crate::inbound::http::test_utils::{TEST_USER, TestState, USER_TOKEN, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::TimeZone;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn asha() -> User {
        User::new(UserDraft {
            id: UserId::new(7),
            name: PersonName::new("Asha").expect("name"),
            phone: Phone::new("9848012345").expect("phone"),
            is_admin: false,
            addresses: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).single().expect("time"),
        })
    }

    async fn post_json(state: HttpState, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(test_app(state)).await;
        let request = actix_test::TestRequest::post()
            .uri(uri)
            .insert_header((USER_TOKEN_HEADER, USER_TOKEN))
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).expect("JSON body"))
    }

    #[rstest]
    #[actix_web::test]
    async fn register_returns_created_user() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_register()
            .withf(|request| request.phone.as_ref() == "9848012345")
            .times(1)
            .returning(|_| Ok(asha()));
        let state = TestState::default().with_accounts(accounts).build();

        let (status, body) = post_json(
            state,
            "/api/register",
            json!({"name": "Asha", "phone": "98480-12345", "password": "secret"}),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["id"], 7);
        assert_eq!(body["user"]["is_admin"], false);
        assert!(body["user"].get("password_hash").is_none());
    }

    #[rstest]
    #[case(json!({"phone": "9848012345", "password": "x"}), "name")]
    #[case(json!({"name": "Asha", "password": "x"}), "phone")]
    #[case(json!({"name": "Asha", "phone": "9848012345", "password": ""}), "password")]
    #[actix_web::test]
    async fn register_reports_the_missing_field(#[case] payload: Value, #[case] field: &str) {
        let (status, body) = post_json(TestState::default().build(), "/api/register", payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], "missing_field");
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_phone_is_a_bad_request() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_register()
            .returning(|_| Err(Error::conflict("phone number already registered")));
        let state = TestState::default().with_accounts(accounts).build();

        let (status, body) = post_json(
            state,
            "/api/register",
            json!({"name": "Asha", "phone": "9848012345", "password": "secret"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "conflict");
        assert_eq!(body["msg"], "phone number already registered");
    }

    #[rstest]
    #[actix_web::test]
    async fn login_returns_token_and_user() {
        let mut accounts = MockAccountCommand::new();
        accounts.expect_login().times(1).returning(|_| {
            Ok(LoginResponse {
                token: IssuedToken {
                    token: "signed".to_owned(),
                    expires_at: Utc.with_ymd_and_hms(2026, 6, 2, 9, 0, 0).single().expect("time"),
                },
                user: asha(),
            })
        });
        let state = TestState::default().with_accounts(accounts).build();

        let (status, body) = post_json(
            state,
            "/api/login",
            json!({"phone": "9848012345", "password": "secret"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token"], "signed");
        assert_eq!(body["user"]["name"], "Asha");
        assert!(body.get("expiresAt").is_some());
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_json_is_an_invalid_request() {
        let app = actix_test::init_service(test_app(TestState::default().build())).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"phone\":")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("JSON");
        assert_eq!(body["code"], "invalid_request");
    }

    #[rstest]
    #[actix_web::test]
    async fn add_address_appends_for_the_token_owner() {
        let mut accounts = MockAccountCommand::new();
        accounts
            .expect_add_address()
            .with(
                eq(TEST_USER),
                eq(SavedAddress::new("Home", "Banjara Hills, Hyderabad").expect("address")),
            )
            .times(1)
            .returning(|_, address| Ok(vec![address]));
        let state = TestState::default().with_accounts(accounts).build();

        let (status, body) = post_json(
            state,
            "/api/addresses",
            json!({"label": "Home", "value": "Banjara Hills, Hyderabad"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"label": "Home", "value": "Banjara Hills, Hyderabad"}]));
    }

    #[rstest]
    #[actix_web::test]
    async fn addresses_require_a_user_token() {
        let app = actix_test::init_service(test_app(TestState::default().build())).await;
        let request = actix_test::TestRequest::get().uri("/api/addresses").to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
