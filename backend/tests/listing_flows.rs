//! End-to-end HTTP flows over the in-memory adapters.
//!
//! The app is wired exactly as in production (trace, session and identity
//! middleware around the real handlers and services); only the driven ports
//! are swapped for `test_support` stores so the assertions can inspect rows.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use listings::Trace;
use listings::domain::{
    ACCOUNT_CREATED, ACCOUNT_EXISTS, AccountService, INVALID_CREDENTIALS, LOGIN_FIELDS_REQUIRED,
    ListingService, SessionIdentityResolver,
};
use listings::inbound::http::error::GENERIC_FAILURE;
use listings::inbound::http::home::home;
use listings::inbound::http::properties::{add_property, add_property_form};
use listings::inbound::http::state::HttpState;
use listings::inbound::http::test_utils::{MultipartBody, test_session_middleware};
use listings::inbound::http::users::{login, signup};
use listings::inbound::http::validation::form_config;
use listings::middleware::ResolveIdentity;
use listings::test_support::{
    InMemoryPropertyRepository, InMemoryUploadStager, InMemoryUserRepository,
    fast_password_hasher,
};
use rstest::rstest;
use serde_json::Value;

struct Harness {
    users: Arc<InMemoryUserRepository>,
    properties: Arc<InMemoryPropertyRepository>,
    stager: Arc<InMemoryUploadStager>,
}

impl Harness {
    fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            properties: Arc::new(InMemoryPropertyRepository::new()),
            stager: Arc::new(InMemoryUploadStager::new()),
        }
    }

    fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let accounts = Arc::new(AccountService::new(
            Arc::clone(&self.users),
            Arc::new(fast_password_hasher()),
        ));
        let listings = Arc::new(ListingService::new(
            Arc::clone(&self.properties),
            Arc::clone(&self.stager),
        ));
        let state = HttpState::new(accounts.clone(), accounts, listings);
        let resolver = Arc::new(SessionIdentityResolver::new(Arc::clone(&self.users)));

        App::new()
            .app_data(web::Data::new(state))
            .app_data(form_config())
            .wrap(ResolveIdentity::new(resolver))
            .wrap(test_session_middleware())
            .wrap(Trace)
            .service(home)
            .service(signup)
            .service(login)
            .service(add_property_form)
            .service(add_property)
    }
}

fn form(uri: &str, body: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(body.to_owned())
}

fn location<B>(res: &ServiceResponse<B>) -> Option<&str> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

fn listing_body(photos: usize) -> (String, Vec<u8>) {
    let mut body = MultipartBody::new()
        .text("title", "Sunny two-bed")
        .text("description", "Close to the park")
        .text("price", "250000")
        .text("area", "82.5")
        .text("property_type", "Apartment")
        .text("location_city", "Metropolis")
        .text("listing_type", "sale");
    for i in 0..photos {
        body = body.file("photos", &format!("photo-{i}.jpg"), "image/jpeg", b"jpeg-bytes");
    }
    body.finish()
}

async fn sign_up_and_log_in<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        form("/signup", "username=alice&email=a%40x.com&password=Secret123%21").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        app,
        form("/login", "email=a%40x.com&password=Secret123%21").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    session_cookie(&res).expect("login sets a session cookie")
}

#[actix_web::test]
async fn signup_then_login_establishes_a_session() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        form("/signup", "username=alice&email=a%40x.com&password=Secret123%21").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(session_cookie(&res).is_none());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], ACCOUNT_CREATED);

    let res = test::call_service(
        &app,
        form("/login", "email=a%40x.com&password=Secret123%21").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/"));
    let cookie = session_cookie(&res).expect("session cookie");

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "a@x.com");
}

#[actix_web::test]
async fn home_is_anonymous_without_a_session() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(body["user"].is_null());
}

#[actix_web::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;
    sign_up_and_log_in(&app).await;

    let unknown = test::call_service(
        &app,
        form("/login", "email=nobody%40x.com&password=Secret123%21").to_request(),
    )
    .await;
    let wrong = test::call_service(
        &app,
        form("/login", "email=a%40x.com&password=nope").to_request(),
    )
    .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&unknown).is_none());
    assert!(session_cookie(&wrong).is_none());

    let unknown: Value = test::read_body_json(unknown).await;
    let wrong: Value = test::read_body_json(wrong).await;
    assert_eq!(unknown["message"], INVALID_CREDENTIALS);
    assert_eq!(unknown["message"], wrong["message"]);
    assert_eq!(unknown["code"], wrong["code"]);
}

#[actix_web::test]
async fn login_without_password_is_rejected_before_lookup() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(&app, form("/login", "email=a%40x.com").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], LOGIN_FIELDS_REQUIRED);
}

#[actix_web::test]
async fn over_long_login_email_gets_the_generic_credential_failure() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;
    sign_up_and_log_in(&app).await;

    let body = format!("email={}%40x.com&password=Secret123%21", "a".repeat(262));
    let res = test::call_service(&app, form("/login", &body).to_request()).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&res).is_none());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], INVALID_CREDENTIALS);
}

#[rstest]
#[case("username=alice&email=other%40x.com&password=pw")]
#[case("username=bob&email=a%40x.com&password=pw")]
#[actix_web::test]
async fn duplicate_username_or_email_conflicts(#[case] second: &str) {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;
    test::call_service(
        &app,
        form("/signup", "username=alice&email=a%40x.com&password=pw").to_request(),
    )
    .await;

    let res = test::call_service(&app, form("/signup", second).to_request()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], ACCOUNT_EXISTS);
    assert_eq!(harness.users.count(), 1);
}

#[actix_web::test]
async fn anonymous_listing_redirects_to_login_and_writes_nothing() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;
    let (content_type, body) = listing_body(2);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add-property")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/login"));
    assert_eq!(harness.properties.property_count(), 0);
    assert!(harness.stager.staged().is_empty());
}

#[actix_web::test]
async fn anonymous_form_request_redirects_to_login() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/add-property").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/login"));
}

#[actix_web::test]
async fn signed_in_user_lists_a_property_with_two_photos() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;
    let cookie = sign_up_and_log_in(&app).await;
    let (content_type, body) = listing_body(2);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add-property")
            .cookie(cookie)
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some("/"));

    let properties = harness.properties.properties();
    assert_eq!(properties.len(), 1);
    let (id, listing) = &properties[0];
    assert_eq!(listing.draft().location_city(), "Metropolis");
    assert_eq!(listing.draft().property_type().as_str(), "apartment");

    let staged: Vec<String> = harness
        .stager
        .staged()
        .into_iter()
        .map(|(path, upload)| {
            assert_eq!(upload.content_type, "image/jpeg");
            path.as_str().to_owned()
        })
        .collect();
    let rows: Vec<(String, i32)> = harness
        .properties
        .images_for(id)
        .into_iter()
        .map(|row| (row.image_url, row.position))
        .collect();
    let expected: Vec<(String, i32)> = staged.into_iter().zip(0..).collect();
    assert_eq!(rows, expected);
    assert_eq!(rows.len(), 2);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
#[case(5)]
#[actix_web::test]
async fn k_photos_produce_k_image_rows(#[case] photos: usize) {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;
    let cookie = sign_up_and_log_in(&app).await;
    let (content_type, body) = listing_body(photos);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add-property")
            .cookie(cookie)
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(harness.properties.property_count(), 1);
    assert_eq!(harness.properties.image_count(), photos);
    let positions: Vec<i32> = harness
        .properties
        .properties()
        .first()
        .map(|(id, _)| harness.properties.images_for(id))
        .unwrap_or_default()
        .into_iter()
        .map(|row| row.position)
        .collect();
    assert_eq!(positions, (0..).take(photos).collect::<Vec<i32>>());
}

#[actix_web::test]
async fn store_fault_after_property_insert_leaves_no_rows() {
    let harness = Harness::new();
    harness.properties.fail_image_inserts();
    let app = test::init_service(harness.app()).await;
    let cookie = sign_up_and_log_in(&app).await;
    let (content_type, body) = listing_body(2);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add-property")
            .cookie(cookie)
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.headers().contains_key("trace-id"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], GENERIC_FAILURE);
    assert_eq!(harness.properties.property_count(), 0);
    assert_eq!(harness.properties.image_count(), 0);
}

#[actix_web::test]
async fn invalid_listing_is_rejected_before_staging() {
    let harness = Harness::new();
    let app = test::init_service(harness.app()).await;
    let cookie = sign_up_and_log_in(&app).await;
    let (content_type, body) = MultipartBody::new()
        .text("title", "No price")
        .text("description", "Missing numbers")
        .text("area", "40")
        .text("property_type", "house")
        .text("location_city", "Metropolis")
        .text("listing_type", "sale")
        .file("photos", "a.jpg", "image/jpeg", b"jpeg")
        .finish();

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/add-property")
            .cookie(cookie)
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "price");
    assert!(harness.stager.staged().is_empty());
    assert_eq!(harness.properties.property_count(), 0);
}
