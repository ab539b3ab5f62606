//! Home endpoint exposing the current identity.

use actix_web::{get, web};
use serde::Serialize;

use crate::domain::User;
use crate::middleware::CurrentIdentity;

/// `GET /` body: the signed-in user, or `null`.
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub user: Option<User>,
}

#[get("/")]
pub async fn home(identity: CurrentIdentity) -> web::Json<HomeResponse> {
    web::Json(HomeResponse {
        user: identity.0.user().cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Identity;
    use actix_web::{App, HttpMessage, dev::Service, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn anonymous_home_has_null_user() {
        let app = test::init_service(App::new().service(home)).await;
        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(body, json!({ "user": null }));
    }

    #[actix_web::test]
    async fn authenticated_home_exposes_user() {
        let user = User::try_from_strings(
            "11111111-1111-1111-1111-111111111111",
            "alice",
            "a@x.com",
        )
        .expect("valid user");
        let app = test::init_service(
            App::new()
                .wrap_fn(move |req, srv| {
                    req.extensions_mut()
                        .insert(Identity::Authenticated(user.clone()));
                    srv.call(req)
                })
                .service(home),
        )
        .await;
        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request())
                .await;
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["id"], "11111111-1111-1111-1111-111111111111");
    }
}
