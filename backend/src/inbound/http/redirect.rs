//! Redirect responses used after form submissions.

use actix_web::HttpResponse;
use actix_web::http::header;

/// `303 See Other` to `location`, so browsers follow up with a `GET`.
pub fn see_other(location: &'static str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
