//! Property listing handlers.
//!
//! ```text
//! GET  /add-property   form description (authenticated)
//! POST /add-property   multipart listing with up to 5 `photos`
//! ```
//!
//! Anonymous callers are redirected to `/login` before the body is read.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Identity, ListingType, MAX_PROPERTY_IMAGES};
use crate::inbound::http::ApiResult;
use crate::inbound::http::redirect::see_other;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::uploads::read_listing_form;
use crate::middleware::CurrentIdentity;

/// Description of the listing form for clients rendering it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFormDescriptor {
    pub max_images: usize,
    pub listing_types: Vec<ListingType>,
}

#[get("/add-property")]
pub async fn add_property_form(identity: CurrentIdentity) -> HttpResponse {
    if !identity.0.is_authenticated() {
        return see_other("/login");
    }
    HttpResponse::Ok().json(ListingFormDescriptor {
        max_images: MAX_PROPERTY_IMAGES,
        listing_types: ListingType::ALL.to_vec(),
    })
}

/// Create a listing owned by the current user, then redirect home.
#[post("/add-property")]
pub async fn add_property(
    state: web::Data<HttpState>,
    identity: CurrentIdentity,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let Identity::Authenticated(owner) = identity.into_inner() else {
        return Ok(see_other("/login"));
    };

    let submission = read_listing_form(payload).await?;
    state
        .listings
        .create_listing(&owner, &submission.fields, submission.uploads)
        .await?;
    Ok(see_other("/"))
}
