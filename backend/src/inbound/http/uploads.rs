//! Multipart parsing for the listing form.
//!
//! Text parts fill [`PropertyFields`]; `photos` parts become
//! [`ImageUpload`]s in the order received. Nothing is written to disk here.

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use tracing::debug;

use crate::domain::ports::ImageUpload;
use crate::domain::{
    Error, MAX_PROPERTY_IMAGES, PropertyField, PropertyFields, PropertyValidationError,
    validation_error,
};
use crate::inbound::http::validation::field_error;

/// Form part name carrying photos.
pub const PHOTOS_FIELD: &str = "photos";
/// Largest accepted photo.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Parsed listing form.
#[derive(Debug, Default)]
pub struct ListingSubmission {
    /// Raw text fields, validated later by the domain.
    pub fields: PropertyFields,
    /// Non-empty photo parts in submission order.
    pub uploads: Vec<ImageUpload>,
}

/// Read every part of a listing submission.
///
/// Photo parts without a file name or with an empty body are skipped, as
/// browsers send those for an untouched file input.
pub async fn read_listing_form(mut payload: Multipart) -> Result<ListingSubmission, Error> {
    let mut submission = ListingSubmission::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let Some(name) = field.name().map(str::to_owned) else {
            drain(&mut field).await?;
            continue;
        };

        if name == PHOTOS_FIELD {
            if let Some(upload) = read_photo(&mut field).await? {
                if submission.uploads.len() == MAX_PROPERTY_IMAGES {
                    return Err(validation_error(PropertyValidationError::TooManyImages {
                        max: MAX_PROPERTY_IMAGES,
                    }));
                }
                submission.uploads.push(upload);
            }
        } else if let Some(target) = PropertyField::from_form_name(&name) {
            let bytes = read_limited(&mut field, MAX_TEXT_FIELD_BYTES)
                .await?
                .ok_or_else(|| field_error(&name, "too_long", format!("{name} is too long")))?;
            let value = String::from_utf8(bytes)
                .map_err(|_| field_error(&name, "invalid_utf8", format!("{name} is not valid text")))?;
            submission.fields.set(target, value);
        } else {
            debug!(part = %name, "ignoring unknown form part");
            drain(&mut field).await?;
        }
    }

    Ok(submission)
}

async fn read_photo(field: &mut Field) -> Result<Option<ImageUpload>, Error> {
    let original_name = field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .unwrap_or_default()
        .to_owned();
    let content_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_owned())
        .unwrap_or_default();

    let bytes = read_limited(field, MAX_UPLOAD_BYTES).await?.ok_or_else(|| {
        field_error(
            PHOTOS_FIELD,
            "too_large",
            format!("{original_name} exceeds the {} MiB limit", MAX_UPLOAD_BYTES / (1024 * 1024)),
        )
    })?;

    if original_name.is_empty() || bytes.is_empty() {
        return Ok(None);
    }
    if !content_type.starts_with("image/") {
        return Err(field_error(
            PHOTOS_FIELD,
            "unsupported_type",
            format!("{original_name} is not an image"),
        ));
    }

    Ok(Some(ImageUpload {
        original_name,
        content_type,
        bytes,
    }))
}

/// Buffer a part, returning `None` once it grows past `limit`.
async fn read_limited(field: &mut Field, limit: usize) -> Result<Option<Vec<u8>>, Error> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed)?;
        if buf.len() + chunk.len() > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(buf))
}

async fn drain(field: &mut Field) -> Result<(), Error> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(malformed)?;
    }
    Ok(())
}

fn malformed(err: actix_multipart::MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart body: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::MultipartBody;
    use actix_web::{FromRequest, test};
    use rstest::rstest;

    async fn parse(content_type: String, body: Vec<u8>) -> Result<ListingSubmission, Error> {
        let (req, mut payload) = test::TestRequest::post()
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_http_parts();
        let multipart = Multipart::from_request(&req, &mut payload)
            .await
            .expect("multipart extractor");
        read_listing_form(multipart).await
    }

    #[actix_web::test]
    async fn collects_text_fields_and_photos_in_order() {
        let (ct, body) = MultipartBody::new()
            .text("title", "Sunny flat")
            .text("location_city", "Metropolis")
            .file("photos", "first.jpg", "image/jpeg", b"one")
            .text("unexpected", "ignored")
            .file("photos", "second.png", "image/png", b"two")
            .finish();

        let submission = parse(ct, body).await.expect("parsed");
        assert_eq!(submission.fields.title.as_deref(), Some("Sunny flat"));
        assert_eq!(submission.fields.location_city.as_deref(), Some("Metropolis"));
        let names: Vec<&str> = submission
            .uploads
            .iter()
            .map(|u| u.original_name.as_str())
            .collect();
        assert_eq!(names, ["first.jpg", "second.png"]);
        assert_eq!(submission.uploads[1].content_type, "image/png");
    }

    #[actix_web::test]
    async fn empty_file_inputs_are_skipped() {
        let (ct, body) = MultipartBody::new()
            .file("photos", "", "application/octet-stream", b"")
            .file("photos", "blank.jpg", "image/jpeg", b"")
            .finish();

        let submission = parse(ct, body).await.expect("parsed");
        assert!(submission.uploads.is_empty());
    }

    #[rstest]
    #[case("text/plain", "unsupported_type")]
    #[case("application/pdf", "unsupported_type")]
    #[actix_web::test]
    async fn non_images_are_rejected(#[case] content_type: &str, #[case] code: &str) {
        let (ct, body) = MultipartBody::new()
            .file("photos", "notes.txt", content_type, b"hello")
            .finish();

        let err = parse(ct, body).await.expect_err("non-image");
        assert_eq!(err.details().expect("details")["code"], code);
    }

    #[actix_web::test]
    async fn oversized_photo_is_rejected() {
        let big = vec![0_u8; MAX_UPLOAD_BYTES + 1];
        let (ct, body) = MultipartBody::new()
            .file("photos", "huge.jpg", "image/jpeg", &big)
            .finish();

        let err = parse(ct, body).await.expect_err("too large");
        assert_eq!(err.details().expect("details")["code"], "too_large");
    }

    #[actix_web::test]
    async fn sixth_photo_is_rejected() {
        let mut builder = MultipartBody::new();
        for i in 0..=MAX_PROPERTY_IMAGES {
            builder = builder.file("photos", &format!("{i}.jpg"), "image/jpeg", b"img");
        }
        let (ct, body) = builder.finish();

        let err = parse(ct, body).await.expect_err("too many");
        assert_eq!(err.details().expect("details")["code"], "too_many_images");
    }
}
