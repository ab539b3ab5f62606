//! Tests for the listing service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockPropertyRepository, MockUploadStager, UploadStagerError};
use rstest::{fixture, rstest};

#[fixture]
fn owner() -> User {
    User::try_from_strings("11111111-1111-1111-1111-111111111111", "alice", "a@x.com")
        .expect("valid user")
}

#[fixture]
fn fields() -> PropertyFields {
    PropertyFields {
        title: Some("Sunny flat".into()),
        description: Some("Two rooms".into()),
        price: Some("100000".into()),
        area: Some("50".into()),
        property_type: Some("apartment".into()),
        location_city: Some("Metropolis".into()),
        listing_type: Some("sale".into()),
    }
}

fn upload(name: &str) -> ImageUpload {
    ImageUpload {
        original_name: name.to_owned(),
        content_type: "image/jpeg".to_owned(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}

fn sequential_stager() -> MockUploadStager {
    let counter = AtomicUsize::new(0);
    let mut stager = MockUploadStager::new();
    stager.expect_stage().returning(move |_| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok(ImagePath::for_file_name(&format!("staged-{n}.jpg")).expect("valid path"))
    });
    stager
}

fn make_service(
    repo: MockPropertyRepository,
    stager: MockUploadStager,
) -> ListingService<MockPropertyRepository, MockUploadStager> {
    ListingService::new(Arc::new(repo), Arc::new(stager))
}

#[rstest]
#[tokio::test]
async fn creates_listing_with_images_in_upload_order(owner: User, fields: PropertyFields) {
    let expected_id = PropertyId::random();
    let owner_id = owner.id().clone();
    let mut repo = MockPropertyRepository::new();
    repo.expect_create_with_images()
        .withf(move |property| {
            let paths: Vec<&str> = property.images().iter().map(ImagePath::as_str).collect();
            property.owner_id() == &owner_id
                && property.draft().location_city() == "Metropolis"
                && paths == ["/uploads/staged-0.jpg", "/uploads/staged-1.jpg"]
        })
        .times(1)
        .return_once(move |_| Ok(expected_id));

    let id = make_service(repo, sequential_stager())
        .create_listing(&owner, &fields, vec![upload("a.jpg"), upload("b.jpg")])
        .await
        .expect("listing created");
    assert_eq!(id, expected_id);
}

#[rstest]
#[tokio::test]
async fn invalid_form_writes_nothing(owner: User, mut fields: PropertyFields) {
    fields.price = Some("cheap".into());
    let mut repo = MockPropertyRepository::new();
    repo.expect_create_with_images().never();
    let mut stager = MockUploadStager::new();
    stager.expect_stage().never();

    let err = make_service(repo, stager)
        .create_listing(&owner, &fields, vec![upload("a.jpg")])
        .await
        .expect_err("invalid price");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let details = err.details().expect("details");
    assert_eq!(details["field"], "price");
    assert_eq!(details["code"], "invalid_number");
}

#[rstest]
#[tokio::test]
async fn more_than_five_uploads_is_rejected_before_staging(owner: User, fields: PropertyFields) {
    let mut repo = MockPropertyRepository::new();
    repo.expect_create_with_images().never();
    let mut stager = MockUploadStager::new();
    stager.expect_stage().never();

    let uploads = (0..=MAX_PROPERTY_IMAGES)
        .map(|i| upload(&format!("{i}.jpg")))
        .collect();
    let err = make_service(repo, stager)
        .create_listing(&owner, &fields, uploads)
        .await
        .expect_err("too many photos");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["code"], "too_many_images");
}

#[rstest]
#[tokio::test]
async fn transaction_failure_is_internal(owner: User, fields: PropertyFields) {
    let mut repo = MockPropertyRepository::new();
    repo.expect_create_with_images()
        .times(1)
        .return_once(|_| Err(PropertyPersistenceError::query("image insert failed")));

    let err = make_service(repo, sequential_stager())
        .create_listing(&owner, &fields, vec![upload("a.jpg")])
        .await
        .expect_err("rolled back");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn staging_failure_skips_the_transaction(owner: User, fields: PropertyFields) {
    let mut repo = MockPropertyRepository::new();
    repo.expect_create_with_images().never();
    let mut stager = MockUploadStager::new();
    stager
        .expect_stage()
        .return_once(|_| Err(UploadStagerError::io("disk full")));

    let err = make_service(repo, stager)
        .create_listing(&owner, &fields, vec![upload("a.jpg")])
        .await
        .expect_err("staging failed");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn listing_without_photos_is_allowed(owner: User, fields: PropertyFields) {
    let mut repo = MockPropertyRepository::new();
    repo.expect_create_with_images()
        .withf(|property| property.images().is_empty())
        .times(1)
        .return_once(|_| Ok(PropertyId::random()));
    let mut stager = MockUploadStager::new();
    stager.expect_stage().never();

    make_service(repo, stager)
        .create_listing(&owner, &fields, Vec::new())
        .await
        .expect("listing without photos");
}
