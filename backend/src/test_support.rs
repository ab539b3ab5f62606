//! In-memory adapters for end-to-end tests.
//!
//! Compiled for unit tests and behind the `test-support` feature so the
//! integration suites under `tests/` can drive the full HTTP stack without a
//! database. The stores honour the same contracts as the Diesel adapters:
//! unique usernames and emails, and all-or-nothing listing writes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    ImageUpload, PropertyPersistenceError, PropertyRepository, UploadStager, UploadStagerError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, ImagePath, NewProperty, NewUser, PropertyId, StoredCredentials, User, UserId,
};
use crate::outbound::security::{Argon2Costs, Argon2PasswordHasher};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Argon2id hasher with the smallest legal costs.
///
/// # Panics
///
/// Never in practice: the costs are the documented minimums.
pub fn fast_password_hasher() -> Argon2PasswordHasher {
    let costs = Argon2Costs {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    match Argon2PasswordHasher::new(costs) {
        Ok(hasher) => hasher,
        Err(err) => panic!("minimal argon2 costs rejected: {err}"),
    }
}

/// User store keyed by id, enforcing unique username and email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<StoredCredentials>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        lock(&self.rows).len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut rows = lock(&self.rows);
        let taken = rows.iter().any(|row| {
            row.user.username() == &user.username || row.user.email() == &user.email
        });
        if taken {
            return Err(UserPersistenceError::conflict());
        }
        let created = User::new(UserId::random(), user.username.clone(), user.email.clone());
        rows.push(StoredCredentials {
            user: created.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(created)
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|row| row.user.email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|row| row.user.id() == id)
            .map(|row| row.user.clone()))
    }
}

/// One committed image row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRow {
    pub property_id: PropertyId,
    pub image_url: String,
    pub position: i32,
}

#[derive(Default)]
struct Tables {
    properties: Vec<(PropertyId, NewProperty)>,
    images: Vec<ImageRow>,
}

/// Listing store with transactional semantics and fault injection.
///
/// Writes go to a scratch copy of the tables that replaces the committed
/// state only when every insert succeeds.
#[derive(Default)]
pub struct InMemoryPropertyRepository {
    tables: Mutex<Tables>,
    fail_image_inserts: AtomicBool,
}

impl InMemoryPropertyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every image insert fail after the property row was written.
    pub fn fail_image_inserts(&self) {
        self.fail_image_inserts.store(true, Ordering::SeqCst);
    }

    pub fn property_count(&self) -> usize {
        lock(&self.tables).properties.len()
    }

    pub fn image_count(&self) -> usize {
        lock(&self.tables).images.len()
    }

    /// Committed listings in insertion order.
    pub fn properties(&self) -> Vec<(PropertyId, NewProperty)> {
        lock(&self.tables).properties.clone()
    }

    /// Image rows for `id`, ordered by position.
    pub fn images_for(&self, id: &PropertyId) -> Vec<ImageRow> {
        let mut rows: Vec<ImageRow> = lock(&self.tables)
            .images
            .iter()
            .filter(|row| &row.property_id == id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.position);
        rows
    }
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn create_with_images(
        &self,
        property: &NewProperty,
    ) -> Result<PropertyId, PropertyPersistenceError> {
        let mut committed = lock(&self.tables);
        let id = PropertyId::random();

        let mut properties = committed.properties.clone();
        let mut images = committed.images.clone();
        properties.push((id, property.clone()));

        for (image, position) in property.images().iter().zip(0_i32..) {
            if self.fail_image_inserts.load(Ordering::SeqCst) {
                return Err(PropertyPersistenceError::query("injected image insert failure"));
            }
            images.push(ImageRow {
                property_id: id,
                image_url: image.as_str().to_owned(),
                position,
            });
        }

        *committed = Tables { properties, images };
        Ok(id)
    }
}

/// Stager that keeps bytes in memory and hands out sequential names.
#[derive(Default)]
pub struct InMemoryUploadStager {
    next: AtomicUsize,
    staged: Mutex<Vec<(ImagePath, ImageUpload)>>,
}

impl InMemoryUploadStager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything staged so far, in staging order.
    pub fn staged(&self) -> Vec<(ImagePath, ImageUpload)> {
        lock(&self.staged).clone()
    }
}

#[async_trait]
impl UploadStager for InMemoryUploadStager {
    async fn stage(&self, upload: &ImageUpload) -> Result<ImagePath, UploadStagerError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        let path = ImagePath::for_file_name(&format!("staged-{n}"))
            .map_err(|err| UploadStagerError::io(err.to_string()))?;
        lock(&self.staged).push((path.clone(), upload.clone()));
        Ok(path)
    }
}
