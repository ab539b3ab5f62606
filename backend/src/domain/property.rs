//! Property listing model and form validation.
//!
//! A listing is created from raw form text plus the paths of images already
//! staged on disk. Validation happens here, before any file is written or
//! any row is inserted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Maximum number of images attached to one property.
pub const MAX_PROPERTY_IMAGES: usize = 5;
/// URL prefix under which staged uploads are served.
pub const UPLOADS_PREFIX: &str = "/uploads/";

const TITLE_MAX: usize = 200;
const PROPERTY_TYPE_MAX: usize = 50;
const CITY_MAX: usize = 100;
const IMAGE_PATH_MAX: usize = 255;

/// Form fields making up a property listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Title,
    Description,
    Price,
    Area,
    PropertyType,
    LocationCity,
    ListingType,
}

impl PropertyField {
    /// Form field name as submitted by clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Price => "price",
            Self::Area => "area",
            Self::PropertyType => "property_type",
            Self::LocationCity => "location_city",
            Self::ListingType => "listing_type",
        }
    }

    /// Resolve a submitted form field name.
    pub fn from_form_name(name: &str) -> Option<Self> {
        Some(match name {
            "title" => Self::Title,
            "description" => Self::Description,
            "price" => Self::Price,
            "area" => Self::Area,
            "property_type" => Self::PropertyType,
            "location_city" => Self::LocationCity,
            "listing_type" => Self::ListingType,
            _ => return None,
        })
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for listing input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyValidationError {
    #[error("{field} is required")]
    MissingField { field: PropertyField },
    #[error("{field} must be a number")]
    InvalidNumber { field: PropertyField },
    #[error("{field} must not be negative")]
    NegativeNumber { field: PropertyField },
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: PropertyField, max: usize },
    #[error("listing type must be one of: sale, rent")]
    InvalidListingType,
    #[error("at most {max} images may be attached")]
    TooManyImages { max: usize },
    #[error("image path must live under {UPLOADS_PREFIX}")]
    InvalidImagePath,
}

impl PropertyValidationError {
    /// The form field at fault, when the failure concerns a single field.
    pub fn field(&self) -> Option<PropertyField> {
        match self {
            Self::MissingField { field }
            | Self::InvalidNumber { field }
            | Self::NegativeNumber { field }
            | Self::FieldTooLong { field, .. } => Some(*field),
            Self::InvalidListingType => Some(PropertyField::ListingType),
            Self::TooManyImages { .. } | Self::InvalidImagePath => None,
        }
    }

    /// Stable machine-readable code for error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::InvalidNumber { .. } => "invalid_number",
            Self::NegativeNumber { .. } => "negative_number",
            Self::FieldTooLong { .. } => "too_long",
            Self::InvalidListingType => "invalid_listing_type",
            Self::TooManyImages { .. } => "too_many_images",
            Self::InvalidImagePath => "invalid_image_path",
        }
    }
}

/// Stable property identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(Uuid);

impl PropertyId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a property is offered for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    Sale,
    Rent,
}

impl ListingType {
    /// All accepted listing types.
    pub const ALL: [Self; 2] = [Self::Sale, Self::Rent];

    /// Lowercase storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Rent => "rent",
        }
    }
}

impl FromStr for ListingType {
    type Err = PropertyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" => Ok(Self::Sale),
            "rent" => Ok(Self::Rent),
            _ => Err(PropertyValidationError::InvalidListingType),
        }
    }
}

/// Categorical property type such as `apartment` or `house`.
///
/// The category set is open; values are trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyType(String);

impl PropertyType {
    fn parse(raw: &str) -> Result<Self, PropertyValidationError> {
        let value = required(PropertyField::PropertyType, raw, PROPERTY_TYPE_MAX)?;
        Ok(Self(value.to_lowercase()))
    }

    /// Normalised category string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Raw listing form values as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub area: Option<String>,
    pub property_type: Option<String>,
    pub location_city: Option<String>,
    pub listing_type: Option<String>,
}

impl PropertyFields {
    /// Store a submitted value under its form field.
    pub fn set(&mut self, field: PropertyField, value: String) {
        let slot = match field {
            PropertyField::Title => &mut self.title,
            PropertyField::Description => &mut self.description,
            PropertyField::Price => &mut self.price,
            PropertyField::Area => &mut self.area,
            PropertyField::PropertyType => &mut self.property_type,
            PropertyField::LocationCity => &mut self.location_city,
            PropertyField::ListingType => &mut self.listing_type,
        };
        *slot = Some(value);
    }
}

/// Validated listing details, independent of owner and images.
///
/// ## Invariants
/// - every text field is trimmed and non-empty;
/// - `price` and `area_sqm` are finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDraft {
    title: String,
    description: String,
    price: f64,
    area_sqm: f64,
    property_type: PropertyType,
    location_city: String,
    listing_type: ListingType,
}

impl PropertyDraft {
    /// Validate raw form values.
    ///
    /// Fields are checked in form order and the first failure is reported.
    ///
    /// # Examples
    /// ```
    /// use listings::domain::{ListingType, PropertyDraft, PropertyFields};
    ///
    /// let fields = PropertyFields {
    ///     title: Some("Sunny flat".into()),
    ///     description: Some("Two rooms".into()),
    ///     price: Some("100000".into()),
    ///     area: Some("50".into()),
    ///     property_type: Some("Apartment".into()),
    ///     location_city: Some("Metropolis".into()),
    ///     listing_type: Some("sale".into()),
    /// };
    /// let draft = PropertyDraft::try_from_fields(&fields).unwrap();
    /// assert_eq!(draft.property_type().as_str(), "apartment");
    /// assert_eq!(draft.listing_type(), ListingType::Sale);
    /// ```
    pub fn try_from_fields(fields: &PropertyFields) -> Result<Self, PropertyValidationError> {
        let title = required(PropertyField::Title, opt(&fields.title), TITLE_MAX)?;
        let description = required(PropertyField::Description, opt(&fields.description), usize::MAX)?;
        let price = non_negative(PropertyField::Price, opt(&fields.price))?;
        let area_sqm = non_negative(PropertyField::Area, opt(&fields.area))?;
        let property_type = PropertyType::parse(opt(&fields.property_type))?;
        let location_city = required(PropertyField::LocationCity, opt(&fields.location_city), CITY_MAX)?;
        let listing_type: ListingType =
            required(PropertyField::ListingType, opt(&fields.listing_type), usize::MAX)?.parse()?;

        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            price,
            area_sqm,
            property_type,
            location_city: location_city.to_owned(),
            listing_type,
        })
    }

    /// Trimmed listing title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Trimmed free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Asking price; finite and non-negative.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Floor area in square metres; finite and non-negative.
    pub fn area_sqm(&self) -> f64 {
        self.area_sqm
    }

    /// Free-form property category such as `Apartment`.
    pub fn property_type(&self) -> &PropertyType {
        &self.property_type
    }

    /// Trimmed city name.
    pub fn location_city(&self) -> &str {
        &self.location_city
    }

    /// Whether the property is for sale or rent.
    pub fn listing_type(&self) -> ListingType {
        self.listing_type
    }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn required(field: PropertyField, raw: &str, max: usize) -> Result<&str, PropertyValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PropertyValidationError::MissingField { field });
    }
    if trimmed.chars().count() > max {
        return Err(PropertyValidationError::FieldTooLong { field, max });
    }
    Ok(trimmed)
}

fn non_negative(field: PropertyField, raw: &str) -> Result<f64, PropertyValidationError> {
    let value: f64 = required(field, raw, usize::MAX)?
        .parse()
        .map_err(|_| PropertyValidationError::InvalidNumber { field })?;
    if !value.is_finite() {
        return Err(PropertyValidationError::InvalidNumber { field });
    }
    if value.is_sign_negative() && value != 0.0 {
        return Err(PropertyValidationError::NegativeNumber { field });
    }
    // Normalise -0.0 so storage never sees a signed zero.
    Ok(value.abs())
}

/// Public path of a staged upload, e.g. `/uploads/<name>.jpg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImagePath(String);

impl ImagePath {
    /// Validate a staged path.
    pub fn new(path: impl Into<String>) -> Result<Self, PropertyValidationError> {
        let path = path.into();
        let Some(name) = path.strip_prefix(UPLOADS_PREFIX) else {
            return Err(PropertyValidationError::InvalidImagePath);
        };
        if name.is_empty() || name.contains('/') || name.contains("..") || path.len() > IMAGE_PATH_MAX
        {
            return Err(PropertyValidationError::InvalidImagePath);
        }
        Ok(Self(path))
    }

    /// Build the public path for a stored file name.
    pub fn for_file_name(file_name: &str) -> Result<Self, PropertyValidationError> {
        Self::new(format!("{UPLOADS_PREFIX}{file_name}"))
    }

    /// File name component below the uploads prefix.
    pub fn file_name(&self) -> &str {
        self.0.strip_prefix(UPLOADS_PREFIX).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ImagePath> for String {
    fn from(value: ImagePath) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImagePath {
    type Error = PropertyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Everything required to insert one property and its images atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    owner_id: UserId,
    draft: PropertyDraft,
    images: Vec<ImagePath>,
}

impl NewProperty {
    /// Combine an owner, a validated draft and staged images in upload order.
    pub fn new(
        owner_id: UserId,
        draft: PropertyDraft,
        images: Vec<ImagePath>,
    ) -> Result<Self, PropertyValidationError> {
        if images.len() > MAX_PROPERTY_IMAGES {
            return Err(PropertyValidationError::TooManyImages {
                max: MAX_PROPERTY_IMAGES,
            });
        }
        Ok(Self {
            owner_id,
            draft,
            images,
        })
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn draft(&self) -> &PropertyDraft {
        &self.draft
    }

    /// Staged images in the order they were received.
    pub fn images(&self) -> &[ImagePath] {
        &self.images
    }
}
