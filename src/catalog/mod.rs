//! Typed views over catalog records.
//!
//! Records stay the unit of storage and transport; these types are a
//! convenience for callers that know which collection they are reading.
//! Conversion goes through serde, so a record with missing optional fields
//! still decodes, while one with a wrongly shaped field does not.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::record::Record;

pub use dive_catalog_macros::CatalogModel;

/// A typed model bound to one collection.
///
/// Usually derived:
///
/// ```
/// use dive_catalog::CatalogModel;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, Serialize, Deserialize, CatalogModel)]
/// #[catalog(collection = "boats")]
/// struct Boat {
///     id: String,
///     name: String,
/// }
///
/// assert_eq!(Boat::COLLECTION, "boats");
/// ```
pub trait CatalogModel: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection this model is read from and written to.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// Decode a record. Array fields must already be structured.
    fn from_record(record: &Record) -> Result<Self, serde_json::Error> {
        serde_json::to_value(record).and_then(serde_json::from_value)
    }

    /// Encode into a record suitable for create/update.
    fn to_record(&self) -> Result<Record, serde_json::Error> {
        serde_json::to_value(self).and_then(serde_json::from_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CatalogModel)]
#[catalog(collection = "courses")]
pub struct Course {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, rename = "maxDepth")]
    pub max_depth: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub includes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CatalogModel)]
#[catalog(collection = "excursions")]
pub struct Excursion {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CatalogModel)]
#[catalog(collection = "packages")]
pub struct Package {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub popular: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CatalogModel)]
#[catalog(collection = "gallery")]
pub struct GalleryItem {
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CatalogModel)]
#[catalog(collection = "reviews")]
pub struct Review {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CatalogModel)]
#[catalog(collection = "team")]
pub struct TeamMember {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CatalogModel)]
#[catalog(collection = "services")]
pub struct Service {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
