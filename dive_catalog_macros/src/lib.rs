mod catalog_model;

use proc_macro::TokenStream;

/// Derive macro for `CatalogModel`.
///
/// Generates the collection binding and the `id()` accessor for a typed
/// view over catalog records.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, CatalogModel)]
/// #[catalog(collection = "courses")]
/// pub struct Course {
///     pub id: String,
///     pub title: String,
/// }
/// ```
///
/// The identifier defaults to a field named `id`; mark another `String`
/// field with `#[catalog(id)]` to use it instead. Without a `collection`
/// attribute the collection is the snake_case struct name plus `s`.
#[proc_macro_derive(CatalogModel, attributes(catalog))]
pub fn derive_catalog_model(input: TokenStream) -> TokenStream {
    catalog_model::derive_catalog_model(input)
}
