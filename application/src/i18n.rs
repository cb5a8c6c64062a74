//! Localization of rendered messages.

use std::{collections::HashMap, convert::Infallible, fs, io, sync::Arc};

use axum::{async_trait, extract::FromRequestParts};
use derive_more::{Display, Error, From};

/// Translated messages of a single locale, keyed by the original message.
pub type Texts = HashMap<String, String>;

/// Catalog of translated messages.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    /// Locale used when the requested one has no translation.
    main_locale: String,

    /// [`Texts`] of every known locale.
    locales: HashMap<String, Texts>,
}

impl Catalog {
    /// Creates a new [`Catalog`] out of the provided locales.
    #[must_use]
    pub fn new(
        main_locale: impl Into<String>,
        locales: HashMap<String, Texts>,
    ) -> Self {
        Self {
            main_locale: main_locale.into(),
            locales,
        }
    }

    /// Loads a [`Catalog`] from the JSON file at the provided `path`, shaped
    /// as `{"<locale>": {"<message>": "<translation>"}}`.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not a valid catalog.
    pub fn load(
        path: impl AsRef<str>,
        main_locale: impl Into<String>,
    ) -> Result<Self, LoadError> {
        let raw = fs::read(path.as_ref())?;
        Ok(Self::new(main_locale, serde_json::from_slice(&raw)?))
    }

    /// Translates the `message` into the provided `locale`.
    ///
    /// Falls back to the main locale, and then to the `message` itself.
    #[must_use]
    pub fn translate<'m>(
        &'m self,
        locale: Option<&str>,
        message: &'m str,
    ) -> &'m str {
        locale
            .into_iter()
            .flat_map(|l| [Some(l), l.split('-').next()])
            .flatten()
            .chain([self.main_locale.as_str()])
            .find_map(|l| self.locales.get(l)?.get(message))
            .map_or(message, String::as_str)
    }
}

/// Error of loading a [`Catalog`].
#[derive(Debug, Display, Error, From)]
pub enum LoadError {
    /// Catalog file cannot be read.
    #[display("Failed to read catalog: {_0}")]
    Io(io::Error),

    /// Catalog file is malformed.
    #[display("Malformed catalog: {_0}")]
    Json(serde_json::Error),
}

/// Locale requested by the client via the `Accept-Language` header, along
/// with the [`Catalog`] to translate into it.
#[derive(Clone, Debug)]
pub struct Lang {
    /// [`Catalog`] of translated messages.
    catalog: Arc<Catalog>,

    /// First locale tag of the `Accept-Language` header, if any.
    locale: Option<String>,
}

impl Lang {
    /// Resolves the [`Lang`] of the provided HTTP request parts.
    ///
    /// An absent [`Catalog`] extension leaves every message untranslated.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        let locale = parts
            .headers
            .get(http::header::ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.split(',').next())
            .and_then(|tag| tag.split(';').next())
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(ToOwned::to_owned);

        Self {
            catalog: parts
                .extensions
                .get::<Arc<Catalog>>()
                .cloned()
                .unwrap_or_default(),
            locale,
        }
    }

    /// Returns the requested locale, if any.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Translates the `message` into the requested locale.
    #[must_use]
    pub fn translate(&self, message: &str) -> String {
        self.catalog.translate(self.locale(), message).to_owned()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Lang
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod spec {
    use std::{collections::HashMap, sync::Arc};

    use super::{Catalog, Lang};

    fn catalog() -> Catalog {
        serde_json::from_str::<HashMap<_, _>>(
            r#"{
                "en": {"OK": "OK", "Name can't be empty": "Name is required"},
                "id": {"OK": "Oke"}
            }"#,
        )
        .map(|locales| Catalog::new("en", locales))
        .unwrap()
    }

    fn lang(header: Option<&str>) -> Lang {
        let mut req = http::Request::builder();
        if let Some(h) = header {
            req = req.header(http::header::ACCEPT_LANGUAGE, h);
        }
        let (mut parts, ()) = req.body(()).unwrap().into_parts();
        drop(parts.extensions.insert(Arc::new(catalog())));
        Lang::from_parts(&parts)
    }

    #[test]
    fn translates_requested_locale() {
        assert_eq!(catalog().translate(Some("id"), "OK"), "Oke");
    }

    #[test]
    fn falls_back_to_main_locale() {
        assert_eq!(
            catalog().translate(Some("id"), "Name can't be empty"),
            "Name is required",
        );
        assert_eq!(
            catalog().translate(Some("fr"), "Name can't be empty"),
            "Name is required",
        );
    }

    #[test]
    fn falls_back_to_message() {
        assert_eq!(
            catalog().translate(Some("id"), "Invalid email address"),
            "Invalid email address",
        );
        assert_eq!(Catalog::default().translate(None, "OK"), "OK");
    }

    #[test]
    fn takes_first_accepted_tag() {
        let lang = lang(Some("id-ID,id;q=0.9,en;q=0.8"));

        assert_eq!(lang.locale(), Some("id-ID"));
        assert_eq!(lang.translate("OK"), "Oke");
    }

    #[test]
    fn ignores_missing_header() {
        let lang = lang(None);

        assert_eq!(lang.locale(), None);
        assert_eq!(lang.translate("OK"), "OK");
    }

    #[test]
    fn loads_shipped_catalog() {
        let catalog = Catalog::load(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../lang.json"),
            "en",
        )
        .unwrap();

        assert_eq!(
            catalog.translate(Some("id"), "User not found"),
            "Pengguna tidak ditemukan",
        );
        assert_eq!(catalog.translate(Some("en"), "OK"), "OK");
    }

    #[test]
    fn fails_on_missing_catalog() {
        assert!(Catalog::load("definitely/missing.json", "en").is_err());
    }
}
