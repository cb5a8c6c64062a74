//! [`User`] definitions.

pub mod form;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use uuid::Uuid;

pub use self::form::{Form, InvalidForm, Violation};

/// Platform user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`Phone`] of this [`User`].
    pub phone: Phone,

    /// [`Address`] of this [`User`].
    pub address: Address,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was modified last time.
    pub updated_at: ModificationDateTime,

    /// [`Lifecycle`] of this [`User`].
    pub lifecycle: Lifecycle,
}

impl User {
    /// Creates a new live [`User`] with the provided [`Profile`], created at
    /// the provided [`DateTime`].
    #[must_use]
    pub fn new(id: Id, profile: Profile, at: CreationDateTime) -> Self {
        let Profile {
            name,
            email,
            phone,
            address,
        } = profile;

        Self {
            id,
            name,
            email,
            phone,
            address,
            created_at: at,
            updated_at: at.coerce(),
            lifecycle: Lifecycle::Live,
        }
    }
}

/// Client-editable part of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    /// [`Name`] of a [`User`].
    pub name: Name,

    /// [`Email`] of a [`User`].
    pub email: Email,

    /// [`Phone`] of a [`User`].
    pub phone: Phone,

    /// [`Address`] of a [`User`].
    pub address: Address,
}

/// Overwrite of a [`User`]'s [`Profile`].
#[derive(Clone, Debug)]
pub struct Edit {
    /// ID of the [`User`] to edit.
    pub id: Id,

    /// New [`Profile`] of the [`User`].
    pub profile: Profile,

    /// [`DateTime`] of this [`Edit`].
    pub at: ModificationDateTime,
}

/// Tombstoning of a [`User`].
#[derive(Clone, Debug)]
pub struct Tombstone {
    /// ID of the [`User`] to tombstone.
    pub id: Id,

    /// [`DateTime`] of this [`Tombstone`].
    pub at: DeletionDateTime,
}

/// Lifecycle state of a [`User`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lifecycle {
    /// [`User`] is visible to every read.
    Live,

    /// [`User`] is soft-deleted and invisible to reads.
    Tombstoned(DeletionDateTime),
}

impl Lifecycle {
    /// Returns the [`DateTime`] when the [`User`] was deleted, if it was.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DeletionDateTime> {
        match self {
            Self::Live => None,
            Self::Tombstoned(at) => Some(*at),
        }
    }
}

impl From<Option<DeletionDateTime>> for Lifecycle {
    fn from(deleted_at: Option<DeletionDateTime>) -> Self {
        deleted_at.map_or(Self::Live, Self::Tombstoned)
    }
}

/// ID of a [`User`].
///
/// Opaque to clients, which may only provide it on creation.
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq,
)]
#[as_ref(str)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(String);

impl Id {
    /// Generates a new globally unique [`Id`].
    #[expect(clippy::new_without_default, reason = "not a default value")]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (!name.is_empty()).then_some(Self(name))
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

/// Phone number of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

/// Postal address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(&str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Address(String);

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was modified.
pub type ModificationDateTime = DateTimeOf<(User, unit::Modification)>;

/// [`DateTime`] when a [`User`] was deleted.
pub type DeletionDateTime = DateTimeOf<(User, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Email, Id, Lifecycle, Name};

    #[test]
    fn generates_distinct_ids() {
        let (a, b) = (Id::new(), Id::new());

        assert_ne!(a, b);
        assert_eq!(a.as_ref().len(), 36);
    }

    #[test]
    fn rejects_empty_name() {
        assert!(Name::new("").is_none());
        assert!(Name::new("Tom").is_some());
    }

    #[test]
    fn checks_email_format() {
        for valid in ["tom@example.com", "t.o.m+tag@mail.example.org"] {
            assert!(Email::new(valid).is_some(), "valid email: {valid}");
        }
        for invalid in ["", "tom", "tom@", "@example.com", "tom @example.com"]
        {
            assert!(Email::new(invalid).is_none(), "invalid email: {invalid}");
        }
    }

    #[test]
    fn lifecycle_tracks_deletion() {
        let at = DateTime::now().coerce();

        assert_eq!(Lifecycle::from(None), Lifecycle::Live);
        assert_eq!(Lifecycle::from(Some(at)), Lifecycle::Tombstoned(at));
        assert_eq!(Lifecycle::Tombstoned(at).deleted_at(), Some(at));
        assert_eq!(Lifecycle::Live.deleted_at(), None);
    }
}
