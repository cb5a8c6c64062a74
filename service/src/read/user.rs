//! [`User`] read model definition.

use common::query::{self, Conjunction, Entity, Projection, Value};
use strum::{AsRefStr, EnumString, VariantArray};

use crate::domain::{user, User};

/// Column of a [`User`] clients may select and order by.
#[derive(
    AsRefStr, Clone, Copy, Debug, EnumString, Eq, PartialEq, VariantArray,
)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    /// [`user::Id`].
    Id,

    /// [`user::Name`].
    Name,

    /// [`user::Email`].
    Email,

    /// [`user::Phone`].
    Phone,

    /// [`user::Address`].
    Address,

    /// [`user::CreationDateTime`].
    CreatedAt,

    /// [`user::ModificationDateTime`].
    UpdatedAt,
}

impl query::Field for Column {
    const ALL: &'static [Self] = Self::VARIANTS;
}

impl Entity for User {
    type Field = Column;

    const TOMBSTONE: &'static str = "deleted_at";
    const DEFAULT_ORDER: &'static str = "created_at DESC";
}

/// Projected [`User`].
///
/// Only the selected [`Column`]s are present.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct View {
    /// [`user::Id`] of the [`User`].
    pub id: Option<user::Id>,

    /// [`user::Name`] of the [`User`].
    pub name: Option<user::Name>,

    /// [`user::Email`] of the [`User`].
    pub email: Option<user::Email>,

    /// [`user::Phone`] of the [`User`].
    pub phone: Option<user::Phone>,

    /// [`user::Address`] of the [`User`].
    pub address: Option<user::Address>,

    /// [`user::CreationDateTime`] of the [`User`].
    pub created_at: Option<user::CreationDateTime>,

    /// [`user::ModificationDateTime`] of the [`User`].
    pub updated_at: Option<user::ModificationDateTime>,
}

impl View {
    /// Keeps only the provided [`Column`]s of the [`User`].
    #[must_use]
    pub fn project(user: &User, columns: &[Column]) -> Self {
        let mut view = Self::default();
        for column in columns {
            match column {
                Column::Id => view.id = Some(user.id.clone()),
                Column::Name => view.name = Some(user.name.clone()),
                Column::Email => view.email = Some(user.email.clone()),
                Column::Phone => view.phone = Some(user.phone.clone()),
                Column::Address => view.address = Some(user.address.clone()),
                Column::CreatedAt => view.created_at = Some(user.created_at),
                Column::UpdatedAt => view.updated_at = Some(user.updated_at),
            }
        }
        view
    }
}

impl From<User> for View {
    fn from(user: User) -> Self {
        let User {
            id,
            name,
            email,
            phone,
            address,
            created_at,
            updated_at,
            lifecycle: _,
        } = user;

        Self {
            id: Some(id),
            name: Some(name),
            email: Some(email),
            phone: Some(phone),
            address: Some(address),
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }
}

/// Selector of a single live [`User`] by its [`user::Id`].
#[derive(Clone, Debug)]
pub struct ById {
    /// [`user::Id`] of the [`User`] to select.
    pub id: user::Id,

    /// [`Column`]s to select.
    pub projection: Projection<Column>,
}

impl ById {
    /// Creates a new [`ById`] selector out of the raw comma-separated
    /// `select_field` list.
    #[must_use]
    pub fn new(id: user::Id, select_field: Option<&str>) -> Self {
        Self {
            id,
            projection: Projection::sanitize(select_field),
        }
    }

    /// Builds the [`Conjunction`] matching the live [`User`].
    #[must_use]
    pub fn filter(&self) -> Conjunction {
        Conjunction::live::<User>().equals(
            "id",
            "id",
            Value::Text(self.id.to_string()),
        )
    }
}

pub mod list {
    //! [`User`]s list definitions.

    use common::{
        pagination::{self, ParameterError},
        query::{self, Conjunction, OrderBy, Projection},
    };
    use derive_more::{From, Into};

    #[cfg(doc)]
    use crate::domain::user;
    use crate::domain::User;

    use super::View;

    /// [`query::Intent`] of a [`User`]s list.
    pub type Intent = query::Intent<User>;

    /// Page of [`View`]s.
    pub type Page = pagination::Page<View>;

    /// Filter for [`Selector`].
    ///
    /// Every empty field is ignored.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`user::Name`] part to search for.
        pub name: Option<String>,

        /// [`user::Email`] part to search for.
        pub email: Option<String>,

        /// [`user::Phone`] part to search for.
        pub phone: Option<String>,

        /// Earliest [`user::CreationDateTime`], inclusive.
        pub created_at_start: Option<String>,

        /// Latest [`user::CreationDateTime`], inclusive.
        pub created_at_end: Option<String>,
    }

    impl Filter {
        /// Builds the [`Conjunction`] of this [`Filter`].
        #[must_use]
        pub fn conjunction(&self) -> Conjunction {
            Conjunction::live::<User>()
                .contains("name", "name", self.name.as_deref())
                .contains("email", "email", self.email.as_deref())
                .contains("phone", "phone", self.phone.as_deref())
                .not_before(
                    "created_at",
                    "created_at_start",
                    self.created_at_start.as_deref(),
                )
                .not_after(
                    "created_at",
                    "created_at_end",
                    self.created_at_end.as_deref(),
                )
        }
    }

    /// Raw list request, shared by every transport.
    #[derive(Clone, Debug, Default)]
    pub struct Selector {
        /// [`Filter`] of the list.
        pub filter: Filter,

        /// Raw `column direction` order.
        pub order_by: Option<String>,

        /// Raw page number.
        pub page: Option<String>,

        /// Raw number of items per page.
        pub per_page: Option<String>,

        /// Raw comma-separated list of columns to select.
        pub select_field: Option<String>,
    }

    impl Selector {
        /// Shapes this [`Selector`] into an [`Intent`].
        ///
        /// # Errors
        ///
        /// If a pagination token is not an integer.
        pub fn intent(&self) -> Result<Intent, ParameterError> {
            let pagination = pagination::Arguments::parse(
                self.page.as_deref(),
                self.per_page.as_deref(),
            )?;

            Ok(Intent::new(
                self.filter.conjunction(),
                OrderBy::sanitize::<User>(self.order_by.as_deref()),
                Projection::sanitize(self.select_field.as_deref()),
                pagination,
            ))
        }
    }

    /// Total count of [`User`]s matching a [`Filter`].
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i64);
}
