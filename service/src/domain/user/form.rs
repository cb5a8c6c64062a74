//! Client-submitted [`Form`] of a [`User`].
//!
//! [`User`]: super::User

use derive_more::{Display, Error};
use itertools::Itertools as _;

use super::{Address, Email, Name, Phone, Profile};

/// Raw [`Profile`] fields as submitted by a client.
#[derive(Clone, Debug, Default)]
pub struct Form {
    /// Raw [`Name`].
    pub name: String,

    /// Raw [`Email`].
    pub email: String,

    /// Raw [`Phone`].
    pub phone: String,

    /// Raw [`Address`].
    pub address: String,
}

impl Form {
    /// Validates this [`Form`] into a [`Profile`].
    ///
    /// # Errors
    ///
    /// With every [`Violation`] found, in the order of the [`Form`] fields.
    pub fn validate(self) -> Result<Profile, InvalidForm> {
        let Self {
            name,
            email,
            phone,
            address,
        } = self;

        let name = Name::new(name);
        let email = Email::new(email);

        match (name, email) {
            (Some(name), Some(email)) => Ok(Profile {
                name,
                email,
                phone: Phone::from(phone),
                address: Address::from(address),
            }),
            (name, email) => Err(InvalidForm(
                [
                    name.is_none().then_some(Violation::EmptyName),
                    email.is_none().then_some(Violation::InvalidEmail),
                ]
                .into_iter()
                .flatten()
                .collect(),
            )),
        }
    }
}

/// Single rule a [`Form`] breaks.
///
/// Displayed as a locale-neutral message key.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Violation {
    /// [`Name`] is empty.
    #[display("Name can't be empty")]
    EmptyName,

    /// [`Email`] is malformed.
    #[display("Invalid email address")]
    InvalidEmail,
}

/// Error of a [`Form`] breaking at least one rule.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Invalid form: {}", _0.iter().join(", "))]
pub struct InvalidForm(#[error(not(source))] pub Vec<Violation>);

impl InvalidForm {
    /// Returns all the [`Violation`]s, in the order of the [`Form`] fields.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}
