use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::{Details, ServiceError};
use crate::users::repo_types::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// `{"data": ...}` envelope used by every request and response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: Option<T>,
}

impl<T> Data<T> {
    pub fn of(data: T) -> Self {
        Self { data: Some(data) }
    }

    /// Unwraps the payload, rejecting an empty envelope.
    pub fn require(self) -> Result<T, ServiceError> {
        self.data
            .ok_or_else(|| ServiceError::bad_param("data", "Data must be present"))
    }
}

/// Body for create (`POST`) and full replace (`PUT`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<Date>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// A create request that passed field validation.
#[derive(Debug, Clone)]
pub struct ValidUserFields {
    email: String,
    first_name: String,
    last_name: String,
    birth_date: Date,
    address: Option<String>,
    phone: Option<String>,
}

impl CreateUserRequest {
    /// Checks every field and reports all violations together.
    pub fn validate(self) -> Result<ValidUserFields, ServiceError> {
        let mut details = Details::new();
        match self.email.as_deref() {
            None => {
                details.insert("data.email".into(), "Email must be present".into());
            }
            Some(email) if !is_valid_email(email) => {
                details.insert("data.email".into(), "Invalid email format".into());
            }
            Some(_) => {}
        }
        if is_blank(self.first_name.as_deref()) {
            details.insert(
                "data.firstName".into(),
                "First name must be present and contains at least 1 symbol".into(),
            );
        }
        if is_blank(self.last_name.as_deref()) {
            details.insert(
                "data.lastName".into(),
                "Last name must be present and contains at least 1 symbol".into(),
            );
        }
        if self.birth_date.is_none() {
            details.insert("data.birthDate".into(), "Birth date must be present".into());
        }

        match (self.email, self.first_name, self.last_name, self.birth_date) {
            (Some(email), Some(first_name), Some(last_name), Some(birth_date))
                if details.is_empty() =>
            {
                Ok(ValidUserFields {
                    email,
                    first_name,
                    last_name,
                    birth_date,
                    address: self.address,
                    phone: self.phone,
                })
            }
            _ => Err(ServiceError::bad_request(details)),
        }
    }
}

impl ValidUserFields {
    pub fn into_user(self) -> User {
        User {
            id: None,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            address: self.address,
            phone: self.phone,
        }
    }

    /// Overwrites every field of `target` except its id.
    pub fn apply_to(self, target: &mut User) {
        target.email = self.email;
        target.first_name = self.first_name;
        target.last_name = self.last_name;
        target.birth_date = self.birth_date;
        target.address = self.address;
        target.phone = self.phone;
    }
}

/// Body for `PATCH /users/:id/contacts`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContactsRequest {
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl UserContactsRequest {
    pub fn validate(self) -> Result<Self, ServiceError> {
        match self.email.as_deref() {
            Some(email) if !is_valid_email(email) => {
                Err(ServiceError::bad_param("data.email", "Invalid email format"))
            }
            _ => Ok(self),
        }
    }

    pub fn apply_to(self, target: &mut User) {
        if let Some(email) = self.email {
            target.email = email;
        }
        if let Some(address) = self.address {
            target.address = Some(address);
        }
        if let Some(phone) = self.phone {
            target.phone = Some(phone);
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.unwrap_or_default(),
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            birth_date: u.birth_date,
            address: u.address,
            phone: u.phone,
        }
    }
}

/// Raw `?from=&to=` query; dates are parsed by the handler so format errors
/// can be reported per parameter.
#[derive(Debug, Default, Deserialize)]
pub struct BirthDateRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}
