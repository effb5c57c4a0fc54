use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::errors::{require_text, DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Bronze,
    Silver,
    Gold,
}

impl Membership {
    pub fn code(self) -> &'static str {
        match self {
            Membership::Bronze => "B",
            Membership::Silver => "S",
            Membership::Gold => "G",
        }
    }
}

impl FromStr for Membership {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" => Ok(Membership::Bronze),
            "S" => Ok(Membership::Silver),
            "G" => Ok(Membership::Gold),
            other => Err(DomainError::invalid_input(
                "membership",
                format!("unknown membership code '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: Membership,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Details a customer may change on their own profile.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("first_name", &self.first_name, 255)?;
        require_text("last_name", &self.last_name, 255)?;
        if self.phone.trim().is_empty() {
            return Err(DomainError::invalid_input("phone", "may not be blank"));
        }
        Ok(())
    }
}
