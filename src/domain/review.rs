use chrono::{DateTime, Utc};

use super::errors::{require_text, DomainError};

#[derive(Debug, Clone)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub name: String,
    pub description: String,
}

impl ReviewDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("name", &self.name, 255)?;
        if self.description.trim().is_empty() {
            return Err(DomainError::invalid_input("description", "may not be blank"));
        }
        Ok(())
    }
}
