use crate::domain::customer::{Customer, ProfileUpdate};
use crate::domain::errors::DomainError;
use crate::domain::ports::UnitOfWork;

/// The signed-in customer's own profile.
pub struct CustomerService<U> {
    uow: U,
}

impl<U: UnitOfWork> CustomerService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    pub fn get_profile(&self, user_id: i64) -> Result<Customer, DomainError> {
        self.uow.atomically(|tx| {
            tx.find_customer_by_user(user_id)?
                .ok_or(DomainError::NotFound("customer"))
        })
    }

    /// Replaces the editable fields. Membership is not among them.
    pub fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<Customer, DomainError> {
        update.validate()?;
        self.uow.atomically(|tx| {
            let customer = tx
                .find_customer_by_user(user_id)?
                .ok_or(DomainError::NotFound("customer"))?;
            tx.update_customer(customer.id, &update)?
                .ok_or(DomainError::NotFound("customer"))
        })
    }
}
