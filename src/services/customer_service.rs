// src/services/customer_service.rs

use crate::{common::error::AppError, db::CustomerRepository, models::catalog::Customer};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        name: &str,
        phone: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Customer, AppError> {
        let customer = self.repo.create(name, phone, notes).await?;
        tracing::info!("Cliente {} cadastrado", customer.id);
        Ok(customer)
    }

    pub async fn list(&self) -> Result<Vec<Customer>, AppError> {
        self.repo.get_all().await
    }
}
