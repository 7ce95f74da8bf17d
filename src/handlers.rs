// src/handlers.rs

pub mod customers;
pub mod dashboard;
pub mod installments;
pub mod products;
pub mod sales;
