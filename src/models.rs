// src/models.rs

pub mod catalog;
pub mod dashboard;
pub mod installments;
pub mod sales;
pub mod stock;
