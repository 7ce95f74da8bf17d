// src/services.rs

pub mod customer_service;
pub mod dashboard_service;
pub mod installment_service;
pub mod sales_service;
pub mod schedule;
pub mod stock_service;

pub use customer_service::CustomerService;
pub use dashboard_service::DashboardService;
pub use installment_service::InstallmentService;
pub use sales_service::SalesService;
pub use stock_service::StockService;
