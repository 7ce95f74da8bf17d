// src/db.rs

pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod installment_repo;
pub use installment_repo::InstallmentRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
