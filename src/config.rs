// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        CustomerRepository, DashboardRepository, InstallmentRepository, ProductRepository,
        SalesRepository, StockRepository,
    },
    services::{
        CustomerService, DashboardService, InstallmentService, SalesService, StockService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub stock_service: StockService,
    pub customer_service: CustomerService,
    pub sales_service: SalesService,
    pub installment_service: InstallmentService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let product_repo = ProductRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let sales_repo = SalesRepository::new(db_pool.clone());
        let installment_repo = InstallmentRepository::new(db_pool.clone());
        let stock_repo = StockRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let stock_service = StockService::new(product_repo.clone(), stock_repo.clone());
        let customer_service = CustomerService::new(customer_repo.clone());
        let installment_service =
            InstallmentService::new(sales_repo.clone(), installment_repo.clone());
        let sales_service = SalesService::new(
            sales_repo,
            customer_repo,
            product_repo,
            installment_repo,
            stock_repo,
            stock_service.clone(),
        );
        let dashboard_service = DashboardService::new(dashboard_repo);

        Ok(Self {
            db_pool,
            stock_service,
            customer_service,
            sales_service,
            installment_service,
            dashboard_service,
        })
    }
}
