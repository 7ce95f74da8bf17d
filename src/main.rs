//src/main.rs

use axum::{
    Router,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::products::create_product).get(handlers::products::get_all_products),
        )
        .route("/{id}", get(handlers::products::get_product))
        .route("/{id}/restock", post(handlers::products::restock_product))
        .route("/{id}/active", put(handlers::products::set_product_active))
        .route("/{id}/movements", get(handlers::products::get_product_movements));

    let customer_routes = Router::new().route(
        "/",
        post(handlers::customers::create_customer).get(handlers::customers::get_all_customers),
    );

    let sales_routes = Router::new()
        .route(
            "/",
            post(handlers::sales::create_sale).get(handlers::sales::get_all_sales),
        )
        .route("/{id}", get(handlers::sales::get_sale))
        .route("/{id}/confirm", post(handlers::sales::confirm_sale))
        .route("/{id}/cancel", post(handlers::sales::cancel_sale));

    let installment_routes = Router::new()
        .route("/create", post(handlers::installments::create_schedule))
        .route("/upcoming", get(handlers::installments::get_upcoming))
        .route("/{id}/details", get(handlers::installments::get_details))
        .route("/{id}/payment", post(handlers::installments::apply_payment))
        .route("/{id}/pay-full", put(handlers::installments::pay_full))
        .route(
            "/payments/{id}",
            put(handlers::installments::edit_payment)
                .delete(handlers::installments::delete_payment),
        );

    let dashboard_routes =
        Router::new().route("/summary", get(handlers::dashboard::get_summary));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/products", product_routes)
        .nest("/api/customers", customer_routes)
        .nest("/api/sales", sales_routes)
        .nest("/api/installments", installment_routes)
        .nest("/api/dashboard", dashboard_routes)
        .with_state(app_state);

    // Inicia o servidor
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
