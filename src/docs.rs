// src/docs.rs

use crate::handlers;
use crate::models;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Products ---
        handlers::products::create_product,
        handlers::products::get_all_products,
        handlers::products::get_product,
        handlers::products::restock_product,
        handlers::products::set_product_active,
        handlers::products::get_product_movements,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::get_all_customers,

        // --- Sales ---
        handlers::sales::create_sale,
        handlers::sales::get_all_sales,
        handlers::sales::get_sale,
        handlers::sales::confirm_sale,
        handlers::sales::cancel_sale,

        // --- Installments ---
        handlers::installments::create_schedule,
        handlers::installments::get_details,
        handlers::installments::apply_payment,
        handlers::installments::edit_payment,
        handlers::installments::delete_payment,
        handlers::installments::pay_full,
        handlers::installments::get_upcoming,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Catálogo ---
            models::catalog::Product,
            models::catalog::Customer,

            // --- Estoque ---
            models::stock::ReservationStatus,
            models::stock::StockMovementReason,
            models::stock::StockReservation,
            models::stock::StockMovement,

            // --- Vendas ---
            models::sales::SaleStatus,
            models::sales::SaleType,
            models::sales::SaleLineItem,
            models::sales::NewSaleLine,
            models::sales::Sale,
            models::sales::SaleSummary,
            models::sales::SaleDetail,

            // --- Parcelas ---
            models::installments::InstallmentStatus,
            models::installments::InstallmentDisplayStatus,
            models::installments::Installment,
            models::installments::InstallmentPayment,
            models::installments::InstallmentDetail,
            models::installments::PaymentOutcome,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::UpcomingInstallment,
            models::dashboard::UpcomingInstallments,

            // --- Payloads ---
            handlers::products::CreateProductPayload,
            handlers::products::RestockPayload,
            handlers::products::SetActivePayload,
            handlers::customers::CreateCustomerPayload,
            handlers::sales::CreateSalePayload,
            handlers::installments::CreateSchedulePayload,
            handlers::installments::PaymentPayload,
            handlers::installments::EditPaymentPayload,
        )
    ),
    tags(
        (name = "Products", description = "Catálogo, estoque e movimentações"),
        (name = "Customers", description = "Clientes da loja"),
        (name = "Sales", description = "Vendas diretas e malinhas"),
        (name = "Installments", description = "Carnê, pagamentos e cobrança"),
        (name = "Dashboard", description = "Indicadores do dia")
    )
)]
pub struct ApiDoc;
