// src/services/sales_service.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, money},
    db::{
        CustomerRepository, InstallmentRepository, ProductRepository, SalesRepository,
        StockRepository,
    },
    models::catalog::Product,
    models::installments::InstallmentStatus,
    models::sales::{NewSaleLine, Sale, SaleLineItem, SaleStatus, SaleSummary, SaleType},
    services::installment_service::derive_sale_status,
    services::stock_service::StockService,
};

// Ciclo de vida da venda: criação (com baixa ou reserva de estoque),
// confirmação (consome as reservas da malinha) e cancelamento (devolve
// tudo e anula as parcelas em aberto).

/// Produto fora de linha não entra em venda nova. Vendas em andamento
/// seguem o fluxo normal: confirmação, cancelamento e devolução de
/// estoque não passam por esta checagem.
pub fn ensure_sellable(product: &Product) -> Result<(), AppError> {
    if !product.active {
        return Err(AppError::AlreadySettled(format!(
            "Produto \"{}\" está inativo e não pode ser vendido.",
            product.name
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SalesService {
    sales_repo: SalesRepository,
    customer_repo: CustomerRepository,
    product_repo: ProductRepository,
    installment_repo: InstallmentRepository,
    stock_repo: StockRepository,
    stock_service: StockService,
}

impl SalesService {
    pub fn new(
        sales_repo: SalesRepository,
        customer_repo: CustomerRepository,
        product_repo: ProductRepository,
        installment_repo: InstallmentRepository,
        stock_repo: StockRepository,
        stock_service: StockService,
    ) -> Self {
        Self {
            sales_repo,
            customer_repo,
            product_repo,
            installment_repo,
            stock_repo,
            stock_service,
        }
    }

    // --- CRIAÇÃO ---
    /// Cria a venda e mexe no estoque linha a linha, tudo na mesma
    /// transação: venda direta baixa o estoque na hora, malinha só
    /// reserva. Qualquer linha sem saldo desfaz a venda inteira.
    pub async fn create_sale<'e, E>(
        &self,
        executor: E,
        customer_id: Option<Uuid>,
        sale_type: SaleType,
        lines: &[NewSaleLine],
        payment_method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        if lines.is_empty() {
            return Err(AppError::InvalidAmount(
                "Venda precisa de ao menos um item.".into(),
            ));
        }
        for line in lines {
            if line.quantity <= 0 {
                return Err(AppError::InvalidAmount(
                    "Quantidade do item deve ser maior que zero.".into(),
                ));
            }
            if matches!(line.unit_price, Some(p) if p < Decimal::ZERO) {
                return Err(AppError::InvalidAmount(
                    "Preço unitário não pode ser negativo.".into(),
                ));
            }
        }

        let mut tx = executor.begin().await?;

        // 1. Cliente (opcional) precisa existir
        if let Some(customer_id) = customer_id {
            if !self.customer_repo.exists(&mut *tx, customer_id).await? {
                return Err(AppError::ResourceNotFound("Cliente não encontrado.".into()));
            }
        }

        // 2. Congela os itens: nome, custo e preço saem do cadastro atual
        let mut items = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for line in lines {
            let product = self.product_repo.get(&mut *tx, line.product_id).await?;
            ensure_sellable(&product)?;
            let unit_price = money::normalize(line.unit_price.unwrap_or(product.price));
            let item = SaleLineItem {
                product_id: product.id,
                name: product.name,
                quantity: line.quantity,
                unit_price,
                cost_price_at_time: product.cost_price,
                size: product.size,
                color: product.color,
            };
            total += item.line_total();
            items.push(item);
        }

        // 3. Grava a venda antes do estoque: os lançamentos do livro
        //    referenciam o id dela
        let sale = self
            .sales_repo
            .create(&mut *tx, customer_id, sale_type, &items, total, payment_method, notes)
            .await?;

        // 4. Estoque, sempre em ordem crescente de produto para não
        //    cruzar locks com outra venda andando ao contrário
        let mut ordered: Vec<&SaleLineItem> = items.iter().collect();
        ordered.sort_by_key(|item| item.product_id);
        for item in ordered {
            match sale_type {
                SaleType::Direct => {
                    self.stock_service
                        .commit_direct(&mut *tx, item.product_id, Some(sale.id), item.quantity)
                        .await?;
                }
                SaleType::Malinha => {
                    self.stock_service
                        .reserve(&mut *tx, item.product_id, Some(sale.id), item.quantity)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        tracing::info!(
            "Venda {} criada: {:?}, {} item(ns), total R$ {}",
            sale.id,
            sale_type,
            items.len(),
            total
        );
        Ok(sale)
    }

    // --- CONFIRMAÇÃO ---
    /// PENDING -> CONFIRMED. Malinha consome as reservas ativas; venda
    /// direta já baixou o estoque na criação e só muda de estado.
    pub async fn confirm_sale<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sale = self.sales_repo.get_for_update(&mut *tx, sale_id).await?;
        match sale.status {
            SaleStatus::Pending => {}
            SaleStatus::Cancelled => {
                return Err(AppError::AlreadySettled(
                    "Venda cancelada não pode ser confirmada.".into(),
                ));
            }
            _ => {
                return Err(AppError::AlreadySettled(
                    "Só vendas pendentes podem ser confirmadas.".into(),
                ));
            }
        }

        if sale.sale_type == SaleType::Malinha {
            let reservations = self
                .stock_repo
                .active_reservations_for_sale(&mut *tx, sale_id)
                .await?;
            for reservation in reservations {
                self.stock_service
                    .commit_reservation(&mut *tx, reservation.id)
                    .await?;
            }
        }

        let mut updated = self
            .sales_repo
            .update_status(&mut *tx, sale_id, SaleStatus::Confirmed)
            .await?;

        // Carnê criado (e até pago) enquanto a malinha estava na casa da
        // cliente: o status recomputado pode pular direto para PARTIAL/PAID.
        if self.installment_repo.has_billable(&mut *tx, sale_id).await? {
            let installments = self.installment_repo.list_for_sale(&mut *tx, sale_id).await?;
            let mut remaining = Decimal::ZERO;
            let mut total_paid = Decimal::ZERO;
            for installment in installments
                .iter()
                .filter(|i| i.status != InstallmentStatus::Cancelled)
            {
                remaining += installment.remaining();
                total_paid += installment.amount_paid;
            }
            let status = derive_sale_status(SaleStatus::Confirmed, remaining, total_paid);
            if status != SaleStatus::Confirmed {
                updated = self.sales_repo.update_status(&mut *tx, sale_id, status).await?;
            }
        }

        tx.commit().await?;
        tracing::info!("Venda {} confirmada", sale_id);
        Ok(updated)
    }

    // --- CANCELAMENTO ---
    /// Devolve o estoque (reservas ativas e quantidades já baixadas),
    /// anula as parcelas em aberto e marca a venda como cancelada.
    /// Parcelas quitadas ficam como estão, o reembolso é conversa de
    /// balcão, não do sistema.
    pub async fn cancel_sale<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sale = self.sales_repo.get_for_update(&mut *tx, sale_id).await?;
        match sale.status {
            SaleStatus::Paid => {
                return Err(AppError::AlreadySettled(
                    "Venda quitada não pode ser cancelada.".into(),
                ));
            }
            SaleStatus::Cancelled => {
                return Err(AppError::AlreadySettled("Venda já cancelada.".into()));
            }
            SaleStatus::Pending | SaleStatus::Confirmed | SaleStatus::Partial => {}
        }

        // 1. Reservas ainda ativas voltam para o disponível
        let active = self
            .stock_repo
            .active_reservations_for_sale(&mut *tx, sale_id)
            .await?;
        for reservation in active {
            self.stock_service.release(&mut *tx, reservation.id).await?;
        }

        // 2. Estoque já baixado volta para a prateleira
        match sale.sale_type {
            SaleType::Direct => {
                let mut ordered: Vec<&SaleLineItem> = sale.items.0.iter().collect();
                ordered.sort_by_key(|item| item.product_id);
                for item in ordered {
                    self.stock_service
                        .return_stock(&mut *tx, item.product_id, Some(sale_id), None, item.quantity)
                        .await?;
                }
            }
            SaleType::Malinha => {
                let committed = self
                    .stock_repo
                    .committed_reservations_for_sale(&mut *tx, sale_id)
                    .await?;
                for reservation in committed {
                    self.stock_service
                        .return_stock(
                            &mut *tx,
                            reservation.product_id,
                            Some(sale_id),
                            Some(reservation.id),
                            reservation.quantity,
                        )
                        .await?;
                }
            }
        }

        // 3. Parcelas em aberto são anuladas; quitadas permanecem
        let voided = self
            .installment_repo
            .cancel_open_for_sale(&mut *tx, sale_id)
            .await?;

        let updated = self
            .sales_repo
            .update_status(&mut *tx, sale_id, SaleStatus::Cancelled)
            .await?;

        tx.commit().await?;
        tracing::info!("Venda {} cancelada ({} parcela(s) anulada(s))", sale_id, voided);
        Ok(updated)
    }

    // --- CONSULTAS ---

    pub async fn list(&self) -> Result<Vec<SaleSummary>, AppError> {
        self.sales_repo.get_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Saia Jeans".into(),
            price: Decimal::new(9990, 2),
            cost_price: Decimal::new(4200, 2),
            stock: 5,
            reserved: 0,
            size: Some("M".into()),
            color: None,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn active_product_can_be_sold() {
        assert!(ensure_sellable(&product(true)).is_ok());
    }

    #[test]
    fn inactive_product_is_refused_at_sale_creation() {
        // Desativado no catálogo: nem venda direta, nem malinha.
        assert!(matches!(
            ensure_sellable(&product(false)),
            Err(AppError::AlreadySettled(_))
        ));
    }
}
