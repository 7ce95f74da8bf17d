// src/services/stock_service.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductRepository, StockRepository},
    models::catalog::Product,
    models::stock::{ReservationStatus, StockMovement, StockMovementReason, StockReservation},
};

// Razão de estoque. Cada operação roda como uma transação própria: no
// topo vira BEGIN/COMMIT de verdade, dentro da transação de uma venda
// vira SAVEPOINT, então uma linha que falha desfaz só a si mesma e o
// chamador decide se desfaz a venda inteira.

/// Uma reserva só vira baixa uma vez. Consumida ou liberada, a segunda
/// confirmação esbarra aqui, antes de qualquer débito de estoque.
pub fn ensure_reservation_active(status: ReservationStatus) -> Result<(), AppError> {
    match status {
        ReservationStatus::Committed => Err(AppError::AlreadySettled(
            "Reserva já consumida por uma venda confirmada.".into(),
        )),
        ReservationStatus::Released => Err(AppError::AlreadySettled(
            "Reserva já liberada e não pode mais ser confirmada.".into(),
        )),
        ReservationStatus::Active => Ok(()),
    }
}

#[derive(Clone)]
pub struct StockService {
    product_repo: ProductRepository,
    stock_repo: StockRepository,
}

impl StockService {
    pub fn new(product_repo: ProductRepository, stock_repo: StockRepository) -> Self {
        Self {
            product_repo,
            stock_repo,
        }
    }

    // --- CADASTRO DE PRODUTO ---
    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        name: &str,
        price: Decimal,
        cost_price: Decimal,
        initial_stock: i32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let product = self
            .product_repo
            .create(&mut *tx, name, price, cost_price, initial_stock, size, color)
            .await?;

        if initial_stock > 0 {
            self.stock_repo
                .record_movement(
                    &mut *tx,
                    product.id,
                    None,
                    None,
                    initial_stock,
                    0,
                    StockMovementReason::InitialStock,
                    Some("Cadastro do produto"),
                )
                .await?;
        }

        tx.commit().await?;
        Ok(product)
    }

    // --- RESERVA (MALINHA) ---
    /// Move `quantity` de disponível para reservado. Disponível é
    /// `stock - reserved`, avaliado depois do lock na linha do produto.
    pub async fn reserve<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        sale_id: Option<Uuid>,
        quantity: i32,
    ) -> Result<StockReservation, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Tranca e valida disponibilidade
        let product = self.product_repo.get_for_update(&mut *tx, product_id).await?;
        let available = product.available();
        if available < quantity {
            return Err(AppError::InsufficientStock(format!(
                "Estoque insuficiente para \"{}\": disponível {}, solicitado {}.",
                product.name, available, quantity
            )));
        }

        // 2. Segura as unidades
        self.product_repo
            .apply_stock_delta(&mut *tx, product_id, 0, quantity)
            .await?;

        let reservation = self
            .stock_repo
            .create_reservation(&mut *tx, product_id, sale_id, quantity)
            .await?;

        // 3. Grava histórico
        self.stock_repo
            .record_movement(
                &mut *tx,
                product_id,
                sale_id,
                Some(reservation.id),
                0,
                quantity,
                StockMovementReason::Reservation,
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(reservation)
    }

    // --- LIBERAÇÃO DE RESERVA ---
    /// Devolve as unidades ao disponível. Liberar de novo é no-op;
    /// liberar uma reserva já consumida é erro.
    pub async fn release<'e, E>(
        &self,
        executor: E,
        reservation_id: Uuid,
    ) -> Result<StockReservation, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let reservation = self
            .stock_repo
            .get_reservation_for_update(&mut *tx, reservation_id)
            .await?;

        match reservation.status {
            ReservationStatus::Released => {
                // Já liberada: idempotente, nada a fazer.
                tx.commit().await?;
                return Ok(reservation);
            }
            ReservationStatus::Committed => {
                return Err(AppError::AlreadySettled(
                    "Reserva já consumida por uma venda confirmada e não pode ser liberada.".into(),
                ));
            }
            ReservationStatus::Active => {}
        }

        self.product_repo
            .apply_stock_delta(&mut *tx, reservation.product_id, 0, -reservation.quantity)
            .await?;

        let released = self.stock_repo.mark_released(&mut *tx, reservation_id).await?;

        self.stock_repo
            .record_movement(
                &mut *tx,
                reservation.product_id,
                reservation.sale_id,
                Some(reservation.id),
                0,
                -reservation.quantity,
                StockMovementReason::ReservationRelease,
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(released)
    }

    // --- BAIXA DIRETA (VENDA SEM RESERVA) ---
    pub async fn commit_direct<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        sale_id: Option<Uuid>,
        quantity: i32,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Tranca e valida o estoque físico
        let product = self.product_repo.get_for_update(&mut *tx, product_id).await?;
        if product.stock < quantity {
            return Err(AppError::InsufficientStock(format!(
                "Estoque insuficiente para \"{}\": em estoque {}, solicitado {}.",
                product.name, product.stock, quantity
            )));
        }

        // 2. Baixa direto, sem fase de reserva
        let updated = self
            .product_repo
            .apply_stock_delta(&mut *tx, product_id, -quantity, 0)
            .await?;

        // 3. Grava histórico
        self.stock_repo
            .record_movement(
                &mut *tx,
                product_id,
                sale_id,
                None,
                -quantity,
                0,
                StockMovementReason::SaleCommit,
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- CONSUMO DE RESERVA (CONFIRMAÇÃO DE MALINHA) ---
    /// Converte a reserva em baixa definitiva. A reserva é consumida:
    /// segunda confirmação falha sem debitar de novo.
    pub async fn commit_reservation<'e, E>(
        &self,
        executor: E,
        reservation_id: Uuid,
    ) -> Result<StockReservation, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let reservation = self
            .stock_repo
            .get_reservation_for_update(&mut *tx, reservation_id)
            .await?;
        ensure_reservation_active(reservation.status)?;

        // O estoque físico pode ter sido baixado por vendas diretas no
        // meio tempo; a confirmação revalida antes de debitar.
        let product = self
            .product_repo
            .get_for_update(&mut *tx, reservation.product_id)
            .await?;
        if product.stock < reservation.quantity {
            return Err(AppError::InsufficientStock(format!(
                "Estoque insuficiente para confirmar a reserva de \"{}\": em estoque {}, reservado {}.",
                product.name, product.stock, reservation.quantity
            )));
        }

        self.product_repo
            .apply_stock_delta(
                &mut *tx,
                reservation.product_id,
                -reservation.quantity,
                -reservation.quantity,
            )
            .await?;

        let committed = self.stock_repo.mark_committed(&mut *tx, reservation_id).await?;

        self.stock_repo
            .record_movement(
                &mut *tx,
                reservation.product_id,
                reservation.sale_id,
                Some(reservation.id),
                -reservation.quantity,
                -reservation.quantity,
                StockMovementReason::SaleCommit,
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(committed)
    }

    // --- REPOSIÇÃO (ENTRADA) ---
    pub async fn restock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        quantity: i32,
        notes: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        if quantity <= 0 {
            return Err(AppError::InvalidAmount(
                "Quantidade de reposição deve ser maior que zero.".into(),
            ));
        }

        let mut tx = executor.begin().await?;

        // Lock antes do delta para serializar com as baixas concorrentes.
        self.product_repo.get_for_update(&mut *tx, product_id).await?;

        let updated = self
            .product_repo
            .apply_stock_delta(&mut *tx, product_id, quantity, 0)
            .await?;

        self.stock_repo
            .record_movement(
                &mut *tx,
                product_id,
                None,
                None,
                quantity,
                0,
                StockMovementReason::Restock,
                notes,
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- DEVOLUÇÃO POR CANCELAMENTO ---
    /// Devolve ao estoque uma quantidade já baixada (venda direta cancelada
    /// ou reserva consumida de malinha cancelada). A razão no livro fica
    /// separada da reposição comum.
    pub async fn return_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        sale_id: Option<Uuid>,
        reservation_id: Option<Uuid>,
        quantity: i32,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.product_repo.get_for_update(&mut *tx, product_id).await?;

        let updated = self
            .product_repo
            .apply_stock_delta(&mut *tx, product_id, quantity, 0)
            .await?;

        self.stock_repo
            .record_movement(
                &mut *tx,
                product_id,
                sale_id,
                reservation_id,
                quantity,
                0,
                StockMovementReason::SaleCancel,
                Some("Devolução por cancelamento da venda"),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- ATIVAÇÃO NO CATÁLOGO ---
    /// Liga ou desliga o produto no catálogo. Produto inativo não entra
    /// em venda nova; estoque, reservas e histórico ficam como estão.
    pub async fn set_product_active<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        active: bool,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = self.product_repo.set_active(executor, product_id, active).await?;
        tracing::info!(
            "Produto {} {} no catálogo",
            product.id,
            if active { "reativado" } else { "desativado" }
        );
        Ok(product)
    }

    // ---
    // Consultas (pool principal)
    // ---

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.product_repo.get_all().await
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.product_repo.get_by_id(product_id).await
    }

    pub async fn movements(&self, product_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        // 404 se o produto não existir, em vez de lista vazia enganosa.
        self.product_repo.get_by_id(product_id).await?;
        self.stock_repo.movements_for_product(product_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_reservation_can_be_committed() {
        assert!(ensure_reservation_active(ReservationStatus::Active).is_ok());
    }

    #[test]
    fn committed_reservation_refuses_a_second_commit() {
        // A primeira confirmação consome a reserva e debita o estoque;
        // a segunda falha na trava e nenhum débito extra acontece.
        assert!(matches!(
            ensure_reservation_active(ReservationStatus::Committed),
            Err(AppError::AlreadySettled(_))
        ));
    }

    #[test]
    fn released_reservation_cannot_be_committed() {
        assert!(matches!(
            ensure_reservation_active(ReservationStatus::Released),
            Err(AppError::AlreadySettled(_))
        ));
    }
}
