// src/services/installment_service.rs

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::{error::AppError, money},
    db::{InstallmentRepository, SalesRepository},
    models::dashboard::{UpcomingInstallment, UpcomingInstallments},
    models::installments::{Installment, InstallmentDetail, InstallmentStatus, PaymentOutcome},
    models::sales::{Sale, SaleDetail, SaleStatus},
    services::schedule,
};

// Motor de pagamentos do carnê. A regra central: status nunca é ajustado
// incrementalmente; toda mutação recarrega o histórico completo e deriva
// parcela e venda do zero, segurando o lock da venda do início ao fim.

/// Deriva o status persistido da parcela a partir do total pago.
/// Parcelas anuladas ficam anuladas; pagamento a mais ainda é "quitada".
pub fn derive_installment_status(
    amount_due: Decimal,
    amount_paid: Decimal,
    current: InstallmentStatus,
) -> InstallmentStatus {
    if current == InstallmentStatus::Cancelled {
        return InstallmentStatus::Cancelled;
    }
    if money::is_settled(amount_paid, amount_due) {
        InstallmentStatus::Paid
    } else if amount_paid > Decimal::ZERO {
        InstallmentStatus::Partial
    } else {
        InstallmentStatus::Pending
    }
}

/// Deriva o status da venda a partir do agregado das parcelas.
/// PENDING e CANCELLED são estados de ciclo de vida, não de pagamento:
/// a recomputação nunca mexe neles.
pub fn derive_sale_status(
    current: SaleStatus,
    remaining: Decimal,
    total_paid: Decimal,
) -> SaleStatus {
    match current {
        SaleStatus::Pending | SaleStatus::Cancelled => current,
        SaleStatus::Confirmed | SaleStatus::Partial | SaleStatus::Paid => {
            if remaining <= money::settlement_epsilon() {
                SaleStatus::Paid
            } else if total_paid > Decimal::ZERO {
                SaleStatus::Partial
            } else {
                SaleStatus::Confirmed
            }
        }
    }
}

/// Venda cancelada é terminal: nenhum pagamento entra, sai ou muda.
/// Parcelas quitadas sobrevivem ao cancelamento, e mexer nos pagamentos
/// delas reabriria a cobrança de uma venda morta.
pub fn ensure_sale_accepts_payments(status: SaleStatus) -> Result<(), AppError> {
    if status == SaleStatus::Cancelled {
        return Err(AppError::AlreadySettled(
            "Venda cancelada não aceita movimentação de pagamentos.".into(),
        ));
    }
    Ok(())
}

/// Valor do pagamento sintético da quitação total: qualquer saldo devedor
/// positivo, inclusive o resíduo de uma parcela já dada como quitada pelo
/// epsilon. Parcelas anuladas e saldos zerados (ou negativos, no caso de
/// pagamento a mais) não geram lançamento.
pub fn settlement_amount(installment: &Installment) -> Option<Decimal> {
    if installment.status == InstallmentStatus::Cancelled {
        return None;
    }
    let remaining = installment.remaining();
    (remaining > Decimal::ZERO).then_some(remaining)
}

/// Separa as parcelas do widget de cobrança em atrasadas, vencendo hoje
/// e vencendo na próxima semana, com o total devedor de cada grupo.
pub fn group_upcoming(rows: Vec<UpcomingInstallment>, today: NaiveDate) -> UpcomingInstallments {
    let week_end = today + Days::new(7);

    let mut grouped = UpcomingInstallments {
        overdue: Vec::new(),
        due_today: Vec::new(),
        due_this_week: Vec::new(),
        overdue_total: Decimal::ZERO,
        due_today_total: Decimal::ZERO,
        due_this_week_total: Decimal::ZERO,
    };

    for row in rows {
        if row.due_date < today {
            grouped.overdue_total += row.remaining_amount;
            grouped.overdue.push(row);
        } else if row.due_date == today {
            grouped.due_today_total += row.remaining_amount;
            grouped.due_today.push(row);
        } else if row.due_date <= week_end {
            grouped.due_this_week_total += row.remaining_amount;
            grouped.due_this_week.push(row);
        }
    }

    grouped
}

#[derive(Clone)]
pub struct InstallmentService {
    sales_repo: SalesRepository,
    installment_repo: InstallmentRepository,
}

impl InstallmentService {
    pub fn new(sales_repo: SalesRepository, installment_repo: InstallmentRepository) -> Self {
        Self {
            sales_repo,
            installment_repo,
        }
    }

    // --- CRIAÇÃO DO CARNÊ ---
    pub async fn create_schedule<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        num_installments: i32,
        entry_payment: Decimal,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<Installment>, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        if entry_payment < Decimal::ZERO {
            return Err(AppError::InvalidSchedule(
                "Entrada não pode ser negativa.".into(),
            ));
        }

        let mut tx = executor.begin().await?;

        // 1. Tranca a venda e valida o estado
        let sale = self.sales_repo.get_for_update(&mut *tx, sale_id).await?;
        match sale.status {
            SaleStatus::Cancelled => {
                return Err(AppError::AlreadySettled(
                    "Venda cancelada não pode ser parcelada.".into(),
                ));
            }
            SaleStatus::Paid => {
                return Err(AppError::AlreadySettled("Venda já quitada.".into()));
            }
            _ => {}
        }

        if self.installment_repo.has_billable(&mut *tx, sale_id).await? {
            return Err(AppError::InvalidSchedule(
                "Venda já possui um parcelamento ativo.".into(),
            ));
        }

        // 2. Gera e persiste o plano
        let start = start_date.unwrap_or_else(|| sale.created_at.date_naive());
        let entries = schedule::generate(sale.total_value, entry_payment, num_installments, start)?;

        let mut installments = Vec::with_capacity(entries.len());
        for entry in entries {
            let row = self
                .installment_repo
                .insert(&mut *tx, sale_id, entry.sequence, entry.due_date, entry.amount_due)
                .await?;
            installments.push(row);
        }

        tx.commit().await?;
        tracing::info!(
            "Carnê criado para a venda {}: {} parcela(s)",
            sale_id,
            installments.len()
        );
        Ok(installments)
    }

    // --- APLICAÇÃO DE PAGAMENTO ---
    pub async fn apply_payment<'e, E>(
        &self,
        executor: E,
        installment_id: Uuid,
        amount: Decimal,
        payment_date: Option<NaiveDate>,
        method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<PaymentOutcome, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        // Rejeitado antes de qualquer escrita.
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(
                "Valor do pagamento deve ser maior que zero.".into(),
            ));
        }

        let mut tx = executor.begin().await?;

        // 1. Descobre a venda e tranca na ordem global: venda, depois parcela
        let peek = self.installment_repo.get(&mut *tx, installment_id).await?;
        let sale = self.sales_repo.get_for_update(&mut *tx, peek.sale_id).await?;
        ensure_sale_accepts_payments(sale.status)?;
        let installment = self
            .installment_repo
            .get_for_update(&mut *tx, installment_id)
            .await?;

        match installment.status {
            InstallmentStatus::Paid => {
                return Err(AppError::AlreadySettled("Parcela já quitada.".into()));
            }
            InstallmentStatus::Cancelled => {
                return Err(AppError::AlreadySettled(
                    "Parcela cancelada não aceita pagamentos.".into(),
                ));
            }
            _ => {}
        }

        // 2. Registra o pagamento
        let date = payment_date.unwrap_or_else(|| Utc::now().date_naive());
        let payment = self
            .installment_repo
            .insert_payment(&mut *tx, installment_id, amount, date, method, notes)
            .await?;

        // 3. Recomputa parcela e venda a partir do histórico completo
        let (updated, warning) = self.recompute_installment(&mut tx, &installment).await?;
        let (sale_status, sale_remaining) = self.recompute_sale(&mut tx, &sale).await?;

        tx.commit().await?;
        Ok(PaymentOutcome {
            payment: Some(payment),
            installment: updated,
            sale_status,
            sale_remaining_amount: sale_remaining,
            warning,
        })
    }

    // --- QUITAÇÃO TOTAL ---
    /// Sintetiza um pagamento para cada saldo devedor positivo, tudo ou
    /// nada, segurando o lock da venda até o fim. Parcelas já quitadas
    /// pelo epsilon entram na varredura: o resíduo de centavos delas é o
    /// que impediria o agregado da venda de zerar.
    pub async fn pay_full<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<SaleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let sale = self.sales_repo.get_for_update(&mut *tx, sale_id).await?;
        match sale.status {
            SaleStatus::Cancelled => {
                return Err(AppError::AlreadySettled(
                    "Venda cancelada não pode ser quitada.".into(),
                ));
            }
            SaleStatus::Paid => {
                return Err(AppError::AlreadySettled("Venda já quitada.".into()));
            }
            _ => {}
        }

        let installments = self
            .installment_repo
            .list_for_sale_for_update(&mut *tx, sale_id)
            .await?;

        let today = Utc::now().date_naive();
        for installment in &installments {
            if installment.status == InstallmentStatus::Cancelled {
                continue;
            }
            if let Some(amount) = settlement_amount(installment) {
                self.installment_repo
                    .insert_payment(
                        &mut *tx,
                        installment.id,
                        amount,
                        today,
                        Some("full-settlement"),
                        None,
                    )
                    .await?;
            }
            self.recompute_installment(&mut tx, installment).await?;
        }

        self.recompute_sale(&mut tx, &sale).await?;

        let detail = self.load_detail(&mut tx, sale_id).await?;
        tx.commit().await?;
        tracing::info!("Venda {} quitada por completo", sale_id);
        Ok(detail)
    }

    // --- EDIÇÃO DE PAGAMENTO ---
    pub async fn edit_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
        amount: Decimal,
        payment_date: NaiveDate,
        method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<PaymentOutcome, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(
                "Valor do pagamento deve ser maior que zero.".into(),
            ));
        }

        let mut tx = executor.begin().await?;

        // 1. Localiza pagamento e parcela, tranca venda e parcela em ordem
        let payment = self.installment_repo.get_payment(&mut *tx, payment_id).await?;
        let peek = self
            .installment_repo
            .get(&mut *tx, payment.installment_id)
            .await?;
        let sale = self.sales_repo.get_for_update(&mut *tx, peek.sale_id).await?;
        ensure_sale_accepts_payments(sale.status)?;
        let installment = self
            .installment_repo
            .get_for_update(&mut *tx, peek.id)
            .await?;

        // 2. Aplica a correção
        let updated_payment = self
            .installment_repo
            .update_payment(&mut *tx, payment_id, amount, payment_date, method, notes)
            .await?;

        // 3. Recomputa do zero (a parcela pode até deixar de estar quitada)
        let (updated, warning) = self.recompute_installment(&mut tx, &installment).await?;
        let (sale_status, sale_remaining) = self.recompute_sale(&mut tx, &sale).await?;

        tx.commit().await?;
        Ok(PaymentOutcome {
            payment: Some(updated_payment),
            installment: updated,
            sale_status,
            sale_remaining_amount: sale_remaining,
            warning,
        })
    }

    // --- EXCLUSÃO DE PAGAMENTO ---
    pub async fn delete_payment<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
    ) -> Result<PaymentOutcome, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let payment = self.installment_repo.get_payment(&mut *tx, payment_id).await?;
        let peek = self
            .installment_repo
            .get(&mut *tx, payment.installment_id)
            .await?;
        let sale = self.sales_repo.get_for_update(&mut *tx, peek.sale_id).await?;
        ensure_sale_accepts_payments(sale.status)?;
        let installment = self
            .installment_repo
            .get_for_update(&mut *tx, peek.id)
            .await?;

        self.installment_repo.delete_payment(&mut *tx, payment_id).await?;

        let (updated, warning) = self.recompute_installment(&mut tx, &installment).await?;
        let (sale_status, sale_remaining) = self.recompute_sale(&mut tx, &sale).await?;

        tx.commit().await?;
        Ok(PaymentOutcome {
            payment: None,
            installment: updated,
            sale_status,
            sale_remaining_amount: sale_remaining,
            warning,
        })
    }

    // --- VISÃO DO CARNÊ ---
    pub async fn details<'e, E>(&self, executor: E, sale_id: Uuid) -> Result<SaleDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + sqlx::Acquire<'e, Database = Postgres>,
    {
        // Transação só para um snapshot consistente das três tabelas.
        let mut tx = executor.begin().await?;
        let detail = self.load_detail(&mut tx, sale_id).await?;
        tx.commit().await?;
        Ok(detail)
    }

    // --- WIDGET DE COBRANÇA ---
    pub async fn upcoming(&self) -> Result<UpcomingInstallments, AppError> {
        let today = Utc::now().date_naive();
        let rows = self.installment_repo.upcoming(today + Days::new(7)).await?;
        Ok(group_upcoming(rows, today))
    }

    // ---
    // Recomputações (sempre do histórico completo, nunca incremental)
    // ---

    async fn recompute_installment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        installment: &Installment,
    ) -> Result<(Installment, Option<String>), AppError> {
        let payments = self
            .installment_repo
            .payments_for_installment(&mut **tx, installment.id)
            .await?;
        let total_paid: Decimal = payments.iter().map(|p| p.amount).sum();

        let status = derive_installment_status(installment.amount_due, total_paid, installment.status);
        let updated = self
            .installment_repo
            .update_amounts(&mut **tx, installment.id, total_paid, status)
            .await?;

        let overpaid = total_paid - installment.amount_due;
        let warning = (overpaid > Decimal::ZERO).then(|| {
            format!(
                "Pagamento excede o valor da parcela em R$ {}.",
                money::normalize(overpaid)
            )
        });

        Ok((updated, warning))
    }

    async fn recompute_sale(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sale: &Sale,
    ) -> Result<(SaleStatus, Decimal), AppError> {
        let installments = self
            .installment_repo
            .list_for_sale(&mut **tx, sale.id)
            .await?;

        let mut remaining = Decimal::ZERO;
        let mut total_paid = Decimal::ZERO;
        for installment in installments
            .iter()
            .filter(|i| i.status != InstallmentStatus::Cancelled)
        {
            remaining += installment.remaining();
            total_paid += installment.amount_paid;
        }

        let status = derive_sale_status(sale.status, remaining, total_paid);
        if status != sale.status {
            self.sales_repo.update_status(&mut **tx, sale.id, status).await?;
        }

        Ok((status, remaining))
    }

    async fn load_detail(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sale_id: Uuid,
    ) -> Result<SaleDetail, AppError> {
        let sale = self.sales_repo.get(&mut **tx, sale_id).await?;
        let customer_name = self
            .sales_repo
            .customer_name(&mut **tx, sale.customer_id)
            .await?;
        let installments = self.installment_repo.list_for_sale(&mut **tx, sale_id).await?;
        let payments = self.installment_repo.payments_for_sale(&mut **tx, sale_id).await?;

        let mut by_installment: HashMap<Uuid, Vec<_>> = HashMap::new();
        for payment in payments {
            by_installment
                .entry(payment.installment_id)
                .or_default()
                .push(payment);
        }

        let today = Utc::now().date_naive();
        let mut remaining = Decimal::ZERO;
        let mut total_paid = Decimal::ZERO;
        let mut has_overdue = false;

        let details: Vec<InstallmentDetail> = installments
            .into_iter()
            .map(|installment| {
                if installment.status != InstallmentStatus::Cancelled {
                    remaining += installment.remaining();
                    total_paid += installment.amount_paid;
                }
                has_overdue |= installment.is_overdue(today);
                InstallmentDetail {
                    effective_status: installment.display_status(today),
                    remaining_amount: installment.remaining(),
                    payments: by_installment.remove(&installment.id).unwrap_or_default(),
                    installment,
                }
            })
            .collect();

        Ok(SaleDetail {
            sale,
            customer_name,
            total_paid,
            remaining_amount: remaining,
            has_overdue,
            installments: details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(due: &str, paid: &str, status: InstallmentStatus) -> Installment {
        Installment {
            id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
            sequence: 1,
            due_date: date(2024, 2, 1),
            amount_due: dec(due),
            amount_paid: dec(paid),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // --- derivação de status da parcela ---

    #[test]
    fn installment_settles_at_exact_amount() {
        let status =
            derive_installment_status(dec("100.00"), dec("100.00"), InstallmentStatus::Partial);
        assert_eq!(status, InstallmentStatus::Paid);
    }

    #[test]
    fn installment_settles_within_epsilon() {
        let status =
            derive_installment_status(dec("100.00"), dec("99.995"), InstallmentStatus::Pending);
        assert_eq!(status, InstallmentStatus::Paid);
    }

    #[test]
    fn overpayment_still_counts_as_paid() {
        let status =
            derive_installment_status(dec("100.00"), dec("130.00"), InstallmentStatus::Pending);
        assert_eq!(status, InstallmentStatus::Paid);
    }

    #[test]
    fn partial_payment_marks_partial() {
        let status =
            derive_installment_status(dec("100.00"), dec("40.00"), InstallmentStatus::Pending);
        assert_eq!(status, InstallmentStatus::Partial);
    }

    #[test]
    fn deleting_every_payment_reverts_to_pending() {
        let status = derive_installment_status(dec("100.00"), Decimal::ZERO, InstallmentStatus::Paid);
        assert_eq!(status, InstallmentStatus::Pending);
    }

    #[test]
    fn cancelled_installment_stays_cancelled() {
        let status =
            derive_installment_status(dec("100.00"), dec("100.00"), InstallmentStatus::Cancelled);
        assert_eq!(status, InstallmentStatus::Cancelled);
    }

    // --- derivação de status da venda ---

    #[test]
    fn sale_lifecycle_states_are_untouched() {
        assert_eq!(
            derive_sale_status(SaleStatus::Pending, dec("100.00"), dec("50.00")),
            SaleStatus::Pending
        );
        assert_eq!(
            derive_sale_status(SaleStatus::Cancelled, Decimal::ZERO, dec("50.00")),
            SaleStatus::Cancelled
        );
    }

    #[test]
    fn sale_settles_when_remaining_reaches_epsilon() {
        assert_eq!(
            derive_sale_status(SaleStatus::Partial, dec("0.01"), dec("299.99")),
            SaleStatus::Paid
        );
        assert_eq!(
            derive_sale_status(SaleStatus::Confirmed, Decimal::ZERO, Decimal::ZERO),
            SaleStatus::Paid
        );
    }

    #[test]
    fn sale_tracks_partial_and_reverts_to_confirmed() {
        assert_eq!(
            derive_sale_status(SaleStatus::Confirmed, dec("200.00"), dec("100.00")),
            SaleStatus::Partial
        );
        // Excluiu todos os pagamentos: volta a ser apenas confirmada.
        assert_eq!(
            derive_sale_status(SaleStatus::Paid, dec("300.00"), Decimal::ZERO),
            SaleStatus::Confirmed
        );
    }

    // --- trava da venda cancelada ---

    #[test]
    fn cancelled_sale_rejects_payment_changes() {
        // A parcela quitada sobrevive ao cancelamento da venda como PAID.
        // Excluir o último pagamento dela derivaria PENDING de novo, e a
        // cobrança reapareceria no widget e no painel. A trava no status
        // da venda fecha esse caminho antes de qualquer escrita.
        assert_eq!(
            derive_installment_status(dec("100.00"), Decimal::ZERO, InstallmentStatus::Paid),
            InstallmentStatus::Pending
        );
        assert!(matches!(
            ensure_sale_accepts_payments(SaleStatus::Cancelled),
            Err(AppError::AlreadySettled(_))
        ));
    }

    #[test]
    fn live_sales_still_accept_payment_changes() {
        for status in [
            SaleStatus::Pending,
            SaleStatus::Confirmed,
            SaleStatus::Partial,
            SaleStatus::Paid,
        ] {
            assert!(ensure_sale_accepts_payments(status).is_ok());
        }
    }

    // Cenário de referência: venda de R$ 300,00 em 3x a partir de
    // 01/01/2024; R$ 100,00 pagos na primeira parcela.
    #[test]
    fn settling_first_installment_leaves_the_rest_open() {
        let plan =
            schedule::generate(dec("300.00"), Decimal::ZERO, 3, date(2024, 1, 1)).unwrap();
        assert_eq!(plan[0].due_date, date(2024, 2, 1));

        let first = derive_installment_status(
            plan[0].amount_due,
            dec("100.00"),
            InstallmentStatus::Pending,
        );
        assert_eq!(first, InstallmentStatus::Paid);

        let paid = [dec("100.00"), Decimal::ZERO, Decimal::ZERO];
        let remaining: Decimal = plan
            .iter()
            .zip(paid.iter())
            .map(|(entry, p)| entry.amount_due - p)
            .sum();
        assert_eq!(remaining, dec("200.00"));
        assert_eq!(
            derive_sale_status(SaleStatus::Confirmed, remaining, dec("100.00")),
            SaleStatus::Partial
        );
    }

    // --- quitação total ---

    #[test]
    fn full_settlement_sweeps_residue_of_settled_installments() {
        // Duas parcelas de 100,00 com 99,99 pagos: cada uma é PAID pelo
        // epsilon, mas o agregado de 0,02 seguraria a venda em PARTIAL
        // para sempre. A varredura cobre o resíduo mesmo de parcela que
        // já não está em aberto.
        let settled = installment("100.00", "99.99", InstallmentStatus::Paid);
        assert!(!settled.is_open());
        assert_eq!(settlement_amount(&settled), Some(dec("0.01")));

        // Com os resíduos lançados, os saldos zeram exatos e a venda quita.
        assert_eq!(
            derive_sale_status(SaleStatus::Partial, Decimal::ZERO, dec("200.00")),
            SaleStatus::Paid
        );
    }

    #[test]
    fn full_settlement_skips_what_owes_nothing() {
        let exact = installment("100.00", "100.00", InstallmentStatus::Paid);
        assert_eq!(settlement_amount(&exact), None);

        // Pagamento a mais não gera estorno sintético.
        let overpaid = installment("100.00", "130.00", InstallmentStatus::Paid);
        assert_eq!(settlement_amount(&overpaid), None);

        let voided = installment("100.00", "0.00", InstallmentStatus::Cancelled);
        assert_eq!(settlement_amount(&voided), None);

        let open = installment("100.00", "40.00", InstallmentStatus::Partial);
        assert_eq!(settlement_amount(&open), Some(dec("60.00")));
    }

    // --- widget de cobrança ---

    fn upcoming_row(due_date: NaiveDate, remaining: Decimal) -> UpcomingInstallment {
        UpcomingInstallment {
            installment_id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
            customer_name: Some("Maria".into()),
            sequence: 1,
            due_date,
            amount_due: remaining,
            amount_paid: Decimal::ZERO,
            remaining_amount: remaining,
        }
    }

    #[test]
    fn upcoming_buckets_split_on_today_and_week_end() {
        let today = date(2024, 3, 10);
        let rows = vec![
            upcoming_row(date(2024, 3, 1), dec("50.00")),
            upcoming_row(date(2024, 3, 9), dec("30.00")),
            upcoming_row(date(2024, 3, 10), dec("100.00")),
            upcoming_row(date(2024, 3, 14), dec("70.00")),
            upcoming_row(date(2024, 3, 17), dec("20.00")),
        ];

        let grouped = group_upcoming(rows, today);
        assert_eq!(grouped.overdue.len(), 2);
        assert_eq!(grouped.overdue_total, dec("80.00"));
        assert_eq!(grouped.due_today.len(), 1);
        assert_eq!(grouped.due_today_total, dec("100.00"));
        assert_eq!(grouped.due_this_week.len(), 2);
        assert_eq!(grouped.due_this_week_total, dec("90.00"));
    }

    proptest! {
        // A agregação de pagamentos é independente da ordem de aplicação.
        #[test]
        fn payment_order_never_changes_the_outcome(
            cents in prop::collection::vec(1i64..=50_000, 1..12),
            due_cents in 1i64..=500_000,
        ) {
            let due = Decimal::new(due_cents, 2);

            let forward: Decimal = cents.iter().map(|c| Decimal::new(*c, 2)).sum();
            let backward: Decimal = cents.iter().rev().map(|c| Decimal::new(*c, 2)).sum();

            prop_assert_eq!(forward, backward);
            prop_assert_eq!(
                derive_installment_status(due, forward, InstallmentStatus::Pending),
                derive_installment_status(due, backward, InstallmentStatus::Pending)
            );
        }
    }
}
