// src/services/schedule.rs

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::common::{error::AppError, money};

// Geração do carnê. Função pura: quem chama resolve datas padrão e
// persiste as linhas dentro da sua própria transação.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub sequence: i32,
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
}

/// Divide `total - entrada` em `n` parcelas mensais. A divisão trunca no
/// centavo e o resto inteiro vai para a última parcela, de modo que a soma
/// das parcelas bate com o principal exatamente. Principal que não rende
/// ao menos um centavo por parcela é rejeitado.
pub fn generate(
    total_value: Decimal,
    entry_payment: Decimal,
    num_installments: i32,
    start_date: NaiveDate,
) -> Result<Vec<ScheduleEntry>, AppError> {
    if num_installments <= 0 {
        return Err(AppError::InvalidSchedule(
            "Número de parcelas deve ser maior que zero.".into(),
        ));
    }

    let principal = total_value - entry_payment;
    if principal <= Decimal::ZERO {
        return Err(AppError::InvalidSchedule(
            "Entrada deve ser menor que o valor total da venda.".into(),
        ));
    }

    // Parcela única vence na data de início, sem empurrar um mês.
    if num_installments == 1 {
        return Ok(vec![ScheduleEntry {
            sequence: 1,
            due_date: start_date,
            amount_due: principal,
        }]);
    }

    let base = money::floor_cents(principal / Decimal::from(num_installments));
    // 0,10 em 12x daria onze parcelas de 0,00 penduradas no carnê.
    if base.is_zero() {
        return Err(AppError::InvalidSchedule(
            "Valor muito baixo para o número de parcelas.".into(),
        ));
    }
    let last = principal - base * Decimal::from(num_installments - 1);

    let mut entries = Vec::with_capacity(num_installments as usize);
    for i in 1..=num_installments {
        let due_date = start_date
            .checked_add_months(Months::new(i as u32))
            .ok_or_else(|| {
                AppError::InvalidSchedule("Data de vencimento fora do calendário suportado.".into())
            })?;
        let amount_due = if i == num_installments { last } else { base };
        entries.push(ScheduleEntry {
            sequence: i,
            due_date,
            amount_due,
        });
    }

    Ok(entries)
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

    #[test]
    fn three_even_installments_on_calendar_months() {
        let schedule = generate(dec("300.00"), Decimal::ZERO, 3, date(2024, 1, 1)).unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[0].amount_due, dec("100.00"));
        assert_eq!(schedule[0].due_date, date(2024, 2, 1));
        assert_eq!(schedule[1].amount_due, dec("100.00"));
        assert_eq!(schedule[1].due_date, date(2024, 3, 1));
        assert_eq!(schedule[2].amount_due, dec("100.00"));
        assert_eq!(schedule[2].due_date, date(2024, 4, 1));
    }

    #[test]
    fn remainder_lands_on_the_last_installment() {
        let schedule = generate(dec("100.00"), Decimal::ZERO, 3, date(2024, 1, 15)).unwrap();
        assert_eq!(schedule[0].amount_due, dec("33.33"));
        assert_eq!(schedule[1].amount_due, dec("33.33"));
        assert_eq!(schedule[2].amount_due, dec("33.34"));
    }

    #[test]
    fn entry_payment_reduces_principal() {
        let schedule = generate(dec("300.00"), dec("50.00"), 2, date(2024, 1, 1)).unwrap();
        assert_eq!(schedule[0].amount_due, dec("125.00"));
        assert_eq!(schedule[1].amount_due, dec("125.00"));
    }

    #[test]
    fn single_installment_due_at_start() {
        let schedule = generate(dec("180.00"), dec("30.00"), 1, date(2024, 5, 10)).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].sequence, 1);
        assert_eq!(schedule[0].due_date, date(2024, 5, 10));
        assert_eq!(schedule[0].amount_due, dec("150.00"));
    }

    #[test]
    fn month_end_clamps_instead_of_overflowing() {
        let schedule = generate(dec("200.00"), Decimal::ZERO, 2, date(2024, 1, 31)).unwrap();
        // 2024 é bissexto: 31/01 + 1 mês = 29/02.
        assert_eq!(schedule[0].due_date, date(2024, 2, 29));
        assert_eq!(schedule[1].due_date, date(2024, 3, 31));
    }

    #[test]
    fn rejects_non_positive_installment_count() {
        assert!(matches!(
            generate(dec("100.00"), Decimal::ZERO, 0, date(2024, 1, 1)),
            Err(AppError::InvalidSchedule(_))
        ));
        assert!(matches!(
            generate(dec("100.00"), Decimal::ZERO, -3, date(2024, 1, 1)),
            Err(AppError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn rejects_entry_swallowing_the_total() {
        assert!(matches!(
            generate(dec("100.00"), dec("100.00"), 2, date(2024, 1, 1)),
            Err(AppError::InvalidSchedule(_))
        ));
        assert!(matches!(
            generate(dec("100.00"), dec("120.00"), 2, date(2024, 1, 1)),
            Err(AppError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn rejects_principal_below_one_cent_per_installment() {
        // 0,10 em 12x daria onze parcelas de 0,00.
        assert!(matches!(
            generate(dec("0.10"), Decimal::ZERO, 12, date(2024, 1, 1)),
            Err(AppError::InvalidSchedule(_))
        ));

        // Um centavo por parcela ainda passa, resto incluso.
        let schedule = generate(dec("0.12"), Decimal::ZERO, 12, date(2024, 1, 1)).unwrap();
        assert!(schedule.iter().all(|e| e.amount_due == dec("0.01")));

        // Parcela única não divide nada e fica de fora da regra.
        let single = generate(dec("0.10"), Decimal::ZERO, 1, date(2024, 1, 1)).unwrap();
        assert_eq!(single[0].amount_due, dec("0.10"));
    }

    proptest! {
        // Lei da soma: as parcelas sempre somam o principal, centavo a centavo.
        #[test]
        fn sum_of_installments_equals_principal(
            total_cents in 1i64..=10_000_000,
            entry_cents in 0i64..=9_999_999,
            n in 1i32..=48,
        ) {
            let total = Decimal::new(total_cents, 2);
            let entry = Decimal::new(entry_cents, 2);
            prop_assume!(entry < total);
            // Precisa render ao menos um centavo por parcela.
            prop_assume!(total_cents - entry_cents >= n as i64);

            let schedule = generate(total, entry, n, date(2024, 1, 1)).unwrap();
            let sum: Decimal = schedule.iter().map(|e| e.amount_due).sum();
            prop_assert_eq!(sum, total - entry);
            prop_assert_eq!(schedule.len(), n as usize);

            // Nenhuma parcela sem valor, vencimentos estritamente crescentes.
            for row in &schedule {
                prop_assert!(row.amount_due > Decimal::ZERO);
            }
            for pair in schedule.windows(2) {
                prop_assert!(pair[0].due_date < pair[1].due_date);
            }
        }
    }
}
