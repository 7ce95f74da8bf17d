// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

// Dinheiro trafega como Decimal com 2 casas, espelhando NUMERIC(12, 2).
// Float nunca entra no domínio: valores vindos do JSON passam por `normalize`
// na borda e daí em diante toda aritmética é exata.

/// Arredonda para 2 casas, metade para longe do zero (regra comercial).
pub fn normalize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Trunca para o centavo (usado pela geração de parcelas; o resto vai
/// para a última parcela, nunca se perde).
pub fn floor_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Tolerância de quitação: diferenças abaixo de um centavo contam como pago.
pub fn settlement_epsilon() -> Decimal {
    Decimal::new(1, 2)
}

/// Um título está quitado quando o pago alcança o devido, a menos do epsilon.
pub fn is_settled(paid: Decimal, due: Decimal) -> bool {
    paid >= due - settlement_epsilon()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn normalize_rounds_half_away_from_zero() {
        assert_eq!(normalize(dec("10.005")), dec("10.01"));
        assert_eq!(normalize(dec("10.004")), dec("10.00"));
        assert_eq!(normalize(dec("-10.005")), dec("-10.01"));
        assert_eq!(normalize(dec("33.3333")), dec("33.33"));
    }

    #[test]
    fn floor_cents_truncates() {
        assert_eq!(floor_cents(dec("33.3399")), dec("33.33"));
        assert_eq!(floor_cents(dec("100.00")), dec("100.00"));
        assert_eq!(floor_cents(dec("0.019")), dec("0.01"));
    }

    #[test]
    fn settlement_tolerates_sub_cent_residue() {
        assert!(is_settled(dec("100.00"), dec("100.00")));
        assert!(is_settled(dec("99.995"), dec("100.00")));
        assert!(is_settled(dec("100.50"), dec("100.00")));
        assert!(!is_settled(dec("99.98"), dec("100.00")));
        assert!(!is_settled(dec("0"), dec("0.02")));
    }
}
