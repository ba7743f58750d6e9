// 📊 Aggregator - ordering and balances for display
// Pure functions over an in-memory list; nothing here touches the file

use crate::movement::{Account, Movement, FECHA_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Balances per account plus the grand total, rounded to cents
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Balances {
    pub banco: f64,
    pub cash: f64,
    pub total: f64,
}

/// Order movements newest first and compute the balances
///
/// Sorting is all-or-nothing: if any `fecha` fails to parse, the whole
/// batch keeps its incoming order. Sums are computed either way.
pub fn compute(mut records: Vec<Movement>) -> (Vec<Movement>, Balances) {
    sort_newest_first(&mut records);
    let balances = balances(&records);
    (records, balances)
}

/// Stable descending sort by date; returns false (and leaves the slice
/// untouched) when any date does not parse
pub fn sort_newest_first(records: &mut [Movement]) -> bool {
    let dates: Option<Vec<NaiveDate>> = records
        .iter()
        .map(|m| NaiveDate::parse_from_str(m.sort_date(), FECHA_FORMAT).ok())
        .collect();

    let Some(dates) = dates else {
        tracing::debug!("unparseable fecha in ledger, keeping file order");
        return false;
    };

    let mut keyed: Vec<(NaiveDate, Movement)> = dates
        .into_iter()
        .zip(records.iter().cloned())
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    for (slot, (_, movement)) in records.iter_mut().zip(keyed) {
        *slot = movement;
    }
    true
}

/// Per-account sums; movements with any other `tipo` are ignored
pub fn balances(records: &[Movement]) -> Balances {
    let mut banco = 0.0;
    let mut cash = 0.0;

    for movement in records {
        match movement.account() {
            Some(Account::Banco) => banco += movement.cantidad,
            Some(Account::Cash) => cash += movement.cantidad,
            None => {}
        }
    }

    Balances {
        banco: round_cents(banco),
        cash: round_cents(cash),
        total: round_cents(banco + cash),
    }
}

/// Round to two decimals, half away from zero
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mov(id: &str, fecha: &str, tipo: &str, cantidad: f64) -> Movement {
        Movement {
            id: id.to_string(),
            fecha: Some(fecha.to_string()),
            asunto: format!("mov {}", id),
            tipo: tipo.to_string(),
            cantidad,
        }
    }

    fn ids(records: &[Movement]) -> Vec<&str> {
        records.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_salary_and_groceries_scenario() {
        let records = vec![
            mov("groceries", "2024-01-05", "CASH", -50.0),
            mov("salary", "2024-01-10", "BANCO", 1000.0),
        ];

        let (ordered, saldos) = compute(records);

        assert_eq!(ids(&ordered), vec!["salary", "groceries"]);
        assert_eq!(
            saldos,
            Balances {
                banco: 1000.0,
                cash: -50.0,
                total: 950.0
            }
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let records = vec![
            mov("a", "2024-01-05", "CASH", 1.0),
            mov("b", "2024-02-01", "CASH", 1.0),
            mov("c", "2024-01-05", "CASH", 1.0),
        ];

        let (ordered, _) = compute(records);

        assert_eq!(ids(&ordered), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_one_bad_date_disables_sorting_for_all() {
        let records = vec![
            mov("old", "2023-01-01", "BANCO", 10.0),
            mov("bad", "not-a-date", "CASH", 5.0),
            mov("new", "2024-01-01", "BANCO", 20.0),
        ];

        let (ordered, saldos) = compute(records);

        assert_eq!(ids(&ordered), vec!["old", "bad", "new"]);
        assert_eq!(saldos.banco, 30.0);
        assert_eq!(saldos.cash, 5.0);
        assert_eq!(saldos.total, 35.0);
    }

    #[test]
    fn test_missing_fecha_sorts_as_epoch() {
        let mut undated = mov("undated", "x", "BANCO", 1.0);
        undated.fecha = None;
        let records = vec![undated, mov("dated", "2000-01-01", "BANCO", 1.0)];

        let (ordered, _) = compute(records);

        assert_eq!(ids(&ordered), vec!["dated", "undated"]);
    }

    #[test]
    fn test_unknown_tipo_is_ignored() {
        let records = vec![
            mov("a", "2024-01-01", "BANCO", 100.0),
            mov("b", "2024-01-02", "TARJETA", 999.0),
            mov("c", "2024-01-03", "cash", 999.0),
            mov("d", "2024-01-04", "CASH", 1.5),
        ];

        let saldos = balances(&records);

        assert_eq!(saldos.banco, 100.0);
        assert_eq!(saldos.cash, 1.5);
        assert_eq!(saldos.total, 101.5);
    }

    #[test]
    fn test_total_matches_parts_after_rounding() {
        let records = vec![
            mov("a", "2024-01-01", "BANCO", 0.1),
            mov("b", "2024-01-02", "BANCO", 0.2),
            mov("c", "2024-01-03", "CASH", 10.005),
            mov("d", "2024-01-04", "CASH", -3.333),
        ];

        let saldos = balances(&records);

        assert_eq!(saldos.banco, 0.3);
        assert!((saldos.total - (saldos.banco + saldos.cash)).abs() < 0.011);
    }

    #[test]
    fn test_empty_ledger() {
        let (ordered, saldos) = compute(Vec::new());

        assert!(ordered.is_empty());
        assert_eq!(saldos, Balances::default());
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(1.234), 1.23);
        assert_eq!(round_cents(-1.236), -1.24);
        assert_eq!(round_cents(950.0), 950.0);
    }
}
