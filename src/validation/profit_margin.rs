//! Profit margin between client billing and staff pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ClientContract, PayUnit, StaffContract};

/// Margin of billing over pay in a shared unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitMargin {
    /// The unit both amounts are expressed in.
    pub unit: PayUnit,
    /// Client billing amount.
    pub bill_amount: Decimal,
    /// Staff pay amount.
    pub pay_amount: Decimal,
    /// `(bill - pay) / bill`; zero when the bill is zero.
    pub margin: Decimal,
    /// Whether the margin is zero or negative.
    pub warn_if_non_positive: bool,
}

impl ProfitMargin {
    /// The margin as a percentage rounded to two places.
    pub fn percent(&self) -> Decimal {
        (self.margin * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

/// Computes the margin when the client's bill unit equals the staff's pay
/// unit and both amounts are set.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use kintai_engine::models::{ClientContract, ContractStatus, ContractType, PayUnit, StaffContract};
/// use kintai_engine::validation::profit_margin;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let start = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
/// let client = ClientContract {
///     id: Uuid::new_v4(),
///     tenant_id: "t1".to_string(),
///     client_name: "Acme".to_string(),
///     status: ContractStatus::Draft,
///     contract_type: ContractType::Dispatch,
///     start_date: start,
///     end_date: None,
///     bill_unit: Some(PayUnit::Hourly),
///     bill_amount: Some(Decimal::new(2000, 0)),
///     job_category_id: None,
///     limitation: None,
/// };
/// let mut staff = StaffContract::draft("t1", Uuid::new_v4(), "Line", start, None);
/// staff.pay_unit = Some(PayUnit::Hourly);
/// staff.pay_amount = Some(Decimal::new(1500, 0));
///
/// let margin = profit_margin(&client, &staff).unwrap();
/// assert_eq!(margin.percent(), Decimal::new(2500, 2));
/// assert!(!margin.warn_if_non_positive);
/// ```
pub fn profit_margin(client: &ClientContract, staff: &StaffContract) -> Option<ProfitMargin> {
    let unit = client.bill_unit.filter(|unit| Some(*unit) == staff.pay_unit)?;
    let bill_amount = client.bill_amount?;
    let pay_amount = staff.pay_amount?;

    let margin = if bill_amount.is_zero() {
        Decimal::ZERO
    } else {
        (bill_amount - pay_amount) / bill_amount
    };

    Some(ProfitMargin {
        unit,
        bill_amount,
        pay_amount,
        margin,
        warn_if_non_positive: margin <= Decimal::ZERO,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContractStatus, ContractType};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn contracts(
        bill: Option<(PayUnit, i64)>,
        pay: Option<(PayUnit, i64)>,
    ) -> (ClientContract, StaffContract) {
        let start = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
        let client = ClientContract {
            id: Uuid::new_v4(),
            tenant_id: "t1".to_string(),
            client_name: "Acme".to_string(),
            status: ContractStatus::Draft,
            contract_type: ContractType::Dispatch,
            start_date: start,
            end_date: None,
            bill_unit: bill.map(|(u, _)| u),
            bill_amount: bill.map(|(_, a)| Decimal::new(a, 0)),
            job_category_id: None,
            limitation: None,
        };
        let mut staff = StaffContract::draft("t1", Uuid::new_v4(), "Line", start, None);
        staff.pay_unit = pay.map(|(u, _)| u);
        staff.pay_amount = pay.map(|(_, a)| Decimal::new(a, 0));
        (client, staff)
    }

    #[test]
    fn test_mismatched_units_not_computed() {
        let (client, staff) = contracts(Some((PayUnit::Daily, 20000)), Some((PayUnit::Hourly, 1500)));
        assert!(profit_margin(&client, &staff).is_none());
    }

    #[test]
    fn test_missing_amount_not_computed() {
        let (client, staff) = contracts(Some((PayUnit::Hourly, 2000)), None);
        assert!(profit_margin(&client, &staff).is_none());
    }

    #[test]
    fn test_negative_margin_warns() {
        let (client, staff) = contracts(Some((PayUnit::Hourly, 1200)), Some((PayUnit::Hourly, 1500)));
        let margin = profit_margin(&client, &staff).unwrap();
        assert_eq!(margin.percent(), Decimal::new(-2500, 2));
        assert!(margin.warn_if_non_positive);
    }

    #[test]
    fn test_zero_bill_is_zero_margin() {
        let (client, staff) = contracts(Some((PayUnit::Monthly, 0)), Some((PayUnit::Monthly, 1)));
        let margin = profit_margin(&client, &staff).unwrap();
        assert_eq!(margin.margin, Decimal::ZERO);
        assert!(margin.warn_if_non_positive);
    }
}
