use crate::domain::order::OrderItem;
use rust_decimal::Decimal;

/// Monetary values are stored with 2 fractional digits.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary value to the stored scale. The scale is also padded
/// back up, so a value parsed as `100` is stored and rendered as `100.00`
/// no matter which input path it arrived through.
pub fn to_money(value: Decimal) -> Decimal {
    let mut money = value.round_dp(MONEY_SCALE);
    money.rescale(MONEY_SCALE);
    money
}

/// Subtotal of a single line: quantity times the price snapshot.
pub fn line_subtotal(quantity: u32, unit_price: Decimal) -> Decimal {
    to_money(Decimal::from(quantity) * unit_price)
}

/// Total of an order as the sum of its line subtotals.
///
/// Called synchronously inside every item-mutating transaction so that a
/// committed order total always matches its committed items. An order with
/// no items totals zero.
pub fn order_total<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a OrderItem>,
{
    to_money(items.into_iter().map(|item| item.subtotal).sum())
}
