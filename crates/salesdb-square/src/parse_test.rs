use super::*;
use crate::types::Money;
use salesdb_core::ValidationScope;

fn money(amount: i64) -> Option<Money> {
    Some(Money {
        amount: Some(amount),
        currency: Some("USD".to_owned()),
    })
}

fn line(name: &str, quantity: &str, cents: i64) -> WireLineItem {
    WireLineItem {
        name: Some(name.to_owned()),
        quantity: Some(quantity.to_owned()),
        base_price_money: money(cents),
        ..WireLineItem::default()
    }
}

fn order(line_items: Vec<WireLineItem>) -> WireOrder {
    WireOrder {
        id: Some("ORD-1".to_owned()),
        location_id: Some("L1".to_owned()),
        state: Some("COMPLETED".to_owned()),
        closed_at: Some("2025-10-03T17:45:12.345Z".to_owned()),
        line_items: Some(line_items),
    }
}

// -----------------------------------------------------------------------
// order-level checks
// -----------------------------------------------------------------------

#[test]
fn parses_complete_order() {
    let parsed = parse_order(order(vec![line("Croissant", "2", 450)])).unwrap();
    let tx = parsed.transaction;
    assert_eq!(tx.order_id, "ORD-1");
    assert_eq!(tx.location_id, "L1");
    assert_eq!(tx.closed_at.to_rfc3339(), "2025-10-03T17:45:12.345+00:00");
    assert_eq!(tx.line_items.len(), 1);
    assert_eq!(tx.line_items[0].base_price_cents, 450);
    assert_eq!(tx.line_items[0].quantity, 2);
    assert!(parsed.rejected_items.is_empty());
}

#[test]
fn rejects_order_without_id() {
    let mut wire = order(vec![]);
    wire.id = None;
    let err = parse_order(wire).unwrap_err();
    assert_eq!(err.order_id, MISSING_ORDER_ID);
    assert_eq!(err.scope, ValidationScope::Order);
}

#[test]
fn rejects_order_without_closed_at() {
    let mut wire = order(vec![line("Croissant", "1", 450)]);
    wire.closed_at = None;
    let err = parse_order(wire).unwrap_err();
    assert_eq!(err.order_id, "ORD-1");
    assert!(err.reason.contains("closed_at"));
}

#[test]
fn rejects_order_with_garbage_closed_at() {
    let mut wire = order(vec![]);
    wire.closed_at = Some("yesterday".to_owned());
    let err = parse_order(wire).unwrap_err();
    assert!(err.reason.contains("unparseable closed_at"));
}

#[test]
fn rejects_order_without_location() {
    let mut wire = order(vec![]);
    wire.location_id = Some(String::new());
    let err = parse_order(wire).unwrap_err();
    assert!(err.reason.contains("location_id"));
}

#[test]
fn order_without_line_items_is_empty_transaction() {
    let mut wire = order(vec![]);
    wire.line_items = None;
    let parsed = parse_order(wire).unwrap();
    assert!(parsed.transaction.line_items.is_empty());
}

// -----------------------------------------------------------------------
// line-item checks
// -----------------------------------------------------------------------

#[test]
fn bad_line_item_does_not_affect_siblings() {
    let parsed = parse_order(order(vec![
        line("Croissant", "1", 450),
        line("Scone", "one", 300),
        line("Latte", "1", 525),
    ]))
    .unwrap();
    let positions: Vec<i32> = parsed
        .transaction
        .line_items
        .iter()
        .map(|l| l.position)
        .collect();
    assert_eq!(positions, vec![0, 2]);
    assert_eq!(parsed.rejected_items.len(), 1);
    assert_eq!(parsed.rejected_items[0].scope, ValidationScope::LineItem(1));
    assert_eq!(parsed.rejected_items[0].order_id, "ORD-1");
}

#[test]
fn missing_quantity_is_rejected() {
    let mut item = line("Croissant", "1", 450);
    item.quantity = None;
    let parsed = parse_order(order(vec![item])).unwrap();
    assert!(parsed.rejected_items[0].reason.contains("missing quantity"));
}

#[test]
fn fractional_quantity_is_rejected() {
    let parsed = parse_order(order(vec![line("Coffee beans", "0.5", 1800)])).unwrap();
    assert!(parsed.transaction.line_items.is_empty());
    assert!(parsed.rejected_items[0].reason.contains("not a whole number"));
}

#[test]
fn decimal_whole_quantity_is_accepted() {
    let parsed = parse_order(order(vec![line("Bagel", "3.000", 250)])).unwrap();
    assert_eq!(parsed.transaction.line_items[0].quantity, 3);
}

#[test]
fn zero_quantity_passes_edge_parsing() {
    let parsed = parse_order(order(vec![line("Bagel", "0", 250)])).unwrap();
    assert_eq!(parsed.transaction.line_items[0].quantity, 0);
}

#[test]
fn missing_price_is_rejected() {
    let mut item = line("Croissant", "1", 450);
    item.base_price_money = Some(Money {
        amount: None,
        currency: Some("USD".to_owned()),
    });
    let parsed = parse_order(order(vec![item])).unwrap();
    assert!(parsed.rejected_items[0]
        .reason
        .contains("base_price_money.amount"));
}

#[test]
fn missing_name_becomes_empty() {
    let mut item = line("Croissant", "1", 450);
    item.name = None;
    let parsed = parse_order(order(vec![item])).unwrap();
    assert_eq!(parsed.transaction.line_items[0].name, "");
}

#[test]
fn modifiers_default_missing_price_to_zero() {
    let mut item = line("Latte", "1", 525);
    item.modifiers = Some(vec![
        WireModifier {
            name: Some("Oat milk".to_owned()),
            base_price_money: money(75),
        },
        WireModifier {
            name: Some("Extra hot".to_owned()),
            base_price_money: None,
        },
    ]);
    let parsed = parse_order(order(vec![item])).unwrap();
    let modifiers = &parsed.transaction.line_items[0].modifiers;
    assert_eq!(modifiers[0].base_price_cents, 75);
    assert_eq!(modifiers[1].base_price_cents, 0);
}
