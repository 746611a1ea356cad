//! End-to-end command scenarios: matching, priority, modify semantics, and
//! the per-command event contract (trades in match order, then ack/modify,
//! then at most one top-of-book update).

use std::sync::Arc;
use tickbook::{
    EngineEvent, MatchingEngine, OrderId, OwnerId, RecordingObserver, RejectReason, Side, Trade,
};

fn engine_with_recorder() -> (MatchingEngine, Arc<RecordingObserver>) {
    let mut engine = MatchingEngine::new();
    let recorder = Arc::new(RecordingObserver::new(1));
    engine.register_observer(recorder.clone());
    (engine, recorder)
}

fn trades(events: &[EngineEvent]) -> Vec<Trade> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::TradeExecuted { trade } => Some(*trade),
            _ => None,
        })
        .collect()
}

#[test]
fn clean_cross_leaves_residual_on_the_resting_side() {
    let (mut engine, recorder) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(10), Side::Buy, 100, 10000)
        .unwrap();
    recorder.clear();
    engine
        .add_order(OrderId(2), OwnerId(20), Side::Sell, 60, 10000)
        .unwrap();

    let events = recorder.take_events();
    let trades = trades(&events);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].resting_order_id, OrderId(1));
    assert_eq!(trades[0].aggressor_order_id, OrderId(2));
    assert_eq!(trades[0].resting_owner_id, OwnerId(10));
    assert_eq!(trades[0].aggressor_owner_id, OwnerId(20));
    assert_eq!(trades[0].price, 10000);
    assert_eq!(trades[0].quantity, 60);

    let top = engine.top_of_book();
    assert_eq!(top.best_bid, 10000);
    assert_eq!(top.bid_qty, 40);
    assert_eq!(engine.best_ask(), 0);
}

#[test]
fn aggressive_buy_walks_the_ask_ladder_and_rests() {
    let (mut engine, recorder) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Sell, 50, 10050)
        .unwrap();
    engine
        .add_order(OrderId(2), OwnerId(2), Side::Sell, 75, 10060)
        .unwrap();
    engine
        .add_order(OrderId(3), OwnerId(3), Side::Sell, 100, 10070)
        .unwrap();
    recorder.clear();

    engine
        .add_order(OrderId(4), OwnerId(4), Side::Buy, 200, 10065)
        .unwrap();

    let events = recorder.take_events();
    let trades = trades(&events);
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].resting_order_id, OrderId(1));
    assert_eq!(trades[0].quantity, 50);
    assert_eq!(trades[0].price, 10050);
    assert_eq!(trades[1].resting_order_id, OrderId(2));
    assert_eq!(trades[1].quantity, 75);
    assert_eq!(trades[1].price, 10060);

    assert_eq!(engine.best_bid(), 10065);
    assert_eq!(engine.total_bid_qty(), 75);
    let top = engine.top_of_book();
    assert_eq!(top.best_ask, 10070);
    assert_eq!(top.ask_qty, 100);
}

#[test]
fn fifo_within_a_price_level() {
    let (mut engine, recorder) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Buy, 100, 10000)
        .unwrap();
    engine
        .add_order(OrderId(2), OwnerId(2), Side::Buy, 100, 10000)
        .unwrap();
    engine
        .add_order(OrderId(3), OwnerId(3), Side::Buy, 100, 10000)
        .unwrap();
    recorder.clear();

    engine
        .add_order(OrderId(4), OwnerId(4), Side::Sell, 150, 10000)
        .unwrap();

    let trades = trades(&recorder.take_events());
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].resting_order_id, OrderId(1));
    assert_eq!(trades[0].quantity, 100);
    assert_eq!(trades[1].resting_order_id, OrderId(2));
    assert_eq!(trades[1].quantity, 50);

    let book = engine.book();
    assert_eq!(book.order(OrderId(2)).unwrap().quantity, 50);
    assert_eq!(book.order(OrderId(3)).unwrap().quantity, 100);
    assert_eq!(engine.total_bid_qty(), 150);
}

#[test]
fn pure_size_reduction_preserves_time_priority() {
    let (mut engine, recorder) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Buy, 100, 10000)
        .unwrap();
    engine
        .add_order(OrderId(2), OwnerId(2), Side::Buy, 100, 10000)
        .unwrap();
    engine.modify_order(OrderId(1), 75, 10000).unwrap();
    recorder.clear();

    engine
        .add_order(OrderId(3), OwnerId(3), Side::Sell, 50, 10000)
        .unwrap();

    let trades = trades(&recorder.take_events());
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].resting_order_id, OrderId(1));
    assert_eq!(trades[0].quantity, 50);

    let book = engine.book();
    assert_eq!(book.order(OrderId(1)).unwrap().quantity, 25);
    assert_eq!(book.order(OrderId(2)).unwrap().quantity, 100);
    assert_eq!(engine.total_bid_qty(), 125);
}

#[test]
fn price_change_loses_priority_and_may_cross() {
    let (mut engine, recorder) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Buy, 100, 9900)
        .unwrap();
    engine
        .add_order(OrderId(2), OwnerId(2), Side::Sell, 100, 10100)
        .unwrap();
    recorder.clear();

    engine.modify_order(OrderId(1), 100, 10200).unwrap();

    let events = recorder.take_events();
    let trades = trades(&events);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].aggressor_order_id, OrderId(1));
    assert_eq!(trades[0].resting_order_id, OrderId(2));
    assert_eq!(trades[0].quantity, 100);
    assert_eq!(trades[0].price, 10100);

    // replacement fully matched: the trade stream records the outcome, no
    // modification event is emitted
    assert!(!events
        .iter()
        .any(|e| matches!(e, EngineEvent::OrderModified { .. })));

    assert_eq!(engine.best_bid(), 0);
    assert_eq!(engine.best_ask(), 0);
}

#[test]
fn duplicate_id_rejection_is_side_effect_free() {
    let (mut engine, recorder) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Buy, 100, 10000)
        .unwrap();
    recorder.clear();

    let err = engine
        .add_order(OrderId(1), OwnerId(2), Side::Sell, 150, 10050)
        .unwrap_err();
    assert_eq!(err, RejectReason::DuplicateId);

    assert_eq!(
        recorder.take_events(),
        vec![EngineEvent::OrderRejected {
            order_id: OrderId(1),
            reason: RejectReason::DuplicateId
        }]
    );
    assert_eq!(engine.total_ask_qty(), 0);
    assert_eq!(engine.best_ask(), 0);
    assert_eq!(engine.best_bid(), 10000);
    assert_eq!(engine.total_bid_qty(), 100);
}

#[test]
fn add_emits_trades_then_ack_then_one_top_update() {
    let (mut engine, recorder) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Sell, 30, 10050)
        .unwrap();
    engine
        .add_order(OrderId(2), OwnerId(2), Side::Sell, 30, 10060)
        .unwrap();
    recorder.clear();

    // crosses both levels and rests the remainder
    engine
        .add_order(OrderId(3), OwnerId(3), Side::Buy, 100, 10060)
        .unwrap();

    let events = recorder.take_events();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], EngineEvent::TradeExecuted { trade } if trade.price == 10050));
    assert!(matches!(events[1], EngineEvent::TradeExecuted { trade } if trade.price == 10060));
    assert!(matches!(
        events[2],
        EngineEvent::OrderAcknowledged {
            order_id: OrderId(3)
        }
    ));
    match events[3] {
        EngineEvent::TopOfBookUpdate { top } => {
            assert_eq!(top.best_bid, 10060);
            assert_eq!(top.bid_qty, 40);
            assert_eq!(top.best_ask, 0);
        }
        ref other => panic!("expected top-of-book update, got {:?}", other),
    }
}

#[test]
fn modify_emits_trades_then_modify_then_one_top_update() {
    let (mut engine, recorder) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Buy, 100, 9900)
        .unwrap();
    engine
        .add_order(OrderId(2), OwnerId(2), Side::Sell, 40, 10000)
        .unwrap();
    recorder.clear();

    // reprice the bid through the ask: partial fill, remainder rests
    engine.modify_order(OrderId(1), 100, 10000).unwrap();

    let events = recorder.take_events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], EngineEvent::TradeExecuted { trade } if trade.quantity == 40));
    assert_eq!(
        events[1],
        EngineEvent::OrderModified {
            order_id: OrderId(1),
            new_quantity: 100,
            new_price: 10000
        }
    );
    assert!(matches!(events[2], EngineEvent::TopOfBookUpdate { .. }));

    assert_eq!(engine.best_bid(), 10000);
    assert_eq!(engine.total_bid_qty(), 60);
    assert_eq!(engine.best_ask(), 0);
}

#[test]
fn market_buy_is_a_limit_at_the_maximum_price() {
    let (mut engine, _) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Sell, 40, 10050)
        .unwrap();
    engine
        .add_order(OrderId(2), OwnerId(2), Side::Sell, 40, 10070)
        .unwrap();

    engine
        .add_order(OrderId(3), OwnerId(3), Side::Buy, 100, u64::MAX)
        .unwrap();

    // swept the book, remainder rests at the sentinel limit
    assert_eq!(engine.best_ask(), 0);
    assert_eq!(engine.best_bid(), u64::MAX);
    assert_eq!(engine.total_bid_qty(), 20);
}

#[test]
fn book_is_never_observably_crossed() {
    let (mut engine, _) = engine_with_recorder();
    engine
        .add_order(OrderId(1), OwnerId(1), Side::Sell, 10, 10100)
        .unwrap();
    engine
        .add_order(OrderId(2), OwnerId(2), Side::Buy, 10, 9900)
        .unwrap();
    engine
        .add_order(OrderId(3), OwnerId(3), Side::Sell, 10, 10000)
        .unwrap();
    engine
        .add_order(OrderId(4), OwnerId(4), Side::Buy, 10, 10000)
        .unwrap();

    let (bid, ask) = (engine.best_bid(), engine.best_ask());
    assert!(bid == 0 || ask == 0 || bid < ask);
}
