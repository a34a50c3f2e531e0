use std::time::Duration;
use tradepilot::application::training::TrainingService;
use tradepilot::domain::entities::training::TradeOrder;
use tradepilot::domain::error::DomainError;
use tradepilot::domain::values::order_type::OrderType;
use tradepilot::domain::values::trade_side::TradeSide;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn market(symbol: &str, side: TradeSide, quantity: u32) -> TradeOrder {
    TradeOrder {
        symbol: symbol.to_string(),
        side,
        quantity,
        order_type: OrderType::Market,
        limit_price: None,
    }
}

fn limit(symbol: &str, side: TradeSide, quantity: u32, price: f64) -> TradeOrder {
    TradeOrder {
        order_type: OrderType::Limit,
        limit_price: Some(price),
        ..market(symbol, side, quantity)
    }
}

/// A started session with frozen prices.
fn paused(scenario: &str) -> TrainingService {
    let training = TrainingService::new(Some(42));
    training.start("u1", scenario).unwrap();
    training.pause("u1").unwrap();
    training
}

#[test]
fn test_start_seeds_session() {
    let training = TrainingService::new(Some(42));
    let session = training.start("u1", "trend-following").unwrap();

    assert!(session.is_active);
    assert_eq!(session.balance, 10_000.0);
    assert_eq!(session.feedback, vec!["Training session started! Initial balance: $10,000"]);
    assert!(session
        .guidance
        .starts_with("Welcome to Trend Following Strategy! In bullish market conditions, focus on identify upward"));
    let prices = &session.current_prices;
    assert_eq!(prices.len(), 4);
    assert!((150.0..200.0).contains(&prices["AAPL"]));
    assert!((2500.0..3000.0).contains(&prices["GOOGL"]));

    let err = training.start("u1", "day-trading").unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[test]
fn test_buy_beyond_balance_is_refused() {
    let training = paused("trend-following");

    let err = training.execute_trade("u1", market("GOOGL", TradeSide::Buy, 100)).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    let session = training.get_session("u1").unwrap().unwrap();
    assert_eq!(session.balance, 10_000.0);
    assert!(session.trades.is_empty());
    assert_eq!(
        session.feedback.last().unwrap(),
        "Insufficient funds for this trade. Available: $10000.00"
    );
}

#[test]
fn test_pnl_and_metrics() {
    let training = paused("risk-management");

    let session = training.execute_trade("u1", limit("AAPL", TradeSide::Buy, 10, 100.0)).unwrap();
    assert_eq!(session.balance, 24_000.0);
    assert_eq!(session.feedback.last().unwrap(), "BUY 10 AAPL at $100.00 - Balance: $24000.00");
    assert!(session.guidance.starts_with("Good buy on AAPL!"));

    training.execute_trade("u1", limit("aapl", TradeSide::Buy, 10, 120.0)).unwrap();
    let session = training.execute_trade("u1", limit("AAPL", TradeSide::Sell, 5, 130.0)).unwrap();
    assert_eq!(session.balance, 23_450.0);
    let sell = session.trades.last().unwrap();
    assert_eq!(sell.symbol, "AAPL");
    assert_eq!(sell.pnl, Some(100.0));
    assert!(session.trades[0].pnl.is_none());

    let price = session.current_prices["AAPL"];
    let metrics = training.performance("u1").unwrap();
    assert_eq!(metrics.total_trades, 3);
    assert!(approx(metrics.realized_pnl, 100.0));
    assert!(approx(metrics.unrealized_pnl, (price - 110.0) * 15.0));
    assert!(approx(metrics.total_value, 23_450.0 + price * 15.0));
    assert!(approx(metrics.total_pnl, metrics.total_value - 25_000.0));
    assert!(approx(metrics.return_percentage, metrics.total_pnl / 25_000.0 * 100.0));
    assert!(approx(metrics.win_rate, 100.0 / 3.0));
    assert_eq!(metrics.positions["AAPL"].quantity, 15);
    assert!(approx(metrics.positions["AAPL"].avg_price, 110.0));
}

#[test]
fn test_invalid_orders() {
    let training = paused("market-analysis");

    let err = training.execute_trade("u1", market("MSFT", TradeSide::Sell, 1)).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert_eq!(training.get_session("u1").unwrap().unwrap().feedback.last().unwrap(), "Cannot sell 1 MSFT: 0 held");

    for order in [
        market("NVDA", TradeSide::Buy, 1),
        market("AAPL", TradeSide::Buy, 0),
        TradeOrder {
            limit_price: None,
            ..limit("AAPL", TradeSide::Buy, 1, 1.0)
        },
        limit("AAPL", TradeSide::Buy, 1, -5.0),
    ] {
        let err = training.execute_trade("u1", order).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
    assert!(training.performance("u1").unwrap().positions.is_empty());
}

#[test]
fn test_missing_session() {
    let training = TrainingService::new(Some(42));
    assert!(training.get_session("u1").unwrap().is_none());
    assert!(matches!(training.pause("u1"), Err(DomainError::NotFound(_))));
    assert!(matches!(training.reset("u1"), Err(DomainError::NotFound(_))));
    assert!(matches!(training.hint("u1"), Err(DomainError::NotFound(_))));
    assert!(matches!(
        training.execute_trade("u1", market("AAPL", TradeSide::Buy, 1)),
        Err(DomainError::NotFound(_))
    ));
}

#[test]
fn test_prices_move_only_while_active() {
    let training = TrainingService::with_tick(Some(3), Duration::from_millis(1));
    training.start("u1", "risk-management").unwrap();
    let frozen = training.pause("u1").unwrap().current_prices;

    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(training.get_session("u1").unwrap().unwrap().current_prices, frozen);

    training.resume("u1").unwrap();
    std::thread::sleep(Duration::from_millis(10));
    let moved = training.get_session("u1").unwrap().unwrap();
    assert!(moved.is_active);
    assert_ne!(moved.current_prices, frozen);
}

#[test]
fn test_reset_and_hint() {
    let training = paused("trend-following");
    training.execute_trade("u1", limit("TSLA", TradeSide::Buy, 2, 210.0)).unwrap();

    let hint = training.hint("u1").unwrap();
    assert!(hint.starts_with("Hint: For Trend Following Strategy,"));
    assert_eq!(training.get_session("u1").unwrap().unwrap().guidance, hint);

    let fresh = training.reset("u1").unwrap();
    assert_eq!(fresh.scenario.id, "trend-following");
    assert!(fresh.is_active);
    assert!(fresh.trades.is_empty());
    assert_eq!(fresh.balance, 10_000.0);

    // Sessions are per user.
    assert!(training.get_session("u2").unwrap().is_none());
}
