use crate::domain::entities::training::{
    OpenPosition, PerformanceMetrics, PnlBreakdown, SimulatedTrade, TradeOrder, TrainingScenario, TrainingSession,
};
use crate::domain::error::DomainError;
use crate::domain::values::difficulty::Difficulty;
use crate::domain::values::market_condition::MarketCondition;
use crate::domain::values::order_type::OrderType;
use crate::domain::values::trade_side::TradeSide;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_TRAINING_TICK: Duration = Duration::from_secs(2);
/// Price steps replayed at most after an idle gap.
const MAX_CATCH_UP_TICKS: u32 = 30;
const PRICE_FLOOR: f64 = 1.0;

/// Tradable symbol with its opening price range (low, span).
const INSTRUMENTS: [(&str, f64, f64); 4] = [
    ("AAPL", 150.0, 50.0),
    ("GOOGL", 2500.0, 500.0),
    ("MSFT", 300.0, 100.0),
    ("TSLA", 200.0, 100.0),
];

struct Run {
    session: TrainingSession,
    last_tick: Instant,
}

impl Run {
    /// Applies the price steps that came due while the session was running.
    fn catch_up(&mut self, rng: &mut StdRng, tick: Duration) {
        if !self.session.is_active || tick.is_zero() {
            return;
        }
        let due = (self.last_tick.elapsed().as_nanos() / tick.as_nanos()).min(u32::MAX as u128) as u32;
        if due == 0 {
            return;
        }
        let condition = self.session.scenario.market_condition;
        for _ in 0..due.min(MAX_CATCH_UP_TICKS) {
            step_prices(rng, &mut self.session.current_prices, condition);
        }
        self.last_tick = if due > MAX_CATCH_UP_TICKS {
            Instant::now()
        } else {
            self.last_tick + tick * due
        };
    }
}

struct TrainingState {
    rng: StdRng,
    runs: HashMap<String, Run>,
}

/// Paper-trading practice sessions, one per user, over a small simulated
/// market whose drift follows the scenario.
pub struct TrainingService {
    scenarios: Vec<TrainingScenario>,
    state: Mutex<TrainingState>,
    tick: Duration,
}

impl TrainingService {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_tick(seed, DEFAULT_TRAINING_TICK)
    }

    /// `tick` is the wall-clock interval between price steps.
    pub fn with_tick(seed: Option<u64>, tick: Duration) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            scenarios: builtin_scenarios(),
            state: Mutex::new(TrainingState {
                rng,
                runs: HashMap::new(),
            }),
            tick,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, TrainingState>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Store(format!("training sessions: {e}")))
    }

    fn with_run<T>(&self, user_id: &str, f: impl FnOnce(&mut Run) -> Result<T, DomainError>) -> Result<T, DomainError> {
        let mut guard = self.lock()?;
        let TrainingState { rng, runs } = &mut *guard;
        let run = runs.get_mut(user_id).ok_or_else(no_session)?;
        run.catch_up(rng, self.tick);
        f(run)
    }

    pub fn scenarios(&self) -> &[TrainingScenario] {
        &self.scenarios
    }

    pub fn get_scenario(&self, id: &str) -> Option<&TrainingScenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Opens a fresh session, replacing any session the user already had.
    pub fn start(&self, user_id: &str, scenario_id: &str) -> Result<TrainingSession, DomainError> {
        let scenario = self
            .get_scenario(scenario_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("Training scenario {scenario_id} not found")))?;

        let mut st = self.lock()?;
        let current_prices = INSTRUMENTS
            .iter()
            .map(|(symbol, low, span)| (symbol.to_string(), low + st.rng.gen::<f64>() * span))
            .collect();
        let session = TrainingSession {
            user_id: user_id.to_string(),
            feedback: vec![format!(
                "Training session started! Initial balance: ${}",
                whole_dollars(scenario.initial_balance)
            )],
            guidance: start_guidance(&scenario),
            balance: scenario.initial_balance,
            trades: vec![],
            current_prices,
            is_active: true,
            started_at: Utc::now(),
            scenario,
        };
        st.runs.insert(
            user_id.to_string(),
            Run {
                session: session.clone(),
                last_tick: Instant::now(),
            },
        );
        info!(user_id, scenario = %session.scenario.id, "training session started");
        Ok(session)
    }

    /// Starts the current scenario over.
    pub fn reset(&self, user_id: &str) -> Result<TrainingSession, DomainError> {
        let scenario_id = self
            .lock()?
            .runs
            .get(user_id)
            .map(|r| r.session.scenario.id.clone())
            .ok_or_else(no_session)?;
        self.start(user_id, &scenario_id)
    }

    pub fn get_session(&self, user_id: &str) -> Result<Option<TrainingSession>, DomainError> {
        match self.with_run(user_id, |run| Ok(run.session.clone())) {
            Ok(session) => Ok(Some(session)),
            Err(DomainError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Freezes prices until `resume`.
    pub fn pause(&self, user_id: &str) -> Result<TrainingSession, DomainError> {
        self.with_run(user_id, |run| {
            run.session.is_active = false;
            Ok(run.session.clone())
        })
    }

    pub fn resume(&self, user_id: &str) -> Result<TrainingSession, DomainError> {
        self.with_run(user_id, |run| {
            if !run.session.is_active {
                run.session.is_active = true;
                run.last_tick = Instant::now();
            }
            Ok(run.session.clone())
        })
    }

    /// Fills the order immediately, at the current price for market orders
    /// and at the limit price for limit orders. Orders refused for lack of
    /// cash or shares still leave a line in the session feedback.
    pub fn execute_trade(&self, user_id: &str, order: TradeOrder) -> Result<TrainingSession, DomainError> {
        if order.quantity == 0 {
            return Err(DomainError::InvalidInput("Quantity must be positive".to_string()));
        }
        let symbol = order.symbol.trim().to_uppercase();

        self.with_run(user_id, |run| {
            let session = &mut run.session;
            let market_price = *session
                .current_prices
                .get(&symbol)
                .ok_or_else(|| DomainError::InvalidInput(format!("Unknown training symbol: {symbol}")))?;
            let price = match order.order_type {
                OrderType::Market => market_price,
                OrderType::Limit => order
                    .limit_price
                    .filter(|p| p.is_finite() && *p > 0.0)
                    .ok_or_else(|| DomainError::InvalidInput("Limit orders need a positive limit price".to_string()))?,
            };
            let amount = price * f64::from(order.quantity);

            let pnl = match order.side {
                TradeSide::Buy => {
                    if amount > session.balance {
                        let message = format!("Insufficient funds for this trade. Available: ${:.2}", session.balance);
                        session.feedback.push(message.clone());
                        return Err(DomainError::InvalidInput(message));
                    }
                    session.balance -= amount;
                    None
                }
                TradeSide::Sell => {
                    let (positions, _) = replay(&session.trades);
                    let held = positions.get(&symbol).cloned().unwrap_or_default();
                    if order.quantity > held.quantity {
                        let message = format!("Cannot sell {} {symbol}: {} held", order.quantity, held.quantity);
                        session.feedback.push(message.clone());
                        return Err(DomainError::InvalidInput(message));
                    }
                    session.balance += amount;
                    Some((price - held.avg_price) * f64::from(order.quantity))
                }
            };

            let trade = SimulatedTrade {
                id: uuid::Uuid::new_v4().to_string(),
                symbol: symbol.clone(),
                side: order.side,
                quantity: order.quantity,
                price,
                timestamp: Utc::now(),
                pnl,
            };
            session.feedback.push(format!(
                "{} {} {} at ${:.2} - Balance: ${:.2}",
                trade.side.to_string().to_uppercase(),
                trade.quantity,
                trade.symbol,
                trade.price,
                session.balance
            ));
            session.guidance = format!(
                "Good {} on {}! Consider your position size relative to your total portfolio. \
                 Monitor the price action and be ready to adjust your strategy.",
                trade.side, trade.symbol
            );
            debug!(user_id, symbol = %trade.symbol, side = %trade.side, price, "training trade filled");
            session.trades.push(trade);
            Ok(session.clone())
        })
    }

    pub fn hint(&self, user_id: &str) -> Result<String, DomainError> {
        self.with_run(user_id, |run| {
            let hint = format!(
                "Hint: For {}, pay attention to the relationship between price and volume. \
                 Look for confirmation signals before entering positions.",
                run.session.scenario.title
            );
            run.session.guidance = hint.clone();
            Ok(hint)
        })
    }

    pub fn performance(&self, user_id: &str) -> Result<PerformanceMetrics, DomainError> {
        self.with_run(user_id, |run| Ok(performance_of(&run.session)))
    }
}

fn no_session() -> DomainError {
    DomainError::NotFound("No training session in progress".to_string())
}

/// One random step per symbol, never below the price floor.
pub fn step_prices(rng: &mut impl Rng, prices: &mut BTreeMap<String, f64>, condition: MarketCondition) {
    for price in prices.values_mut() {
        let change = (rng.gen::<f64>() - 0.5) * condition.volatility() + condition.trend();
        *price = (*price * (1.0 + change)).max(PRICE_FLOOR);
    }
}

/// Average-cost positions left open by `trades` and the profit realized
/// by their sells.
pub fn replay(trades: &[SimulatedTrade]) -> (BTreeMap<String, OpenPosition>, f64) {
    let mut positions: BTreeMap<String, OpenPosition> = BTreeMap::new();
    let mut realized = 0.0;
    for trade in trades {
        let position = positions.entry(trade.symbol.clone()).or_default();
        match trade.side {
            TradeSide::Buy => {
                let quantity = position.quantity + trade.quantity;
                position.avg_price = (position.avg_price * f64::from(position.quantity)
                    + trade.price * f64::from(trade.quantity))
                    / f64::from(quantity);
                position.quantity = quantity;
            }
            TradeSide::Sell => {
                let sold = trade.quantity.min(position.quantity);
                realized += (trade.price - position.avg_price) * f64::from(sold);
                position.quantity -= sold;
            }
        }
    }
    positions.retain(|_, p| p.quantity > 0);
    (positions, realized)
}

/// Realized profit plus open positions marked at `prices`.
pub fn calculate_pnl(trades: &[SimulatedTrade], prices: &BTreeMap<String, f64>) -> PnlBreakdown {
    let (positions, realized) = replay(trades);
    let unrealized = positions
        .iter()
        .filter_map(|(symbol, p)| prices.get(symbol).map(|price| (price - p.avg_price) * f64::from(p.quantity)))
        .sum();
    PnlBreakdown { realized, unrealized }
}

pub fn performance_of(session: &TrainingSession) -> PerformanceMetrics {
    let pnl = calculate_pnl(&session.trades, &session.current_prices);
    let (positions, _) = replay(&session.trades);
    let holdings: f64 = positions
        .iter()
        .filter_map(|(symbol, p)| session.current_prices.get(symbol).map(|price| price * f64::from(p.quantity)))
        .sum();
    let total_value = session.balance + holdings;
    let initial = session.scenario.initial_balance;
    let return_percentage = if initial > 0.0 {
        (total_value - initial) / initial * 100.0
    } else {
        0.0
    };

    let total_trades = session.trades.len();
    let winning = session.trades.iter().filter(|t| t.pnl.is_some_and(|p| p > 0.0)).count();
    let win_rate = if total_trades > 0 {
        winning as f64 / total_trades as f64 * 100.0
    } else {
        0.0
    };

    PerformanceMetrics {
        total_value,
        total_pnl: pnl.total(),
        realized_pnl: pnl.realized,
        unrealized_pnl: pnl.unrealized,
        return_percentage,
        win_rate,
        total_trades,
        positions,
    }
}

fn start_guidance(scenario: &TrainingScenario) -> String {
    let focus = scenario
        .objectives
        .first()
        .map(|o| o.to_lowercase())
        .unwrap_or_else(|| "the fundamentals".to_string());
    format!(
        "Welcome to {}! In {} market conditions, focus on {focus}. \
         Watch for key indicators and remember to manage your risk.",
        scenario.title, scenario.market_condition
    )
}

/// `10000.0` -> `"10,000"`.
fn whole_dollars(amount: f64) -> String {
    let digits = format!("{:.0}", amount.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn builtin_scenarios() -> Vec<TrainingScenario> {
    vec![
        TrainingScenario {
            id: "trend-following".to_string(),
            title: "Trend Following Strategy".to_string(),
            description: "Learn to identify and follow market trends using technical indicators".to_string(),
            difficulty: Difficulty::Beginner,
            duration: 15,
            objectives: strings(&[
                "Identify upward and downward trends",
                "Use moving averages for entry signals",
                "Practice proper position sizing",
                "Implement stop-loss orders",
            ]),
            initial_balance: 10_000.0,
            market_condition: MarketCondition::Bullish,
        },
        TrainingScenario {
            id: "risk-management".to_string(),
            title: "Risk Management Fundamentals".to_string(),
            description: "Master the art of protecting your capital through proper risk management".to_string(),
            difficulty: Difficulty::Intermediate,
            duration: 20,
            objectives: strings(&[
                "Calculate position sizes based on risk tolerance",
                "Set appropriate stop-loss levels",
                "Understand risk-reward ratios",
                "Practice portfolio diversification",
            ]),
            initial_balance: 25_000.0,
            market_condition: MarketCondition::Volatile,
        },
        TrainingScenario {
            id: "market-analysis".to_string(),
            title: "Technical Analysis Deep Dive".to_string(),
            description: "Advanced chart patterns and technical indicator analysis".to_string(),
            difficulty: Difficulty::Advanced,
            duration: 30,
            objectives: strings(&[
                "Recognize complex chart patterns",
                "Combine multiple technical indicators",
                "Analyze market sentiment",
                "Time entries and exits precisely",
            ]),
            initial_balance: 50_000.0,
            market_condition: MarketCondition::Sideways,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(symbol: &str, side: TradeSide, quantity: u32, price: f64) -> SimulatedTrade {
        SimulatedTrade {
            id: format!("{symbol}-{quantity}-{price}"),
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            timestamp: Utc::now(),
            pnl: None,
        }
    }

    #[test]
    fn test_pnl_uses_average_cost() {
        let trades = vec![
            trade("AAPL", TradeSide::Buy, 10, 100.0),
            trade("AAPL", TradeSide::Buy, 10, 120.0),
            trade("AAPL", TradeSide::Sell, 5, 130.0),
            trade("TSLA", TradeSide::Buy, 2, 200.0),
        ];
        let prices = BTreeMap::from([("AAPL".to_string(), 100.0), ("TSLA".to_string(), 250.0)]);

        let pnl = calculate_pnl(&trades, &prices);
        // Average cost 110: five sold at +20, fifteen held at -10, two TSLA at +50.
        assert_eq!(pnl.realized, 100.0);
        assert_eq!(pnl.unrealized, -150.0 + 100.0);
        assert_eq!(pnl.total(), 50.0);
    }

    #[test]
    fn test_closed_positions_drop_out() {
        let trades = vec![trade("MSFT", TradeSide::Buy, 4, 300.0), trade("MSFT", TradeSide::Sell, 4, 290.0)];
        let (positions, realized) = replay(&trades);
        assert!(positions.is_empty());
        assert_eq!(realized, -40.0);
    }

    #[test]
    fn test_prices_never_fall_below_floor() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut prices = BTreeMap::from([("PENNY".to_string(), 1.0)]);
        for _ in 0..200 {
            step_prices(&mut rng, &mut prices, MarketCondition::Bearish);
        }
        assert!(prices["PENNY"] >= PRICE_FLOOR);
    }

    #[test]
    fn test_whole_dollars_groups_thousands() {
        assert_eq!(whole_dollars(950.0), "950");
        assert_eq!(whole_dollars(10_000.0), "10,000");
        assert_eq!(whole_dollars(1_250_000.0), "1,250,000");
    }

    #[test]
    fn test_catch_up_is_capped() {
        let service = TrainingService::with_tick(Some(1), Duration::from_millis(1));
        service.start("u1", "trend-following").unwrap();
        std::thread::sleep(Duration::from_millis(40));
        let before = service.lock().unwrap().runs["u1"].session.current_prices.clone();
        let after = service.get_session("u1").unwrap().unwrap().current_prices;
        assert_ne!(before, after);
        assert!(service.lock().unwrap().runs["u1"].last_tick.elapsed() < Duration::from_millis(40));
    }
}
