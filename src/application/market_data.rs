use crate::application::ttl_cache::TtlCache;
use crate::domain::entities::market::{
    Bollinger, HistoricalData, MarketData, MarketStatus, NewsItem, SymbolMatch, TechnicalIndicators,
};
use crate::domain::error::DomainError;
use crate::domain::values::history_period::HistoryPeriod;
use crate::domain::values::sentiment::Sentiment;
use chrono::{DateTime, Datelike, Duration as ChronoDuration, FixedOffset, Timelike, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_TICK: Duration = Duration::from_secs(5);
pub const DEFAULT_NEWS_LIMIT: usize = 10;

const DEMO_SYMBOLS: [&str; 8] = ["AAPL", "GOOGL", "TSLA", "MSFT", "NVDA", "AMZN", "META", "NFLX"];
const DEFAULT_NEWS_SYMBOLS: [&str; 4] = ["AAPL", "GOOGL", "TSLA", "MSFT"];
const NEWS_SOURCES: [&str; 4] = ["Reuters", "Bloomberg", "MarketWatch", "CNBC"];
const MAX_SEARCH_RESULTS: usize = 10;
/// Fraction of the base price a single simulated move may span.
const VOLATILITY: f64 = 0.02;
/// US Eastern standard time; daylight saving is ignored.
const EASTERN_OFFSET_SECS: i32 = 5 * 3600;

const NEWS_TEMPLATES: [(&str, Sentiment); 6] = [
    ("Stock reaches new highs amid strong earnings", Sentiment::Positive),
    ("Market volatility increases due to economic uncertainty", Sentiment::Negative),
    ("Company announces new product launch", Sentiment::Positive),
    ("Regulatory concerns impact sector performance", Sentiment::Negative),
    ("Analyst upgrades stock rating", Sentiment::Positive),
    ("Quarterly results meet expectations", Sentiment::Neutral),
];

const SYMBOL_CATALOG: [(&str, &str, &str); 11] = [
    ("AAPL", "Apple Inc.", "stock"),
    ("GOOGL", "Alphabet Inc.", "stock"),
    ("TSLA", "Tesla Inc.", "stock"),
    ("MSFT", "Microsoft Corporation", "stock"),
    ("NVDA", "NVIDIA Corporation", "stock"),
    ("AMZN", "Amazon.com Inc.", "stock"),
    ("META", "Meta Platforms Inc.", "stock"),
    ("NFLX", "Netflix Inc.", "stock"),
    ("BTC-USD", "Bitcoin USD", "crypto"),
    ("ETH-USD", "Ethereum USD", "crypto"),
    ("SPY", "SPDR S&P 500 ETF", "etf"),
];

struct MarketState {
    rng: StdRng,
    quotes: TtlCache<MarketData>,
    history: TtlCache<Vec<HistoricalData>>,
    indicators: TtlCache<TechnicalIndicators>,
    news: TtlCache<Vec<NewsItem>>,
}

/// Synthetic quotes, bars, indicators and headlines behind a short-lived cache.
pub struct MarketDataService {
    state: Mutex<MarketState>,
    tick: Duration,
}

impl MarketDataService {
    /// `seed` makes every generated number reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_timing(seed, DEFAULT_TTL, DEFAULT_TICK)
    }

    pub fn with_timing(seed: Option<u64>, ttl: Duration, tick: Duration) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let mut state = MarketState {
            rng,
            quotes: TtlCache::new(ttl),
            history: TtlCache::new(ttl),
            indicators: TtlCache::new(ttl),
            news: TtlCache::new(ttl),
        };

        for (index, symbol) in DEMO_SYMBOLS.iter().enumerate() {
            let base = 100.0 + index as f64 * 50.0;
            let quote = seeded_quote(&mut state.rng, symbol, base);
            state.quotes.insert(quote_key(symbol), quote);
        }

        Self {
            state: Mutex::new(state),
            tick,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MarketState>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Store(format!("market data: {e}")))
    }

    pub fn get_market_data(&self, symbol: &str) -> Result<MarketData, DomainError> {
        let key = quote_key(symbol);
        let mut st = self.lock()?;
        if let Some(hit) = st.quotes.get(&key) {
            return Ok(hit);
        }
        let base = 100.0 + st.rng.gen::<f64>() * 300.0;
        let quote = realtime_price(&mut st.rng, symbol, base);
        st.quotes.insert(key, quote.clone());
        debug!(symbol, price = quote.price, "generated quote");
        Ok(quote)
    }

    pub fn get_multiple_quotes(&self, symbols: &[String]) -> Result<Vec<MarketData>, DomainError> {
        symbols.iter().map(|s| self.get_market_data(s)).collect()
    }

    /// Daily bars, oldest first, ending today.
    pub fn get_historical_data(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<HistoricalData>, DomainError> {
        let key = format!("historical_{symbol}_{period}");
        let mut st = self.lock()?;
        if let Some(hit) = st.history.get(&key) {
            return Ok(hit);
        }

        let rng = &mut st.rng;
        let base = 100.0 + rng.gen::<f64>() * 200.0;
        let today = Utc::now().date_naive();
        let days = period.days();

        let bars: Vec<HistoricalData> = (0..=days)
            .rev()
            .map(|back| {
                let date = today - ChronoDuration::days(back);
                let open = base + (rng.gen::<f64>() - 0.5) * 10.0;
                let close = open + (rng.gen::<f64>() - 0.5) * 5.0;
                let high = open.max(close) + rng.gen::<f64>() * 3.0;
                let low = open.min(close) - rng.gen::<f64>() * 3.0;
                HistoricalData {
                    symbol: symbol.to_string(),
                    date: date.format("%Y-%m-%d").to_string(),
                    open: round2(open),
                    high: round2(high),
                    low: round2(low),
                    close: round2(close),
                    volume: rng.gen_range(1_000_000..11_000_000),
                }
            })
            .collect();

        st.history.insert(key, bars.clone());
        Ok(bars)
    }

    pub fn get_technical_indicators(&self, symbol: &str) -> Result<TechnicalIndicators, DomainError> {
        let key = format!("technical_{symbol}");
        if let Some(hit) = self.lock()?.indicators.get(&key) {
            return Ok(hit);
        }

        let quote = self.get_market_data(symbol)?;
        let mut st = self.lock()?;
        let rng = &mut st.rng;
        let indicators = TechnicalIndicators {
            symbol: symbol.to_string(),
            sma20: round2(quote.price * (0.95 + rng.gen::<f64>() * 0.1)),
            sma50: round2(quote.price * (0.9 + rng.gen::<f64>() * 0.2)),
            rsi: round2(30.0 + rng.gen::<f64>() * 40.0),
            macd: round2((rng.gen::<f64>() - 0.5) * 2.0),
            bollinger: Bollinger {
                upper: round2(quote.price * 1.05),
                middle: quote.price,
                lower: round2(quote.price * 0.95),
            },
            timestamp: Utc::now(),
        };
        st.indicators.insert(key, indicators.clone());
        Ok(indicators)
    }

    /// Headlines about `symbols` (or a default set), published within the last day.
    pub fn get_market_news(&self, symbols: Option<&[String]>, limit: usize) -> Result<Vec<NewsItem>, DomainError> {
        let targets: Vec<String> = match symbols {
            Some(s) if !s.is_empty() => s.to_vec(),
            _ => DEFAULT_NEWS_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };
        let scope = symbols.filter(|s| !s.is_empty()).map_or("general".to_string(), |s| s.join(","));
        let key = format!("news_{scope}_{limit}");

        let mut st = self.lock()?;
        if let Some(hit) = st.news.get(&key) {
            return Ok(hit);
        }

        let now = Utc::now();
        let rng = &mut st.rng;
        let news: Vec<NewsItem> = (0..limit)
            .map(|i| {
                let (headline, sentiment) = NEWS_TEMPLATES[rng.gen_range(0..NEWS_TEMPLATES.len())];
                let symbol = &targets[rng.gen_range(0..targets.len())];
                let age_ms = rng.gen_range(0..86_400_000);
                NewsItem {
                    id: format!("news_{i}_{}", now.timestamp_millis()),
                    title: format!("{symbol}: {headline}"),
                    summary: format!(
                        "Latest developments regarding {symbol} and its market performance. This news item provides insights into recent market movements and potential impacts on trading decisions."
                    ),
                    url: format!("https://example.com/news/{i}"),
                    source: NEWS_SOURCES[rng.gen_range(0..NEWS_SOURCES.len())].to_string(),
                    published_at: now - ChronoDuration::milliseconds(age_ms),
                    sentiment,
                    symbols: vec![symbol.clone()],
                }
            })
            .collect();

        st.news.insert(key, news.clone());
        Ok(news)
    }

    pub fn search_symbols(&self, query: &str) -> Vec<SymbolMatch> {
        let q = query.to_lowercase();
        SYMBOL_CATALOG
            .iter()
            .filter(|(symbol, name, _)| symbol.to_lowercase().contains(&q) || name.to_lowercase().contains(&q))
            .take(MAX_SEARCH_RESULTS)
            .map(|(symbol, name, kind)| SymbolMatch {
                symbol: symbol.to_string(),
                name: name.to_string(),
                kind: kind.to_string(),
            })
            .collect()
    }

    pub fn get_market_status(&self) -> MarketStatus {
        market_status_at(Utc::now())
    }

    /// Starts a background ticker that nudges each symbol's price every tick.
    /// Updates stop when the returned subscription is dropped.
    pub fn subscribe(self: &Arc<Self>, symbols: Vec<String>) -> Subscription {
        self.subscribe_every(symbols, self.tick)
    }

    pub fn subscribe_every(self: &Arc<Self>, symbols: Vec<String>, tick: Duration) -> Subscription {
        let (tx, rx) = mpsc::channel(symbols.len().max(1) * 4);
        let service = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                for symbol in &symbols {
                    let update = match service.nudge(symbol) {
                        Ok(update) => update,
                        Err(e) => {
                            warn!(symbol, error = %e, "real-time update failed");
                            continue;
                        }
                    };
                    if tx.send(update).await.is_err() {
                        debug!("real-time subscriber went away");
                        return;
                    }
                }
            }
        });

        Subscription { rx, handle }
    }

    fn nudge(&self, symbol: &str) -> Result<MarketData, DomainError> {
        let last = self.get_market_data(symbol)?;
        let mut st = self.lock()?;
        let next = realtime_price(&mut st.rng, symbol, last.price);
        st.quotes.insert(quote_key(symbol), next.clone());
        Ok(next)
    }
}

/// Live feed handle. Yields quotes as a stream; dropping it stops the ticker.
pub struct Subscription {
    rx: mpsc::Receiver<MarketData>,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<MarketData> {
        self.rx.recv().await
    }
}

impl tokio_stream::Stream for Subscription {
    type Item = MarketData;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Regular session is weekdays 09:00-16:00 Eastern.
pub fn market_status_at(now: DateTime<Utc>) -> MarketStatus {
    let eastern = FixedOffset::west_opt(EASTERN_OFFSET_SECS).map(|tz| now.with_timezone(&tz));
    let is_open = eastern.map_or(false, |t| {
        let weekday = !matches!(t.weekday(), Weekday::Sat | Weekday::Sun);
        weekday && (9..16).contains(&t.hour())
    });
    let in_an_hour = now + ChronoDuration::hours(1);

    MarketStatus {
        is_open,
        next_open: if is_open { None } else { Some(in_an_hour) },
        next_close: if is_open { Some(in_an_hour) } else { None },
        timezone: "America/New_York".to_string(),
    }
}

fn quote_key(symbol: &str) -> String {
    format!("market_{symbol}")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn seeded_quote(rng: &mut StdRng, symbol: &str, base: f64) -> MarketData {
    let change = (rng.gen::<f64>() - 0.5) * 10.0;
    let price = base + change;
    MarketData {
        symbol: symbol.to_string(),
        price: round2(price),
        change: round2(change),
        change_percent: round2(change / base * 100.0),
        volume: rng.gen_range(1_000_000..11_000_000),
        high: round2(price + rng.gen::<f64>() * 5.0),
        low: round2(price - rng.gen::<f64>() * 5.0),
        open: round2(base + (rng.gen::<f64>() - 0.5) * 3.0),
        previous_close: base,
        market_cap: Some(price * 1e9),
        pe: Some(round2(15.0 + rng.gen::<f64>() * 20.0)),
        timestamp: Utc::now(),
    }
}

/// A move of at most half of `VOLATILITY` either side of `base`.
fn realtime_price(rng: &mut StdRng, symbol: &str, base: f64) -> MarketData {
    let change = (rng.gen::<f64>() - 0.5) * base * VOLATILITY;
    let price = base + change;
    MarketData {
        symbol: symbol.to_string(),
        price: round2(price),
        change: round2(change),
        change_percent: round2(change / base * 100.0),
        volume: rng.gen_range(1_000_000..6_000_000),
        high: round2(price + rng.gen::<f64>() * 5.0),
        low: round2(price - rng.gen::<f64>() * 5.0),
        open: round2(base + (rng.gen::<f64>() - 0.5) * 2.0),
        previous_close: base,
        market_cap: Some(price * 1e9),
        pe: Some(round2(15.0 + rng.gen::<f64>() * 20.0)),
        timestamp: Utc::now(),
    }
}
