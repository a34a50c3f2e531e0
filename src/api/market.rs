use super::error::{ApiError, OrApiError};
use super::AppState;
use crate::application::market_data::DEFAULT_NEWS_LIMIT;
use crate::domain::entities::market::{HistoricalData, MarketData, MarketStatus, NewsItem, SymbolMatch, TechnicalIndicators};
use crate::domain::values::history_period::HistoryPeriod;
use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt as _};
use tracing::{debug, instrument};

const MAX_NEWS_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SymbolsQuery {
    pub symbols: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub symbols: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Comma-separated, trimmed and upper-cased. Empty items are dropped.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn required_symbols(query: &SymbolsQuery) -> Result<Vec<String>, ApiError> {
    let symbols = query.symbols.as_deref().map(parse_symbols).unwrap_or_default();
    if symbols.is_empty() {
        return Err(ApiError::bad_request("Symbols parameter is required"));
    }
    Ok(symbols)
}

#[instrument(skip(state))]
pub async fn quotes(
    State(state): State<AppState>,
    Query(query): Query<SymbolsQuery>,
) -> Result<Json<Vec<MarketData>>, ApiError> {
    let symbols = required_symbols(&query)?;
    let data = state.app.market().get_multiple_quotes(&symbols).or_api("Failed to fetch market data")?;
    Ok(Json(data))
}

#[instrument(skip(state))]
pub async fn quote(State(state): State<AppState>, Path(symbol): Path<String>) -> Result<Json<MarketData>, ApiError> {
    let data = state
        .app
        .market()
        .get_market_data(&symbol.to_uppercase())
        .or_api("Failed to fetch market data")?;
    Ok(Json(data))
}

#[instrument(skip(state))]
pub async fn historical(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoricalData>>, ApiError> {
    let period = match query.period.as_deref() {
        Some(p) => p.parse::<HistoryPeriod>().map_err(ApiError::bad_request)?,
        None => HistoryPeriod::default(),
    };
    let data = state
        .app
        .market()
        .get_historical_data(&symbol.to_uppercase(), period)
        .or_api("Failed to fetch historical data")?;
    Ok(Json(data))
}

#[instrument(skip(state))]
pub async fn news(State(state): State<AppState>, Query(query): Query<NewsQuery>) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let symbols = query.symbols.as_deref().map(parse_symbols);
    let limit = query.limit.unwrap_or(DEFAULT_NEWS_LIMIT).min(MAX_NEWS_LIMIT);
    let data = state
        .app
        .market()
        .get_market_news(symbols.as_deref(), limit)
        .or_api("Failed to fetch market news")?;
    Ok(Json(data))
}

#[instrument(skip(state))]
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Result<Json<Vec<SymbolMatch>>, ApiError> {
    let q = query
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'q' is required"))?;
    Ok(Json(state.app.market().search_symbols(q.trim())))
}

#[instrument(skip(state))]
pub async fn indicators(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TechnicalIndicators>, ApiError> {
    let data = state
        .app
        .market()
        .get_technical_indicators(&symbol.to_uppercase())
        .or_api("Failed to fetch technical indicators")?;
    Ok(Json(data))
}

pub async fn status(State(state): State<AppState>) -> Json<MarketStatus> {
    Json(state.app.market().get_market_status())
}

/// Server-sent quote updates until the client disconnects.
#[instrument(skip(state))]
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<SymbolsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let symbols = required_symbols(&query)?;
    debug!(?symbols, "real-time client connected");

    let subscription = state.app.market().subscribe(symbols);
    let events = subscription.filter_map(|quote| {
        let data = serde_json::to_string(&quote).ok()?;
        Some(Ok(Event::default().event("quote").data(data)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols() {
        assert_eq!(parse_symbols(" aapl, msft ,,tsla"), vec!["AAPL", "MSFT", "TSLA"]);
        assert!(parse_symbols(" , ").is_empty());
    }
}
