//! OANDA-compatible candle REST client.

use anyhow::{anyhow, Context};
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::sources::CandleSource;
use crate::types::{Candle, Granularity};

/// Raw candle entry from the candles endpoint.
#[derive(Debug, Deserialize)]
struct OandaCandle {
    /// RFC3339 timestamp of the bucket open.
    time: String,
    complete: bool,
    mid: OandaMid,
}

/// Mid prices come back as decimal strings.
#[derive(Debug, Deserialize)]
struct OandaMid {
    o: String,
    h: String,
    l: String,
    c: String,
}

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    candles: Vec<OandaCandle>,
}

/// OANDA v3 REST client for instrument candles.
#[derive(Clone)]
pub struct OandaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OandaClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("sweepscan/0.1")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn parse_candle(raw: &OandaCandle) -> anyhow::Result<Candle> {
        let open_time = DateTime::parse_from_rfc3339(&raw.time)
            .with_context(|| format!("bad candle timestamp {}", raw.time))?
            .timestamp_millis();
        Ok(Candle {
            open_time,
            open: raw.mid.o.parse().context("bad open price")?,
            high: raw.mid.h.parse().context("bad high price")?,
            low: raw.mid.l.parse().context("bad low price")?,
            close: raw.mid.c.parse().context("bad close price")?,
        })
    }
}

impl CandleSource for OandaClient {
    async fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> anyhow::Result<Vec<Candle>> {
        let url = format!(
            "{}/instruments/{}/candles?granularity={}&count={}&price=M",
            self.base_url,
            instrument,
            granularity.code(),
            count
        );

        let mut request = self.client.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("candle request failed")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "candle source returned {} for {}: {}",
                status,
                instrument,
                body
            ));
        }

        let parsed: CandlesResponse = response
            .json()
            .await
            .context("candle response parse failed")?;

        let mut candles = Vec::with_capacity(parsed.candles.len());
        for raw in &parsed.candles {
            candles.push(Self::parse_candle(raw)?);
        }

        debug!(
            "Fetched {} {} candles for {} ({} complete)",
            candles.len(),
            granularity.code(),
            instrument,
            parsed.candles.iter().filter(|c| c.complete).count()
        );

        Ok(candles)
    }
}
