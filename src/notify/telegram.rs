//! Telegram notification sink.

use reqwest::Client;
use tracing::{info, warn};

use crate::types::Signal;

const BASE_URL: &str = "https://api.telegram.org";

/// Thin Telegram Bot API client for signal alerts.
///
/// Delivery failures are logged and swallowed; the pipeline never blocks or
/// retries on a failed send.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    send_url: String,
}

impl TelegramNotifier {
    pub fn new(token: &str) -> Self {
        Self {
            client: Client::new(),
            send_url: format!("{}/bot{}/sendMessage", BASE_URL, token),
        }
    }

    /// Send an HTML-formatted message to one chat.
    pub async fn send(&self, chat_id: &str, text: &str) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });

        let response = self.client.post(&self.send_url).json(&body).send().await?;
        if response.status().is_success() {
            let preview: String = text.chars().take(60).collect();
            info!("Telegram sent to {}: {}", chat_id, preview.replace('\n', " "));
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "telegram returned status {}",
                response.status()
            ))
        }
    }

    /// Send a message, logging any failure instead of propagating it.
    pub async fn send_logged(&self, chat_id: &str, text: &str) {
        if let Err(e) = self.send(chat_id, text).await {
            warn!("Telegram send to {} failed: {}", chat_id, e);
        }
    }
}

/// Format a signal as a Telegram HTML alert.
pub fn format_signal(signal: &Signal) -> String {
    let emoji = match signal.direction {
        crate::types::Direction::Long => "🟢",
        crate::types::Direction::Short => "🔴",
    };
    format!(
        "{emoji} <b>{dir} {instrument}</b> — grade {grade} ({score})\n\
         {label}\n\
         Entry:  <code>{entry:.5}</code>\n\
         SL:     <code>{sl:.5}</code>\n\
         TP1:    <code>{tp1:.5}</code>\n\
         TP2:    <code>{tp2:.5}</code>\n\
         Runner: <code>{runner:.5}</code>\n\
         R:R {rr:.1} | {tf}",
        dir = signal.direction.label(),
        instrument = signal.instrument,
        grade = signal.grade.label(),
        score = signal.score,
        label = signal.setup_label,
        entry = signal.entry_price,
        sl = signal.stop_loss,
        tp1 = signal.tp1,
        tp2 = signal.tp2,
        runner = signal.runner,
        rr = signal.reward_risk,
        tf = signal.timeframe.code(),
    )
}
