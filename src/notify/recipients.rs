//! Recipient and entitlement store.
//!
//! In-memory registry of alert recipients. A recipient receives alerts once
//! they are premium-entitled and have completed the out-of-band opt-in
//! (verification code redeemed from their delivery channel).

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// One alert recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Delivery channel id (Telegram chat id).
    pub channel_id: String,
    pub display_name: String,
    /// Premium entitlement flag.
    pub premium: bool,
    /// Whether the opt-in verification completed.
    pub verified: bool,
}

/// Store of recipients and pending verification codes.
#[derive(Default)]
pub struct RecipientStore {
    recipients: DashMap<String, Recipient>,
    /// Pending codes: code -> channel id it was issued for.
    pending_codes: DashMap<String, String>,
}

impl RecipientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or update a recipient. New recipients start unverified.
    pub fn upsert(&self, channel_id: &str, display_name: &str, premium: bool) {
        self.recipients
            .entry(channel_id.to_string())
            .and_modify(|r| {
                r.display_name = display_name.to_string();
                r.premium = premium;
            })
            .or_insert_with(|| Recipient {
                channel_id: channel_id.to_string(),
                display_name: display_name.to_string(),
                premium,
                verified: false,
            });
    }

    /// Issue an opt-in verification code for a channel.
    pub fn issue_code(&self, channel_id: &str, code: &str) {
        self.pending_codes
            .insert(code.to_string(), channel_id.to_string());
    }

    /// Redeem a verification code, marking its recipient verified.
    /// Codes are single-use. Returns the verified recipient.
    pub fn redeem_code(&self, code: &str) -> Option<Recipient> {
        let (_, channel_id) = self.pending_codes.remove(code)?;
        let mut entry = self.recipients.get_mut(&channel_id)?;
        entry.verified = true;
        Some(entry.clone())
    }

    /// All recipients eligible for alert fan-out: premium and verified.
    pub fn active_premium_recipients(&self) -> Vec<Recipient> {
        self.recipients
            .iter()
            .filter(|r| r.premium && r.verified)
            .map(|r| r.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}
