use crate::clock::{Clock, SystemClock};
use crate::whitelist::Whitelist;
use anyhow::{Context, Result};
use common::document::Element;
use common::Credentials;
use console::Session;
use log::{error, info};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use trading::TradingCall;

const LISTING_WINDOW_DAYS: i64 = 30;
const MIN_TRUSTED_SCORE: i64 = 9;

/// Reputation of the current high bidder on one listing. Rebuilt from a
/// fresh API call on every pass, never cached.
#[derive(Clone, Debug)]
pub(crate) struct BidderStatus {
    pub item_id: String,
    pub description: String,
    pub user_id: String,
    pub feedback_score: Option<i64>,
    pub positive_feedback_percent: Option<f64>,
}

/// Watches the seller's active listings and cancels/blocks bids from
/// low-reputation buyers, using the trading API to evaluate and the web
/// console to act.
#[derive(Clone)]
pub(crate) struct Sentry {
    trading: trading::Client,
    console: Session,
    whitelist: Whitelist,
    clock: Arc<dyn Clock>,
}

impl Sentry {
    pub(crate) fn new(credentials: Credentials, whitelist: Whitelist) -> Result<Self> {
        Ok(Self {
            trading: trading::Client::new(credentials.auth_token.clone()),
            console: Session::new(credentials)?,
            whitelist,
            clock: Arc::new(SystemClock),
        })
    }

    /// One full pass: evaluate every active listing, then cancel and block
    /// each unacceptable bid. Both console actions are best-effort; a partial
    /// failure is logged and re-evaluated on the next pass.
    pub(crate) async fn block_and_cancel(&self) -> Result<()> {
        let blockable = self.blockable_bids().await?;
        if blockable.is_empty() {
            info!("No blockable bids this pass");
            return Ok(());
        }

        for status in blockable {
            info!(
                "Bid by {} on {} ({}) is blockable (score {:?}, positive {:?})",
                status.user_id,
                status.item_id,
                status.description,
                status.feedback_score,
                status.positive_feedback_percent
            );
            match self
                .console
                .cancel_bid(&status.item_id, &status.user_id)
                .await
            {
                Ok(outcome) => info!("Cancelled bid on {}: {outcome}", status.item_id),
                Err(e) => error!("Failed to cancel bid on {}: {e}", status.item_id),
            }
            match self.console.block_bidder(&status.user_id).await {
                Ok(outcome) => info!("Blocked {}: {outcome}", status.user_id),
                Err(e) => error!("Failed to block {}: {e}", status.user_id),
            }
        }
        Ok(())
    }

    /// Whitelists a bidder and lifts any existing console block, so a manual
    /// decision overrides earlier automated ones.
    pub(crate) async fn allow(&self, user_id: &str) -> Result<()> {
        self.whitelist.add(user_id)?;
        let outcome = self.console.unblock_bidder(user_id).await?;
        info!("Whitelisted {user_id}; console says: {outcome}");
        Ok(())
    }

    pub(crate) async fn blockable_bids(&self) -> Result<Vec<BidderStatus>> {
        let mut blockable = Vec::new();
        for item_id in self.active_item_ids().await? {
            let Some(status) = self.high_bidder_status(&item_id).await? else {
                continue;
            };
            if !self.is_acceptable(&status)? {
                blockable.push(status);
            }
        }
        Ok(blockable)
    }

    /// Item ids of the seller's listings started within the trailing window.
    async fn active_item_ids(&self) -> Result<Vec<String>> {
        let (from, to) = listing_window(self.clock.now());
        let params = vec![
            Element::with_text("StartTimeFrom", format_timestamp(from)?),
            Element::with_text("StartTimeTo", format_timestamp(to)?),
            Element::with_text("GranularityLevel", "Coarse"),
        ];
        let response = self.trading.call(TradingCall::GetSellerList, params).await?;
        Ok(response
            .find_all(&["ItemArray", "Item", "ItemID"])
            .iter()
            .map(|id| id.text().trim().to_owned())
            .collect())
    }

    async fn high_bidder_status(&self, item_id: &str) -> Result<Option<BidderStatus>> {
        let params = vec![Element::with_text("ItemID", item_id)];
        let response = self.trading.call(TradingCall::GetItem, params).await?;
        status_from_response(item_id, &response)
    }

    fn is_acceptable(&self, status: &BidderStatus) -> Result<bool> {
        if self.whitelist.contains(&status.user_id)? {
            return Ok(true);
        }
        Ok(has_trusted_feedback(status))
    }
}

fn status_from_response(item_id: &str, response: &Element) -> Result<Option<BidderStatus>> {
    let Some(high_bidder) = response.find_first(&["SellingStatus", "HighBidder"]) else {
        return Ok(None);
    };

    let user_id = high_bidder
        .first_text(&["UserID"])
        .with_context(|| format!("High bidder on {item_id} has no UserID"))?;
    let feedback_score = high_bidder
        .first_text(&["FeedbackScore"])
        .map(|score| score.parse::<i64>())
        .transpose()
        .with_context(|| format!("Malformed feedback score on {item_id}"))?;
    let positive_feedback_percent = high_bidder
        .first_text(&["PositiveFeedbackPercent"])
        .map(|percent| percent.parse::<f64>())
        .transpose()
        .with_context(|| format!("Malformed feedback percentage on {item_id}"))?;

    Ok(Some(BidderStatus {
        item_id: item_id.to_owned(),
        description: response.first_text(&["Item", "Title"]).unwrap_or_default(),
        user_id,
        feedback_score,
        positive_feedback_percent,
    }))
}

/// Permissive by default: a bidder with no feedback score at all is left
/// alone. Only a known score of 9 or less, or a positive percentage below a
/// flat 100, marks the bid as blockable.
fn has_trusted_feedback(status: &BidderStatus) -> bool {
    let Some(score) = status.feedback_score else {
        return true;
    };
    match status.positive_feedback_percent {
        Some(percent) => percent.floor() == 100.0 && score > MIN_TRUSTED_SCORE,
        None => false,
    }
}

fn listing_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    (now - Duration::days(LISTING_WINDOW_DAYS), now)
}

fn format_timestamp(timestamp: OffsetDateTime) -> Result<String> {
    Ok(timestamp.format(&Rfc3339)?)
}
