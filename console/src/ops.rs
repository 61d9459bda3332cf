//! The console operations the bot performs. The console has no incremental
//! block API, so the block list is always read, edited, and written back
//! whole. Outcomes are reported through page headings, never status codes,
//! so every mutation returns the heading for the caller to log.
use crate::call::ConsoleCall;
use crate::page;
use crate::session::Session;
use crate::Result;
use common::document;
use std::collections::BTreeSet;

const BIDDER_LIST_FIELD: &str = "bidderlist";
const BIDDER_LIST_SEPARATOR: &str = ", ";
const CANCEL_REASON: &str = "Bid cancelled by the seller's automated bid screening.";

impl Session {
    /// Current block list, scraped from the block-list page's textarea.
    pub async fn blocked_bidders(&self) -> Result<BTreeSet<String>> {
        let body = self.get(ConsoleCall::BidderBlockLogin).await?;
        let list = page::textarea(&document::parse_html(&body), BIDDER_LIST_FIELD)
            .unwrap_or_default();
        Ok(split_bidder_list(&list))
    }

    pub async fn block_bidder(&self, user_id: &str) -> Result<String> {
        let mut bidders = self.blocked_bidders().await?;
        bidders.insert(user_id.to_owned());
        self.replace_blocked_bidders(&bidders).await
    }

    pub async fn unblock_bidder(&self, user_id: &str) -> Result<String> {
        let mut bidders = self.blocked_bidders().await?;
        bidders.remove(user_id);
        self.replace_blocked_bidders(&bidders).await
    }

    async fn replace_blocked_bidders(&self, bidders: &BTreeSet<String>) -> Result<String> {
        let params = [(BIDDER_LIST_FIELD.to_owned(), join_bidder_list(bidders))];
        let body = self.post(ConsoleCall::BidderBlockResult, &params).await?;
        Ok(page::heading(&document::parse_html(&body)))
    }

    /// Cancels one bid with the boilerplate reason the console requires.
    pub async fn cancel_bid(&self, item_id: &str, user_id: &str) -> Result<String> {
        let params = [
            ("itemid".to_owned(), item_id.to_owned()),
            ("userid".to_owned(), user_id.to_owned()),
            ("cancelreason".to_owned(), CANCEL_REASON.to_owned()),
        ];
        let body = self.post(ConsoleCall::CancelBid, &params).await?;
        Ok(page::heading(&document::parse_html(&body)))
    }
}

fn split_bidder_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

fn join_bidder_list(bidders: &BTreeSet<String>) -> String {
    bidders
        .iter()
        .cloned()
        .collect::<Vec<_>>()
        .join(BIDDER_LIST_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_console_rendered_list() {
        let bidders = split_bidder_list("alice, bob");
        assert!(bidders.contains("alice"));
        assert!(bidders.contains("bob"));
        assert_eq!(bidders.len(), 2);
    }

    #[test]
    fn tolerates_sloppy_separators_and_empties() {
        let bidders = split_bidder_list(" alice ,bob,, carol ");
        assert_eq!(
            join_bidder_list(&bidders),
            "alice, bob, carol"
        );
        assert!(split_bidder_list("").is_empty());
    }

    #[test]
    fn replacement_list_is_comma_space_joined_in_set_order() {
        let mut bidders = split_bidder_list("alice, bob");
        bidders.insert("carol".to_owned());
        assert_eq!(join_bidder_list(&bidders), "alice, bob, carol");
    }
}
