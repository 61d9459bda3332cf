use strum_macros::{Display, EnumString};

/// Console pages the bot drives, addressed as the call-name query parameter
/// on the shared ISAPI endpoint.
#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq)]
pub enum ConsoleCall {
    #[strum(serialize = "bidderblocklogin")]
    BidderBlockLogin,
    #[strum(serialize = "bidderblockresult")]
    BidderBlockResult,
    #[strum(serialize = "CancelBid")]
    CancelBid,
}
