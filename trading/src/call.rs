use strum_macros::{Display, EnumString};

/// Trading-API calls the bot issues. The variant name doubles as the
/// call-name header and the request root tag prefix.
#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq)]
pub enum TradingCall {
    GetSellerList,
    GetItem,
}
