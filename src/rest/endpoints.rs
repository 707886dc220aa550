//! Bybit P2P REST API hosts and operation catalog.

/// Subdomain of the production API.
pub const MAINNET_SUBDOMAIN: &str = "api";
/// Subdomain of the testnet API.
pub const TESTNET_SUBDOMAIN: &str = "api-testnet";
/// Primary domain.
pub const DOMAIN_MAIN: &str = "bybit";
/// Alternative domain, for regions where the primary one is blocked.
pub const DOMAIN_ALT: &str = "bytick";
/// Default top-level domain.
pub const TLD_MAIN: &str = "com";

/// Default receive window in milliseconds.
pub const DEFAULT_RECV_WINDOW: u64 = 5000;

/// How an operation is sent and signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    /// Parameters go in a sorted query string
    Get,
    /// Parameters go in a JSON body
    Post,
    /// A single file goes in a multipart body; sent as POST
    File,
}

impl HttpVerb {
    /// The method used on the wire.
    pub fn wire_method(self) -> reqwest::Method {
        match self {
            HttpVerb::Get => reqwest::Method::GET,
            HttpVerb::Post | HttpVerb::File => reqwest::Method::POST,
        }
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpVerb::Get => write!(f, "GET"),
            HttpVerb::Post => write!(f, "POST"),
            HttpVerb::File => write!(f, "FILE"),
        }
    }
}

/// A logical API operation: where it lives, how it is sent, and which
/// parameters it cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    /// Endpoint path, appended to the base URL
    pub path: &'static str,
    /// Request kind
    pub verb: HttpVerb,
    /// Parameters the caller must supply
    pub required: &'static [&'static str],
}

impl Operation {
    /// A GET operation.
    pub const fn get(path: &'static str, required: &'static [&'static str]) -> Self {
        Self {
            path,
            verb: HttpVerb::Get,
            required,
        }
    }

    /// A POST operation with a JSON body.
    pub const fn post(path: &'static str, required: &'static [&'static str]) -> Self {
        Self {
            path,
            verb: HttpVerb::Post,
            required,
        }
    }

    /// A multipart file upload.
    pub const fn file(path: &'static str, required: &'static [&'static str]) -> Self {
        Self {
            path,
            verb: HttpVerb::File,
            required,
        }
    }
}

/// Account endpoints.
pub mod account {
    use super::Operation;

    /// Wallet balance for one account type.
    pub const GET_CURRENT_BALANCE: Operation =
        Operation::get("/v5/account/wallet-balance", &["accountType"]);
    /// P2P user profile.
    pub const GET_ACCOUNT_INFORMATION: Operation =
        Operation::post("/v5/p2p/user/personal/info", &[]);
    /// Counterparty profile for an order.
    pub const GET_COUNTERPARTY_INFO: Operation =
        Operation::post("/v5/p2p/user/order/personal/info", &["originalUid", "orderId"]);
    /// Payment methods configured on the account.
    pub const GET_USER_PAYMENT_TYPES: Operation =
        Operation::post("/v5/p2p/user/payment/list", &[]);
}

/// Advertisement endpoints.
pub mod ads {
    use super::Operation;

    /// Public advertisements for a market.
    pub const GET_ONLINE_ADS: Operation =
        Operation::post("/v5/p2p/item/online", &["tokenId", "currencyId", "side"]);
    /// Create an advertisement.
    pub const POST_NEW_AD: Operation = Operation::post(
        "/v5/p2p/item/create",
        &[
            "tokenId",
            "currencyId",
            "side",
            "priceType",
            "premium",
            "price",
            "minAmount",
            "maxAmount",
            "remark",
            "tradingPreferenceSet",
            "paymentIds",
            "quantity",
            "paymentPeriod",
            "itemType",
        ],
    );
    /// Take an advertisement offline.
    pub const REMOVE_AD: Operation = Operation::post("/v5/p2p/item/cancel", &["itemId"]);
    /// Modify or reactivate an advertisement.
    pub const UPDATE_AD: Operation = Operation::post(
        "/v5/p2p/item/update",
        &[
            "id",
            "priceType",
            "premium",
            "price",
            "minAmount",
            "maxAmount",
            "remark",
            "tradingPreferenceSet",
            "paymentIds",
            "actionType",
            "quantity",
            "paymentPeriod",
        ],
    );
    /// The caller's own advertisements.
    pub const GET_ADS_LIST: Operation = Operation::post("/v5/p2p/item/personal/list", &[]);
    /// One advertisement.
    pub const GET_AD_DETAILS: Operation = Operation::post("/v5/p2p/item/info", &["itemId"]);
}

/// Order endpoints.
pub mod orders {
    use super::Operation;

    /// All orders, paginated.
    pub const GET_ORDERS: Operation =
        Operation::post("/v5/p2p/order/simplifyList", &["page", "size"]);
    /// Order detail.
    pub const GET_ORDER_DETAILS: Operation = Operation::post("/v5/p2p/order/info", &["orderId"]);
    /// Orders awaiting action, paginated.
    pub const GET_PENDING_ORDERS: Operation =
        Operation::post("/v5/p2p/order/pending/simplifyList", &["page", "size"]);
    /// Mark an order as paid.
    pub const MARK_AS_PAID: Operation =
        Operation::post("/v5/p2p/order/pay", &["orderId", "paymentType", "paymentId"]);
    /// Release the digital asset to the buyer.
    pub const RELEASE_ASSETS: Operation = Operation::post("/v5/p2p/order/finish", &["orderId"]);
}

/// Order chat endpoints.
pub mod chat {
    use super::Operation;

    /// Send a chat message.
    pub const SEND_CHAT_MESSAGE: Operation = Operation::post(
        "/v5/p2p/order/message/send",
        &["message", "contentType", "orderId"],
    );
    /// Upload a chat attachment.
    pub const UPLOAD_CHAT_FILE: Operation =
        Operation::file("/v5/p2p/oss/upload_file", &["upload_file"]);
    /// Chat history for an order.
    pub const GET_CHAT_MESSAGES: Operation =
        Operation::post("/v5/p2p/order/message/listpage", &["orderId", "size"]);
}
