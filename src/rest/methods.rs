//! One method per P2P operation.
//!
//! Each method forwards its parameters to [`P2pClient::call`] with the
//! matching catalog entry, so required-parameter checks, signing and error
//! handling are identical across operations. Successful calls return the
//! full response envelope (`retCode`, `retMsg`, `result`, ...).

use serde_json::Value;

use crate::error::P2pError;
use crate::params::Params;
use crate::rest::P2pClient;
use crate::rest::canonical::FilePart;
use crate::rest::endpoints::{account, ads, chat, orders};

impl P2pClient {
    // ========== Account ==========

    /// Get the wallet balance for an account type.
    ///
    /// Required: `accountType`. Optional: `coin`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::sync::Arc;
    ///
    /// use bybit_p2p::Params;
    /// use bybit_p2p::auth::StaticCredentials;
    /// use bybit_p2p::rest::P2pClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let credentials = Arc::new(StaticCredentials::new("key", "secret"));
    ///     let client = P2pClient::new(credentials);
    ///
    ///     let response = client
    ///         .get_current_balance(Params::new().with("accountType", "FUND").with("coin", "USDT"))
    ///         .await?;
    ///     println!("{}", response["result"]);
    ///     Ok(())
    /// }
    /// ```
    pub async fn get_current_balance(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&account::GET_CURRENT_BALANCE, params).await
    }

    /// Get the P2P profile of the calling account.
    pub async fn get_account_information(&self) -> Result<Value, P2pError> {
        self.call(&account::GET_ACCOUNT_INFORMATION, Params::new()).await
    }

    /// Get the profile of an order's counterparty.
    ///
    /// Required: `originalUid`, `orderId`.
    pub async fn get_counterparty_info(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&account::GET_COUNTERPARTY_INFO, params).await
    }

    /// List the payment methods configured on the account.
    pub async fn get_user_payment_types(&self) -> Result<Value, P2pError> {
        self.call(&account::GET_USER_PAYMENT_TYPES, Params::new()).await
    }

    // ========== Advertisements ==========

    /// List public advertisements for a market.
    ///
    /// Required: `tokenId`, `currencyId`, `side`.
    pub async fn get_online_ads(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&ads::GET_ONLINE_ADS, params).await
    }

    /// Publish a new advertisement.
    pub async fn post_new_ad(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&ads::POST_NEW_AD, params).await
    }

    /// Take an advertisement offline.
    ///
    /// Required: `itemId`.
    pub async fn remove_ad(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&ads::REMOVE_AD, params).await
    }

    /// Modify, or reactivate, an advertisement.
    ///
    /// `actionType` is `MODIFY` or `ACTIVE`.
    pub async fn update_ad(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&ads::UPDATE_AD, params).await
    }

    /// List the caller's own advertisements.
    ///
    /// All filters are optional.
    pub async fn get_ads_list(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&ads::GET_ADS_LIST, params).await
    }

    /// Get one advertisement.
    ///
    /// Required: `itemId`.
    pub async fn get_ad_details(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&ads::GET_AD_DETAILS, params).await
    }

    // ========== Orders ==========

    /// List orders.
    ///
    /// Required: `page`, `size`. Optional filters: `status`, `beginTime`,
    /// `endTime`, `tokenId`, `side`.
    pub async fn get_orders(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&orders::GET_ORDERS, params).await
    }

    /// Get one order.
    ///
    /// Required: `orderId`.
    pub async fn get_order_details(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&orders::GET_ORDER_DETAILS, params).await
    }

    /// List orders awaiting action.
    ///
    /// Required: `page`, `size`.
    pub async fn get_pending_orders(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&orders::GET_PENDING_ORDERS, params).await
    }

    /// Mark an order as paid.
    ///
    /// Required: `orderId`, `paymentType`, `paymentId`.
    pub async fn mark_as_paid(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&orders::MARK_AS_PAID, params).await
    }

    /// Release the digital asset to the buyer.
    ///
    /// Required: `orderId`.
    pub async fn release_assets(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&orders::RELEASE_ASSETS, params).await
    }

    // ========== Chat ==========

    /// Send a chat message on an order.
    ///
    /// Required: `message`, `contentType`, `orderId`. `msgUuid` is optional.
    pub async fn send_chat_message(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&chat::SEND_CHAT_MESSAGE, params).await
    }

    /// Upload a chat attachment from disk.
    ///
    /// Required: `upload_file`, the path of the file. The returned URL can be
    /// sent with [`send_chat_message`](Self::send_chat_message).
    pub async fn upload_chat_file(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&chat::UPLOAD_CHAT_FILE, params).await
    }

    /// Upload a chat attachment held in memory.
    pub async fn upload_chat_file_bytes(
        &self,
        filename: impl Into<String>,
        data: Vec<u8>,
    ) -> Result<Value, P2pError> {
        self.call_with_file(&chat::UPLOAD_CHAT_FILE, FilePart::new(filename, data)).await
    }

    /// Get the chat history of an order.
    ///
    /// Required: `orderId`, `size`. `currentPage` is optional.
    pub async fn get_chat_messages(&self, params: Params) -> Result<Value, P2pError> {
        self.call(&chat::GET_CHAT_MESSAGES, params).await
    }
}
