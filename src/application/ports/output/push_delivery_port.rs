/*
Push Delivery Port

The transport that delivers one push message to one device token. Each call is
a single attempt; retry policy, if any, belongs to the caller.
*/

use async_trait::async_trait;

pub use crate::domain::entities::dispatch::{DeliveryReceipt, DispatchError, PushMessage};

#[async_trait]
pub trait PushDeliveryPort: Send + Sync {
    /// Send `message` to `message.token` and return the transport's receipt.
    async fn send(&self, message: &PushMessage) -> Result<DeliveryReceipt, DispatchError>;
}
