//! Outbound side of Herald: the delivery capability, its Telegram
//! implementation, and the dispatcher that fans one message out to many groups.

pub mod delivery;
pub mod dispatcher;
pub mod telegram;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use delivery::{Deliver, DeliveryError};
pub use dispatcher::{BroadcastReport, DispatchError, Dispatcher};
pub use telegram::TelegramBot;
