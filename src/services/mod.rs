//! External collaborators: market data in, notifications out.

pub mod coingecko;
pub mod error;
pub mod market_data;
pub mod notifier;
pub mod telegram;

pub use coingecko::CoinGeckoClient;
pub use error::{DataError, NotifyError};
pub use market_data::{MarketDataProvider, StaticAsset, StaticMarketDataProvider};
pub use notifier::{LogNotifier, Notifier};
pub use telegram::TelegramNotifier;
