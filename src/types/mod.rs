pub mod ohlcv;
pub mod signals;
pub mod timeframe;
pub mod trade;

pub use ohlcv::*;
pub use signals::*;
pub use timeframe::*;
pub use trade::*;
