//! 거래소 계정으로부터 kline provider를 생성하는 팩토리.
//!
//! 수집기와 유지보수 워커가 계정 레코드만으로 적절한 커넥터를
//! 얻을 수 있도록 거래소 이름 기반 디스패치를 제공한다.

use std::sync::Arc;

use bridge_core::{ExchangeAccount, KlineProvider};

use crate::connector::{BinanceClient, BingxClient, BybitClient};
use crate::ExchangeError;

/// provider 생성 추상화. 테스트에서 mock provider 주입에 사용.
pub trait ProviderFactory: Send + Sync {
    fn create(&self, account: &ExchangeAccount) -> Result<Arc<dyn KlineProvider>, ExchangeError>;
}

/// 실거래소 커넥터를 생성하는 기본 팩토리.
pub struct LiveProviderFactory;

impl ProviderFactory for LiveProviderFactory {
    fn create(&self, account: &ExchangeAccount) -> Result<Arc<dyn KlineProvider>, ExchangeError> {
        match account.exchange_name.to_lowercase().as_str() {
            "bybit" => Ok(Arc::new(BybitClient::new())),
            "binance" => Ok(Arc::new(BinanceClient::new())),
            "bingx" => Ok(Arc::new(BingxClient::new())),
            other => Err(ExchangeError::UnknownExchange(other.to_string())),
        }
    }
}
