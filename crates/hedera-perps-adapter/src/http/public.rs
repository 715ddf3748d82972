/*
[INPUT]:  Market query parameters
[OUTPUT]: Market configuration and order book depth
[POS]:    HTTP layer - public market endpoints (no auth)
[UPDATE]: When adding market endpoints or changing query parameters
*/

use reqwest::Method;

use crate::http::{PerpsClient, Result};
use crate::types::{DepthSnapshot, MarketInfo};

impl PerpsClient {
    /// Market configuration: treasury, settlement token, decimals
    ///
    /// GET /api/v1/market/info
    pub async fn market_info(&self) -> Result<MarketInfo> {
        let builder = self.request(Method::GET, "/api/v1/market/info")?;
        self.send_json(builder).await
    }

    /// Aggregated order book depth
    ///
    /// GET /api/v1/market/depth?levels={levels}
    pub async fn market_depth(&self, levels: u32) -> Result<DepthSnapshot> {
        let builder = self
            .request(Method::GET, "/api/v1/market/depth")?
            .query(&[("levels", levels)]);
        self.send_json(builder).await
    }
}
