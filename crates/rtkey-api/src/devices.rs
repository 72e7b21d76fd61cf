// Household API device endpoints

use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::{ActionResponse, RtkeyClient};
use crate::error::Error;

impl RtkeyClient {
    /// List intercom and gate devices as raw JSON.
    ///
    /// `GET {household}/devices/intercom`
    pub async fn list_devices(&self) -> Result<Value, Error> {
        let url = self.household(&["devices", "intercom"])?;
        debug!("listing devices");
        self.fetch_json(url, &[], self.transport().request_timeout)
            .await
    }

    /// Status code of the device listing, without parsing its body.
    pub async fn device_listing_status(&self) -> Result<StatusCode, Error> {
        let url = self.household(&["devices", "intercom"])?;
        self.fetch_status(url, self.transport().request_timeout)
            .await
    }

    /// Ask the device to open its door or gate.
    ///
    /// `POST {household}/devices/{id}/open` with an empty JSON object.
    pub async fn open_device(&self, device_id: &str) -> Result<ActionResponse, Error> {
        let url = self.household(&["devices", device_id, "open"])?;
        debug!(device_id, "sending open command");
        self.post_action(url, &json!({}), self.transport().request_timeout)
            .await
    }
}
