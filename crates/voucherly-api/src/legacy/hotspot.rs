// Legacy API hotspot endpoints
//
// Voucher management via stat/voucher (read) and cmd/hotspot (commands),
// plus the guest authorization list from stat/guest.

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::{LegacyGuest, LegacyVoucher, LegacyVoucherBatch};

/// Body for `cmd/hotspot` `create-voucher`.
///
/// Limits are left out of the body when unset.
#[derive(Debug, Clone, Serialize)]
pub struct CreateVoucherCommand {
    /// Validity in minutes once redeemed.
    pub expire: u32,
    /// Number of vouchers to create.
    pub n: u32,
    /// 0 = unlimited, 1 = single-use, n = n guests.
    pub quota: u32,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down: Option<u32>,
    /// Data cap in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u32>,
}

impl LegacyClient {
    /// List all vouchers on the site.
    ///
    /// `GET /api/s/{site}/stat/voucher`
    pub async fn list_vouchers(&self) -> Result<Vec<LegacyVoucher>, Error> {
        let url = self.site_url("stat/voucher")?;
        debug!("listing vouchers");
        self.get(url).await
    }

    /// List the vouchers created in one batch.
    ///
    /// `POST /api/s/{site}/stat/voucher` with `{"create_time": ...}`
    pub async fn vouchers_created_at(&self, create_time: i64) -> Result<Vec<LegacyVoucher>, Error> {
        let url = self.site_url("stat/voucher")?;
        debug!(create_time, "listing voucher batch");
        self.post(url, &json!({ "create_time": create_time })).await
    }

    /// Create a batch of vouchers. Returns the batch `create_time`.
    ///
    /// `POST /api/s/{site}/cmd/hotspot` with `{"cmd": "create-voucher", ...}`
    pub async fn create_vouchers(&self, command: &CreateVoucherCommand) -> Result<i64, Error> {
        let url = self.site_url("cmd/hotspot")?;
        debug!(count = command.n, expire = command.expire, "creating vouchers");

        let mut body = serde_json::to_value(command).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;
        if let Some(obj) = body.as_object_mut() {
            obj.insert("cmd".into(), "create-voucher".into());
        }

        let batches: Vec<LegacyVoucherBatch> = self.post(url, &body).await?;
        batches
            .first()
            .map(|b| b.create_time)
            .ok_or_else(|| Error::LegacyApi {
                message: "create-voucher returned no batch".into(),
            })
    }

    /// Revoke a voucher.
    ///
    /// `POST /api/s/{site}/cmd/hotspot` with `{"cmd": "delete-voucher", "_id": "..."}`
    pub async fn delete_voucher(&self, id: &str) -> Result<(), Error> {
        let url = self.site_url("cmd/hotspot")?;
        debug!(id, "deleting voucher");
        let _: Vec<serde_json::Value> = self
            .post(
                url,
                &json!({
                    "cmd": "delete-voucher",
                    "_id": id,
                }),
            )
            .await?;
        Ok(())
    }

    /// List guest authorizations.
    ///
    /// `GET /api/s/{site}/stat/guest`
    pub async fn list_guests(&self) -> Result<Vec<LegacyGuest>, Error> {
        let url = self.site_url("stat/guest")?;
        debug!("listing guests");
        self.get(url).await
    }
}
