use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs private exchange requests with the `CB-ACCESS-*` header scheme.
///
/// The prehash string is `timestamp + METHOD + request_path + body`, keyed
/// with the base64-decoded secret; the digest is sent base64-encoded.
#[derive(Clone)]
pub struct RequestSigner {
    api_key: String,
    /// Keyed with the decoded secret, cloned per request
    mac: HmacSha256,
    passphrase: String,
}

impl RequestSigner {
    pub fn new(api_key: &str, api_secret: &str, passphrase: &str) -> Result<Self> {
        let secret = STANDARD
            .decode(api_secret.trim())
            .context("Exchange API secret is not valid base64")?;
        if secret.is_empty() {
            anyhow::bail!("Exchange API secret is empty");
        }
        let mac = HmacSha256::new_from_slice(&secret)
            .map_err(|e| anyhow!("Exchange API secret is not a usable HMAC key: {}", e))?;

        Ok(Self {
            api_key: api_key.to_string(),
            mac,
            passphrase: passphrase.to_string(),
        })
    }

    pub fn sign(&self, timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(timestamp.as_bytes());
        mac.update(method.to_uppercase().as_bytes());
        mac.update(request_path.as_bytes());
        mac.update(body.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Header set for one request
    pub fn headers(
        &self,
        timestamp: &str,
        method: &str,
        request_path: &str,
        body: &str,
    ) -> [(&'static str, String); 4] {
        [
            ("CB-ACCESS-KEY", self.api_key.clone()),
            (
                "CB-ACCESS-SIGN",
                self.sign(timestamp, method, request_path, body),
            ),
            ("CB-ACCESS-TIMESTAMP", timestamp.to_string()),
            ("CB-ACCESS-PASSPHRASE", self.passphrase.clone()),
        ]
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
