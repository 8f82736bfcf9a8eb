//! Session and user endpoints: token exchange, renewal, invalidation,
//! profile, funds & margins.

use serde::de::IgnoredAny;
use sha2::{Digest, Sha256};

use crate::api::pairs;
use crate::client::{KiteClient, endpoint};
use crate::constants::endpoints;
use crate::error::Result;
use crate::types::enums::MarginSegment;
use crate::types::user::*;

/// `hex(sha256(api_key + token + api_secret))`, the checksum the session
/// endpoints expect.
pub fn checksum(api_key: &str, token: &str, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(token.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

impl KiteClient {
    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Exchange the `request_token` obtained from the login redirect for a
    /// session. The returned access token is installed on this client.
    ///
    /// **Endpoint:** `POST /session/token`
    pub async fn generate_session(&mut self, request_token: &str, api_secret: &str) -> Result<UserSession> {
        let sum = checksum(self.api_key(), request_token, api_secret);
        let params = pairs(&[
            ("api_key", self.api_key()),
            ("request_token", request_token),
            ("checksum", &sum),
        ]);

        let session: UserSession = self.post(endpoints::USER_SESSION, &params).await?;
        if !session.access_token.is_empty() {
            self.set_access_token(session.access_token.clone());
        }
        tracing::info!(user_id = %session.user_id, "session established");
        Ok(session)
    }

    /// Obtain a fresh access token with a refresh token. The new access token
    /// is installed on this client.
    ///
    /// **Endpoint:** `POST /session/refresh_token`
    pub async fn renew_access_token(&mut self, refresh_token: &str, api_secret: &str) -> Result<UserSessionTokens> {
        let sum = checksum(self.api_key(), refresh_token, api_secret);
        let params = pairs(&[
            ("api_key", self.api_key()),
            ("refresh_token", refresh_token),
            ("checksum", &sum),
        ]);

        let tokens: UserSessionTokens = self.post(endpoints::USER_SESSION_RENEW, &params).await?;
        if !tokens.access_token.is_empty() {
            self.set_access_token(tokens.access_token.clone());
        }
        Ok(tokens)
    }

    /// Log out the current access token. Returns `true` on success.
    ///
    /// **Endpoint:** `DELETE /session/token`
    pub async fn invalidate_access_token(&self) -> Result<bool> {
        self.invalidate_token("access_token", self.access_token()).await
    }

    /// Revoke a refresh token. Returns `true` on success.
    ///
    /// **Endpoint:** `DELETE /session/token`
    pub async fn invalidate_refresh_token(&self, refresh_token: &str) -> Result<bool> {
        self.invalidate_token("refresh_token", refresh_token).await
    }

    async fn invalidate_token(&self, kind: &str, token: &str) -> Result<bool> {
        let params = pairs(&[("api_key", self.api_key()), (kind, token)]);
        self.delete::<IgnoredAny>(endpoints::USER_SESSION_INVALIDATE, &params)
            .await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // User
    // -----------------------------------------------------------------------

    /// Retrieve the user's profile.
    ///
    /// **Endpoint:** `GET /user/profile`
    pub async fn get_user_profile(&self) -> Result<UserProfile> {
        self.get(endpoints::USER_PROFILE, &[]).await
    }

    /// Retrieve funds and margins for all segments.
    ///
    /// **Endpoint:** `GET /user/margins`
    pub async fn get_user_margins(&self) -> Result<AllMargins> {
        self.get(endpoints::USER_MARGINS, &[]).await
    }

    /// Retrieve funds and margins for one segment.
    ///
    /// **Endpoint:** `GET /user/margins/{segment}`
    pub async fn get_user_segment_margins(&self, segment: MarginSegment) -> Result<Margins> {
        let path = endpoint(endpoints::USER_MARGINS_SEGMENT, &[segment.as_str().into()])?;
        self.get(&path, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_sha256_hex_of_the_concatenation() {
        assert_eq!(
            checksum("a", "b", "c"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
