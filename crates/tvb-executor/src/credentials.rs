//! Exchange API credentials.
//!
//! Security notes:
//! - Values live in `Zeroizing` buffers and are wiped on drop.
//! - `Debug` never prints them.
//! - Missing credentials are reported by name only.

use std::fmt;
use zeroize::Zeroizing;

/// API key, secret and passphrase for the exchange account.
#[derive(Default, Clone)]
pub struct ExchangeCredentials {
    api_key: Option<Zeroizing<String>>,
    api_secret: Option<Zeroizing<String>>,
    passphrase: Option<Zeroizing<String>>,
}

/// A complete credential set, borrowed from `ExchangeCredentials`.
pub struct ApiKeys<'a> {
    pub api_key: &'a str,
    pub api_secret: &'a Zeroizing<String>,
    pub passphrase: &'a str,
}

impl ExchangeCredentials {
    /// Blank values count as missing.
    pub fn new(
        api_key: Option<String>,
        api_secret: Option<String>,
        passphrase: Option<String>,
    ) -> Self {
        fn keep(value: Option<String>) -> Option<Zeroizing<String>> {
            let value = Zeroizing::new(value?);
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Zeroizing::new(trimmed.to_string()))
            }
        }

        Self {
            api_key: keep(api_key),
            api_secret: keep(api_secret),
            passphrase: keep(passphrase),
        }
    }

    /// Names of the credentials that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push("api_key");
        }
        if self.api_secret.is_none() {
            missing.push("api_secret");
        }
        if self.passphrase.is_none() {
            missing.push("passphrase");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// All three credentials, or the names of the missing ones.
    pub fn keys(&self) -> Result<ApiKeys<'_>, Vec<&'static str>> {
        match (&self.api_key, &self.api_secret, &self.passphrase) {
            (Some(api_key), Some(api_secret), Some(passphrase)) => Ok(ApiKeys {
                api_key: api_key.as_str(),
                api_secret,
                passphrase: passphrase.as_str(),
            }),
            _ => Err(self.missing()),
        }
    }
}

impl fmt::Debug for ExchangeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeCredentials")
            .field("api_key_set", &self.api_key.is_some())
            .field("api_secret_set", &self.api_secret.is_some())
            .field("passphrase_set", &self.passphrase.is_some())
            .finish()
    }
}
