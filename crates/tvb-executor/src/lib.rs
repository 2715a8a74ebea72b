//! Order execution for the signal bridge.
//!
//! Turns an authenticated signal into a signed Bitget order and hands it to
//! a dispatcher:
//! - `OrderBuilder`: mapping + amount resolution into a `NormalizedOrder`
//! - `RequestSigner`: HMAC-SHA256 over `timestamp + METHOD + path + body`
//! - `OrderDispatcher`: transport boundary (reqwest in production, mock in tests)
//! - `SignalRelay`: the one-shot pipeline tying it all together

pub mod builder;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod relay;
pub mod signer;

pub use builder::OrderBuilder;
pub use config::{ExchangeConfig, OperatingMode, OrderProfile};
pub use credentials::ExchangeCredentials;
pub use dispatcher::{
    AuthHeaders, BoxFuture, DispatchRequest, DispatchResponse, DynDispatcher, HttpDispatcher,
    MockDispatcher, OrderDispatcher,
};
pub use error::{ExecutorError, ExecutorResult, RelayError};
pub use relay::{RelayConfig, RelayOutcome, SignalRelay};
pub use signer::{sign, RequestSigner, SignatureEncoding, SignedRequest};
