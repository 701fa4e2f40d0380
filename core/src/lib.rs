//! Typed, synchronous client for the Telegram Bot API.
//!
//! # Overview
//! Maps Bot API methods to typed requests and typed response envelopes.
//! `BotClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern); `Bot` pairs it with a
//! `Transport` to perform the round-trip.
//!
//! # Design
//! - Every call is a single stateless request/response. No retries, no
//!   polling loop, no caching.
//! - Application failures come back as `Envelope { ok: false, .. }`; only
//!   transport and decoding failures are `ClientError`s.
//! - Each method has a typed function with a statically declared result
//!   shape; `Bot::invoke` covers the rest.
//! - `Configuration` layers call-level over client-level over defaults.
//!
//! ```no_run
//! use tgbot_core::{Bot, GetUpdates};
//!
//! # fn main() -> Result<(), tgbot_core::ClientError> {
//! let bot = Bot::new("123456:ABC-DEF1234ghIkl")?;
//! let me = bot.get_me()?;
//! if let Some(user) = me.result {
//!     println!("running as @{}", user.username.unwrap_or_default());
//! }
//! let updates = bot.get_updates(&GetUpdates::default())?;
//! println!("{} pending updates", updates.result.map_or(0, |u| u.len()));
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod methods;
pub mod token;
pub mod transport;
pub mod types;

pub use bot::Bot;
pub use client::{BotClient, DEFAULT_BASE_URL};
pub use config::{Configuration, ResolvedConfiguration};
pub use envelope::{Envelope, ResponseParameters};
pub use error::{ApiFailure, ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use methods::{ChatId, GetFile, GetUpdates, Params, ParseMode, SendMessage};
pub use token::{mask_token, Token};
pub use transport::{Transport, UreqTransport};
pub use types::{Chat, ChatType, File, Message, Update, User};
