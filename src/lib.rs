//! Parse copied `curl` command lines into structured HTTP requests.
//!
//! ```
//! let curl = curlreq::parse("curl -X POST -d 'a=1' -d 'b=2' http://x/y").unwrap();
//! assert_eq!(curl.method, "POST");
//! assert_eq!(curl.header("Content-Type"), Some("application/x-www-form-urlencoded"));
//! ```

pub mod auth;
pub mod body;
pub mod cookie;
pub mod curl;
pub mod error;
pub mod files;
pub mod uri;

mod log;
#[cfg(test)]
mod test_util;

pub use auth::{AuthType, Authentication};
pub use body::{Body, BodyKind, Payload};
pub use cookie::{CookieEntry, CookieJar};
pub use curl::dialect::Dialect;
pub use curl::lexer::{Token, tokenize};
pub use curl::options::{OptionSpec, Registry};
pub use curl::parser::{Parser, parse, parse_bash, parse_cmd};
pub use curl::{Curl, HeaderMap, TransferConfig};
pub use error::{Error, Result};
pub use files::{FsReader, MemoryReader, PayloadReader};
