//! JSONL request dispatch for the protocol session.
//!
//! ## Protocol
//!
//! Clients write one JSON object per line. The `command` key names the
//! operation and the remaining keys are its arguments:
//!
//! ```json
//! {"command":"open","version":"0.1"}
//! {"command":"setdir","mode":"local","directory":"/home/me/project"}
//! {"command":"xrun","transformation":"rename","textselection":{"filename":"foo.go","startline":3,"startcol":6,"endline":3,"endcol":9},"arguments":["bar"]}
//! ```
//!
//! Every request receives exactly one reply line whose `reply` key is `OK` or
//! `Error`:
//!
//! ```json
//! {"reply":"OK","description":"Rename","log":[],"files":[{"filename":"foo.go","patchFile":"foo.go.diff"}]}
//! ```
//!
//! Failed requests never end the loop; only `close`, EOF or a broken output
//! stream do.

mod errors;
mod handler;
mod request;
mod response;
mod router;
pub mod xrun;

pub use self::errors::DispatchError;
pub use self::handler::Dispatcher;
pub use self::request::CommandRequest;
pub use self::response::{
    FileChange, FsChange, LogLine, Reply, ResponseWriter, TransformationSummary, severity_label,
};
pub use self::router::{Command, CommandRouter, DispatchResult, PROTOCOL_VERSION};
