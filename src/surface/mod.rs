// Transport-specific adapters over the shared auth resolver: the RPC
// interceptor, the page-navigation redirect gate, and the typed caller
// extractor.

mod extract;
mod interceptor;
mod redirect;

pub use extract::Caller;
pub use interceptor::{attach_identity, throttle, track_requests};
pub use redirect::{redirect_gate, AUTH_PAGE};
