//! Link probes: HTTP reachability, media metadata extraction, and the merge
//! of the two into a single verdict.

pub mod http;
pub mod media;
pub mod merge;
pub mod result;

pub use http::{probe_http, HttpProbeConfig};
pub use media::{probe_media, MediaProbeOutcome};
pub use merge::{merge, Verdict};
pub use result::{ProbeKind, ProbeResult};
