//! Session id generation

use tracing::debug;
use uuid::Uuid;

/// Generate a short opaque session id, e.g. `proj-0193bfa2c1d4`
///
/// Session ids are the unit of identity for one end-to-end pipeline run.
/// Restarting a pipeline means generating a fresh id; ids are never reused.
pub fn generate_session_id() -> String {
    let uuid = Uuid::now_v7().simple().to_string();
    let id = format!("proj-{}", &uuid[..12]);
    debug!(%id, "generate_session_id: called");
    id
}
