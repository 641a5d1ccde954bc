//! Check-in URL issuance and recognition.
//!
//! The URL is the payload of the event's QR code. It is derived once at event
//! creation and stays constant for the event's lifetime; the time-window
//! gating of the rendered code is a UI affordance, the URL itself always
//! resolves.
//!
//! The canonical path shape is `/event/{id}/check-in`. Scanners must also
//! recognize the deprecated alias `/event-check-in/{id}`, which older codes
//! may still carry; new codes are only ever issued in the canonical form.

/// Build the canonical check-in URL for an event.
#[must_use]
pub fn check_in_url(origin: &str, event_id: &str) -> String {
    format!("{}/event/{event_id}/check-in", origin.trim_end_matches('/'))
}

/// Extract the event id from a scanned check-in path.
///
/// Accepts the canonical `/event/{id}/check-in` and the deprecated
/// `/event-check-in/{id}` alias. Returns `None` for anything else.
#[must_use]
pub fn parse_check_in_path(path: &str) -> Option<&str> {
    let path = path.trim_end_matches('/');

    if let Some(rest) = path.strip_prefix("/event/") {
        let id = rest.strip_suffix("/check-in")?;
        return (!id.is_empty() && !id.contains('/')).then_some(id);
    }

    // Deprecated alias, kept for codes issued by older builds.
    if let Some(id) = path.strip_prefix("/event-check-in/") {
        return (!id.is_empty() && !id.contains('/')).then_some(id);
    }

    None
}
