use crate::types::OwnedRequest;

/// Serialize an [`OwnedRequest`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(request: &OwnedRequest, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(request).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(request).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render an [`OwnedRequest`] in a human-readable debug format.
pub fn format_debug(request: &OwnedRequest) -> String {
    let mut out = String::with_capacity(256);

    out.push_str("=== HTTP Request ===\n");
    out.push_str(&format!("Method:  {}\n", request.method));
    out.push_str(&format!("Target:  {}\n", request.target));
    out.push_str(&format!(
        "Version: HTTP/{}.{}\n",
        request.version_major, request.version_minor
    ));
    out.push_str(&format!("Keep-Alive: {}\n", request.keep_alive));

    out.push_str(&format!("\n--- Headers ({}) ---\n", request.headers.len()));
    for header in &request.headers {
        out.push_str(&format!("  {}: {}\n", header.name, header.value));
    }

    if !request.trailers.is_empty() {
        out.push_str(&format!("\n--- Trailers ({}) ---\n", request.trailers.len()));
        for trailer in &request.trailers {
            out.push_str(&format!("  {}: {}\n", trailer.name, trailer.value));
        }
    }

    if request.body.is_empty() {
        out.push_str("\n--- No Body ---\n");
    } else {
        out.push_str(&format!("\n--- Body ({} bytes) ---\n", request.body.len()));
        out.push_str(&String::from_utf8_lossy(&request.body));
        out.push('\n');
    }

    out.push_str("====================\n");
    out
}

/// Render only the request line and headers (no body, no trailers).
pub fn format_headers_only(request: &OwnedRequest) -> String {
    let mut out = String::with_capacity(64 + request.headers.len() * 40);

    out.push_str(&format!(
        "{} {} HTTP/{}.{}\n",
        request.method, request.target, request.version_major, request.version_minor
    ));

    for header in &request.headers {
        out.push_str(&format!("{}: {}\n", header.name, header.value));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_request;

    #[test]
    fn json_round_trips_through_serde() {
        let raw = b"GET /x HTTP/1.1\r\nHost: h\r\n\r\n";
        let req = parse_request(raw).unwrap();
        let json = format_json(&req, false);
        assert!(json.contains("\"method\":\"GET\""));
    }

    #[test]
    fn debug_format_reports_no_body() {
        let raw = b"GET /x HTTP/1.1\r\nHost: h\r\n\r\n";
        let req = parse_request(raw).unwrap();
        let rendered = format_debug(&req);
        assert!(rendered.contains("No Body"));
    }

    #[test]
    fn headers_only_omits_body() {
        let raw = b"POST /x HTTP/1.1\r\nHost: h\r\nContent-Length: 2\r\n\r\nhi";
        let req = parse_request(raw).unwrap();
        let rendered = format_headers_only(&req);
        assert!(!rendered.contains("hi"));
        assert!(rendered.starts_with("POST /x HTTP/1.1\n"));
    }
}
