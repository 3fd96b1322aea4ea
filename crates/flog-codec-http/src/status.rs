//! The fixed status-line table an `HttpResponse` serializes against
//!, ported verbatim from the original `HTTPResponse::serialize`
//! switch. Codes outside this table fall back to `500 Internal Server
//! Error`, matching the original's `default:` arm.

/// Returns `(status line bytes including "HTTP/1.1 " prefix and trailing
/// CRLF, reason phrase alone)` for `code`, or the `500` fallback if `code`
/// is not one of the fixed set the original recognises.
pub fn status_line_and_reason(code: u16) -> (&'static str, &'static str) {
    match code {
        100 => ("HTTP/1.1 100 Continue\r\n", "Continue"),
        200 => ("HTTP/1.1 200 OK\r\n", "OK"),
        201 => ("HTTP/1.1 201 Created\r\n", "Created"),
        202 => ("HTTP/1.1 202 Accepted\r\n", "Accepted"),
        203 => ("HTTP/1.1 203 Non-Authoritative Information\r\n", "Non-Authoritative Information"),
        204 => ("HTTP/1.1 204 No Content\r\n", "No Content"),
        205 => ("HTTP/1.1 205 Reset Content\r\n", "Reset Content"),
        206 => ("HTTP/1.1 206 Partial Content\r\n", "Partial Content"),
        207 => ("HTTP/1.1 207 Multi-Status\r\n", "Multi-Status"),
        300 => ("HTTP/1.1 300 Multiple Choices\r\n", "Multiple Choices"),
        301 => ("HTTP/1.1 301 Moved Permanently\r\n", "Moved Permanently"),
        302 => ("HTTP/1.1 302 Found\r\n", "Found"),
        303 => ("HTTP/1.1 303 See Other\r\n", "See Other"),
        304 => ("HTTP/1.1 304 Not Modified\r\n", "Not Modified"),
        305 => ("HTTP/1.1 305 Use Proxy\r\n", "Use Proxy"),
        307 => ("HTTP/1.1 307 Temporary Redirect\r\n", "Temporary Redirect"),
        400 => ("HTTP/1.1 400 Bad Request\r\n", "Bad Request"),
        401 => ("HTTP/1.1 401 Unauthorized\r\n", "Unauthorized"),
        403 => ("HTTP/1.1 403 Forbidden\r\n", "Forbidden"),
        404 => ("HTTP/1.1 404 Not Found\r\n", "Not Found"),
        405 => ("HTTP/1.1 405 Method Not Allowed\r\n", "Method Not Allowed"),
        406 => ("HTTP/1.1 406 Not Acceptable\r\n", "Not Acceptable"),
        407 => ("HTTP/1.1 407 Proxy Authentication Required\r\n", "Proxy Authentication Required"),
        408 => ("HTTP/1.1 408 Request Timeout\r\n", "Request Timeout"),
        409 => ("HTTP/1.1 409 Conflict\r\n", "Conflict"),
        410 => ("HTTP/1.1 410 Gone\r\n", "Gone"),
        411 => ("HTTP/1.1 411 Length Required\r\n", "Length Required"),
        412 => ("HTTP/1.1 412 Precondition Failed\r\n", "Precondition Failed"),
        413 => ("HTTP/1.1 413 Request Entity Too Large\r\n", "Request Entity Too Large"),
        414 => ("HTTP/1.1 414 Request-URI Too Long\r\n", "Request-URI Too Long"),
        415 => ("HTTP/1.1 415 Unsupported Media Type\r\n", "Unsupported Media Type"),
        416 => ("HTTP/1.1 416 Request Range Not Satisfiable\r\n", "Request Range Not Satisfiable"),
        417 => ("HTTP/1.1 417 Expectation Failed\r\n", "Expectation Failed"),
        422 => ("HTTP/1.1 422 Unprocessable Entity\r\n", "Unprocessable Entity"),
        423 => ("HTTP/1.1 423 Locked\r\n", "Locked"),
        424 => ("HTTP/1.1 424 Failed Dependency\r\n", "Failed Dependency"),
        500 => ("HTTP/1.1 500 Internal Server Error\r\n", "Internal Server Error"),
        501 => ("HTTP/1.1 501 Not Implemented\r\n", "Not Implemented"),
        502 => ("HTTP/1.1 502 Bad Gateway\r\n", "Bad Gateway"),
        503 => ("HTTP/1.1 503 Service Unavailable\r\n", "Service Unavailable"),
        504 => ("HTTP/1.1 504 Gateway Timeout\r\n", "Gateway Timeout"),
        505 => ("HTTP/1.1 505 HTTP Version Not Supported\r\n", "HTTP Version Not Supported"),
        507 => ("HTTP/1.1 507 Insufficient Storage\r\n", "Insufficient Storage"),
        _ => ("HTTP/1.1 500 Internal Server Error\r\n", "Internal Server Error"),
    }
}

/// `true` if `atoi`-style status code parsing failed or produced zero, the
/// original's signal to fall back to 500 (`if (status_code == 0) status_code
/// = 500;`).
pub fn normalize_parsed_status_code(parsed: Option<u16>) -> u16 {
    match parsed {
        Some(0) | None => 500,
        Some(code) => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code_returns_its_status_line() {
        let (line, reason) = status_line_and_reason(404);
        assert_eq!(line, "HTTP/1.1 404 Not Found\r\n");
        assert_eq!(reason, "Not Found");
    }

    #[test]
    fn unknown_code_falls_back_to_500() {
        let (line, reason) = status_line_and_reason(999);
        assert_eq!(line, "HTTP/1.1 500 Internal Server Error\r\n");
        assert_eq!(reason, "Internal Server Error");
    }

    #[test]
    fn zero_or_unparseable_status_normalizes_to_500() {
        assert_eq!(normalize_parsed_status_code(Some(0)), 500);
        assert_eq!(normalize_parsed_status_code(None), 500);
        assert_eq!(normalize_parsed_status_code(Some(204)), 204);
    }
}
