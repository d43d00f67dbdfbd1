// Minimal HTTP/1.1 request decoding and response encoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use super::{NetworkError, Result, MAX_REQUEST_SIZE};

const HEADER_END: &[u8] = b"\r\n\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Percent-decoded path without the query string
    pub path: String,
    /// Percent-decoded query parameters in request order
    pub query: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpRequest {
    /// First value of a query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Decode one request from the front of `buf`.
    ///
    /// Returns `Ok(None)` until the head and the `Content-Length` body have
    /// fully arrived; the consumed bytes are removed from `buf`.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<HttpRequest>> {
        let Some(head_len) = find_header_end(buf) else {
            if buf.len() > MAX_REQUEST_SIZE {
                return Err(NetworkError::RequestTooLarge {
                    limit: MAX_REQUEST_SIZE,
                });
            }
            return Ok(None);
        };

        let head = std::str::from_utf8(&buf[..head_len])
            .map_err(|_| NetworkError::InvalidRequest("request head is not UTF-8".to_string()))?;
        let mut lines = head.split("\r\n");

        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(NetworkError::InvalidRequest(format!(
                "malformed request line: {}",
                request_line
            )));
        };
        if !version.starts_with("HTTP/1.") {
            return Err(NetworkError::InvalidRequest(format!(
                "unsupported version {}",
                version
            )));
        }

        let mut content_length = 0usize;
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                return Err(NetworkError::InvalidRequest(format!(
                    "malformed header: {}",
                    line
                )));
            };
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| {
                    NetworkError::InvalidRequest(format!("bad Content-Length: {}", value.trim()))
                })?;
            }
        }

        let total = content_length
            .checked_add(head_len + HEADER_END.len())
            .filter(|total| *total <= MAX_REQUEST_SIZE)
            .ok_or(NetworkError::RequestTooLarge {
                limit: MAX_REQUEST_SIZE,
            })?;
        if buf.len() < total {
            return Ok(None);
        }

        let method = Method::parse(method);
        let (raw_path, raw_query) = target.split_once('?').unwrap_or((target, ""));
        let path = percent_decode(raw_path)?;
        let query = parse_query(raw_query)?;

        let mut frame = buf.split_to(total);
        let body = frame.split_off(head_len + HEADER_END.len()).freeze();

        Ok(Some(HttpRequest {
            method,
            path,
            query,
            body,
        }))
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADER_END.len())
        .position(|window| window == HEADER_END)
}

fn parse_query(raw: &str) -> Result<Vec<(String, String)>> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((percent_decode(key)?, percent_decode(value)?))
        })
        .collect()
}

/// Decode `%XX` escapes and `+` as space
pub fn percent_decode(input: &str) -> Result<String> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => decoded.push(b' '),
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| {
                        NetworkError::InvalidRequest(format!("bad percent escape in {}", input))
                    })?;
                decoded.push(hex);
                i += 2;
            }
            b => decoded.push(b),
        }
        i += 1;
    }
    String::from_utf8(decoded)
        .map_err(|_| NetworkError::InvalidRequest(format!("{} is not UTF-8", input)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const CONFLICT: StatusCode = StatusCode(409);
    pub const PAYLOAD_TOO_LARGE: StatusCode = StatusCode(413);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    pub fn reason(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            413 => "Payload Too Large",
            503 => "Service Unavailable",
            _ => "Internal Server Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    /// Serialize `payload` as a JSON body
    pub fn json<T: serde::Serialize>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(body) => Self::new(status, "application/json", body),
            Err(e) => Self::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SerializationFailed",
                &e.to_string(),
            ),
        }
    }

    pub fn xml(body: String) -> Self {
        Self::new(StatusCode::OK, "application/xml", body)
    }

    /// `{"error": {"code": .., "message": ..}}`
    pub fn error(status: StatusCode, code: &str, message: &str) -> Self {
        let payload = serde_json::json!({
            "error": {"code": code, "message": message}
        });
        Self::new(status, "application/json", payload.to_string())
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(128 + self.body.len());
        buf.put_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());
        buf.put_slice(format!("Content-Type: {}\r\n", self.content_type).as_bytes());
        buf.put_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        buf.put_slice(b"Connection: close\r\n\r\n");
        buf.put_slice(&self.body);
    }
}
