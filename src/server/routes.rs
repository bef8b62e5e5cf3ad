use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request(method: &str, path: &str) -> HttpResponse {
    match (method, path) {
        ("GET", "/") => json_result(api::root_payload()),
        ("GET", "/api/health") => json_result(api::health_payload()),
        ("GET", "/api/heroes") => json_result(api::heroes_payload()),
        (method, path) if method == "GET" && path.starts_with("/api/hero/") => {
            let hero_id = path.trim_start_matches("/api/hero/");
            match api::hero_payload(hero_id) {
                Ok(Some(payload)) => json_ok(payload),
                Ok(None) => error_response(
                    404,
                    "Not Found",
                    &format!("Hero with ID '{hero_id}' not found."),
                ),
                Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
            }
        }
        (method, path) if method == "GET" && path.starts_with("/api/query") => {
            match api::query_payload(path) {
                Ok(Some(payload)) => json_ok(payload),
                Ok(None) => error_response(404, "Not Found", "No blocks matched the query."),
                Err(err) => error_response(400, "Bad Request", &err.to_string()),
            }
        }
        (method, path) if method == "GET" && path.starts_with("/api/language/") => {
            let lang_id = path.trim_start_matches("/api/language/");
            match api::language_payload(lang_id) {
                Ok(Some(payload)) => json_ok(payload),
                Ok(None) => error_response(
                    404,
                    "Not Found",
                    &format!("Language key '{lang_id}' not found."),
                ),
                Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
            }
        }
        _ => error_response(404, "Not Found", "Unknown route"),
    }
}

fn json_ok(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

fn json_result(result: Result<String, api::ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => json_ok(payload),
        Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
    }
}

pub fn bad_request(message: &str) -> HttpResponse {
    error_response(400, "Bad Request", message)
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::json!({ "error": message }).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::route_request;

    #[test]
    fn health_route_returns_ok() {
        let response = route_request("GET", "/api/health");
        assert_eq!(response.status_code, 200);
        assert!(response.body.contains("\"status\""));
    }

    #[test]
    fn unknown_route_is_not_found() {
        let response = route_request("GET", "/api/nothing");
        assert_eq!(response.status_code, 404);
    }

    #[test]
    fn query_without_parameters_is_bad_request() {
        let response = route_request("GET", "/api/query");
        assert_eq!(response.status_code, 400);
    }

    #[test]
    fn http_string_carries_content_length() {
        let response = route_request("GET", "/api/health");
        let raw = response.to_http_string();
        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(raw.contains(&format!("Content-Length: {}", response.body.len())));
    }
}
