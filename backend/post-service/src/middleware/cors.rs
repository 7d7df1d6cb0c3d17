use actix_cors::Cors;

/// Build the CORS policy for the post routes from a comma separated origin
/// list; `*` admits any origin.
pub fn build_cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default();
    for origin in allowed_origins.split(',') {
        let origin = origin.trim();
        if origin.is_empty() {
            continue;
        }
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
