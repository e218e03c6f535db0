//! Landing page handler.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

/// Data routes advertised on the landing page.
pub const ROUTES: &[&str] = &[
    "/api/precipitation",
    "/api/stations",
    "/api/tobs",
    "/api/start/<start_date>",
    "/api/start-end/<start_date>/<end_date>",
];

/// Plain text listing of [`ROUTES`].
pub fn landing_text() -> String {
    let mut text = String::from("Available Routes:\n");
    for route in ROUTES {
        text.push_str(route);
        text.push('\n');
    }
    text.push_str("\nDates are formatted YYYY-MM-DD.\n");
    text
}

/// GET / - Landing page
pub async fn landing_handler() -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "max-age=300"),
        ],
        landing_text(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_lists_every_route() {
        let text = landing_text();
        assert!(text.starts_with("Available Routes:"));
        for route in ROUTES {
            assert!(text.contains(route), "missing {}", route);
        }
    }
}
