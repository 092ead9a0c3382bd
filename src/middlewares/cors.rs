use actix_cors::Cors;

use crate::handlers::REQUEST_ID_HEADER;

pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        // 浏览器端需要读取关联ID
        .expose_headers(vec![REQUEST_ID_HEADER])
        .max_age(3600)
}
