use actix_web::{get, HttpResponse, Responder};

/// Liveness check: answers `home`.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("home")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[actix_web::test]
    async fn test_index_endpoint() {
        let app = test::init_service(actix_web::App::new().service(index)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(test::read_body(resp).await, "home");
    }
}
