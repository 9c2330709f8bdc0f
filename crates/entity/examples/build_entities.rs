use http::{Method, Request};
use http_body_util::BodyExt;

use micro_entity::content_type::ContentType;
use micro_entity::entity::{BodySource, build_byte_range_body, build_form_body, build_text_body};
use micro_entity::request::reset;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let text = match build_text_body("héllo wörld", &ContentType::text_plain().with_charset("UTF-8")) {
        Ok(entity) => entity,
        Err(e) => {
            error!(cause = %e, "build text entity error");
            return;
        }
    };

    let request = match text.into_request(Request::builder().method(Method::POST).uri("http://127.0.0.1:8080/notes")) {
        Ok(request) => request,
        Err(e) => {
            error!(cause = %e, "build request error");
            return;
        }
    };
    info!(headers = ?request.headers(), "request ready");

    match reset(&request) {
        Ok(retry) => info!(uri = %retry.uri(), "request reset for retry"),
        Err(e) => error!(cause = %e, "reset request error"),
    }

    match request.into_body().collect().await {
        Ok(collected) => info!(body = ?collected.to_bytes(), "text body"),
        Err(e) => error!(cause = %e, "read text body error"),
    }

    match build_form_body([("user", "jane doe"), ("lang", "rust")], "ISO-8859-1") {
        Ok(form) => info!(body = ?form.as_bytes(), content_type = ?form.content_type(), "form body"),
        Err(e) => error!(cause = %e, "build form entity error"),
    }

    let buffer = b"0123456789";
    for (offset, length) in [(2, 3), (5, 10)] {
        match build_byte_range_body(buffer, offset, length) {
            Ok(entity) => info!(offset, length, body = ?entity.as_bytes(), "byte range body"),
            Err(e) => error!(cause = %e, "build byte range entity error"),
        }
    }

    match BodySource::form([("q", "x")], "klingon-8").build() {
        Ok(entity) => info!(?entity, "unexpected form entity"),
        Err(e) => error!(cause = %e, unsupported_encoding = e.is_unsupported_encoding(), "build form entity error"),
    }
}
