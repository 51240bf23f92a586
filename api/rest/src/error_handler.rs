use actix_web::{
    body::{to_bytes, MessageBody},
    dev::ServiceResponse,
    http::header,
    middleware::ErrorHandlerResponse,
    Result,
};
use futures::executor;

use crate::model::Response;

/// Rewrites error responses that are not JSON (extractor failures, unknown
/// routes) into the REST envelope.
pub fn default_error_handler<B: MessageBody>(
    svc_res: ServiceResponse<B>,
) -> Result<ErrorHandlerResponse<B>> {
    let is_json = svc_res
        .response()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.to_lowercase().starts_with("application/json"));
    if is_json {
        return Ok(ErrorHandlerResponse::Response(svc_res.map_into_left_body()));
    }

    let (req, res) = svc_res.into_parts();

    let status_code = res.status();
    let body = executor::block_on(async {
        match to_bytes(res.into_body()).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                let err: Box<dyn std::error::Error> = err.into();
                err.to_string()
            }
        }
    });
    let message = if body.is_empty() {
        status_code
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_owned()
    } else {
        body
    };

    let res = Response::error_raw(&status_code, &message);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, res).map_into_right_body(),
    ))
}
