use std::path::Path;

use actix_multipart::Multipart;
use actix_web::web;
use actix_web::HttpResponse;
use chrono::Utc;
use futures::StreamExt;
use log::info;
use serde_json::json;

use crate::config::Config;
use crate::error::ApiError;

/// Accepts a single `product` image field and stores it under the upload
/// directory as `product_<millis>.<ext>`, mirroring the layout the admin
/// panel expects when it later references the returned `image_url`.
pub async fn upload_image(
    config: web::Data<Config>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    while let Some(field) = payload.next().await {
        let mut field = field?;
        if field.name() != "product" {
            continue;
        }

        let ext = field
            .content_disposition()
            .get_filename()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let filename = format!("product_{}{}", Utc::now().timestamp_millis(), ext);
        let path = Path::new(&config.upload_dir).join(&filename);

        let mut bytes = web::BytesMut::new();
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
        }

        let written = web::block(move || std::fs::write(path, bytes)).await;
        match written {
            Ok(result) => result?,
            Err(_) => {
                return Err(ApiError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "blocking write was cancelled",
                )))
            }
        }

        info!("stored upload {filename}");
        return Ok(HttpResponse::Ok().json(json!({
            "success": 1,
            "image_url": format!("{}/images/{}", config.public_url, filename),
        })));
    }

    Err(ApiError::MissingFile)
}
