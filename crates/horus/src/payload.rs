//! Classification of Horus image responses into [`MediaPayload`] shapes.

use bridge_core::imaging::MediaPayload;
use futures::TryStreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio_util::io::StreamReader;

use crate::api::HorusApiError;

/// Media type of a response, lowercased and without parameters.
pub fn media_type(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Turn a successful image response into a payload.
///
/// | Content type                | Framing          | Payload           |
/// |-----------------------------|------------------|-------------------|
/// | `image/jpeg`                | known length     | `RawBytes`        |
/// | `image/jpeg`                | chunked          | `BufferedStream`  |
/// | `application/octet-stream`  | any              | `BufferedStream`  |
/// | `image/png`, `image/webp`   | any              | `DecodedImage`    |
///
/// Anything else is rejected with the content type in the error.
pub async fn into_payload(response: reqwest::Response) -> Result<MediaPayload, HorusApiError> {
    let media_type = media_type(&response);
    let known_length = response.content_length().is_some();

    match media_type.as_str() {
        "image/jpeg" | "image/jpg" if known_length => {
            let bytes = response.bytes().await?;
            Ok(MediaPayload::RawBytes(bytes.to_vec()))
        }
        "image/jpeg" | "image/jpg" | "application/octet-stream" => {
            let stream = response.bytes_stream().map_err(std::io::Error::other);
            Ok(MediaPayload::BufferedStream(Box::new(StreamReader::new(
                Box::pin(stream),
            ))))
        }
        "image/png" | "image/webp" => {
            let bytes = response.bytes().await?;
            let img = image::load_from_memory(&bytes)?;
            Ok(MediaPayload::DecodedImage(img))
        }
        "" => Err(HorusApiError::UnsupportedContentType(
            "<missing content-type>".to_string(),
        )),
        other => Err(HorusApiError::UnsupportedContentType(other.to_string())),
    }
}
