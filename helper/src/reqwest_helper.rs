use bytes::Bytes;
use reqwest::Response;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to get bytes from the body of the message: {0}")]
    Body(#[from] reqwest::Error),
    #[error(
        "Failed to deserialize (supposedly JSON) to the specified type, the \
         text message is {text:?}: {source}"
    )]
    Json { source: serde_json::Error, text: String },
}

pub async fn deserialize_response<T>(response: Response) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let full = response.bytes().await?;
    deserialize_bytes(&full)
}

pub fn deserialize_bytes<T>(full: &Bytes) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(full).map_err(|source| Error::Json {
        source,
        text: String::from_utf8_lossy(full).into_owned(),
    })
}
