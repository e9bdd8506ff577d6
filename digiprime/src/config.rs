use nutype::nutype;

#[nutype(derive(Clone, Copy, Debug), validate(greater_or_equal = 1))]
pub struct ServerPort(u16);

#[nutype(
    derive(Clone, Debug, AsRef),
    sanitize(trim, with = |url: String| url.trim_end_matches('/').to_string()),
    validate(not_empty, predicate = is_http_url)
)]
pub struct EngineBaseUrl(String);

#[nutype(derive(Clone, Debug, AsRef), sanitize(trim), validate(not_empty))]
pub struct SeedPath(String);

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
