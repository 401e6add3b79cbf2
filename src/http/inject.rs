use url::Url;

use crate::error::ConfigError;

pub fn validate_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("URL must start with http:// or https://"));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL must contain a host"));
    }

    Ok(url)
}

/// Sets `param` to `payload` in the query string. Every other pair keeps its
/// position and value; a parameter that is not present yet is appended.
pub fn inject_query_param(base: &Url, param: &str, payload: &str) -> Url {
    let mut url = base.clone();
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut found = false;
    for (k, v) in pairs.iter_mut() {
        if k == param {
            *v = payload.to_string();
            found = true;
        }
    }

    if !found {
        pairs.push((param.to_string(), payload.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url
}
