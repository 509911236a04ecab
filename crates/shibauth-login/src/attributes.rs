//! Reading and decoding of asserted identity attributes.
//!
//! Depending on the servlet container in front of the SSO agent, UTF-8
//! attribute values may arrive decoded as ISO-8859-1. Tenants flagged with
//! `utf8_reencode_attributes` get every value mapped back to its Latin-1
//! bytes and decoded again as UTF-8.

use shibauth_core::models::session::AttributeSource;
use shibauth_core::models::tenant::TenantSsoConfig;

use crate::error::LoginError;

/// Maximum length in chars of any account field written by the login flow.
pub const MAX_FIELD_LENGTH: usize = 75;

/// Read attribute `key` from the session, re-encoding it when the tenant
/// asks for it. Absent attributes yield `Ok(None)`; values are otherwise
/// returned as asserted (possibly empty).
pub fn extract<S>(
    config: &TenantSsoConfig,
    session: &S,
    key: &str,
) -> Result<Option<String>, LoginError>
where
    S: AttributeSource + ?Sized,
{
    let Some(raw) = session.attribute(key) else {
        return Ok(None);
    };

    if config.utf8_reencode_attributes {
        reencode_utf8(key, raw).map(Some)
    } else {
        Ok(Some(raw.to_string()))
    }
}

/// Like [`extract`], but blank values count as absent and surrounding
/// whitespace is dropped.
pub fn extract_non_blank<S>(
    config: &TenantSsoConfig,
    session: &S,
    key: &str,
) -> Result<Option<String>, LoginError>
where
    S: AttributeSource + ?Sized,
{
    Ok(extract(config, session, key)?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

fn reencode_utf8(attribute: &str, raw: &str) -> Result<String, LoginError> {
    let bytes = raw
        .chars()
        .map(|c| {
            u8::try_from(c).map_err(|_| LoginError::Decoding {
                attribute: attribute.to_string(),
                reason: format!("character {c:?} is outside ISO-8859-1"),
            })
        })
        .collect::<Result<Vec<u8>, LoginError>>()?;

    String::from_utf8(bytes).map_err(|e| LoginError::Decoding {
        attribute: attribute.to_string(),
        reason: e.to_string(),
    })
}

/// Cut `value` to [`MAX_FIELD_LENGTH`] chars. Shorter values are unchanged.
pub fn truncate(value: &str) -> String {
    match value.char_indices().nth(MAX_FIELD_LENGTH) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}

/// Split a comma-separated affiliation list into role names.
pub fn split_affiliation(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
