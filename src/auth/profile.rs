//! Provider profile normalization

use crate::{auth::strategy::StrategyError, models::{OAuthProfile, Provider}};
use serde_json::Value;

/// Build an [`OAuthProfile`] from the raw profile payload of `provider`
pub fn normalize(provider: Provider, raw: Value) -> Result<OAuthProfile, StrategyError> {
    let profile = match provider {
        Provider::Google => OAuthProfile {
            provider,
            // v3 userinfo uses `sub`, v2 uses `id`
            id: id_of(&raw, &["sub"]).or_else(|| id_of(&raw, &["id"])).unwrap_or_default(),
            display_name: string_at(&raw, &["name"]),
            emails: string_at(&raw, &["email"]).into_iter().collect(),
            photos: string_at(&raw, &["picture"]).into_iter().collect(),
            raw,
        },
        Provider::Facebook => OAuthProfile {
            provider,
            id: id_of(&raw, &["id"]).unwrap_or_default(),
            display_name: string_at(&raw, &["name"]),
            emails: string_at(&raw, &["email"]).into_iter().collect(),
            photos: string_at(&raw, &["picture", "data", "url"]).into_iter().collect(),
            raw,
        },
        Provider::Kakao => OAuthProfile {
            provider,
            id: id_of(&raw, &["id"]).unwrap_or_default(),
            display_name: string_at(&raw, &["kakao_account", "profile", "nickname"])
                .or_else(|| string_at(&raw, &["properties", "nickname"])),
            emails: string_at(&raw, &["kakao_account", "email"]).into_iter().collect(),
            photos: string_at(&raw, &["kakao_account", "profile", "profile_image_url"])
                .or_else(|| string_at(&raw, &["properties", "profile_image"]))
                .into_iter()
                .collect(),
            raw,
        },
        Provider::Naver => {
            match string_at(&raw, &["resultcode"]).as_deref() {
                Some("00") | None => {}
                Some(code) => {
                    return Err(StrategyError::Profile(format!(
                        "naver returned result code {}",
                        code
                    )))
                }
            }
            OAuthProfile {
                provider,
                id: id_of(&raw, &["response", "id"]).unwrap_or_default(),
                display_name: string_at(&raw, &["response", "nickname"])
                    .or_else(|| string_at(&raw, &["response", "name"])),
                emails: string_at(&raw, &["response", "email"]).into_iter().collect(),
                photos: string_at(&raw, &["response", "profile_image"]).into_iter().collect(),
                raw,
            }
        }
        Provider::Password => {
            return Err(StrategyError::Profile(
                "password accounts have no provider profile".to_string(),
            ))
        }
    };

    if profile.id.is_empty() {
        return Err(StrategyError::Profile(format!(
            "{} profile has no id",
            provider
        )));
    }

    Ok(profile)
}

fn lookup<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |value, key| value.get(*key))
}

fn string_at(raw: &Value, path: &[&str]) -> Option<String> {
    lookup(raw, path)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Ids come back as strings (google, facebook, naver) or numbers (kakao)
fn id_of(raw: &Value, path: &[&str]) -> Option<String> {
    match lookup(raw, path)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
