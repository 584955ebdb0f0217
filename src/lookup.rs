use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;

use crate::ident::{normalize, NormalizedId};

/// Classified outcome of one lookup call.
///
/// `NotFound` means the service answered and rejected the id (HTTP 404, or
/// a success body without a playable asset); `NetworkError` means no usable
/// response arrived. User-facing copy differs between the two, so the
/// distinction lives in the type rather than in message text.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found(AudioAsset),
    NotFound,
    NetworkError,
}

/// Resolved audio asset plus the order details shown alongside playback.
/// Created per lookup and handed straight to the presenter; never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    pub audio_url: String,
    pub frame_title: Option<String>,
    pub customer_name: Option<String>,
    pub created_at: Option<String>,
}

/// Remote resolution of a normalized scan code.
#[async_trait]
pub trait AudioLookup: Send + Sync {
    async fn resolve(&self, id: &NormalizedId) -> LookupResult;
}

/// Wire shape of the audio endpoint's response body.
#[derive(Debug, Default, Deserialize)]
struct AudioResponse {
    success: Option<bool>,
    audio_url: Option<String>,
    frame_title: Option<String>,
    order: Option<OrderInfo>,
}

#[derive(Debug, Deserialize)]
struct OrderInfo {
    customer_name: Option<String>,
    created_at: Option<String>,
}

/// Resolver against the storefront's `GET /api/audio/{id}/` endpoint.
pub struct HttpAudioLookup {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAudioLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AudioLookup for HttpAudioLookup {
    async fn resolve(&self, id: &NormalizedId) -> LookupResult {
        let url = format!("{}/api/audio/{}/", self.base_url, id);
        info!("Looking up scan code {}", id);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Audio lookup transport failure: {}", e);
                return LookupResult::NetworkError;
            }
        };

        let status = response.status().as_u16();
        let body = response.json::<AudioResponse>().await.ok();
        classify(status, body)
    }
}

/// Pure classification of an HTTP outcome, split out so the mapping table
/// can be tested without a server.
fn classify(status: u16, body: Option<AudioResponse>) -> LookupResult {
    if status == 404 {
        return LookupResult::NotFound;
    }
    if !(200..300).contains(&status) {
        // The service answered but with nothing actionable; the user gets
        // the same generic retry copy as a transport failure.
        return LookupResult::NetworkError;
    }

    let body = body.unwrap_or_default();
    match body.audio_url {
        Some(audio_url) if body.success != Some(false) => {
            let order = body.order;
            LookupResult::Found(AudioAsset {
                audio_url,
                frame_title: body.frame_title,
                customer_name: order.as_ref().and_then(|o| o.customer_name.clone()),
                created_at: order.as_ref().and_then(|o| o.created_at.clone()),
            })
        }
        _ => LookupResult::NotFound,
    }
}

/// Manual-entry fallback: free text goes through the same normalization as
/// a camera decode, then straight to the resolver. Returns `None` when
/// nothing alphanumeric was entered.
pub async fn lookup_manual(
    raw: &str,
    lookup: &dyn AudioLookup,
) -> Option<(NormalizedId, LookupResult)> {
    let id = normalize(raw)?;
    let result = lookup.resolve(&id).await;
    Some((id, result))
}
