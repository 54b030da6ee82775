use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ServiceError;
use crate::settings::ApiSettings;
use crate::types::{
    ScriptRequest, ScriptResponse, TranscriptRequest, TranscriptResponse, VideoCandidate,
    VideoListResponse, VideoSearchRequest,
};

const FETCH_VIDEOS_PATH: &str = "/agent/fetch-videos";
const CREATE_TRANSCRIPTS_PATH: &str = "/transcript/create";
const CREATE_SCRIPT_PATH: &str = "/agent/create-script";

/// Remote side of the workflow: video search, transcripts and script generation.
pub trait ScriptService {
    fn search_videos(
        &self,
        request: &VideoSearchRequest,
    ) -> Result<Vec<VideoCandidate>, ServiceError>;

    /// Returns one entry per requested url, in request order. Entries the
    /// service could not produce start with `ERROR:`.
    fn create_transcripts(&self, request: &TranscriptRequest)
        -> Result<Vec<String>, ServiceError>;

    fn create_script(&self, request: &ScriptRequest) -> Result<String, ServiceError>;
}

pub struct HttpScriptService {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpScriptService {
    pub fn new(settings: &ApiSettings) -> Result<Self, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| ServiceError::Other(err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ServiceError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|source| ServiceError::Connect {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .ok()
                .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
                .and_then(|payload| {
                    payload
                        .get("detail")
                        .and_then(|value| value.as_str())
                        .map(|value| value.trim().to_string())
                });
            return Err(ServiceError::Status {
                url,
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<R>()
            .map_err(|source| ServiceError::Decode { url, source })
    }
}

impl ScriptService for HttpScriptService {
    fn search_videos(
        &self,
        request: &VideoSearchRequest,
    ) -> Result<Vec<VideoCandidate>, ServiceError> {
        let payload: VideoListResponse = self.post(FETCH_VIDEOS_PATH, request)?;
        Ok(payload.videos)
    }

    fn create_transcripts(
        &self,
        request: &TranscriptRequest,
    ) -> Result<Vec<String>, ServiceError> {
        let payload: TranscriptResponse = self.post(CREATE_TRANSCRIPTS_PATH, request)?;
        Ok(payload.transcripts)
    }

    fn create_script(&self, request: &ScriptRequest) -> Result<String, ServiceError> {
        let payload: ScriptResponse = self.post(CREATE_SCRIPT_PATH, request)?;
        Ok(payload.script)
    }
}
