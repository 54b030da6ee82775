use serde::{Deserialize, Deserializer, Serialize};

/// Prefix the transcript service puts on entries it could not produce.
pub const TRANSCRIPT_ERROR_MARKER: &str = "ERROR:";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub topic: String,
    #[serde(default)]
    pub keywords: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoCandidate {
    pub id: String,
    pub url: String,
    pub title: String,
    pub thumbnail: Option<String>,
}

#[derive(Deserialize)]
struct RawVideoCandidate {
    #[serde(default)]
    id: Option<String>,
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    thumbnail: Option<String>,
}

// The search endpoint does not always send an id; the url is unique per video.
impl<'de> Deserialize<'de> for VideoCandidate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawVideoCandidate::deserialize(deserializer)?;
        let id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| raw.url.clone());
        Ok(Self {
            id,
            url: raw.url,
            title: raw.title,
            thumbnail: raw.thumbnail,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedVideo {
    pub id: String,
    pub url: String,
}

/// Free-form fields of the customize panel, kept exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptDetails {
    pub host_name: String,
    pub channel_name: String,
    pub signature_lines: String,
    pub required_lines: String,
    pub additional_instructions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    HostName,
    ChannelName,
    SignatureLines,
    RequiredLines,
    AdditionalInstructions,
}

impl ScriptDetails {
    pub fn set(&mut self, field: DetailField, value: String) {
        match field {
            DetailField::HostName => self.host_name = value,
            DetailField::ChannelName => self.channel_name = value,
            DetailField::SignatureLines => self.signature_lines = value,
            DetailField::RequiredLines => self.required_lines = value,
            DetailField::AdditionalInstructions => self.additional_instructions = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoSearchRequest {
    pub topic: String,
    pub keywords: String,
    pub video_language: String,
}

impl VideoSearchRequest {
    pub fn new(criteria: &SearchCriteria, video_language: &str) -> Self {
        Self {
            topic: criteria.topic.trim().to_string(),
            keywords: criteria.keywords.trim().to_string(),
            video_language: video_language.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub videos: Vec<VideoCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptRequest {
    pub video_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptResponse {
    #[serde(default)]
    pub transcripts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptRequest {
    pub transcripts: Vec<String>,
    pub host_name: String,
    pub channel_name: String,
    pub signature_lines: Vec<String>,
    pub additional_instructions: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptResponse {
    pub script: String,
}
