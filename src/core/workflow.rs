//! Workflow state and the reducer that drives it.
//!
//! Every change to [`WorkflowState`] goes through [`WorkflowState::reduce`].
//! Actions that need the remote service return an [`Effect`] stamped with the
//! current epoch; the caller runs it and feeds the outcome back as a
//! `*Completed` action carrying that same epoch. Completions whose epoch no
//! longer matches (after a reset, a retreat, or a newer request) are dropped.

use crate::core::stage::{Preconditions, Stage, StageTracker};
use crate::error::{
    ServiceError, WorkflowError, MSG_DETAILS_REQUIRED, MSG_NO_TRANSCRIPTS, MSG_SCRIPT_FAILED,
    MSG_SEARCH_FAILED, MSG_SELECTION_REQUIRED, MSG_TOPIC_REQUIRED, MSG_TRANSCRIPTS_FAILED,
};
use crate::types::{
    DetailField, ScriptDetails, ScriptRequest, SearchCriteria, SelectedVideo, TranscriptRequest,
    VideoCandidate, TRANSCRIPT_ERROR_MARKER,
};

const REQUIRED_LINES_REMINDER: &str =
    "IMPORTANT: The following lines MUST be included naturally somewhere in the script:";
const TRANSCRIPT_SEPARATOR: &str = "\n\n---\n\n";
const NO_TRANSCRIPTS_PLACEHOLDER: &str = "No transcripts available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    Transcripts,
    Script,
}

impl Operation {
    fn stage(self) -> Stage {
        match self {
            Operation::Search => Stage::Search,
            Operation::Transcripts => Stage::Transcribe,
            Operation::Script => Stage::Customize,
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Operation::Search => MSG_SEARCH_FAILED,
            Operation::Transcripts => MSG_TRANSCRIPTS_FAILED,
            Operation::Script => MSG_SCRIPT_FAILED,
        }
    }

    /// Only script generation reports the server's `detail` to the user.
    fn shows_server_detail(self) -> bool {
        self == Operation::Script
    }
}

/// Everything the user entered or the service returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    pub criteria: SearchCriteria,
    pub candidates: Vec<VideoCandidate>,
    pub selection: Vec<SelectedVideo>,
    pub transcripts: Vec<String>,
    pub details: ScriptDetails,
    pub final_script: Option<String>,
}

impl Accumulator {
    pub fn preconditions(&self) -> Preconditions {
        Preconditions {
            has_selection: !self.selection.is_empty(),
            has_transcripts: !self.transcripts.is_empty(),
            has_script: self.final_script.is_some(),
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|video| video.id == id)
    }

    pub fn selected_urls(&self) -> Vec<String> {
        self.selection.iter().map(|video| video.url.clone()).collect()
    }

    fn select(&mut self, id: &str) -> Result<(), WorkflowError> {
        if self.is_selected(id) {
            return Ok(());
        }
        let candidate = self
            .candidates
            .iter()
            .find(|candidate| candidate.id == id)
            .ok_or_else(|| WorkflowError::UnknownVideo(id.to_string()))?;
        self.selection.push(SelectedVideo {
            id: candidate.id.clone(),
            url: candidate.url.clone(),
        });
        Ok(())
    }

    fn deselect(&mut self, id: &str) {
        self.selection.retain(|video| video.id != id);
    }

    fn replace_candidates(&mut self, candidates: Vec<VideoCandidate>) {
        self.candidates = candidates;
        let candidates = &self.candidates;
        self.selection
            .retain(|video| candidates.iter().any(|candidate| candidate.id == video.id));
    }
}

/// Splits the signature field into lines, dropping blank ones.
pub fn signature_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Appends the required-lines reminder to the user's instructions.
pub fn combined_instructions(additional: &str, required_lines: &str) -> String {
    format!("{additional}\n\n{REQUIRED_LINES_REMINDER} \"{required_lines}\"")
        .trim()
        .to_string()
}

pub fn build_script_request(transcripts: &[String], details: &ScriptDetails) -> ScriptRequest {
    ScriptRequest {
        transcripts: transcripts.to_vec(),
        host_name: details.host_name.clone(),
        channel_name: details.channel_name.clone(),
        signature_lines: signature_lines(&details.signature_lines),
        additional_instructions: combined_instructions(
            &details.additional_instructions,
            &details.required_lines,
        ),
    }
}

fn is_error_entry(entry: &str) -> bool {
    entry.starts_with(TRANSCRIPT_ERROR_MARKER)
}

#[derive(Debug)]
pub enum Action {
    SetTopic(String),
    SetKeywords(String),
    SelectVideo(String),
    DeselectVideo(String),
    ToggleVideo(String),
    SetDetail(DetailField, String),
    Advance(Stage),
    Retreat(Stage),
    ClearError,
    Reset,
    SearchRequested,
    SearchCompleted {
        epoch: u64,
        result: Result<Vec<VideoCandidate>, ServiceError>,
    },
    TranscriptsRequested,
    TranscriptsCompleted {
        epoch: u64,
        result: Result<Vec<String>, ServiceError>,
    },
    ScriptRequested,
    ScriptCompleted {
        epoch: u64,
        result: Result<String, ServiceError>,
    },
}

/// Remote call the caller must perform after a `*Requested` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Search {
        epoch: u64,
        criteria: SearchCriteria,
    },
    Transcripts {
        epoch: u64,
        request: TranscriptRequest,
    },
    Script {
        epoch: u64,
        request: ScriptRequest,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    tracker: StageTracker,
    data: Accumulator,
    pending: Option<Operation>,
    last_error: Option<String>,
    epoch: u64,
}

impl WorkflowState {
    pub fn stage(&self) -> Stage {
        self.tracker.current()
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<Operation> {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn data(&self) -> &Accumulator {
        &self.data
    }

    pub fn can_advance_to(&self, to: Stage) -> bool {
        crate::core::stage::can_advance(self.stage(), to, &self.data.preconditions())
    }

    pub fn transcripts_preview(&self) -> String {
        if self.data.transcripts.is_empty() {
            NO_TRANSCRIPTS_PLACEHOLDER.to_string()
        } else {
            self.data.transcripts.join(TRANSCRIPT_SEPARATOR)
        }
    }

    pub fn reduce(&mut self, action: Action) -> Result<Effect, WorkflowError> {
        match action {
            Action::SetTopic(topic) => {
                self.data.criteria.topic = topic;
                Ok(Effect::None)
            }
            Action::SetKeywords(keywords) => {
                self.data.criteria.keywords = keywords;
                Ok(Effect::None)
            }
            Action::SelectVideo(id) => self.data.select(&id).map(|_| Effect::None),
            Action::DeselectVideo(id) => {
                self.data.deselect(&id);
                Ok(Effect::None)
            }
            Action::ToggleVideo(id) => {
                if self.data.is_selected(&id) {
                    self.data.deselect(&id);
                    Ok(Effect::None)
                } else {
                    self.data.select(&id).map(|_| Effect::None)
                }
            }
            Action::SetDetail(field, value) => {
                self.data.details.set(field, value);
                Ok(Effect::None)
            }
            Action::Advance(to) => {
                if self.is_busy() {
                    return Err(WorkflowError::Busy);
                }
                let facts = self.data.preconditions();
                self.tracker.advance(to, &facts).map(|_| Effect::None)
            }
            Action::Retreat(to) => {
                self.tracker.retreat(to)?;
                self.abandon_pending();
                Ok(Effect::None)
            }
            Action::ClearError => {
                self.last_error = None;
                Ok(Effect::None)
            }
            Action::Reset => {
                self.reset();
                Ok(Effect::None)
            }
            Action::SearchRequested => self.request_search(),
            Action::TranscriptsRequested => self.request_transcripts(),
            Action::ScriptRequested => self.request_script(),
            Action::SearchCompleted { epoch, result } => {
                if !self.accept_completion(Operation::Search, epoch) {
                    return Ok(Effect::None);
                }
                match result {
                    Ok(videos) => {
                        log::info!("search returned {} candidate(s)", videos.len());
                        self.data.replace_candidates(videos);
                        Ok(Effect::None)
                    }
                    Err(err) => Err(self.transport_failure(&err, Operation::Search)),
                }
            }
            Action::TranscriptsCompleted { epoch, result } => {
                if !self.accept_completion(Operation::Transcripts, epoch) {
                    return Ok(Effect::None);
                }
                match result {
                    Ok(entries) => self.apply_transcripts(entries),
                    Err(err) => Err(self.transport_failure(&err, Operation::Transcripts)),
                }
            }
            Action::ScriptCompleted { epoch, result } => {
                if !self.accept_completion(Operation::Script, epoch) {
                    return Ok(Effect::None);
                }
                match result {
                    Ok(script) => {
                        self.data.final_script = Some(script);
                        let facts = self.data.preconditions();
                        self.tracker.advance(Stage::Result, &facts)?;
                        Ok(Effect::None)
                    }
                    Err(err) => Err(self.transport_failure(&err, Operation::Script)),
                }
            }
        }
    }

    fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = WorkflowState {
            epoch,
            ..WorkflowState::default()
        };
    }

    fn abandon_pending(&mut self) {
        if let Some(operation) = self.pending.take() {
            log::debug!("abandoning in-flight {operation:?} request");
            self.epoch += 1;
        }
    }

    fn begin(&self, operation: Operation) -> Result<(), WorkflowError> {
        if self.is_busy() {
            return Err(WorkflowError::Busy);
        }
        let expected = operation.stage();
        if self.stage() != expected {
            return Err(WorkflowError::WrongStage {
                expected,
                actual: self.stage(),
            });
        }
        Ok(())
    }

    fn issue(&mut self, operation: Operation) -> u64 {
        self.last_error = None;
        self.epoch += 1;
        self.pending = Some(operation);
        self.epoch
    }

    fn validation_failure(&mut self, message: &str) -> WorkflowError {
        self.last_error = Some(message.to_string());
        WorkflowError::Validation(message.to_string())
    }

    fn transport_failure(&mut self, err: &ServiceError, operation: Operation) -> WorkflowError {
        log::warn!("{operation:?} request failed: {err}");
        let message =
            err.user_message(operation.failure_message(), operation.shows_server_detail());
        self.last_error = Some(message.clone());
        WorkflowError::Transport(message)
    }

    fn accept_completion(&mut self, operation: Operation, epoch: u64) -> bool {
        if self.pending != Some(operation) || epoch != self.epoch {
            log::debug!(
                "discarding stale {operation:?} response (epoch {epoch}, current {})",
                self.epoch
            );
            return false;
        }
        self.pending = None;
        true
    }

    fn request_search(&mut self) -> Result<Effect, WorkflowError> {
        self.begin(Operation::Search)?;
        if self.data.criteria.topic.trim().is_empty() {
            return Err(self.validation_failure(MSG_TOPIC_REQUIRED));
        }
        let epoch = self.issue(Operation::Search);
        Ok(Effect::Search {
            epoch,
            criteria: self.data.criteria.clone(),
        })
    }

    fn request_transcripts(&mut self) -> Result<Effect, WorkflowError> {
        self.begin(Operation::Transcripts)?;
        if self.data.selection.is_empty() {
            return Err(self.validation_failure(MSG_SELECTION_REQUIRED));
        }
        let epoch = self.issue(Operation::Transcripts);
        Ok(Effect::Transcripts {
            epoch,
            request: TranscriptRequest {
                video_urls: self.data.selected_urls(),
            },
        })
    }

    fn request_script(&mut self) -> Result<Effect, WorkflowError> {
        self.begin(Operation::Script)?;
        let details = &self.data.details;
        if details.host_name.trim().is_empty() || details.channel_name.trim().is_empty() {
            return Err(self.validation_failure(MSG_DETAILS_REQUIRED));
        }
        let request = build_script_request(&self.data.transcripts, &self.data.details);
        let epoch = self.issue(Operation::Script);
        Ok(Effect::Script { epoch, request })
    }

    fn apply_transcripts(&mut self, entries: Vec<String>) -> Result<Effect, WorkflowError> {
        let first_failure = entries.iter().find(|entry| is_error_entry(entry)).cloned();
        let total = entries.len();
        let accepted: Vec<String> = entries
            .into_iter()
            .filter(|entry| !is_error_entry(entry))
            .collect();

        if accepted.is_empty() {
            self.data.transcripts.clear();
            let message = first_failure.unwrap_or_else(|| MSG_NO_TRANSCRIPTS.to_string());
            log::warn!("no transcripts could be fetched ({total} entries)");
            self.last_error = Some(message.clone());
            return Err(WorkflowError::PartialData(message));
        }

        let dropped = total - accepted.len();
        if dropped > 0 {
            log::debug!("dropping {dropped} failed transcript(s) of {total}");
        }
        self.data.transcripts = accepted;
        let facts = self.data.preconditions();
        self.tracker.advance(Stage::Customize, &facts)?;
        Ok(Effect::None)
    }
}
