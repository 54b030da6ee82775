use crate::core::api::{HttpScriptService, ScriptService};
use crate::core::clipboard::ClipboardExporter;
use crate::core::stage::Stage;
use crate::core::workflow::{Action, Effect, WorkflowState};
use crate::error::WorkflowError;
use crate::settings::Settings;
use crate::types::{DetailField, VideoSearchRequest};

/// Owns the workflow state and runs the remote calls its actions ask for.
pub struct Controller<S> {
    state: WorkflowState,
    service: S,
    video_language: String,
}

impl<S: ScriptService> Controller<S> {
    pub fn new(service: S, video_language: impl Into<String>) -> Self {
        Self {
            state: WorkflowState::default(),
            service,
            video_language: video_language.into(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn dispatch(&mut self, action: Action) -> Result<(), WorkflowError> {
        let effect = self.state.reduce(action)?;
        self.run(effect)
    }

    fn run(&mut self, effect: Effect) -> Result<(), WorkflowError> {
        let completion = match effect {
            Effect::None => return Ok(()),
            Effect::Search { epoch, criteria } => {
                let request = VideoSearchRequest::new(&criteria, &self.video_language);
                log::info!("searching videos for topic {:?}", request.topic);
                Action::SearchCompleted {
                    epoch,
                    result: self.service.search_videos(&request),
                }
            }
            Effect::Transcripts { epoch, request } => {
                log::info!("requesting {} transcript(s)", request.video_urls.len());
                Action::TranscriptsCompleted {
                    epoch,
                    result: self.service.create_transcripts(&request),
                }
            }
            Effect::Script { epoch, request } => {
                log::info!(
                    "generating script from {} transcript(s)",
                    request.transcripts.len()
                );
                Action::ScriptCompleted {
                    epoch,
                    result: self.service.create_script(&request),
                }
            }
        };
        self.state.reduce(completion).map(|_| ())
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) -> Result<(), WorkflowError> {
        self.dispatch(Action::SetTopic(topic.into()))
    }

    pub fn set_keywords(&mut self, keywords: impl Into<String>) -> Result<(), WorkflowError> {
        self.dispatch(Action::SetKeywords(keywords.into()))
    }

    pub fn set_detail(
        &mut self,
        field: DetailField,
        value: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        self.dispatch(Action::SetDetail(field, value.into()))
    }

    pub fn select(&mut self, id: &str) -> Result<(), WorkflowError> {
        self.dispatch(Action::SelectVideo(id.to_string()))
    }

    pub fn deselect(&mut self, id: &str) -> Result<(), WorkflowError> {
        self.dispatch(Action::DeselectVideo(id.to_string()))
    }

    pub fn toggle(&mut self, id: &str) -> Result<(), WorkflowError> {
        self.dispatch(Action::ToggleVideo(id.to_string()))
    }

    pub fn advance(&mut self, to: Stage) -> Result<(), WorkflowError> {
        self.dispatch(Action::Advance(to))
    }

    pub fn retreat(&mut self, to: Stage) -> Result<(), WorkflowError> {
        self.dispatch(Action::Retreat(to))
    }

    /// Searches with the topic and keywords entered so far.
    pub fn search_videos(&mut self) -> Result<(), WorkflowError> {
        self.dispatch(Action::SearchRequested)
    }

    /// Requests transcripts for the current selection.
    pub fn fetch_transcripts(&mut self) -> Result<(), WorkflowError> {
        self.dispatch(Action::TranscriptsRequested)
    }

    /// Generates the script from the accepted transcripts and entered details.
    pub fn generate_script(&mut self) -> Result<(), WorkflowError> {
        self.dispatch(Action::ScriptRequested)
    }

    pub fn reset(&mut self) -> Result<(), WorkflowError> {
        self.dispatch(Action::Reset)?;
        log::info!("workflow reset (epoch {})", self.state.epoch());
        Ok(())
    }
}

pub struct AppState<S = HttpScriptService> {
    pub settings: Settings,
    pub controller: Controller<S>,
    pub clipboard: ClipboardExporter,
}

impl AppState<HttpScriptService> {
    pub fn load(settings: Settings) -> Result<Self, String> {
        let service = HttpScriptService::new(&settings.api).map_err(|err| err.to_string())?;
        log::info!("using script service at {}", service.base_url());
        let controller = Controller::new(service, settings.search.video_language.clone());
        let clipboard = ClipboardExporter::system(&settings.clipboard);
        Ok(Self {
            settings,
            controller,
            clipboard,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{ServiceError, MSG_SEARCH_FAILED};
    use crate::types::{ScriptRequest, TranscriptRequest, VideoCandidate};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    #[derive(Default)]
    pub(crate) struct FakeService {
        pub videos: RefCell<VecDeque<Result<Vec<VideoCandidate>, ServiceError>>>,
        pub transcripts: RefCell<VecDeque<Result<Vec<String>, ServiceError>>>,
        pub scripts: RefCell<VecDeque<Result<String, ServiceError>>>,
        pub searches: RefCell<Vec<VideoSearchRequest>>,
        pub transcript_requests: RefCell<Vec<TranscriptRequest>>,
        pub script_requests: RefCell<Vec<ScriptRequest>>,
    }

    fn next<T>(queue: &RefCell<VecDeque<Result<T, ServiceError>>>) -> Result<T, ServiceError> {
        queue
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Other("no canned response".to_string())))
    }

    impl ScriptService for FakeService {
        fn search_videos(
            &self,
            request: &VideoSearchRequest,
        ) -> Result<Vec<VideoCandidate>, ServiceError> {
            self.searches.borrow_mut().push(request.clone());
            next(&self.videos)
        }

        fn create_transcripts(
            &self,
            request: &TranscriptRequest,
        ) -> Result<Vec<String>, ServiceError> {
            self.transcript_requests.borrow_mut().push(request.clone());
            next(&self.transcripts)
        }

        fn create_script(&self, request: &ScriptRequest) -> Result<String, ServiceError> {
            self.script_requests.borrow_mut().push(request.clone());
            next(&self.scripts)
        }
    }

    pub(crate) fn video(id: &str) -> VideoCandidate {
        VideoCandidate {
            id: id.to_string(),
            url: format!("https://www.youtube.com/watch?v={id}"),
            title: format!("Video {id}"),
            thumbnail: None,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn full_workflow_reaches_result() {
        let service = FakeService::default();
        service
            .videos
            .borrow_mut()
            .push_back(Ok(vec![video("a"), video("b"), video("c")]));
        service
            .transcripts
            .borrow_mut()
            .push_back(Ok(strings(&["T1", "ERROR: blocked", "T3"])));
        service
            .scripts
            .borrow_mut()
            .push_back(Ok("Final script".to_string()));

        let mut controller = Controller::new(service, "en");
        controller.set_topic("cats").expect("edit");
        controller.set_keywords("funny, short").expect("edit");
        controller.search_videos().expect("search");
        assert_eq!(controller.state().data().candidates.len(), 3);

        for id in ["a", "b", "c"] {
            controller.select(id).expect("select");
        }
        controller.advance(Stage::Transcribe).expect("advance");
        controller.fetch_transcripts().expect("transcripts");
        assert_eq!(controller.state().stage(), Stage::Customize);
        assert_eq!(controller.state().data().transcripts, strings(&["T1", "T3"]));

        controller.set_detail(DetailField::HostName, "Ann").expect("edit");
        controller.set_detail(DetailField::ChannelName, "Cat Facts").expect("edit");
        controller.set_detail(DetailField::SignatureLines, "a\n\nb\n").expect("edit");
        controller.set_detail(DetailField::RequiredLines, "Stay curious.").expect("edit");
        controller.generate_script().expect("generate");

        assert_eq!(controller.state().stage(), Stage::Result);
        assert_eq!(
            controller.state().data().final_script.as_deref(),
            Some("Final script")
        );

        let service = controller.service();
        let searches = service.searches.borrow();
        assert_eq!(searches[0].topic, "cats");
        assert_eq!(searches[0].keywords, "funny, short");
        assert_eq!(searches[0].video_language, "en");
        assert_eq!(service.transcript_requests.borrow()[0].video_urls.len(), 3);
        let script_requests = service.script_requests.borrow();
        let script_request = &script_requests[0];
        assert_eq!(script_request.transcripts, strings(&["T1", "T3"]));
        assert_eq!(script_request.signature_lines, strings(&["a", "b"]));
        assert!(script_request
            .additional_instructions
            .contains("Stay curious."));
    }

    #[test]
    fn validation_failure_issues_no_request() {
        let mut controller = Controller::new(FakeService::default(), "en");
        let err = controller.search_videos().unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(controller.service().searches.borrow().is_empty());
        assert!(!controller.state().is_busy());
    }

    #[test]
    fn connection_failure_is_reported_and_retryable() {
        let service = FakeService::default();
        service
            .videos
            .borrow_mut()
            .push_back(Err(ServiceError::Other(String::new())));
        service.videos.borrow_mut().push_back(Ok(vec![video("a")]));

        let mut controller = Controller::new(service, "en");
        controller.set_topic("cats").expect("edit");
        let err = controller.search_videos().unwrap_err();
        assert_eq!(err, WorkflowError::Transport(MSG_SEARCH_FAILED.to_string()));
        assert_eq!(controller.state().last_error(), Some(MSG_SEARCH_FAILED));
        assert!(!controller.state().is_busy());

        controller.search_videos().expect("retry");
        assert_eq!(controller.state().last_error(), None);
        assert_eq!(controller.state().data().candidates.len(), 1);
    }

    #[test]
    fn edits_go_through_the_reducer() {
        let mut controller = Controller::new(FakeService::default(), "en");
        controller.set_topic("cats").expect("topic");
        controller.set_keywords("funny").expect("keywords");
        controller
            .set_detail(DetailField::ChannelName, "Cat Facts")
            .expect("channel");

        let data = controller.state().data();
        assert_eq!(data.criteria.topic, "cats");
        assert_eq!(data.criteria.keywords, "funny");
        assert_eq!(data.details.channel_name, "Cat Facts");
        assert_eq!(controller.state().last_error(), None);
    }

    #[test]
    fn reset_after_result_starts_over() {
        let service = FakeService::default();
        service.videos.borrow_mut().push_back(Ok(vec![video("a")]));
        let mut controller = Controller::new(service, "en");
        controller.set_topic("cats").expect("edit");
        controller.search_videos().expect("search");
        controller.select("a").expect("select");
        controller.advance(Stage::Transcribe).expect("advance");

        controller.reset().expect("reset");
        assert_eq!(controller.state().stage(), Stage::Search);
        assert!(controller.state().data().candidates.is_empty());
        assert!(controller.state().data().selection.is_empty());
        assert!(controller.state().data().criteria.topic.is_empty());
    }
}
