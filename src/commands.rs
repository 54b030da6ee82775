use std::fmt::Write as _;

use crate::cli::{PanelCommand, HELP};
use crate::core::api::ScriptService;
use crate::core::stage::Stage;
use crate::core::storage;
use crate::error::WorkflowError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Panel,
    Text(String),
    Quit,
}

pub fn handle_command<S: ScriptService>(
    app: &mut AppState<S>,
    command: PanelCommand,
) -> Result<Reply, String> {
    match command {
        PanelCommand::Show => Ok(Reply::Panel),
        PanelCommand::Help => Ok(Reply::Text(HELP.to_string())),
        PanelCommand::Quit => Ok(Reply::Quit),
        PanelCommand::Topic(topic) => surface(app.controller.set_topic(topic)),
        PanelCommand::Keywords(keywords) => surface(app.controller.set_keywords(keywords)),
        PanelCommand::Detail(field, value) => surface(app.controller.set_detail(field, value)),
        PanelCommand::Search => surface(app.controller.search_videos()),
        PanelCommand::Transcribe => surface(app.controller.fetch_transcripts()),
        PanelCommand::Generate => surface(app.controller.generate_script()),
        PanelCommand::Toggle(token) => {
            let id = resolve_video(app, &token);
            surface(app.controller.toggle(&id))
        }
        PanelCommand::Select(token) => {
            let id = resolve_video(app, &token);
            surface(app.controller.select(&id))
        }
        PanelCommand::Deselect(token) => {
            let id = resolve_video(app, &token);
            surface(app.controller.deselect(&id))
        }
        PanelCommand::Next => {
            let current = app.controller.state().stage();
            let to = current
                .next()
                .ok_or_else(|| "Already at the last step; use `restart` to start over".to_string())?;
            surface(app.controller.advance(to))
        }
        PanelCommand::Back(target) => {
            let current = app.controller.state().stage();
            let to = match target {
                Some(number) => Stage::from_number(number)
                    .ok_or_else(|| format!("There is no step {number}"))?,
                None => current
                    .number()
                    .checked_sub(1)
                    .and_then(Stage::from_number)
                    .ok_or_else(|| "Already at the first step".to_string())?,
            };
            surface(app.controller.retreat(to))
        }
        PanelCommand::Restart => surface(app.controller.reset()),
        PanelCommand::Copy => {
            let script = final_script(app)?;
            let outcome = app.clipboard.copy(&script);
            Ok(Reply::Text(outcome.label().to_string()))
        }
        PanelCommand::Export(path) => {
            let script = final_script(app)?;
            let written = storage::export_script(&path, &script)?;
            Ok(Reply::Text(format!("Saved script to {}", written.display())))
        }
    }
}

// Errors the panel already shows through `last_error` are not repeated.
fn surface(result: Result<(), WorkflowError>) -> Result<Reply, String> {
    match result {
        Ok(()) => Ok(Reply::Panel),
        Err(err) if err.user_message().is_some() => Ok(Reply::Panel),
        Err(err) => Err(err.to_string()),
    }
}

fn final_script<S: ScriptService>(app: &AppState<S>) -> Result<String, String> {
    app.controller
        .state()
        .data()
        .final_script
        .clone()
        .ok_or_else(|| "No script has been generated yet".to_string())
}

/// Accepts either the 1-based position shown in the panel or a video id.
fn resolve_video<S: ScriptService>(app: &AppState<S>, token: &str) -> String {
    let candidates = &app.controller.state().data().candidates;
    token
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| candidates.get(index))
        .map(|candidate| candidate.id.clone())
        .unwrap_or_else(|| token.to_string())
}

fn detail_line(out: &mut String, label: &str, value: &str) {
    if value.contains('\n') {
        let _ = writeln!(out, "  {label}:");
        for line in value.lines() {
            let _ = writeln!(out, "    {line}");
        }
    } else {
        let _ = writeln!(out, "  {label}: {value}");
    }
}

pub fn render_panel<S: ScriptService>(app: &AppState<S>) -> String {
    let state = app.controller.state();
    let data = state.data();
    let current = state.stage();
    let mut out = String::new();

    let progress: Vec<String> = Stage::ALL
        .iter()
        .map(|stage| {
            let marker = if *stage <= current { "*" } else { " " };
            format!("[{}{marker}] {}", stage.number(), stage.label())
        })
        .collect();
    let _ = writeln!(out, "{}", progress.join(" -- "));

    if state.is_busy() {
        let _ = writeln!(out, "Working...");
    }
    if let Some(error) = state.last_error() {
        let _ = writeln!(out, "Error: {error}");
    }
    let _ = writeln!(out);

    match current {
        Stage::Search => {
            let _ = writeln!(out, "1. Find Your Inspiration");
            detail_line(&mut out, "Topic", &data.criteria.topic);
            detail_line(&mut out, "Keywords", &data.criteria.keywords);
            if !data.candidates.is_empty() {
                let _ = writeln!(out, "\nSelect Videos to Transcribe:");
                for (index, candidate) in data.candidates.iter().enumerate() {
                    let mark = if data.is_selected(&candidate.id) { "x" } else { " " };
                    let _ = writeln!(
                        out,
                        "  [{mark}] {}. {} <{}>",
                        index + 1,
                        candidate.title,
                        candidate.url
                    );
                }
                if state.can_advance_to(Stage::Transcribe) {
                    let _ = writeln!(out, "\nType `next` to get transcripts.");
                }
            }
        }
        Stage::Transcribe => {
            let _ = writeln!(out, "2. Get Transcripts");
            let _ = writeln!(
                out,
                "You've selected {} video(s). Ready to fetch their transcripts?",
                data.selection.len()
            );
            let _ = writeln!(out, "Type `transcribe`, or `back` to return to search.");
        }
        Stage::Customize => {
            let _ = writeln!(out, "3. Customize Your Script");
            let _ = writeln!(out, "Generated Transcript(s):");
            for line in state.transcripts_preview().lines() {
                let _ = writeln!(out, "  | {line}");
            }
            let _ = writeln!(out);
            let details = &data.details;
            let fields = [
                ("Host's Name", &details.host_name),
                ("Channel Name", &details.channel_name),
                ("Signature Lines", &details.signature_lines),
                ("Required Lines", &details.required_lines),
                ("Additional Instructions", &details.additional_instructions),
            ];
            for (label, value) in fields {
                detail_line(&mut out, label, value);
            }
            let _ = writeln!(out, "\nType `generate` when ready.");
        }
        Stage::Result => {
            let _ = writeln!(out, "Your Generated Script");
            let _ = writeln!(out);
            if let Some(script) = &data.final_script {
                let _ = writeln!(out, "{script}");
            }
            let _ = writeln!(out);
            if let Some(status) = app.clipboard.status() {
                let _ = writeln!(out, "[{}]", status.label());
            }
            let _ = writeln!(
                out,
                "Type `copy`, `export <path>`, or `restart` to create another script."
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_panel_command;
    use crate::core::clipboard::{ClipboardExporter, ClipboardHolder, ClipboardProvider};
    use crate::settings::Settings;
    use crate::state::tests::{video, FakeService};
    use crate::state::Controller;
    use std::time::Duration;

    struct NoClipboard;

    impl ClipboardProvider for NoClipboard {
        fn open(&self) -> Result<Box<dyn ClipboardHolder>, String> {
            Err("No display session detected".to_string())
        }
    }

    fn app(service: FakeService) -> AppState<FakeService> {
        AppState {
            settings: Settings::default(),
            controller: Controller::new(service, "en"),
            clipboard: ClipboardExporter::new(Box::new(NoClipboard), Duration::from_secs(2)),
        }
    }

    fn run(app: &mut AppState<FakeService>, line: &str) -> Result<Reply, String> {
        let command = parse_panel_command(line)?;
        handle_command(app, command)
    }

    #[test]
    fn search_without_topic_shows_error_in_panel() {
        let mut app = app(FakeService::default());
        assert_eq!(run(&mut app, "search"), Ok(Reply::Panel));
        let panel = render_panel(&app);
        assert!(panel.contains("Error: Please enter a topic to search."));
    }

    #[test]
    fn toggle_by_position_selects_candidate() {
        let service = FakeService::default();
        service
            .videos
            .borrow_mut()
            .push_back(Ok(vec![video("a"), video("b")]));
        let mut app = app(service);
        run(&mut app, "topic cats").expect("topic");
        run(&mut app, "search").expect("search");
        run(&mut app, "toggle 2").expect("toggle");

        assert!(app.controller.state().data().is_selected("b"));
        let panel = render_panel(&app);
        assert!(panel.contains("[x] 2. Video b"));
        assert!(panel.contains("Type `next`"));

        run(&mut app, "next").expect("next");
        assert_eq!(app.controller.state().stage(), Stage::Transcribe);
        run(&mut app, "back").expect("back");
        assert_eq!(app.controller.state().stage(), Stage::Search);
        assert!(app.controller.state().data().is_selected("b"));
    }

    #[test]
    fn unknown_video_and_blocked_transition_are_errors() {
        let mut app = app(FakeService::default());
        assert!(run(&mut app, "select nope").is_err());
        assert!(run(&mut app, "next").is_err());
        assert!(run(&mut app, "back").is_err());
        assert_eq!(app.controller.state().last_error(), None);
    }

    #[test]
    fn copy_without_script_is_rejected() {
        let mut app = app(FakeService::default());
        assert!(run(&mut app, "copy").is_err());
        assert!(run(&mut app, "export /tmp/never.txt").is_err());
    }

    #[test]
    fn failed_copy_reports_status_and_keeps_stage() {
        let service = FakeService::default();
        service.videos.borrow_mut().push_back(Ok(vec![video("a")]));
        service
            .transcripts
            .borrow_mut()
            .push_back(Ok(vec!["T1".to_string()]));
        service
            .scripts
            .borrow_mut()
            .push_back(Ok("The script".to_string()));
        let mut app = app(service);
        for line in [
            "topic cats",
            "search",
            "select 1",
            "next",
            "transcribe",
            "host Ann",
            "channel Cat Facts",
            "generate",
        ] {
            run(&mut app, line).expect(line);
        }
        assert_eq!(app.controller.state().stage(), Stage::Result);
        assert!(render_panel(&app).contains("The script"));

        assert_eq!(
            run(&mut app, "copy"),
            Ok(Reply::Text("Failed!".to_string()))
        );
        assert_eq!(app.controller.state().stage(), Stage::Result);
        assert_eq!(app.controller.state().last_error(), None);

        run(&mut app, "restart").expect("restart");
        assert_eq!(app.controller.state().stage(), Stage::Search);
        assert!(app.controller.state().data().final_script.is_none());
    }
}
