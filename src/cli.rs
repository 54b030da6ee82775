use std::path::PathBuf;

use crate::types::DetailField;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub api_url: Option<String>,
    pub settings_path: Option<PathBuf>,
    pub show_help: bool,
}

pub fn parse_cli_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--api-url" | "--api" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("{arg} expects a value"))?;
                options.api_url = Some(value.clone());
            }
            "--settings" | "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("{arg} expects a path"))?;
                options.settings_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" | "help" => options.show_help = true,
            other => {
                if let Some(value) = other.strip_prefix("--api-url=") {
                    options.api_url = Some(value.to_string());
                } else if let Some(value) = other.strip_prefix("--settings=") {
                    options.settings_path = Some(PathBuf::from(value));
                } else {
                    return Err(format!("unknown argument: {other}"));
                }
            }
        }
    }
    Ok(options)
}

/// One line of input from the terminal panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    Topic(String),
    Keywords(String),
    Search,
    Toggle(String),
    Select(String),
    Deselect(String),
    Next,
    Back(Option<u8>),
    Transcribe,
    Detail(DetailField, String),
    Generate,
    Copy,
    Export(PathBuf),
    Restart,
    Show,
    Help,
    Quit,
}

pub fn parse_panel_command(line: &str) -> Result<PanelCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let required = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("{word} expects {what}"))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match word.to_lowercase().as_str() {
        "" | "show" | "status" => PanelCommand::Show,
        "topic" => PanelCommand::Topic(rest.to_string()),
        "keywords" => PanelCommand::Keywords(rest.to_string()),
        "search" => PanelCommand::Search,
        "toggle" | "t" => PanelCommand::Toggle(required("a video number or id")?),
        "select" => PanelCommand::Select(required("a video number or id")?),
        "deselect" => PanelCommand::Deselect(required("a video number or id")?),
        "next" => PanelCommand::Next,
        "back" => {
            if rest.is_empty() {
                PanelCommand::Back(None)
            } else {
                let stage = rest
                    .parse::<u8>()
                    .map_err(|_| format!("back expects a stage number, got {rest:?}"))?;
                PanelCommand::Back(Some(stage))
            }
        }
        "transcribe" | "transcripts" => PanelCommand::Transcribe,
        "host" => PanelCommand::Detail(DetailField::HostName, rest.to_string()),
        "channel" => PanelCommand::Detail(DetailField::ChannelName, rest.to_string()),
        "signature" => {
            PanelCommand::Detail(DetailField::SignatureLines, unescape_newlines(rest))
        }
        "required" => PanelCommand::Detail(DetailField::RequiredLines, unescape_newlines(rest)),
        "instructions" => PanelCommand::Detail(
            DetailField::AdditionalInstructions,
            unescape_newlines(rest),
        ),
        "generate" => PanelCommand::Generate,
        "copy" => PanelCommand::Copy,
        "export" => PanelCommand::Export(PathBuf::from(required("a file path")?)),
        "restart" | "reset" | "start-over" => PanelCommand::Restart,
        "help" | "?" => PanelCommand::Help,
        "quit" | "exit" | "q" => PanelCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(command)
}

// Multi-line fields are typed on one line with literal `\n` separators.
fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}

pub const USAGE: &str = "\
usage: samanvaya [--api-url <origin>] [--settings <path>]

Reads one command per line from stdin; type `help` for the list.";

pub const HELP: &str = "\
commands:
  topic <text>          set the search topic
  keywords <text>       set optional keywords
  search                search for videos
  toggle <n|id>         select or deselect a video (select/deselect also work)
  next                  continue to transcripts
  back [stage]          go back a stage (or to the given stage)
  transcribe            fetch transcripts for the selected videos
  host <text>           host name
  channel <text>        channel name
  signature <text>      signature lines, use \\n between lines
  required <text>       lines that must appear in the script
  instructions <text>   additional instructions
  generate              generate the script
  copy                  copy the script to the clipboard
  export <path>         write the script to a file
  restart               start over
  quit                  exit";
