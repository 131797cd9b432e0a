//! Line commands typed at the console prompt.

use mission_core::MissionCommand;
use shared::domain::{AppMode, CityId, Intervention, UnknownMode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Mission(MissionCommand),
    Cities(Option<String>),
    Interventions,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'; type 'help' for a list")]
    UnknownCommand(String),
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error(transparent)]
    Mode(#[from] UnknownMode),
    #[error("unknown intervention '{0}'; type 'interventions' for a list")]
    UnknownIntervention(String),
}

pub const HELP: &str = "\
commands:
  mode <global|city|compare|scenario>   switch analysis mode
  click <city>                          globe click on a city
  primary <city>                        select primary city from the list
  secondary <city|none>                 set or clear the comparison city
  opposite                              compare against the opposite side of the globe
  toggle <intervention>                 toggle a scenario intervention
  ask <text>                            attach a custom question (blank clears)
  cities [query]                        list or search cities
  interventions                         list available interventions
  status                                show the current state
  help                                  show this help
  quit                                  exit";

/// Normalises a typed city argument to id form: `Mexico City` becomes
/// `mexico_city`. Names that do not map onto their id this way are resolved
/// against the registry before dispatch.
pub fn city_arg(raw: &str) -> CityId {
    CityId::new(
        raw.split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_lowercase(),
    )
}

pub fn parse_command(line: &str, catalog: &[Intervention]) -> Result<ConsoleCommand, ParseError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let required = |command: &'static str, argument: &'static str| {
        if rest.is_empty() {
            Err(ParseError::MissingArgument { command, argument })
        } else {
            Ok(rest)
        }
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "" => return Err(ParseError::Empty),
        "mode" => {
            let mode: AppMode = required("mode", "a mode name")?.parse()?;
            ConsoleCommand::Mission(MissionCommand::SetMode(mode))
        }
        "click" => ConsoleCommand::Mission(MissionCommand::ActivateCity(city_arg(required(
            "click", "a city",
        )?))),
        "primary" => ConsoleCommand::Mission(MissionCommand::ActivatePrimary(city_arg(
            required("primary", "a city")?,
        ))),
        "secondary" => {
            let arg = required("secondary", "a city or 'none'")?;
            let id = (!arg.eq_ignore_ascii_case("none")).then(|| city_arg(arg));
            ConsoleCommand::Mission(MissionCommand::SetSecondary(id))
        }
        "opposite" => ConsoleCommand::Mission(MissionCommand::FindOpposite),
        "toggle" => {
            let wanted = city_arg(required("toggle", "an intervention")?);
            let intervention = catalog
                .iter()
                .find(|item| item.kind.as_str() == wanted.as_str())
                .cloned()
                .ok_or_else(|| ParseError::UnknownIntervention(wanted.to_string()))?;
            ConsoleCommand::Mission(MissionCommand::ToggleIntervention(intervention))
        }
        "ask" => ConsoleCommand::Mission(MissionCommand::SetCustomQuery(rest.to_string())),
        "cities" => ConsoleCommand::Cities((!rest.is_empty()).then(|| rest.to_string())),
        "interventions" => ConsoleCommand::Interventions,
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(cmd)
}
