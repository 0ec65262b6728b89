use anyhow::{anyhow, bail, Context};
use orbitcore::catalog::{AltitudeBin, FilterCriteria, ObjectKind, Origin};
use orbitcore::session::{SessionCommand, SessionParameters};

pub const HELP: &str = "commands: start | stop | restart [threshold length step] | capacity N | \
kind <active|junk> | origin <name> | bin <label> | all | metrics | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Send(SessionCommand),
    Metrics,
    Help,
    Nothing,
}

/// Turns stdin lines into session commands, tracking the UI-side filter and
/// parameter state so toggles and restarts build on what came before.
pub struct CommandInterpreter {
    params: SessionParameters,
    criteria: FilterCriteria,
}

impl CommandInterpreter {
    pub fn new(params: SessionParameters, criteria: FilterCriteria) -> Self {
        Self { params, criteria }
    }

    pub fn interpret(&mut self, line: &str) -> anyhow::Result<Action> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Action::Nothing);
        };
        let rest: Vec<&str> = words.collect();
        let argument = || {
            rest.first()
                .copied()
                .ok_or_else(|| anyhow!("'{}' needs an argument", verb))
        };

        let action = match verb.to_ascii_lowercase().as_str() {
            "start" => Action::Send(SessionCommand::Enter(self.params)),
            "stop" | "exit" => Action::Send(SessionCommand::Exit),
            "restart" => {
                if !rest.is_empty() {
                    self.params = parse_params(&rest)?;
                }
                Action::Send(SessionCommand::Restart(self.params))
            }
            "capacity" => {
                let capacity = argument()?
                    .parse::<usize>()
                    .context("capacity must be a non-negative integer")?;
                Action::Send(SessionCommand::SetCapacity(capacity))
            }
            "kind" => {
                let kind: ObjectKind = argument()?.parse().map_err(|err: String| anyhow!(err))?;
                self.criteria.toggle_kind(kind);
                self.criteria_changed()
            }
            "origin" => {
                let origin: Origin = rest.join(" ").parse().map_err(|err: String| anyhow!(err))?;
                self.criteria.toggle_origin(origin);
                self.criteria_changed()
            }
            "bin" => {
                let bin: AltitudeBin = argument()?.parse().map_err(|err: String| anyhow!(err))?;
                self.criteria.toggle_altitude_bin(bin);
                self.criteria_changed()
            }
            "all" => {
                self.criteria = FilterCriteria::accept_all();
                self.criteria_changed()
            }
            "metrics" => Action::Metrics,
            "help" | "?" => Action::Help,
            "quit" | "q" => Action::Send(SessionCommand::Shutdown),
            other => bail!("unknown command '{}'", other),
        };
        Ok(action)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    fn criteria_changed(&self) -> Action {
        Action::Send(SessionCommand::SetCriteria(self.criteria.clone()))
    }
}

fn parse_params(words: &[&str]) -> anyhow::Result<SessionParameters> {
    let [threshold, length, step] = words else {
        bail!("restart takes three values: threshold length step");
    };
    let threshold = threshold.parse().context("threshold must be an integer >= 0")?;
    let length = length.parse().context("length must be an integer >= 1")?;
    let step = step.parse().context("step must be an integer >= 1")?;
    SessionParameters::new(threshold, length, step).context("invalid session parameters")
}
