//! Line-oriented script files.
//!
//! ```text
//! # n_proposers n_acceptors n_learners tmax
//! 2 3 1 50
//! 0 PROPOSE 1 42
//! 8 FAIL PROPOSER 1
//! 11 PROPOSE 2 37
//! 26 RECOVER PROPOSER 1
//! 0 END
//! ```
//!
//! The header may omit the learner count (`n_proposers n_acceptors tmax`).
//! Lines starting with `#` are comments; a `#` anywhere else is part of the
//! line, so values may contain it. Lines with an unknown event type or
//! failure target are skipped with a warning.

use crate::ScriptError;
use paxsim_simulation::{Script, ScriptEvent, SimulationConfig};
use paxsim_types::{NodeId, Role, Value};
use std::fmt::Write;
use tracing::warn;

/// A script file split into its header and its events.
#[derive(Debug, Clone)]
pub struct ParsedScript {
    pub config: SimulationConfig,
    pub script: Script,
}

/// Parse a script file.
///
/// Node indices are not checked against the header here;
/// [`paxsim_simulation::Simulation::new`] rejects out-of-range indices.
pub fn parse_script(text: &str) -> Result<ParsedScript, ScriptError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let (header_line, header) = lines.next().ok_or(ScriptError::MissingHeader)?;
    let config = parse_header(header_line, header)?;

    let mut events = Vec::new();
    let mut ended = false;
    for (line, content) in lines {
        if ended {
            return Err(ScriptError::TrailingContent { line });
        }

        let tokens: Vec<&str> = content.split_whitespace().collect();
        let tick = tokens[0]
            .parse::<u64>()
            .map_err(|_| ScriptError::InvalidTick {
                line,
                token: tokens[0].to_string(),
            })?;

        match tokens.get(1).copied() {
            Some("END") if tick == 0 => ended = true,
            Some("END") => return Err(ScriptError::InvalidSentinel { line, tick }),
            Some("PROPOSE") => {
                let index = index_field(line, "PROPOSE", "proposer index", tokens.get(2))?;
                let value = tokens.get(3).ok_or(ScriptError::MissingField {
                    line,
                    event: "PROPOSE",
                    field: "value",
                })?;
                events.push((
                    tick,
                    ScriptEvent::Propose {
                        proposer: NodeId::proposer(index),
                        value: Value::new(*value),
                    },
                ));
            }
            Some(kind @ ("FAIL" | "RECOVER")) => {
                let event = if kind == "FAIL" { "FAIL" } else { "RECOVER" };
                let Some(target) = tokens.get(2) else {
                    return Err(ScriptError::MissingField {
                        line,
                        event,
                        field: "target",
                    });
                };
                let role = match target.parse::<Role>() {
                    Ok(role @ (Role::Proposer | Role::Acceptor)) => role,
                    _ => {
                        warn!(line, node_role = %target, "Invalid failure target, skipping line");
                        continue;
                    }
                };
                let index = index_field(line, event, "node index", tokens.get(3))?;
                let node = NodeId::new(role, index);
                events.push((
                    tick,
                    if kind == "FAIL" {
                        ScriptEvent::Fail(node)
                    } else {
                        ScriptEvent::Recover(node)
                    },
                ));
            }
            Some(other) => {
                warn!(line, event = other, "Invalid event type, skipping line");
            }
            None => {
                return Err(ScriptError::MissingField {
                    line,
                    event: "event",
                    field: "type",
                })
            }
        }
    }

    if !ended {
        return Err(ScriptError::MissingSentinel);
    }

    Ok(ParsedScript {
        config,
        script: Script::from_events(events),
    })
}

/// Render a script in the file format accepted by [`parse_script`].
pub fn render_script(config: &SimulationConfig, script: &Script) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {}",
        config.proposers, config.acceptors, config.learners, config.tmax
    );
    for record in script.records() {
        for node in &record.failed {
            let _ = writeln!(out, "{} FAIL {} {}", record.tick, node.role, node.number);
        }
        for node in &record.recovered {
            let _ = writeln!(out, "{} RECOVER {} {}", record.tick, node.role, node.number);
        }
        if let Some(proposal) = &record.propose {
            let _ = writeln!(
                out,
                "{} PROPOSE {} {}",
                record.tick, proposal.proposer.number, proposal.value
            );
        }
    }
    out.push_str("0 END\n");
    out
}

fn parse_header(line: usize, header: &str) -> Result<SimulationConfig, ScriptError> {
    let fields = header
        .split_whitespace()
        .map(|token| {
            token.parse::<u64>().map_err(|_| ScriptError::InvalidHeader {
                line,
                reason: format!("{token:?} is not a number"),
            })
        })
        .collect::<Result<Vec<u64>, _>>()?;

    let count = |n: u64| {
        u32::try_from(n).map_err(|_| ScriptError::InvalidHeader {
            line,
            reason: format!("{n} nodes is too many"),
        })
    };

    match fields.as_slice() {
        [proposers, acceptors, tmax] => Ok(SimulationConfig::new(
            count(*proposers)?,
            count(*acceptors)?,
            0,
            *tmax,
        )),
        [proposers, acceptors, learners, tmax] => Ok(SimulationConfig::new(
            count(*proposers)?,
            count(*acceptors)?,
            count(*learners)?,
            *tmax,
        )),
        _ => Err(ScriptError::InvalidHeader {
            line,
            reason: format!("expected 3 or 4 fields, found {}", fields.len()),
        }),
    }
}

fn index_field(
    line: usize,
    event: &'static str,
    field: &'static str,
    token: Option<&&str>,
) -> Result<u32, ScriptError> {
    let token = token.ok_or(ScriptError::MissingField { line, event, field })?;
    token.parse::<u32>().map_err(|_| ScriptError::InvalidIndex {
        line,
        token: token.to_string(),
    })
}
