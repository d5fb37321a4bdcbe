use anyhow::{Result, bail};
use menu::controls::{ControlEvent, ControlId};

/// One line of a simulation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Hover(ControlId),
    Click(ControlId),
    Set(ControlId, bool),
}

impl Step {
    pub fn event(&self) -> ControlEvent {
        match self {
            Step::Hover(control) => ControlEvent::PointerEnter(control.clone()),
            Step::Click(control) => ControlEvent::Activate(control.clone()),
            Step::Set(control, on) => ControlEvent::ValueChanged(control.clone(), *on),
        }
    }
}

/// Parses `hover <id>`, `click <id>` and `set <id> on|off` lines. Blank lines and lines starting
/// with `#` are skipped.
pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        steps.push(parse_step(line).map_err(|err| err.context(format!("line {}", idx + 1)))?);
    }
    Ok(steps)
}

pub fn parse_step(line: &str) -> Result<Step> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["hover", control] => Ok(Step::Hover(control_id(control))),
        ["click", control] => Ok(Step::Click(control_id(control))),
        ["set", control, state] => Ok(Step::Set(control_id(control), parse_switch(state)?)),
        [verb, ..] if matches!(*verb, "hover" | "click" | "set") => {
            bail!("wrong number of arguments for `{verb}`: {line}")
        }
        _ => bail!("unknown step: {line}"),
    }
}

fn control_id(raw: &str) -> ControlId {
    ControlId::from(raw)
}

fn parse_switch(raw: &str) -> Result<bool> {
    match raw {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => bail!("expected on or off, got `{other}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_step_kinds_and_skips_comments() {
        let steps = parse_script(
            "# open and close settings\nhover open_settings\nclick open_settings\n\nset sfx_toggle off\n",
        )
        .expect("script should parse");
        assert_eq!(
            steps,
            vec![
                Step::Hover(ControlId::from("open_settings")),
                Step::Click(ControlId::from("open_settings")),
                Step::Set(ControlId::from("sfx_toggle"), false),
            ]
        );
    }

    #[test]
    fn errors_name_the_offending_line() {
        let err = parse_script("click play\nset music_toggle maybe\n")
            .expect_err("bad switch should fail");
        assert!(format!("{err:#}").contains("line 2"));

        assert!(parse_step("jump play").is_err());
        assert!(parse_step("click").is_err());
    }

    #[test]
    fn steps_map_onto_control_events() {
        let step = Step::Set(ControlId::from("music_toggle"), true);
        assert_eq!(
            step.event(),
            ControlEvent::ValueChanged(ControlId::from("music_toggle"), true)
        );
    }
}
