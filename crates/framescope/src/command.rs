//! Text commands driving a session.
//!
//! One command per line; `#` starts a comment. See [`HELP`] for the syntax.

use std::path::PathBuf;
use std::str::FromStr;

use crate::{FieldMode, FramescopeError, ParamValue, Result};

/// Command summary printed by `help`.
pub const HELP: &str = "\
commands:
  mode smooth|curvature          switch the active parameter set
  set <name> <value>             edit a parameter of the active mode
  set smooth.<name> <value>      edit a smooth-mode parameter
  set curvature.<name> <value>   edit a curvature-mode parameter
  run                            compute the field
  singularities | find           flag and list singularities
  export [dir]                   write the mesh and the field lines
  params                         print the active parameters
  help                           print this message
  quit                           leave
smooth parameters: element order cad_correction align_features use_cotan_weights smoothing_steps attach_weight
curvature parameters: element align_features confidence_threshold smooth_threshold patch_size smoothing_steps attach_weight";

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch the active mode.
    SetMode(FieldMode),
    /// Edit a parameter; `None` targets the active mode.
    SetParameter {
        mode: Option<FieldMode>,
        name: String,
        value: ParamValue,
    },
    /// Compute the field with the active parameters.
    Run,
    /// Flag and extract singularities of the current field.
    FindSingularities,
    /// Export to the given directory, or the session output directory.
    Export(Option<PathBuf>),
    /// Print the active parameter record.
    ShowParams,
    /// Print the command list.
    Help,
    /// Stop reading commands.
    Quit,
}

impl Command {
    /// Parses one input line. Blank and comment lines give `None`.
    pub fn parse_line(line: &str) -> Result<Option<Command>> {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            return Ok(None);
        }

        let invalid = || FramescopeError::InvalidCommand(line.to_string());
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["mode", mode] => Command::SetMode(mode.parse()?),
            ["set", target, value] => {
                let (mode, name) = match target.split_once('.') {
                    Some((mode, name)) => (Some(mode.parse()?), name),
                    None => (None, *target),
                };
                Command::SetParameter {
                    mode,
                    name: name.to_string(),
                    value: value.parse()?,
                }
            }
            ["run"] => Command::Run,
            ["singularities" | "find"] => Command::FindSingularities,
            ["export"] => Command::Export(None),
            ["export", dir] => Command::Export(Some(PathBuf::from(dir))),
            ["params"] => Command::ShowParams,
            ["help"] => Command::Help,
            ["quit" | "exit"] => Command::Quit,
            _ => return Err(invalid()),
        };
        Ok(Some(command))
    }
}

impl FromStr for Command {
    type Err = FramescopeError;

    fn from_str(s: &str) -> Result<Self> {
        Command::parse_line(s)?.ok_or_else(|| FramescopeError::InvalidCommand(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementKind;

    #[test]
    fn test_parse_actions() {
        assert_eq!("run".parse::<Command>().unwrap(), Command::Run);
        assert_eq!("find".parse::<Command>().unwrap(), Command::FindSingularities);
        assert_eq!(
            "singularities".parse::<Command>().unwrap(),
            Command::FindSingularities
        );
        assert_eq!("export".parse::<Command>().unwrap(), Command::Export(None));
        assert_eq!(
            "export out/dir".parse::<Command>().unwrap(),
            Command::Export(Some(PathBuf::from("out/dir")))
        );
        assert_eq!(
            "mode curvature".parse::<Command>().unwrap(),
            Command::SetMode(FieldMode::Curvature)
        );
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(
            "set element edges".parse::<Command>().unwrap(),
            Command::SetParameter {
                mode: None,
                name: "element".into(),
                value: ParamValue::Element(ElementKind::Edges),
            }
        );
        assert_eq!(
            "set curvature.smoothThreshold 1.5".parse::<Command>().unwrap(),
            Command::SetParameter {
                mode: Some(FieldMode::Curvature),
                name: "smoothThreshold".into(),
                value: ParamValue::Float(1.5),
            }
        );
        assert_eq!(
            "set smooth.cad_correction off".parse::<Command>().unwrap(),
            Command::SetParameter {
                mode: Some(FieldMode::Smooth),
                name: "cad_correction".into(),
                value: ParamValue::Bool(false),
            }
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        assert_eq!(Command::parse_line("   ").unwrap(), None);
        assert_eq!(Command::parse_line("# a comment").unwrap(), None);
        assert_eq!(Command::parse_line("run # now").unwrap(), Some(Command::Run));
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(matches!(
            "jump".parse::<Command>(),
            Err(FramescopeError::InvalidCommand(_))
        ));
        assert!(matches!(
            "set order".parse::<Command>(),
            Err(FramescopeError::InvalidCommand(_))
        ));
        assert!(matches!(
            "mode sideways".parse::<Command>(),
            Err(FramescopeError::InvalidParameter { .. })
        ));
        assert!("".parse::<Command>().is_err());
    }
}
