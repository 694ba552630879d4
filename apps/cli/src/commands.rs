//! Commands typed into a watched room.

use houseparty_core::RoomSettings;

pub const HELP: &str = "\
Commands:
  vol <0-100>                       set the volume
  toggle                            pause or resume playback
  skip                              vote to skip the current track
  settings                          show the host's settings panel
  settings <votes> <pause> <volume> update room settings, e.g. `settings 3 yes no`
  close                             hide the settings panel
  status                            print the room state
  leave                             leave the room
  help                              show this message";

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomCommand {
    Volume(u8),
    Toggle,
    Skip,
    OpenSettings,
    UpdateSettings(RoomSettings),
    CloseSettings,
    Status,
    Leave,
    Help,
}

impl RoomCommand {
    /// Parses one input line. Returns a message for the user on failure.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err("Empty command; type `help`.".to_string());
        };
        let args: Vec<&str> = words.collect();

        match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("vol" | "volume", [value]) => value
                .parse::<u8>()
                .ok()
                .filter(|v| *v <= 100)
                .map(RoomCommand::Volume)
                .ok_or_else(|| format!("Volume must be 0-100, got `{}`.", value)),
            ("toggle" | "play" | "pause", []) => Ok(RoomCommand::Toggle),
            ("skip", []) => Ok(RoomCommand::Skip),
            ("settings", []) => Ok(RoomCommand::OpenSettings),
            ("settings", [votes, pause, volume]) => {
                let votes_to_skip = votes
                    .parse::<u32>()
                    .ok()
                    .filter(|v| *v >= 1)
                    .ok_or_else(|| format!("Votes to skip must be at least 1, got `{}`.", votes))?;
                Ok(RoomCommand::UpdateSettings(RoomSettings {
                    votes_to_skip,
                    guest_can_pause: parse_flag(pause)?,
                    guest_can_control_volume: parse_flag(volume)?,
                }))
            }
            ("close", []) => Ok(RoomCommand::CloseSettings),
            ("status", []) => Ok(RoomCommand::Status),
            ("leave" | "quit", []) => Ok(RoomCommand::Leave),
            ("help" | "?", []) => Ok(RoomCommand::Help),
            _ => Err(format!("Unknown command `{}`; type `help`.", line.trim())),
        }
    }
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "on" => Ok(true),
        "no" | "n" | "false" | "off" => Ok(false),
        _ => Err(format!("Expected yes or no, got `{}`.", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_volume_in_range() {
        assert_eq!(RoomCommand::parse("vol 80"), Ok(RoomCommand::Volume(80)));
        assert_eq!(RoomCommand::parse("  VOLUME 0 "), Ok(RoomCommand::Volume(0)));
        assert!(RoomCommand::parse("vol 101").is_err());
        assert!(RoomCommand::parse("vol loud").is_err());
        assert!(RoomCommand::parse("vol").is_err());
    }

    #[test]
    fn parses_settings_update() {
        assert_eq!(
            RoomCommand::parse("settings 3 yes no"),
            Ok(RoomCommand::UpdateSettings(RoomSettings {
                votes_to_skip: 3,
                guest_can_pause: true,
                guest_can_control_volume: false,
            }))
        );
        assert_eq!(RoomCommand::parse("settings"), Ok(RoomCommand::OpenSettings));
        assert!(RoomCommand::parse("settings 0 yes no").is_err());
        assert!(RoomCommand::parse("settings 2 maybe no").is_err());
    }

    #[test]
    fn play_and_pause_both_toggle() {
        assert_eq!(RoomCommand::parse("play"), Ok(RoomCommand::Toggle));
        assert_eq!(RoomCommand::parse("pause"), Ok(RoomCommand::Toggle));
    }

    #[test]
    fn rejects_unknown_and_empty_input() {
        assert!(RoomCommand::parse("dance").is_err());
        assert!(RoomCommand::parse("   ").is_err());
        assert!(RoomCommand::parse("skip now").is_err());
    }
}
