use std::fmt;
use taskpilot::models::{ChatId, ProjectId};

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Register { email: String, username: String, password: String },
    Logout,
    WhoAmI,
    Projects,
    Tasks { project_id: Option<ProjectId> },
    Chats,
    Chat { chat_id: ChatId, message: String },
    Notifications,
    Help,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Command invoked without its required arguments.
    MissingArguments(&'static str),
    /// An ID argument that is not a number.
    InvalidId(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArguments(usage) => write!(f, "Missing arguments. Usage: {}", usage),
            Self::InvalidId(value) => {
                write!(f, "Invalid ID '{}'. Must be a number (e.g., 'tasks 3')", value)
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Usage lines shown by `help`.
pub const USAGE: &str = "\
COMMANDS:
  login <email> <password>
  register <email> <username> <password>
  logout
  whoami
  projects
  tasks [project_id]
  chats
  chat <chat_id> <message...>
  notifications
  help
";

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use tp_client::commands::{parse_command, Command};
///
/// assert_eq!(parse_command("projects"), Ok(Command::Projects));
/// assert_eq!(parse_command("tasks 3"), Ok(Command::Tasks { project_id: Some(3) }));
/// assert!(parse_command("chat 4").is_err());
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    match trimmed {
        "" | "help" => return Ok(Command::Help),
        "logout" => return Ok(Command::Logout),
        "whoami" => return Ok(Command::WhoAmI),
        "projects" => return Ok(Command::Projects),
        "chats" => return Ok(Command::Chats),
        "notifications" => return Ok(Command::Notifications),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"login") => parse_login_command(&parts),
        Some(&"register") => parse_register_command(&parts),
        Some(&"tasks") => parse_tasks_command(&parts),
        Some(&"chat") => parse_chat_command(&parts),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a login command: "login EMAIL PASSWORD"
fn parse_login_command(parts: &[&str]) -> Result<Command, ParseError> {
    match (parts.get(1), parts.get(2)) {
        (Some(email), Some(password)) => Ok(Command::Login {
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(ParseError::MissingArguments("login <email> <password>")),
    }
}

/// Parse a register command: "register EMAIL USERNAME PASSWORD"
fn parse_register_command(parts: &[&str]) -> Result<Command, ParseError> {
    match (parts.get(1), parts.get(2), parts.get(3)) {
        (Some(email), Some(username), Some(password)) => Ok(Command::Register {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }),
        _ => Err(ParseError::MissingArguments(
            "register <email> <username> <password>",
        )),
    }
}

/// Parse a tasks command: "tasks [PROJECT_ID]"
fn parse_tasks_command(parts: &[&str]) -> Result<Command, ParseError> {
    let project_id = parts.get(1).map(|value| parse_id(value)).transpose()?;
    Ok(Command::Tasks { project_id })
}

/// Parse a chat command: "chat CHAT_ID MESSAGE..."
fn parse_chat_command(parts: &[&str]) -> Result<Command, ParseError> {
    let usage = "chat <chat_id> <message...>";
    let chat_id = parse_id(parts.get(1).ok_or(ParseError::MissingArguments(usage))?)?;

    let message = parts.get(2..).unwrap_or_default().join(" ");
    if message.is_empty() {
        return Err(ParseError::MissingArguments(usage));
    }

    Ok(Command::Chat { chat_id, message })
}

fn parse_id(value: &str) -> Result<i64, ParseError> {
    value
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidId(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Single-word command tests ===

    #[test]
    fn test_parse_single_word_commands() {
        assert_eq!(parse_command("logout"), Ok(Command::Logout));
        assert_eq!(parse_command("whoami"), Ok(Command::WhoAmI));
        assert_eq!(parse_command("projects"), Ok(Command::Projects));
        assert_eq!(parse_command("chats"), Ok(Command::Chats));
        assert_eq!(parse_command("notifications"), Ok(Command::Notifications));
    }

    #[test]
    fn test_empty_input_is_help() {
        assert_eq!(parse_command(""), Ok(Command::Help));
        assert_eq!(parse_command("   "), Ok(Command::Help));
        assert_eq!(parse_command("help"), Ok(Command::Help));
    }

    // === Whitespace handling ===

    #[test]
    fn test_parse_with_surrounding_whitespace() {
        assert_eq!(parse_command("  whoami  "), Ok(Command::WhoAmI));
    }

    // === Multi-word commands ===

    #[test]
    fn test_parse_login() {
        assert_eq!(
            parse_command("login ada@example.com Secret123!"),
            Ok(Command::Login {
                email: "ada@example.com".to_string(),
                password: "Secret123!".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_login_missing_password() {
        assert_eq!(
            parse_command("login ada@example.com"),
            Err(ParseError::MissingArguments("login <email> <password>"))
        );
    }

    #[test]
    fn test_parse_register() {
        assert_eq!(
            parse_command("register ada@example.com ada Secret123!"),
            Ok(Command::Register {
                email: "ada@example.com".to_string(),
                username: "ada".to_string(),
                password: "Secret123!".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_tasks_with_and_without_project() {
        assert_eq!(parse_command("tasks"), Ok(Command::Tasks { project_id: None }));
        assert_eq!(
            parse_command("tasks 12"),
            Ok(Command::Tasks {
                project_id: Some(12)
            })
        );
    }

    #[test]
    fn test_parse_tasks_invalid_id() {
        assert_eq!(
            parse_command("tasks abc"),
            Err(ParseError::InvalidId("abc".to_string()))
        );
    }

    #[test]
    fn test_parse_chat_joins_message() {
        assert_eq!(
            parse_command("chat 4 what is   left to do?"),
            Ok(Command::Chat {
                chat_id: 4,
                message: "what is left to do?".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_chat_requires_message() {
        assert!(matches!(
            parse_command("chat 4"),
            Err(ParseError::MissingArguments(_))
        ));
        assert!(matches!(
            parse_command("chat"),
            Err(ParseError::MissingArguments(_))
        ));
    }

    // === Error handling ===

    #[test]
    fn test_unrecognized_command() {
        let err = parse_command("deploy now").unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedCommand("deploy now".to_string()));
        assert!(err.to_string().contains("Type 'help'"));
    }

    #[test]
    fn test_error_messages_include_usage() {
        let err = parse_command("register ada@example.com").unwrap_err();
        assert!(err.to_string().contains("register <email> <username> <password>"));
    }
}
