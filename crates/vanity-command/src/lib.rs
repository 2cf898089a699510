//! Command parsing and tab completion for the cosmetics command.
//!
//! Parsing is pure: the plugin executes the structured command against its
//! own state, so this crate stays dependency-free.

/// Context passed along with a command invocation.
pub struct CommandContext {
    /// Name of the player executing the command.
    pub sender_name: String,
    /// Arguments after the command name.
    pub args: Vec<String>,
}

/// Result returned to the command dispatcher.
pub struct CommandResult {
    /// Whether the command executed successfully.
    pub success: bool,
    /// Messages to send back to the command sender.
    pub messages: Vec<String>,
}

impl CommandResult {
    /// Create a successful result with a single message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
        }
    }

    /// Create a failed result with a single message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
        }
    }
}

/// A structured cosmetics subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosmeticsCommand {
    /// `spawn <item-id> [player]`: build the configured item and give it to
    /// the target (the sender when omitted).
    Spawn {
        item_id: String,
        target: Option<String>,
    },
    /// `reload`: reload descriptor and message configuration.
    Reload,
    /// `storage`: open the cosmetic storage UI.
    Storage,
    /// `help`
    Help,
}

/// Why a command line failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No subcommand given.
    Empty,
    /// Unknown subcommand.
    Unknown(String),
    /// Subcommand given too few arguments.
    Usage(&'static str),
}

impl ParseError {
    /// Usage line to show the sender.
    pub fn usage(&self) -> &'static str {
        match self {
            ParseError::Usage(usage) => usage,
            _ => "/cosmetics <spawn|storage|reload|help>",
        }
    }
}

/// Parse an argument list into a structured subcommand.
pub fn parse(args: &[String]) -> Result<CosmeticsCommand, ParseError> {
    let Some(sub) = args.first() else {
        return Err(ParseError::Empty);
    };
    match sub.to_ascii_lowercase().as_str() {
        "spawn" => {
            let Some(item_id) = args.get(1) else {
                return Err(ParseError::Usage("/cosmetics spawn <item-id> [player]"));
            };
            Ok(CosmeticsCommand::Spawn {
                item_id: item_id.clone(),
                target: args.get(2).cloned(),
            })
        }
        "reload" => Ok(CosmeticsCommand::Reload),
        "storage" => Ok(CosmeticsCommand::Storage),
        "help" => Ok(CosmeticsCommand::Help),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

const SUBCOMMANDS: &[&str] = &["help", "reload", "spawn", "storage"];

/// Tab completion over subcommands, known item ids, and online player names.
///
/// `args` is the partial argument list, last element being the fragment
/// under the cursor (possibly empty).
pub fn complete(args: &[String], item_ids: &[&str], player_names: &[&str]) -> Vec<String> {
    match args.len() {
        0 | 1 => {
            let fragment = args.first().map(String::as_str).unwrap_or("");
            matching(SUBCOMMANDS.iter().copied(), fragment)
        }
        2 if args[0].eq_ignore_ascii_case("spawn") => matching(item_ids.iter().copied(), &args[1]),
        3 if args[0].eq_ignore_ascii_case("spawn") => {
            matching(player_names.iter().copied(), &args[2])
        }
        _ => Vec::new(),
    }
}

fn matching<'a>(candidates: impl Iterator<Item = &'a str>, fragment: &str) -> Vec<String> {
    let fragment = fragment.to_ascii_lowercase();
    let mut out: Vec<String> = candidates
        .filter(|c| c.to_ascii_lowercase().starts_with(&fragment))
        .map(str::to_owned)
        .collect();
    out.sort_unstable();
    out
}
