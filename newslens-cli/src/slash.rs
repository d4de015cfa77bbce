//! Slash command registry for the REPL.
//!
//! Provides structured metadata for all `/command` slash commands,
//! enabling categorized help, alias resolution, and typo suggestions.

use crate::MlopsView;

/// Categories for grouping commands in `/help` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    Analysis,
    Monitoring,
    Session,
}

impl CommandCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CommandCategory::Analysis => "Analysis",
            CommandCategory::Monitoring => "Monitoring",
            CommandCategory::Session => "Session",
        }
    }

    pub fn all() -> &'static [CommandCategory] {
        &[
            CommandCategory::Analysis,
            CommandCategory::Monitoring,
            CommandCategory::Session,
        ]
    }
}

impl std::fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Metadata describing a slash command.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// Primary name including the slash, e.g., "/analyze".
    pub name: &'static str,
    /// Alternative aliases, e.g., &["/exit", "/q"] for /quit.
    pub aliases: &'static [&'static str],
    /// One-line description shown in /help.
    pub description: &'static str,
    /// Usage pattern, e.g., "/mlops [view]".
    pub usage: &'static str,
    /// Category for grouping in /help.
    pub category: CommandCategory,
}

/// Registry holding all slash commands with their metadata.
pub struct CommandRegistry {
    commands: Vec<CommandInfo>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Create a registry pre-populated with all default commands.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Register a single command.
    pub fn register(&mut self, info: CommandInfo) {
        self.commands.push(info);
    }

    /// Register all built-in commands.
    pub fn register_defaults(&mut self) {
        // Analysis commands
        self.register(CommandInfo {
            name: "/analyze",
            aliases: &["/a"],
            description: "Analyze text or a URL (same as typing it)",
            usage: "/analyze <text|url>",
            category: CommandCategory::Analysis,
        });
        self.register(CommandInfo {
            name: "/summarize",
            aliases: &["/sum"],
            description: "Summarize text (last analyzed text if omitted)",
            usage: "/summarize [text]",
            category: CommandCategory::Analysis,
        });
        self.register(CommandInfo {
            name: "/similar",
            aliases: &["/related"],
            description: "Find related articles (last analyzed text if omitted)",
            usage: "/similar [text]",
            category: CommandCategory::Analysis,
        });

        // Monitoring commands
        self.register(CommandInfo {
            name: "/health",
            aliases: &["/status"],
            description: "Check the analysis backend",
            usage: "/health",
            category: CommandCategory::Monitoring,
        });
        self.register(CommandInfo {
            name: "/mlops",
            aliases: &[],
            description: "ML-operations view: overview, models, health, alerts, drift, pipeline",
            usage: "/mlops [view] [arg]",
            category: CommandCategory::Monitoring,
        });

        // Session commands
        self.register(CommandInfo {
            name: "/clear",
            aliases: &[],
            description: "Clear the screen",
            usage: "/clear",
            category: CommandCategory::Session,
        });
        self.register(CommandInfo {
            name: "/help",
            aliases: &["/?"],
            description: "Show this help",
            usage: "/help",
            category: CommandCategory::Session,
        });
        self.register(CommandInfo {
            name: "/quit",
            aliases: &["/exit", "/q"],
            description: "Exit NewsLens",
            usage: "/quit",
            category: CommandCategory::Session,
        });
    }

    /// Look up a command by name or alias.
    pub fn lookup(&self, input: &str) -> Option<&CommandInfo> {
        self.commands
            .iter()
            .find(|cmd| cmd.name == input || cmd.aliases.contains(&input))
    }

    /// Generate categorized help text.
    pub fn help_text(&self) -> String {
        let mut output = String::from("\nAvailable commands:\n");

        for category in CommandCategory::all() {
            let cmds: Vec<&CommandInfo> = self
                .commands
                .iter()
                .filter(|c| c.category == *category)
                .collect();

            if cmds.is_empty() {
                continue;
            }

            output.push_str(&format!("\n  {}:\n", category.label()));

            for cmd in cmds {
                let aliases = if cmd.aliases.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", cmd.aliases.join(", "))
                };
                output.push_str(&format!(
                    "    {:<24} {}{}\n",
                    cmd.usage, cmd.description, aliases
                ));
            }
        }

        output.push_str("\nInput:\n  Paste article text or a URL and press Enter to analyze it.\n");
        output
    }

    /// Return all registered commands.
    #[cfg(test)]
    pub fn all(&self) -> &[CommandInfo] {
        &self.commands
    }

    /// Suggest the closest command for an unknown input using edit distance.
    pub fn suggest(&self, input: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;

        for cmd in &self.commands {
            for name in std::iter::once(&cmd.name).chain(cmd.aliases.iter()) {
                let dist = edit_distance(input, name);
                if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
                    best = Some((*name, dist));
                }
            }
        }

        best.map(|(name, _)| name)
    }

    /// Parse one REPL line that starts with `/`.
    pub fn parse(&self, line: &str) -> SlashCommand {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        let Some(info) = self.lookup(cmd) else {
            return SlashCommand::Unknown {
                input: cmd.to_string(),
                suggestion: self.suggest(cmd).map(str::to_string),
            };
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());
        match info.name {
            "/analyze" => SlashCommand::Analyze(arg),
            "/summarize" => SlashCommand::Summarize(arg),
            "/similar" => SlashCommand::Similar(arg),
            "/health" => SlashCommand::Health,
            "/mlops" => match parse_mlops_view(rest) {
                Ok(view) => SlashCommand::Mlops(view),
                Err(message) => SlashCommand::Invalid(message),
            },
            "/clear" => SlashCommand::Clear,
            "/help" => SlashCommand::Help,
            "/quit" => SlashCommand::Quit,
            other => SlashCommand::Invalid(format!("{other} is not handled")),
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Analyze(Option<String>),
    Summarize(Option<String>),
    Similar(Option<String>),
    Health,
    Mlops(MlopsView),
    Clear,
    Help,
    Quit,
    Unknown {
        input: String,
        suggestion: Option<String>,
    },
    Invalid(String),
}

fn parse_mlops_view(args: &str) -> Result<MlopsView, String> {
    let mut parts = args.split_whitespace();
    let view = parts.next().unwrap_or("overview");
    let arg = parts.next().map(str::to_string);
    match view {
        "overview" => Ok(MlopsView::Overview),
        "models" => Ok(MlopsView::Models),
        "health" | "metrics" => Ok(MlopsView::Health { model: arg }),
        "alerts" => Ok(MlopsView::Alerts {
            filter: arg.unwrap_or_else(|| "all".to_string()),
        }),
        "drift" => Ok(MlopsView::Drift),
        "pipeline" => Ok(MlopsView::Pipeline),
        other => Err(format!(
            "Unknown MLOps view '{other}'. Use overview, models, health, alerts, drift or pipeline."
        )),
    }
}

/// Simple Levenshtein edit distance for command suggestions.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    let a_len = a_bytes.len();
    let b_len = b_bytes.len();

    let mut prev = (0..=b_len).collect::<Vec<_>>();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = if a_bytes[i - 1] == b_bytes[j - 1] {
                0
            } else {
                1
            };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_by_alias() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(registry.lookup("/exit").unwrap().name, "/quit");
        assert_eq!(registry.lookup("/related").unwrap().name, "/similar");
        assert!(registry.lookup("/nope").is_none());
    }

    #[test]
    fn test_no_duplicate_names_or_aliases() {
        let registry = CommandRegistry::with_defaults();
        let mut seen = HashSet::new();
        for cmd in registry.all() {
            assert!(seen.insert(cmd.name), "Duplicate command name: {}", cmd.name);
            for alias in cmd.aliases {
                assert!(
                    seen.insert(alias),
                    "Duplicate alias: {} (for {})",
                    alias,
                    cmd.name
                );
            }
        }
    }

    #[test]
    fn test_all_categories_have_commands() {
        let registry = CommandRegistry::with_defaults();
        for cat in CommandCategory::all() {
            let count = registry.all().iter().filter(|c| c.category == *cat).count();
            assert!(count > 0, "Category {} has no commands", cat.label());
        }
    }

    #[test]
    fn test_help_text_lists_commands() {
        let help = CommandRegistry::with_defaults().help_text();
        for name in ["/analyze", "/summarize", "/similar", "/health", "/mlops", "/quit"] {
            assert!(help.contains(name), "help is missing {name}");
        }
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(
            registry.parse("/analyze  https://example.com/a "),
            SlashCommand::Analyze(Some("https://example.com/a".into()))
        );
        assert_eq!(registry.parse("/summarize"), SlashCommand::Summarize(None));
        assert_eq!(registry.parse("/q"), SlashCommand::Quit);
        assert_eq!(
            registry.parse("/mlops alerts resolved"),
            SlashCommand::Mlops(MlopsView::Alerts {
                filter: "resolved".into()
            })
        );
        assert_eq!(registry.parse("/mlops"), SlashCommand::Mlops(MlopsView::Overview));
        assert!(matches!(
            registry.parse("/mlops charts"),
            SlashCommand::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_unknown_suggests() {
        let registry = CommandRegistry::with_defaults();
        assert_eq!(
            registry.parse("/helth"),
            SlashCommand::Unknown {
                input: "/helth".into(),
                suggestion: Some("/health".into())
            }
        );
        assert_eq!(
            registry.parse("/xyzabcdef"),
            SlashCommand::Unknown {
                input: "/xyzabcdef".into(),
                suggestion: None
            }
        );
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("hello", "hello"), 0);
        assert_eq!(edit_distance("/help", "/hep"), 1);
        assert_eq!(edit_distance("abc", "xyz"), 3);
    }
}
