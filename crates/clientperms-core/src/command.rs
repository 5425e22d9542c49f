use std::collections::HashMap;

use crate::registry::ModVersionRegistry;

/// Output from a command execution.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandOutput {
    /// Lines to show the operator.
    Lines(Vec<String>),
    /// Signal that the console session should end.
    Quit,
}

/// Context available to commands during execution.
pub struct CommandContext<'a> {
    pub registry: &'a mut ModVersionRegistry,
}

/// An admin console command.
pub trait Command: Send + Sync {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[&str] { &[] }
    fn description(&self) -> &str;
    fn usage(&self) -> &str { self.name() }
    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput;
}

const HELP_NAMES: [&str; 2] = ["help", "?"];

/// Registry of admin console commands.
pub struct CommandRegistry {
    commands: Vec<Box<dyn Command>>,
    lookup: HashMap<String, usize>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let idx = self.commands.len();
        self.lookup.insert(cmd.name().to_string(), idx);
        for alias in cmd.aliases() {
            self.lookup.insert(alias.to_string(), idx);
        }
        self.commands.push(cmd);
    }

    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandOutput {
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            return CommandOutput::Lines(vec![]);
        }

        let name = parts[0];
        let args = &parts[1..];

        // Help lives here rather than in a Command so it can see every registration.
        if HELP_NAMES.contains(&name) {
            return CommandOutput::Lines(self.help_lines(args.first().copied()));
        }

        match self.lookup.get(name) {
            Some(&idx) => self.commands[idx].execute(args, ctx),
            None => CommandOutput::Lines(vec![
                format!("unknown command: '{}'. Type 'help' for available commands.", name),
            ]),
        }
    }

    /// Usage for one command, or a listing of all of them.
    pub fn help_lines(&self, topic: Option<&str>) -> Vec<String> {
        if let Some(topic) = topic {
            return match self.lookup.get(topic) {
                Some(&idx) => {
                    let cmd = &self.commands[idx];
                    vec![format!("usage: {}", cmd.usage()), format!("  {}", cmd.description())]
                }
                None => vec![format!("no help for unknown command '{}'", topic)],
            };
        }

        let mut lines = vec![format!("  {:24} {} (aliases: ?)", "help [command]", "List commands or show usage")];
        lines.extend(self.commands.iter().map(|cmd| {
            let aliases = cmd.aliases();
            if aliases.is_empty() {
                format!("  {:24} {}", cmd.usage(), cmd.description())
            } else {
                format!(
                    "  {:24} {} (aliases: {})",
                    cmd.usage(),
                    cmd.description(),
                    aliases.join(", ")
                )
            }
        }));
        lines
    }

    pub fn commands(&self) -> &[Box<dyn Command>] {
        &self.commands
    }
}

// ── Built-in commands ──

pub struct ModsCommand;

impl Command for ModsCommand {
    fn name(&self) -> &str { "mods" }
    fn aliases(&self) -> &[&str] { &["list"] }
    fn description(&self) -> &str { "List supported mods and minimum versions" }

    fn execute(&self, _args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let registry = &*ctx.registry;
        if registry.mods().is_empty() {
            return CommandOutput::Lines(vec!["no supported mods".into()]);
        }

        let lines = registry
            .mods()
            .iter()
            .map(|name| match registry.min_version(name) {
                v if v > 0.0 => format!("  {} (min version {})", name, v),
                _ => format!("  {}", name),
            })
            .collect();
        CommandOutput::Lines(lines)
    }
}

pub struct AddModCommand;

impl Command for AddModCommand {
    fn name(&self) -> &str { "addmod" }
    fn aliases(&self) -> &[&str] { &["add"] }
    fn description(&self) -> &str { "Add a supported mod" }
    fn usage(&self) -> &str { "addmod <mod>" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let Some(name) = args.first() else {
            return CommandOutput::Lines(vec![format!("usage: {}", self.usage())]);
        };
        match ctx.registry.add_mod(name) {
            Ok(()) => CommandOutput::Lines(vec![format!("Added mod: {}", name)]),
            Err(e) => CommandOutput::Lines(vec![format!("error: {}", e)]),
        }
    }
}

pub struct RemoveModCommand;

impl Command for RemoveModCommand {
    fn name(&self) -> &str { "removemod" }
    fn aliases(&self) -> &[&str] { &["rm"] }
    fn description(&self) -> &str { "Remove a supported mod" }
    fn usage(&self) -> &str { "removemod <mod>" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let Some(name) = args.first() else {
            return CommandOutput::Lines(vec![format!("usage: {}", self.usage())]);
        };
        match ctx.registry.remove_mod(name) {
            Ok(()) => CommandOutput::Lines(vec![format!("Removed mod: {}", name)]),
            Err(e) => CommandOutput::Lines(vec![format!("error: {}", e)]),
        }
    }
}

pub struct MinVersionCommand;

impl Command for MinVersionCommand {
    fn name(&self) -> &str { "minversion" }
    fn aliases(&self) -> &[&str] { &["ver"] }
    fn description(&self) -> &str { "Show or set a mod's minimum version" }
    fn usage(&self) -> &str { "minversion <mod> [version]" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        match args {
            [name] => {
                if !ctx.registry.provides_mappings_for(name) {
                    return CommandOutput::Lines(vec![format!("error: mod is not supported: {}", name)]);
                }
                match ctx.registry.min_version(name) {
                    v if v > 0.0 => CommandOutput::Lines(vec![format!("{}: min version {}", name, v)]),
                    _ => CommandOutput::Lines(vec![format!("{}: no minimum version", name)]),
                }
            }
            [name, raw] => {
                let Ok(version) = raw.parse::<f32>() else {
                    return CommandOutput::Lines(vec![format!("error: invalid version '{}'", raw)]);
                };
                match ctx.registry.set_min_version(name, version) {
                    Ok(()) => CommandOutput::Lines(vec![format!(
                        "Set {} min version to {}",
                        name,
                        ctx.registry.min_version(name)
                    )]),
                    Err(e) => CommandOutput::Lines(vec![format!("error: {}", e)]),
                }
            }
            _ => CommandOutput::Lines(vec![format!("usage: {}", self.usage())]),
        }
    }
}

pub struct CheckCommand;

impl Command for CheckCommand {
    fn name(&self) -> &str { "check" }
    fn description(&self) -> &str { "Check a client mod version against the minimum" }
    fn usage(&self) -> &str { "check <mod> <version>" }

    fn execute(&self, args: &[&str], ctx: &mut CommandContext) -> CommandOutput {
        let [name, raw] = args else {
            return CommandOutput::Lines(vec![format!("usage: {}", self.usage())]);
        };
        let Ok(version) = raw.parse::<f32>() else {
            return CommandOutput::Lines(vec![format!("error: invalid version '{}'", raw)]);
        };

        let verdict = if ctx.registry.check_version(name, version) { "accepted" } else { "too old" };
        CommandOutput::Lines(vec![format!("{} {}: {}", name, version, verdict)])
    }
}

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name(&self) -> &str { "quit" }
    fn aliases(&self) -> &[&str] { &["exit", "q"] }
    fn description(&self) -> &str { "End the console session" }

    fn execute(&self, _args: &[&str], _ctx: &mut CommandContext) -> CommandOutput {
        CommandOutput::Quit
    }
}

/// Create a CommandRegistry pre-loaded with all built-in commands.
pub fn builtin_registry() -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    reg.register(Box::new(ModsCommand));
    reg.register(Box::new(AddModCommand));
    reg.register(Box::new(RemoveModCommand));
    reg.register(Box::new(MinVersionCommand));
    reg.register(Box::new(CheckCommand));
    reg.register(Box::new(QuitCommand));
    reg
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientperms_config::MemoryStore;

    fn make_registry() -> ModVersionRegistry {
        let mut registry = ModVersionRegistry::with_store(MemoryStore::new());
        registry.add_mod("minimap").unwrap();
        registry
    }

    fn run(input: &str, registry: &mut ModVersionRegistry) -> Vec<String> {
        let reg = builtin_registry();
        let mut ctx = CommandContext { registry };
        match reg.execute(input, &mut ctx) {
            CommandOutput::Lines(lines) => lines,
            CommandOutput::Quit => panic!("expected Lines"),
        }
    }

    // ── Parsing tests ──

    #[test]
    fn empty_input_returns_empty() {
        let mut registry = make_registry();
        assert!(run("", &mut registry).is_empty());
        assert!(run("   ", &mut registry).is_empty());
    }

    #[test]
    fn unknown_command_returns_error() {
        let mut registry = make_registry();
        let lines = run("foobar", &mut registry);
        assert!(lines[0].contains("unknown command"));
    }

    #[test]
    fn lookup_by_alias() {
        let mut registry = make_registry();
        assert_eq!(run("add journeymap", &mut registry), vec!["Added mod: journeymap"]);
        assert_eq!(run("rm journeymap", &mut registry), vec!["Removed mod: journeymap"]);
        assert_eq!(run("list", &mut registry), vec!["  minimap"]);
    }

    // ── Help ──

    #[test]
    fn help_lists_every_command() {
        let mut registry = make_registry();
        let lines = run("help", &mut registry);
        assert_eq!(lines.len(), builtin_registry().commands().len() + 1);
        assert!(lines.iter().any(|l| l.contains("addmod <mod>")));
        assert!(lines.iter().any(|l| l.contains("aliases: exit, q")));
    }

    #[test]
    fn help_for_one_command() {
        let mut registry = make_registry();
        let lines = run("? minversion", &mut registry);
        assert_eq!(lines[0], "usage: minversion <mod> [version]");

        let lines = run("help nope", &mut registry);
        assert!(lines[0].contains("unknown command 'nope'"));
    }

    // ── Built-in command tests ──

    #[test]
    fn mods_lists_versions() {
        let mut registry = make_registry();
        registry.add_mod("journeymap").unwrap();
        registry.set_min_version("minimap", 2.5).unwrap();

        assert_eq!(
            run("mods", &mut registry),
            vec!["  minimap (min version 2.5)", "  journeymap"]
        );
    }

    #[test]
    fn mods_on_empty_registry() {
        let mut registry = ModVersionRegistry::with_store(MemoryStore::new());
        assert_eq!(run("mods", &mut registry), vec!["no supported mods"]);
    }

    #[test]
    fn addmod_reports_rejection() {
        let mut registry = make_registry();
        assert_eq!(
            run("addmod ALL", &mut registry),
            vec!["error: mod name is reserved: ALL"]
        );
        assert_eq!(
            run("addmod minimap", &mut registry),
            vec!["error: mod is already supported: minimap"]
        );
        assert_eq!(run("addmod", &mut registry), vec!["usage: addmod <mod>"]);
    }

    #[test]
    fn removemod_unknown_reports_error() {
        let mut registry = make_registry();
        assert_eq!(
            run("removemod nope", &mut registry),
            vec!["error: mod is not supported: nope"]
        );
    }

    #[test]
    fn minversion_show_and_set() {
        let mut registry = make_registry();
        assert_eq!(run("minversion minimap", &mut registry), vec!["minimap: no minimum version"]);

        assert_eq!(run("ver minimap 1.5", &mut registry), vec!["Set minimap min version to 1.5"]);
        assert_eq!(registry.min_version("minimap"), 1.5);
        assert_eq!(run("minversion minimap", &mut registry), vec!["minimap: min version 1.5"]);

        assert_eq!(run("minversion minimap -3", &mut registry), vec!["Set minimap min version to 0"]);
    }

    #[test]
    fn minversion_rejects_bad_input() {
        let mut registry = make_registry();
        assert_eq!(
            run("minversion minimap abc", &mut registry),
            vec!["error: invalid version 'abc'"]
        );
        assert_eq!(
            run("minversion nope 2", &mut registry),
            vec!["error: mod is not supported: nope"]
        );
        assert_eq!(
            run("minversion nope", &mut registry),
            vec!["error: mod is not supported: nope"]
        );
        assert_eq!(
            run("minversion", &mut registry),
            vec!["usage: minversion <mod> [version]"]
        );
    }

    #[test]
    fn check_reports_verdict() {
        let mut registry = make_registry();
        registry.set_min_version("minimap", 2.0).unwrap();

        assert_eq!(run("check minimap 1.9", &mut registry), vec!["minimap 1.9: too old"]);
        assert_eq!(run("check minimap 2", &mut registry), vec!["minimap 2: accepted"]);
        assert_eq!(run("check other 0", &mut registry), vec!["other 0: accepted"]);
        assert_eq!(run("check minimap", &mut registry), vec!["usage: check <mod> <version>"]);
    }

    #[test]
    fn quit_command() {
        let mut registry = make_registry();
        let reg = builtin_registry();
        let mut ctx = CommandContext { registry: &mut registry };
        assert_eq!(reg.execute("exit", &mut ctx), CommandOutput::Quit);
        assert_eq!(reg.execute("q", &mut ctx), CommandOutput::Quit);
    }
}
