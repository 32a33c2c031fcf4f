//! Built-in commands for the BlockTerm shell.

use std::fmt::Display;

use blockterm_types::error::Result;
use chrono::{DateTime, TimeZone};

use crate::eval::EvalCmd;
use crate::interpreter::{ArgSpec, Command, CommandRegistry, CommandResult, Environment, Renderable};

/// Register all built-in commands into a registry.
///
/// Registration order is the order `help` lists them in.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(EvalCmd));
    reg.register(Box::new(ExitCmd));
    reg.register(Box::new(LoadImgCmd));
    reg.register(Box::new(ClearCmd));
    reg.register(Box::new(DateCmd));
    reg.register(Box::new(FlipCoinCmd));
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(RmdirCmd));
    reg.register(Box::new(AliasCmd));
    reg.register(Box::new(DummyCmd));
    reg.register(Box::new(HelpCmd));
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Echoes back specified string"
    }
    fn args(&self) -> &[ArgSpec] {
        const ARGS: &[ArgSpec] = &[ArgSpec::new("string", "string to echo")];
        ARGS
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandResult> {
        Ok(CommandResult::Text(args.join(" ")))
    }
}

// ---------------------------------------------------------------------------
// exit
// ---------------------------------------------------------------------------

struct ExitCmd;
impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn description(&self) -> &str {
        "Exits shell with specified code"
    }
    fn args(&self) -> &[ArgSpec] {
        const ARGS: &[ArgSpec] = &[ArgSpec::new("code", "exit code")];
        ARGS
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        let code = parse_exit_code(args.first().copied().unwrap_or(""));
        env.state.running = false;
        env.state.exit_code = code;
        Ok(CommandResult::Text(format!("[Exit {code}]")))
    }
}

/// Parse an exit code the way an integer prefix parser does.
///
/// Leading whitespace and an optional sign are accepted, then decimal digits
/// up to the first non-digit. No digits, or a value outside `i32`, gives -1.
pub fn parse_exit_code(arg: &str) -> i32 {
    let s = arg.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => ("-", &s[1..]),
        Some(b'+') => ("", &s[1..]),
        _ => ("", s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return -1;
    }
    format!("{sign}{digits}").parse().unwrap_or(-1)
}

// ---------------------------------------------------------------------------
// loadimg
// ---------------------------------------------------------------------------

struct LoadImgCmd;
impl Command for LoadImgCmd {
    fn name(&self) -> &str {
        "loadimg"
    }
    fn description(&self) -> &str {
        "Loads image from specified URL"
    }
    fn args(&self) -> &[ArgSpec] {
        const ARGS: &[ArgSpec] = &[ArgSpec::new("url", "URL to load")];
        ARGS
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandResult> {
        let url = args.first().copied().unwrap_or_default().to_string();
        Ok(CommandResult::Block(Renderable::Image { url }))
    }
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Clears the screen"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        env.state.request_clear();
        Ok(CommandResult::Success)
    }
}

// ---------------------------------------------------------------------------
// date
// ---------------------------------------------------------------------------

struct DateCmd;
impl Command for DateCmd {
    fn name(&self) -> &str {
        "date"
    }
    fn description(&self) -> &str {
        "Shows the date"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandResult> {
        Ok(CommandResult::Text(format_date(&chrono::Local::now())))
    }
}

/// `MM/DD/YYYY HH:MM:SS`, zero-padded.
pub fn format_date<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format("%m/%d/%Y %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// flipcoin
// ---------------------------------------------------------------------------

struct FlipCoinCmd;
impl Command for FlipCoinCmd {
    fn name(&self) -> &str {
        "flipcoin"
    }
    fn description(&self) -> &str {
        "Toss a coin"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandResult> {
        let face = if rand::random::<bool>() { "Heads" } else { "Tails" };
        Ok(CommandResult::text(face))
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Prints the working directory"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        Ok(CommandResult::Text(env.state.cwd.clone()))
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Navigates to specified directory"
    }
    fn args(&self) -> &[ArgSpec] {
        const ARGS: &[ArgSpec] = &[ArgSpec::new("directory", "path to navigate to")];
        ARGS
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        // No existence check; the path is built from the raw tokens.
        env.state.cwd = format!("/{}", args.join("/"));
        Ok(CommandResult::Empty)
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "Lists the files in the current directory"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        let sep = if args.first() == Some(&"-l") { "\n" } else { " " };
        Ok(CommandResult::Text(env.vfs.entries().join(sep)))
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Creates a directory"
    }
    fn args(&self) -> &[ArgSpec] {
        const ARGS: &[ArgSpec] = &[ArgSpec::new("directory", "path to create")];
        ARGS
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        for name in args {
            env.vfs.add(name);
        }
        Ok(CommandResult::Empty)
    }
}

// ---------------------------------------------------------------------------
// rmdir
// ---------------------------------------------------------------------------

struct RmdirCmd;
impl Command for RmdirCmd {
    fn name(&self) -> &str {
        "rmdir"
    }
    fn description(&self) -> &str {
        "Removes a directory"
    }
    fn args(&self) -> &[ArgSpec] {
        const ARGS: &[ArgSpec] = &[ArgSpec::new("directory", "path to remove")];
        ARGS
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        for name in args {
            if env.vfs.remove(name) == 0 {
                log::debug!("rmdir: no entry named {name:?}");
            }
        }
        Ok(CommandResult::Empty)
    }
}

// ---------------------------------------------------------------------------
// alias
// ---------------------------------------------------------------------------

struct AliasCmd;
impl Command for AliasCmd {
    fn name(&self) -> &str {
        "alias"
    }
    fn description(&self) -> &str {
        "Creates an alias for the specified command"
    }
    fn args(&self) -> &[ArgSpec] {
        const ARGS: &[ArgSpec] = &[
            ArgSpec::new("command", "target command"),
            ArgSpec::new("alias", "command alias"),
        ];
        ARGS
    }
    /// Invoked as `alias <alias> <command>`; the declared order is the help
    /// listing order only.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        let (Some(alias), Some(command)) = (args.first(), args.get(1)) else {
            return Ok(CommandResult::error("alias: missing command"));
        };
        env.aliases.set(alias, command);
        log::debug!("alias {alias} set to {command}");
        Ok(CommandResult::Text(format!("{alias} -> {command}")))
    }
}

// ---------------------------------------------------------------------------
// dummy
// ---------------------------------------------------------------------------

/// Minimal command; copy this to add a new one.
struct DummyCmd;
impl Command for DummyCmd {
    fn name(&self) -> &str {
        "dummy"
    }
    fn description(&self) -> &str {
        "Dummy command used as a template to create new commands"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandResult> {
        Ok(CommandResult::Empty)
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "Shows this help info"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandResult> {
        Ok(CommandResult::Text(env.registry.help_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use crate::interpreter::EnvironmentState;
    use blockterm_vfs::{MemoryVfs, Vfs};

    struct Fixture {
        reg: CommandRegistry,
        state: EnvironmentState,
        vfs: MemoryVfs,
        aliases: AliasTable,
    }

    impl Fixture {
        fn new() -> Self {
            let mut reg = CommandRegistry::new();
            register_builtins(&mut reg);
            Self {
                reg,
                state: EnvironmentState::new("root", "web", "/root"),
                vfs: MemoryVfs::with_entries([".", "bin"]),
                aliases: AliasTable::new(),
            }
        }

        fn exec(&mut self, line: &str) -> CommandResult {
            let mut env = Environment {
                state: &mut self.state,
                vfs: &mut self.vfs,
                aliases: &mut self.aliases,
                registry: &self.reg,
            };
            self.reg.interpret(line, &mut env).unwrap()
        }
    }

    #[test]
    fn registration_order() {
        let fx = Fixture::new();
        let names: Vec<&str> = fx.reg.commands().map(|c| c.name()).collect();
        assert_eq!(
            names,
            [
                "echo", "eval", "exit", "loadimg", "clear", "date", "flipcoin", "pwd", "cd", "ls",
                "mkdir", "rmdir", "alias", "dummy", "help"
            ]
        );
    }

    #[test]
    fn echo_joins_args() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("echo hello world"), CommandResult::text("hello world"));
    }

    #[test]
    fn echo_without_args_is_usage() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.exec("echo"),
            CommandResult::error("echo requires 1 argument:\n\tstring: string to echo")
        );
    }

    #[test]
    fn eval_success_and_failure() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("eval 1 + 2 * 3"), CommandResult::text("7"));
        assert_eq!(fx.exec("eval 'a' + 'b'"), CommandResult::text("ab"));
        assert_eq!(
            fx.exec("eval 1 / 0"),
            CommandResult::error("eval: division by zero")
        );
        let big = format!("1{}", "0".repeat(308));
        assert_eq!(
            fx.exec(&format!("eval {big} * 10")),
            CommandResult::error("eval: number out of range")
        );
    }

    #[test]
    fn exit_sets_state() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("exit 7"), CommandResult::text("[Exit 7]"));
        assert!(!fx.state.running);
        assert_eq!(fx.state.exit_code, 7);
    }

    #[test]
    fn exit_non_numeric_is_minus_one() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("exit abc"), CommandResult::text("[Exit -1]"));
        assert_eq!(fx.state.exit_code, -1);
    }

    #[test]
    fn exit_without_code_is_usage() {
        let mut fx = Fixture::new();
        assert!(fx.exec("exit").is_error());
        assert!(fx.state.running);
    }

    #[test]
    fn parse_exit_code_prefix() {
        assert_eq!(parse_exit_code("7"), 7);
        assert_eq!(parse_exit_code(" 7"), 7);
        assert_eq!(parse_exit_code("7x"), 7);
        assert_eq!(parse_exit_code("-3"), -3);
        assert_eq!(parse_exit_code("+4"), 4);
        assert_eq!(parse_exit_code(""), -1);
        assert_eq!(parse_exit_code("x7"), -1);
        assert_eq!(parse_exit_code("-"), -1);
        assert_eq!(parse_exit_code("99999999999"), -1);
        assert_eq!(parse_exit_code("-2147483648"), i32::MIN);
    }

    #[test]
    fn loadimg_yields_block() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.exec("loadimg http://x/cat.png"),
            CommandResult::Block(Renderable::Image {
                url: "http://x/cat.png".into()
            })
        );
    }

    #[test]
    fn clear_resets_line_and_requests_wipe() {
        let mut fx = Fixture::new();
        fx.state.line = 5;
        assert_eq!(fx.exec("clear"), CommandResult::Success);
        assert_eq!(fx.state.line, 0);
        assert!(fx.state.take_clear_request());
        assert!(fx.state.running);
    }

    #[test]
    fn format_date_zero_padded() {
        let dt = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(format_date(&dt), "03/05/2024 07:08:09");
    }

    #[test]
    fn date_shape() {
        let mut fx = Fixture::new();
        match fx.exec("date") {
            CommandResult::Text(s) => {
                assert_eq!(s.len(), 19);
                assert_eq!(&s[2..3], "/");
                assert_eq!(&s[10..11], " ");
            },
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn flipcoin_is_heads_or_tails() {
        let mut fx = Fixture::new();
        for _ in 0..20 {
            match fx.exec("flipcoin") {
                CommandResult::Text(s) => assert!(s == "Heads" || s == "Tails"),
                other => panic!("expected text, got {other:?}"),
            }
        }
    }

    #[test]
    fn cd_then_pwd() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("pwd"), CommandResult::text("/root"));
        assert_eq!(fx.exec("cd etc"), CommandResult::Empty);
        assert_eq!(fx.exec("pwd"), CommandResult::text("/etc"));
        fx.exec("cd a b");
        assert_eq!(fx.state.cwd, "/a/b");
    }

    #[test]
    fn ls_separators() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("ls"), CommandResult::text(". bin"));
        assert_eq!(fx.exec("ls -l"), CommandResult::text(".\nbin"));
    }

    #[test]
    fn ls_empty_vfs() {
        let mut fx = Fixture::new();
        fx.vfs = MemoryVfs::new();
        assert_eq!(fx.exec("ls"), CommandResult::text(""));
    }

    #[test]
    fn mkdir_and_rmdir() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("mkdir tmp logs"), CommandResult::Empty);
        assert_eq!(fx.vfs.entries(), [".", "bin", "tmp", "logs"]);
        assert_eq!(fx.exec("rmdir tmp ghost"), CommandResult::Empty);
        assert_eq!(fx.vfs.entries(), [".", "bin", "logs"]);
    }

    #[test]
    fn mkdir_appends_every_argument_verbatim() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("mkdir a b\nc"), CommandResult::Empty);
        assert_eq!(fx.vfs.entries(), [".", "bin", "a", "b\nc"]);
    }

    #[test]
    fn alias_registers_mapping() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("alias ll ls"), CommandResult::text("ll -> ls"));
        assert_eq!(fx.exec("ll"), fx.exec("ls"));
    }

    #[test]
    fn alias_without_target_is_error() {
        let mut fx = Fixture::new();
        assert!(fx.exec("alias ll").is_error());
        assert!(fx.aliases.is_empty());
    }

    #[test]
    fn dummy_is_empty() {
        let mut fx = Fixture::new();
        assert_eq!(fx.exec("dummy"), CommandResult::Empty);
    }

    #[test]
    fn help_lists_every_command() {
        let mut fx = Fixture::new();
        let CommandResult::Text(text) = fx.exec("help") else {
            panic!("expected text");
        };
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "BlockTerm 1.0.1 BETA (DEBUG)");
        assert_eq!(lines.len(), fx.reg.len() + 1);
        assert!(lines.contains(&"\techo [string: string to echo]: Echoes back specified string"));
        assert!(lines.contains(
            &"\talias [command: target command] [alias: command alias]: Creates an alias for the specified command"
        ));
        assert!(lines.contains(&"\tpwd: Prints the working directory"));
        assert!(lines.contains(&"\tloadimg [url: URL to load]: Loads image from specified URL"));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn exit_code_matches_integer(n in any::<i32>()) {
                prop_assert_eq!(parse_exit_code(&n.to_string()), n);
            }

            #[test]
            fn exit_code_ignores_suffix(n in any::<i32>(), tail in "[a-z ]{0,5}") {
                prop_assert_eq!(parse_exit_code(&format!("{n}{tail}")), n);
            }

            #[test]
            fn exit_code_never_panics(s in "\\PC{0,20}") {
                let _ = parse_exit_code(&s);
            }
        }
    }
}
