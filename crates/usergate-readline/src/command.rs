//! REPL command parsing.

use thiserror::Error;

/// Every command with its usage line, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/login", "/login <email> <password>    sign in"),
    ("/register", "/register                    open the registration form"),
    ("/signup", "/signup <name> <email> <password>  create an account"),
    ("/back", "/back                        return to sign-in"),
    ("/goto", "/goto <path>                 navigate to a route"),
    ("/users", "/users                       show the account list"),
    ("/select", "/select <n|id>               toggle one account"),
    ("/select-all", "/select-all                  select every account"),
    ("/select-none", "/select-none                 clear the selection"),
    ("/block", "/block                       block selected accounts"),
    ("/unblock", "/unblock                     unblock selected accounts"),
    ("/delete", "/delete                      delete selected accounts"),
    ("/reload", "/reload                      re-fetch the account list"),
    ("/logout", "/logout                      sign out"),
    ("/whoami", "/whoami                      show the signed-in identity"),
    ("/help", "/help                        show this help"),
    ("/quit", "/quit                        exit"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Register,
    SignUp { name: String, email: String, password: String },
    Back,
    Goto(String),
    Users,
    /// A 1-based list position or an account id.
    Select(String),
    SelectAll,
    SelectNone,
    Block,
    Unblock,
    Delete,
    Reload,
    Logout,
    WhoAmI,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type /help for a list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

fn usage(name: &str) -> &'static str {
    COMMANDS
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, usage)| *usage)
        .unwrap_or("/help")
}

impl Command {
    /// Parses one input line. Bare `quit` and `exit` are accepted too.
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };
        let args: Vec<&str> = words.collect();

        let command = match (head, args.as_slice()) {
            ("quit" | "exit" | "/quit" | "/exit", []) => Command::Quit,
            ("/login", [email, password]) => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("/register", []) => Command::Register,
            // The name may contain spaces; email and password are the last two words.
            ("/signup", [name @ .., email, password]) if !name.is_empty() => Command::SignUp {
                name: name.join(" "),
                email: email.to_string(),
                password: password.to_string(),
            },
            ("/back", []) => Command::Back,
            ("/goto", [path]) => Command::Goto(path.to_string()),
            ("/users", []) => Command::Users,
            ("/select", [target]) => Command::Select(target.to_string()),
            ("/select-all", []) => Command::SelectAll,
            ("/select-none", []) => Command::SelectNone,
            ("/block", []) => Command::Block,
            ("/unblock", []) => Command::Unblock,
            ("/delete", []) => Command::Delete,
            ("/reload", []) => Command::Reload,
            ("/logout", []) => Command::Logout,
            ("/whoami", []) => Command::WhoAmI,
            ("/help", _) => Command::Help,
            (name, _) if COMMANDS.iter().any(|(command, _)| *command == name) => {
                return Err(CommandError::Usage(usage(name)));
            }
            (name, _) => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(command)
    }
}
