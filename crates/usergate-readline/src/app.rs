//! Console state: current route, session, and the moderation view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use colored::Colorize;
use usergate_application::{
    BatchAction, BatchReport, MountedGate, ModerationWorkflow, RegistrationUseCase, SessionGate,
    SignInUseCase,
};
use usergate_core::account::{AccountDirectory, AccountId, AccountStatus};
use usergate_core::config::RootConfig;
use usergate_core::session::SessionStore;
use usergate_core::Route;
use usergate_infrastructure::Backend;

use crate::command::{COMMANDS, Command};

/// Whether the REPL keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    session: Arc<SessionStore>,
    directory: AccountDirectory,
    registration: RegistrationUseCase,
    sign_in: SignInUseCase,
    gate: MountedGate,
    route: Route,
    /// Present only while the moderation view is shown.
    moderation: Option<ModerationWorkflow>,
    batch_concurrency: usize,
}

impl App {
    pub fn new(backend: Backend, config: &RootConfig) -> Self {
        let session = Arc::new(SessionStore::new(backend.credentials));
        let directory = AccountDirectory::new(backend.documents, config.directory.collection.clone());
        let gate = SessionGate::mount(&session);

        Self {
            registration: RegistrationUseCase::new(session.clone(), directory.clone()),
            sign_in: SignInUseCase::new(session.clone(), directory.clone()),
            session,
            directory,
            gate,
            route: Route::SignIn,
            moderation: None,
            batch_concurrency: config.moderation.batch_concurrency,
        }
    }

    pub fn prompt(&self) -> String {
        format!("usergate:{}> ", self.route)
    }

    /// Shows the entry route.
    pub async fn enter(&mut self) {
        self.navigate(Route::SignIn).await;
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Quit => return Flow::Quit,
            Command::Help => print_help(),
            Command::Login { email, password } => self.login(&email, &password).await,
            Command::Register => self.navigate(Route::Registration).await,
            Command::SignUp { name, email, password } => self.sign_up(&name, &email, &password).await,
            Command::Back => self.navigate(Route::SignIn).await,
            Command::Goto(path) => match Route::from_path(&path) {
                Some(route) => self.navigate(route).await,
                None => println!("{}", format!("No page at '{}'.", path).red()),
            },
            Command::WhoAmI => match self.session.current() {
                Some(identity) => println!("{} ({})", identity.email.bright_white(), identity.uid),
                None => println!("{}", "Not signed in.".bright_black()),
            },
            Command::Logout => self.logout().await,
            Command::Users => {
                if let Some(workflow) = self.workflow() {
                    print_accounts(workflow);
                }
            }
            Command::Select(target) => self.select(&target),
            Command::SelectAll => self.toggle_all(true),
            Command::SelectNone => self.toggle_all(false),
            Command::Block => self.run_batch(BatchAction::Block).await,
            Command::Unblock => self.run_batch(BatchAction::Unblock).await,
            Command::Delete => self.run_batch(BatchAction::Delete).await,
            Command::Reload => self.reload().await,
        }

        self.follow_session().await;
        Flow::Continue
    }

    /// Leaves a protected route once the session is gone.
    async fn follow_session(&mut self) {
        let decision = self.gate.decision(self.route);
        if decision.is_redirect() {
            self.navigate(decision.route()).await;
        }
    }

    async fn navigate(&mut self, requested: Route) {
        let decision = self.gate.decision(requested);
        if decision.is_redirect() {
            println!("{}", format!("Sign in to view {}.", requested).yellow());
        }

        let route = decision.route();
        if route != Route::PrivatePage {
            self.moderation = None;
        }
        self.route = route;
        tracing::debug!(route = %route, "Navigated");
        self.render().await;
    }

    async fn render(&mut self) {
        match self.route {
            Route::SignIn => {
                println!("{}", "== Sign in ==".bright_magenta().bold());
                println!(
                    "{}",
                    "/login <email> <password>, or /register to create an account.".bright_black()
                );
            }
            Route::Registration => {
                println!("{}", "== Create account ==".bright_magenta().bold());
                println!(
                    "{}",
                    "/signup <name> <email> <password>. Already registered? /back".bright_black()
                );
            }
            Route::PrivatePage => {
                println!("{}", "== Accounts ==".bright_magenta().bold());
                if self.moderation.is_none() {
                    let mut workflow = ModerationWorkflow::new(self.session.clone(), self.directory.clone())
                        .with_batch_concurrency(self.batch_concurrency);
                    println!("{}", "Loading...".bright_black());
                    if let Err(e) = workflow.load().await {
                        println!("{}", format!("Failed to load accounts: {}", e).red());
                    }
                    self.moderation = Some(workflow);
                }
                if let Some(workflow) = &self.moderation {
                    print_accounts(workflow);
                }
            }
        }
    }

    async fn login(&mut self, email: &str, password: &str) {
        if self.route != Route::SignIn {
            println!("{}", "The sign-in form is at /. Use /goto /".yellow());
            return;
        }
        match self.sign_in.sign_in(email, password).await {
            Ok(signed_in) => {
                println!("{}", format!("Welcome, {}.", signed_in.account.name).green());
                self.navigate(signed_in.next).await;
            }
            Err(e) => {
                tracing::debug!("Sign-in failed: {}", e);
                println!("{}", e.user_message().red());
            }
        }
    }

    async fn sign_up(&mut self, name: &str, email: &str, password: &str) {
        if self.route != Route::Registration {
            println!("{}", "Open the registration form first with /register".yellow());
            return;
        }
        match self.registration.register(name, email, password).await {
            Ok(registered) => {
                println!(
                    "{}",
                    format!("Account created for {}.", registered.account.email).green()
                );
                self.navigate(registered.next).await;
            }
            Err(e) => println!("{}", e.user_message().red()),
        }
    }

    async fn logout(&mut self) {
        let result = match self.moderation.as_mut() {
            Some(workflow) => workflow.logout().await.map(|_| ()).map_err(|e| e.to_string()),
            None => self.session.sign_out().await.map(|_| ()).map_err(|e| e.to_string()),
        };
        match result {
            Ok(()) => {
                println!("{}", "Signed out.".green());
                self.navigate(Route::SignIn).await;
            }
            Err(e) => println!("{}", format!("Sign-out failed: {}", e).red()),
        }
    }

    fn select(&mut self, target: &str) {
        let Some(workflow) = self.workflow_mut() else {
            return;
        };

        let id = match target.parse::<usize>() {
            Ok(n) if n >= 1 && n <= workflow.accounts().len() => workflow.accounts()[n - 1].id.clone(),
            _ => AccountId::new(target),
        };
        if !workflow.accounts().iter().any(|account| account.id == id) {
            println!("{}", format!("No account '{}' in the list.", target).red());
            return;
        }

        let selected = workflow.toggle_one(&id);
        println!("{} {}", if selected { "[x]" } else { "[ ]" }, id);
    }

    fn toggle_all(&mut self, checked: bool) {
        if let Some(workflow) = self.workflow_mut() {
            workflow.toggle_all(checked);
            println!("{} selected.", workflow.selection().len());
        }
    }

    async fn reload(&mut self) {
        let Some(workflow) = self.workflow_mut() else {
            return;
        };
        let result = workflow.reload().await.map(|accounts| accounts.len());
        match result {
            Ok(_) => print_accounts(workflow),
            Err(e) => println!("{}", format!("Reload failed: {}", e).red()),
        }
    }

    async fn run_batch(&mut self, action: BatchAction) {
        let Some(workflow) = self.workflow_mut() else {
            return;
        };
        if workflow.selection().is_empty() {
            println!("{}", "Nothing selected.".yellow());
            return;
        }

        let result = match action {
            BatchAction::Block => workflow.block().await,
            BatchAction::Unblock => workflow.unblock().await,
            BatchAction::Delete => workflow.delete().await,
        };

        match result {
            Ok(report) => {
                print_report(&report);
                match report.navigation {
                    Some(route) => {
                        println!(
                            "{}",
                            "Your own account was affected; you have been signed out.".yellow()
                        );
                        self.navigate(route).await;
                    }
                    None => {
                        if let Some(workflow) = &self.moderation {
                            print_accounts(workflow);
                        }
                    }
                }
            }
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    fn workflow(&self) -> Option<&ModerationWorkflow> {
        if self.moderation.is_none() {
            println!("{}", "Open /privatePage first.".yellow());
        }
        self.moderation.as_ref()
    }

    fn workflow_mut(&mut self) -> Option<&mut ModerationWorkflow> {
        if self.moderation.is_none() {
            println!("{}", "Open /privatePage first.".yellow());
        }
        self.moderation.as_mut()
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_white().bold());
    for (_, usage) in COMMANDS {
        println!("  {}", usage);
    }
}

fn print_accounts(workflow: &ModerationWorkflow) {
    let accounts = workflow.accounts();
    if accounts.is_empty() {
        println!("{}", "No accounts.".bright_black());
        return;
    }

    let header_box = if workflow.all_selected() { "[x]" } else { "[ ]" };
    println!(
        "{}",
        format!(
            "{:>3} {} {:<20} {:<28} {:<8} {:<16} {:<16}",
            "#", header_box, "Name", "Email", "Status", "Registered", "Last login"
        )
        .bright_white()
        .bold()
    );

    for (index, account) in accounts.iter().enumerate() {
        let checkbox = if workflow.selection().contains(&account.id) { "[x]" } else { "[ ]" };
        let status = match account.status {
            AccountStatus::Active => format!("{:<8}", account.status.as_str()).green(),
            AccountStatus::Blocked => format!("{:<8}", account.status.as_str()).red(),
        };
        println!(
            "{:>3} {} {:<20} {:<28} {} {:<16} {:<16}",
            index + 1,
            checkbox,
            account.name,
            account.email,
            status,
            format_time(account.registration_time),
            format_time(account.last_login),
        );
    }
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_report(report: &BatchReport) {
    let summary = report.to_string();
    if report.all_succeeded() {
        println!("{}", summary.green());
    } else if report.succeeded.is_empty() {
        println!("{}", summary.red());
    } else {
        println!("{}", summary.yellow());
    }
    for (id, error) in &report.failed {
        println!("  {}", format!("{}: {}", id, error).red());
    }
}
