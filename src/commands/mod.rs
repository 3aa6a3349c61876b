//! Command handlers for the Careterm CLI
//!
//! Each submodule backs one CLI subcommand: the interactive chat loop,
//! the notification watcher, and the offline form pre-checks.

use crate::config::Config;
use crate::error::Result;

pub mod chat {
    //! Interactive chat handler.
    //!
    //! Creates an `ApiClient` and a `ChatController`, then runs a
    //! readline-based loop: plain input is sent to the assistant, and
    //! slash commands manage sessions.

    use super::*;
    use crate::api::ApiClient;
    use crate::chat::{ChatController, DeleteOutcome, SendOutcome};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start the interactive chat loop
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `session` - Optional session id to open on startup
    /// * `personal_context` - Start with the personal-context toggle on
    pub async fn run_chat(
        config: Config,
        session: Option<String>,
        personal_context: bool,
    ) -> Result<()> {
        let api = ApiClient::new(&config.server)?;
        let mut chat = ChatController::new(api, &config.chat);
        if personal_context {
            chat.set_personal_context(true);
        }

        chat.refresh_sessions().await;
        if let Some(id) = session {
            chat.open_session(&id).await;
        }

        println!("{}", "careterm chat — /help for commands".bold());
        print_surfaces(&chat);

        let mut rl = DefaultEditor::new()?;

        loop {
            let prompt = if chat.personal_context() {
                "[ctx] >> "
            } else {
                ">> "
            };
            match rl.readline(prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    if let Some(command) = trimmed.strip_prefix('/') {
                        if !handle_command(&mut chat, &mut rl, command).await? {
                            break;
                        }
                        continue;
                    }

                    match chat.send(trimmed).await {
                        SendOutcome::Ignored => {}
                        SendOutcome::SessionRequired => {
                            println!(
                                "{}",
                                "Create or select a conversation first (/new or /open <id>)."
                                    .yellow()
                            );
                        }
                        SendOutcome::Delivered { alert } => {
                            print_surfaces(&chat);
                            if let Some(alert) = alert {
                                eprintln!("{}", format!("Error: {}", alert).red());
                            }
                        }
                        SendOutcome::TransportFailed => {
                            print_surfaces(&chat);
                            eprintln!("{}", "Failed to send the message".red());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Handle a slash command; returns false when the loop should exit
    async fn handle_command(
        chat: &mut ChatController,
        rl: &mut DefaultEditor,
        command: &str,
    ) -> Result<bool> {
        let mut parts = command.splitn(2, ' ');
        let name = parts.next().unwrap_or("");
        let arg = parts.next().map(str::trim);

        match (name, arg) {
            ("quit", _) | ("exit", _) => return Ok(false),
            ("help", _) => print_help(),
            ("new", _) => {
                match chat.new_session().await {
                    Some(id) => println!("Started conversation {}", id.yellow()),
                    None => println!("{}", "Could not start a new conversation".yellow()),
                }
                print_surfaces(chat);
            }
            ("list", _) => {
                chat.refresh_sessions().await;
                print!("{}", chat.history().render());
            }
            ("open", Some(id)) if !id.is_empty() => {
                chat.open_session(id).await;
                print_surfaces(chat);
            }
            ("open", _) => println!("Usage: /open <session-id>"),
            ("delete", Some(id)) if !id.is_empty() => {
                let answer = rl.readline("Delete this conversation? [y/N] ")?;
                let confirmed = answer.trim().eq_ignore_ascii_case("y");
                match chat.delete_session(id, confirmed).await {
                    DeleteOutcome::Cancelled => println!("Cancelled"),
                    DeleteOutcome::Deleted => {
                        println!("Conversation deleted");
                        print_surfaces(chat);
                    }
                    DeleteOutcome::Failed { alert } => {
                        eprintln!("{}", format!("Error: {}", alert).red());
                    }
                }
            }
            ("delete", _) => println!("Usage: /delete <session-id>"),
            ("context", Some("on")) => {
                chat.set_personal_context(true);
                println!("Personal context enabled");
            }
            ("context", Some("off")) => {
                chat.set_personal_context(false);
                println!("Personal context disabled");
            }
            ("context", _) => println!("Usage: /context on|off"),
            (other, _) => println!("Unknown command: /{} (try /help)", other),
        }

        Ok(true)
    }

    fn print_surfaces(chat: &ChatController) {
        println!("{}", "— history —".dimmed());
        print!("{}", chat.history().render());
        println!("{}", "— conversation —".dimmed());
        print!("{}", chat.pane().render());
    }

    fn print_help() {
        println!("  /new              start a new conversation");
        println!("  /open <id>        open a conversation from the history");
        println!("  /list             refresh and show the history");
        println!("  /delete <id>      delete a conversation (asks for confirmation)");
        println!("  /context on|off   toggle personal context for sent messages");
        println!("  /quit             leave chat");
        println!("  anything else is sent to the assistant");
    }
}

pub mod watch {
    //! Notification watch handler.
    //!
    //! Starts the notification poller and runs it until Ctrl-C. Like the
    //! page version, the poller only starts for an authenticated viewer.

    use super::*;
    use crate::api::ApiClient;
    use crate::notify::NotificationPoller;
    use tokio::sync::watch;

    /// Run the notification poller until interrupted
    pub async fn run_watch(mut config: Config, interval: Option<u64>) -> Result<()> {
        if let Some(seconds) = interval {
            config.notifications.poll_interval_seconds = seconds;
        }
        config.validate()?;

        let api = ApiClient::new(&config.server)?;
        if !api.is_authenticated() {
            tracing::info!("No session cookie configured; poller not started");
            println!("Not authenticated: configure server.session_cookie to watch notifications");
            return Ok(());
        }

        let poller = NotificationPoller::new(api, &config.notifications);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(poller.run(shutdown_rx));

        tokio::signal::ctrl_c().await?;
        let _ = shutdown_tx.send(true);
        handle.await?;

        Ok(())
    }
}

pub mod forms {
    //! Offline pre-checks for the portal's login and registration forms.
    //!
    //! Prompts for each field, validates with the portal's rules, and
    //! gives one correction round for invalid fields. Editing a field
    //! clears its error before the new value is re-validated.

    use super::*;
    use crate::error::CaretermError;
    use crate::validate::{
        validate_login, validate_registration, Field, FormState, LoginForm, RegistrationForm,
    };
    use colored::Colorize;
    use rustyline::DefaultEditor;

    /// Pre-check login credentials
    pub fn run_check_login() -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        let mut form = LoginForm {
            username: rl.readline("Username or email: ")?,
            password: rl.readline("Password: ")?,
        };

        let mut state = FormState::new();
        state.apply(validate_login(&form));

        if !state.is_clean() {
            print_errors(&state, &[Field::Username, Field::Password]);

            if state.is_invalid(Field::Username) {
                state.note_edit(Field::Username);
                form.username = rl.readline("Username or email: ")?;
            }
            if state.is_invalid(Field::Password) {
                state.note_edit(Field::Password);
                form.password = rl.readline("Password: ")?;
            }
            state.apply(validate_login(&form));
        }

        finish(&state, &[Field::Username, Field::Password])
    }

    /// Pre-check registration input
    pub fn run_check_registration() -> Result<()> {
        let fields = [
            Field::Username,
            Field::Email,
            Field::Password,
            Field::PasswordConfirm,
            Field::PolicyAgreement,
        ];

        let mut rl = DefaultEditor::new()?;
        let mut form = RegistrationForm {
            username: rl.readline("Username: ")?,
            email: rl.readline("Email: ")?,
            password: rl.readline("Password: ")?,
            password_confirm: rl.readline("Repeat password: ")?,
            policy_agreement: Some(
                rl.readline("Agree to the privacy policy? [y/N] ")?
                    .trim()
                    .eq_ignore_ascii_case("y"),
            ),
        };

        let mut state = FormState::new();
        state.apply(validate_registration(&form));

        if !state.is_clean() {
            print_errors(&state, &fields);

            if state.is_invalid(Field::Username) {
                state.note_edit(Field::Username);
                form.username = rl.readline("Username: ")?;
            }
            if state.is_invalid(Field::Email) {
                state.note_edit(Field::Email);
                form.email = rl.readline("Email: ")?;
            }
            if state.is_invalid(Field::Password) {
                state.note_edit(Field::Password);
                form.password = rl.readline("Password: ")?;
            }
            if state.is_invalid(Field::PasswordConfirm) {
                state.note_edit(Field::PasswordConfirm);
                form.password_confirm = rl.readline("Repeat password: ")?;
            }
            if state.is_invalid(Field::PolicyAgreement) {
                state.note_edit(Field::PolicyAgreement);
                form.policy_agreement = Some(
                    rl.readline("Agree to the privacy policy? [y/N] ")?
                        .trim()
                        .eq_ignore_ascii_case("y"),
                );
            }
            state.apply(validate_registration(&form));
        }

        finish(&state, &fields)
    }

    fn print_errors(state: &FormState, fields: &[Field]) {
        for field in fields {
            if let Some(message) = state.message(*field) {
                eprintln!("{}", format!("{}: {}", field, message).red());
            }
        }
    }

    fn finish(state: &FormState, fields: &[Field]) -> Result<()> {
        if state.is_clean() {
            println!("{}", "Input accepted.".green());
            Ok(())
        } else {
            print_errors(state, fields);
            Err(CaretermError::Validation("form input rejected".to_string()).into())
        }
    }
}
