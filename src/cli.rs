// src/cli.rs
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use crate::biometric::{self, BiometricAuthenticator, Unavailable};
use crate::config::{Config, PasswordScheme};
use crate::error::{AppError, AppResult, ValidationError};
use crate::export;
use crate::gate::{self, Attempt, GateState, UnlockSession};
use crate::kv::KeyValueStore;
use crate::models::{self, Note, NoteColor, SavedCredential};
use crate::settings::Settings;
use crate::store::CollectionStore;
use crate::validation;
use log;
use rpassword;

/// Notes with optional per-note passwords, plus a small password manager.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the stored data (overrides the config file)
    #[clap(long, global = true, value_parser)]
    pub data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, read, edit, delete and export notes
    #[clap(subcommand)]
    Note(NoteCommand),
    /// Manage saved credentials in the password manager
    #[clap(subcommand)]
    Cred(CredCommand),
    /// Show or change the biometric lock on the password manager
    #[clap(subcommand)]
    Biometric(BiometricCommand),
    /// Show or change the name used in the greeting
    #[clap(subcommand)]
    User(UserCommand),
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// Create a note
    Add {
        #[clap(short, long)]
        title: String,
        #[clap(short, long)]
        content: String,
        /// pink, green, blue, yellow, purple, or one of their hex codes
        #[clap(long, default_value = "pink")]
        color: NoteColor,
        /// Protect the note with a password (prompted)
        #[clap(long)]
        protect: bool,
    },
    /// List notes, most recent first
    List {
        /// Only notes whose title or content contains this text
        #[clap(short, long)]
        search: Option<String>,
    },
    /// Show one note, unlocking it first if it is protected
    Show {
        id: String,
        /// Password to try instead of prompting
        #[clap(long)]
        password: Option<String>,
    },
    /// Edit a note
    Edit {
        id: String,
        #[clap(short, long)]
        title: Option<String>,
        #[clap(short, long)]
        content: Option<String>,
        #[clap(long)]
        color: Option<NoteColor>,
        /// Set or replace the note password (prompted)
        #[clap(long, conflicts_with = "unprotect")]
        protect: bool,
        /// Remove password protection
        #[clap(long)]
        unprotect: bool,
        /// Current password to unlock a protected note instead of prompting
        #[clap(long)]
        password: Option<String>,
    },
    /// Delete a note
    Delete {
        id: String,
        /// Do not ask for confirmation
        #[clap(short, long)]
        yes: bool,
    },
    /// Write notes to a JSON file (all notes when no ids are given)
    Export {
        ids: Vec<String>,
        /// Directory to write the export into (defaults to the current directory)
        #[clap(short, long, value_parser)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CredCommand {
    /// Save a credential (password is prompted)
    Add {
        /// Username or email the password belongs to
        #[clap(short, long)]
        title: String,
        #[clap(short = 'g', long)]
        category: Option<String>,
    },
    /// List saved credentials
    List {
        /// Print passwords instead of masking them
        #[clap(long)]
        reveal: bool,
    },
    /// Edit a saved credential
    Edit {
        id: String,
        #[clap(short, long)]
        title: Option<String>,
        #[clap(short = 'g', long)]
        category: Option<String>,
        /// Prompt for a new password
        #[clap(long)]
        change_password: bool,
    },
    /// Delete a saved credential
    Delete {
        id: String,
        #[clap(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BiometricCommand {
    Status,
    Enable,
    Disable,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Show,
    Set { name: String },
}

/// Interactive input. Swapped out in tests.
pub trait Prompt {
    fn password(&mut self, message: &str) -> io::Result<String>;
    fn confirm(&mut self, message: &str) -> io::Result<bool>;
}

pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn password(&mut self, message: &str) -> io::Result<String> {
        rpassword::prompt_password(message)
    }

    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        print!("{} (y/N): ", message);
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

/// Everything a command handler needs.
pub struct Context<S: KeyValueStore> {
    pub store: CollectionStore<S>,
    pub config: Config,
    pub authenticator: Box<dyn BiometricAuthenticator>,
}

impl<S: KeyValueStore> Context<S> {
    /// Context for a host without a biometric API.
    pub fn new(kv: S, config: Config) -> Self {
        Context { store: CollectionStore::new(kv), config, authenticator: Box::new(Unavailable) }
    }

    fn settings(&self) -> Settings<'_, S> {
        Settings::new(self.store.kv())
    }

    fn scheme(&self) -> PasswordScheme {
        self.config.note_password_scheme
    }
}

fn read_password(prompt: &mut dyn Prompt, message: &str) -> AppResult<String> {
    prompt.password(message).map_err(|e| {
        log::error!("Failed to read password: {}", e);
        AppError::Cli(format!("Failed to read password: {}", e))
    })
}

fn confirmed(prompt: &mut dyn Prompt, message: &str, skip: bool) -> AppResult<bool> {
    if skip {
        return Ok(true);
    }
    prompt.confirm(message).map_err(|e| {
        log::error!("Failed to read confirmation: {}", e);
        AppError::Cli(format!("Failed to read confirmation: {}", e))
    })
}

/// Handles the parsed command. No command prints the greeting and the notes.
pub fn handle_cli_command<S: KeyValueStore>(
    command: Option<Commands>,
    ctx: &Context<S>,
    prompt: &mut dyn Prompt,
) -> AppResult<()> {
    log::debug!("Handling CLI command: {:?}", command);
    match command {
        Some(Commands::Note(cmd)) => handle_note(cmd, ctx, prompt),
        Some(Commands::Cred(cmd)) => {
            biometric::authorize_manager_access(&ctx.settings(), ctx.authenticator.as_ref())?;
            handle_cred(cmd, ctx, prompt)
        }
        Some(Commands::Biometric(cmd)) => handle_biometric(cmd, ctx),
        Some(Commands::User(cmd)) => handle_user(cmd, ctx),
        None => {
            match ctx.settings().username() {
                Some(name) => println!("Hey, {}", name),
                None => println!("Hey! Set your name with `notevault user set <name>`."),
            }
            print_note_list(&ctx.store.load_or_empty::<Note>(), None);
            Ok(())
        }
    }
}

fn handle_note<S: KeyValueStore>(cmd: NoteCommand, ctx: &Context<S>, prompt: &mut dyn Prompt) -> AppResult<()> {
    match cmd {
        NoteCommand::Add { title, content, color, protect } => {
            validation::note_fields(&title, &content)?;
            let mut note = Note::new(&title, &content, color);

            let mut chosen_password = None;
            if protect {
                let password = read_password(prompt, "Enter password: ")?;
                let confirm = read_password(prompt, "Confirm password: ")?;
                gate::protect(&mut note, &password, &confirm, ctx.scheme(), &ctx.config.argon2_params)?;
                chosen_password = Some(password);
            }

            if !ctx.store.insert(note.clone()) {
                return Err(AppError::Cli("Failed to save note".to_string()));
            }
            println!("Saved note '{}' ({})", note.title, note.id);

            // Protected notes also get their password recorded in the password
            // manager, except under Argon2 where that would keep a plaintext copy.
            if let (Some(password), PasswordScheme::Plaintext) = (chosen_password, ctx.scheme()) {
                let credential = SavedCredential::new(&note.title, &password, None);
                if ctx.store.insert(credential) {
                    println!("Password added to the password manager.");
                } else {
                    log::warn!("Note {} saved but its password was not added to the manager", note.id);
                    eprintln!("Note saved, but its password could not be added to the password manager.");
                }
            }
            Ok(())
        }
        NoteCommand::List { search } => {
            let notes = ctx.store.load_or_empty::<Note>();
            print_note_list(&notes, search.as_deref());
            Ok(())
        }
        NoteCommand::Show { id, password } => {
            let note = find_note(ctx, &id)?;
            if !unlock_note(ctx, &note, password.as_deref(), prompt)? {
                return Err(AppError::Cli("Note is locked".to_string()));
            }
            print_note(&note);
            Ok(())
        }
        NoteCommand::Edit { id, title, content, color, protect, unprotect, password } => {
            if title.is_none() && content.is_none() && color.is_none() && !protect && !unprotect {
                return Err(AppError::Cli("Nothing to change".to_string()));
            }
            let mut note = find_note(ctx, &id)?;
            if !unlock_note(ctx, &note, password.as_deref(), prompt)? {
                return Err(AppError::Cli("Note is locked".to_string()));
            }

            if let Some(title) = title {
                note.title = title.trim().to_string();
            }
            if let Some(content) = content {
                note.content = content.trim().to_string();
            }
            validation::note_fields(&note.title, &note.content)?;
            if let Some(color) = color {
                note.color = color.hex().to_string();
            }
            if protect {
                let new_password = read_password(prompt, "New note password: ")?;
                if new_password.trim().is_empty() {
                    return Err(ValidationError::MissingNotePassword.into());
                }
                let confirm = read_password(prompt, "Confirm password: ")?;
                gate::protect(&mut note, &new_password, &confirm, ctx.scheme(), &ctx.config.argon2_params)?;
            } else if unprotect {
                gate::unprotect(&mut note);
            }
            note.touch();

            if !ctx.store.update(note.clone()) {
                return Err(AppError::Cli("Failed to update note".to_string()));
            }
            println!("Updated note '{}'", note.title);
            Ok(())
        }
        NoteCommand::Delete { id, yes } => {
            if ctx.store.find::<Note>(&id).is_none() {
                println!("No note with id {}; nothing to delete.", id);
                return Ok(());
            }
            if !confirmed(prompt, "Are you sure you want to delete this note?", yes)? {
                println!("Delete cancelled.");
                return Ok(());
            }
            if !ctx.store.delete::<Note>(&id) {
                return Err(AppError::Cli("Failed to delete note".to_string()));
            }
            println!("Deleted note {}", id);
            Ok(())
        }
        NoteCommand::Export { ids, out } => {
            let all = ctx.store.load_or_empty::<Note>();
            let selected: Vec<Note> = if ids.is_empty() {
                all
            } else {
                let mut picked = Vec::with_capacity(ids.len());
                for id in &ids {
                    match all.iter().find(|n| &n.id == id) {
                        Some(note) => picked.push(note.clone()),
                        None => return Err(AppError::Cli(format!("Note not found: {}", id))),
                    }
                }
                picked
            };

            let protected = selected.iter().filter(|n| n.is_protected()).count();
            if protected > 0 {
                eprintln!(
                    "Warning: {} protected note(s) are included as stored, with their passwords.",
                    protected
                );
            }

            let dir = out.unwrap_or_else(|| PathBuf::from("."));
            let path = export::export_notes(&selected, &dir, &ctx.config.export_file_name)
                .map_err(|e| {
                    log::error!("Error exporting notes: {}", e);
                    AppError::Cli("Failed to export notes".to_string())
                })?;
            println!("Exported {} note(s) to {}", selected.len(), path.display());
            Ok(())
        }
    }
}

fn find_note<S: KeyValueStore>(ctx: &Context<S>, id: &str) -> AppResult<Note> {
    ctx.store.find::<Note>(id).ok_or_else(|| {
        log::warn!("Note {} not found", id);
        AppError::Cli("Note not found".to_string())
    })
}

/// Runs an unlock session for `note`. With `given` the single candidate is
/// tried once; otherwise the user is prompted until the password matches or
/// they give up with a blank entry.
fn unlock_note<S: KeyValueStore>(
    ctx: &Context<S>,
    note: &Note,
    given: Option<&str>,
    prompt: &mut dyn Prompt,
) -> AppResult<bool> {
    let mut session = UnlockSession::new(note);
    if session.state() == GateState::Unlocked {
        return Ok(true);
    }
    if !gate::is_unlockable(note) {
        eprintln!("Warning: this note is protected but has no password set, so it cannot be unlocked.");
    }

    if let Some(candidate) = given {
        return match session.submit(candidate)? {
            Attempt::Unlocked => Ok(true),
            _ => Err(AppError::Cli("Incorrect password".to_string())),
        };
    }

    while session.state() == GateState::Locked {
        let candidate = match prompt.password("Enter note password: ") {
            Ok(candidate) => candidate,
            Err(e) => {
                log::warn!("Password prompt closed: {}", e);
                session.dismiss();
                break;
            }
        };
        match session.submit(&candidate) {
            Ok(Attempt::Unlocked) | Ok(Attempt::Closed) => {}
            Ok(Attempt::Rejected) => eprintln!("Incorrect password"),
            Err(e) => {
                eprintln!("{}", e);
                session.dismiss();
            }
        }
    }
    log::debug!(
        "Unlock session for note {} ended {:?} after {} failed attempt(s)",
        note.id,
        session.state(),
        session.failed_attempts()
    );
    Ok(session.note().is_some())
}

fn color_label(hex: &str) -> String {
    NoteColor::from_hex(hex).map_or_else(|| hex.to_string(), |c| c.name().to_string())
}

fn print_note_list(notes: &[Note], search: Option<&str>) {
    let shown = models::filter_notes(notes, search.unwrap_or(""));
    if shown.is_empty() {
        match search {
            Some(query) if !query.is_empty() => println!("No notes match '{}'.", query),
            _ => println!("No notes yet. Add one with `notevault note add`."),
        }
        return;
    }
    println!("Notes ({}):", shown.len());
    for note in shown {
        let lock = if note.is_protected() { " [locked]" } else { "" };
        println!("  {}  {}{}  ({}, {})", note.id, note.title, lock, color_label(&note.color), note.date);
    }
}

fn print_note(note: &Note) {
    println!("{}", note.title);
    println!("Color: {}  Created: {}  Modified: {}", color_label(&note.color), note.date, note.last_modified);
    println!();
    println!("{}", note.content);
}

fn handle_cred<S: KeyValueStore>(cmd: CredCommand, ctx: &Context<S>, prompt: &mut dyn Prompt) -> AppResult<()> {
    match cmd {
        CredCommand::Add { title, category } => {
            let password = read_password(prompt, "Password: ")?;
            validation::credential_fields(&title, &password)?;
            let credential = SavedCredential::new(&title, &password, category.as_deref());
            if !ctx.store.insert(credential) {
                return Err(AppError::Cli("Failed to save password".to_string()));
            }
            println!("Password saved successfully");
            Ok(())
        }
        CredCommand::List { reveal } => {
            let credentials = ctx.store.load_or_empty::<SavedCredential>();
            if credentials.is_empty() {
                println!("No saved passwords.");
                return Ok(());
            }
            println!("Saved passwords ({}):", credentials.len());
            for cred in &credentials {
                let shown = if reveal { cred.password.clone() } else { "********".to_string() };
                println!("  {}  {}  [{}]  {}  ({})", cred.id, cred.title, cred.category(), shown, cred.date);
            }
            log::info!("Listed {} credential(s)", credentials.len());
            Ok(())
        }
        CredCommand::Edit { id, title, category, change_password } => {
            let mut credential = ctx.store.find::<SavedCredential>(&id).ok_or_else(|| {
                log::warn!("Credential {} not found", id);
                AppError::Cli("Password not found".to_string())
            })?;

            if let Some(title) = title {
                credential.title = title.trim().to_string();
            }
            if change_password {
                credential.password = read_password(prompt, "New password: ")?.trim().to_string();
            }
            validation::credential_fields(&credential.title, &credential.password)?;
            let category = category.as_deref().or(credential.category.as_deref()).map(str::to_string);
            credential.category = Some(models::normalize_category(category.as_deref()));
            credential.last_modified = Some(models::timestamp());

            if !ctx.store.update(credential) {
                return Err(AppError::Cli("Failed to update password".to_string()));
            }
            println!("Password updated successfully");
            Ok(())
        }
        CredCommand::Delete { id, yes } => {
            if !confirmed(prompt, "Are you sure you want to delete this password?", yes)? {
                println!("Delete cancelled.");
                return Ok(());
            }
            if !ctx.store.delete::<SavedCredential>(&id) {
                return Err(AppError::Cli("Failed to delete password".to_string()));
            }
            println!("Deleted password {}", id);
            Ok(())
        }
    }
}

fn handle_biometric<S: KeyValueStore>(cmd: BiometricCommand, ctx: &Context<S>) -> AppResult<()> {
    let settings = ctx.settings();
    let auth = ctx.authenticator.as_ref();
    match cmd {
        BiometricCommand::Status => {
            if !auth.is_supported() {
                println!("Biometric authentication not available");
            } else if settings.biometric_enabled() {
                println!("Biometric authentication enabled");
            } else {
                println!("Biometric authentication disabled");
            }
            Ok(())
        }
        BiometricCommand::Enable | BiometricCommand::Disable => {
            let enable = matches!(cmd, BiometricCommand::Enable);
            let now_enabled = biometric::set_biometric_lock(&settings, auth, enable)?;
            println!("Biometric authentication {}", if now_enabled { "enabled" } else { "disabled" });
            Ok(())
        }
    }
}

fn handle_user<S: KeyValueStore>(cmd: UserCommand, ctx: &Context<S>) -> AppResult<()> {
    let settings = ctx.settings();
    match cmd {
        UserCommand::Show => {
            match settings.username() {
                Some(name) => println!("Hey, {}", name),
                None => println!("No name set."),
            }
            Ok(())
        }
        UserCommand::Set { name } => {
            let name = validation::username(&name)?;
            if !settings.set_username(name) {
                return Err(AppError::Cli("Failed to save name".to_string()));
            }
            println!("Hey, {}", name);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argon2Params;
    use crate::kv::testing::MemoryKv;
    use crate::models::NOTES_KEY;
    use std::collections::VecDeque;

    /// Replays canned answers; an exhausted script behaves like a closed terminal.
    #[derive(Default)]
    struct ScriptedPrompt {
        passwords: VecDeque<String>,
        confirmations: VecDeque<bool>,
    }

    impl ScriptedPrompt {
        fn passwords(items: &[&str]) -> Self {
            ScriptedPrompt { passwords: items.iter().map(|s| s.to_string()).collect(), ..Default::default() }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn password(&mut self, _message: &str) -> io::Result<String> {
            self.passwords
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
        }

        fn confirm(&mut self, _message: &str) -> io::Result<bool> {
            self.confirmations
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
        }
    }

    fn context() -> Context<MemoryKv> {
        Context::new(MemoryKv::new(), Config::default())
    }

    fn run(ctx: &Context<MemoryKv>, args: &[&str], prompt: &mut ScriptedPrompt) -> AppResult<()> {
        let mut argv = vec!["notevault"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).expect("arguments should parse");
        handle_cli_command(cli.command, ctx, prompt)
    }

    fn only_note(ctx: &Context<MemoryKv>) -> Note {
        let notes = ctx.store.load_all::<Note>().unwrap();
        assert_eq!(notes.len(), 1);
        notes.into_iter().next().unwrap()
    }

    #[test]
    fn test_parse_global_data_dir_and_color() {
        let cli = Cli::try_parse_from([
            "notevault", "note", "add", "-t", "Ideas", "-c", "Write a paper", "--color", "green", "--data-dir", "/tmp/x",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Some(Commands::Note(NoteCommand::Add { color, protect, .. })) => {
                assert_eq!(color, NoteColor::Green);
                assert!(!protect);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_color_and_conflicting_flags() {
        assert!(Cli::try_parse_from(["notevault", "note", "add", "-t", "a", "-c", "b", "--color", "teal"]).is_err());
        assert!(Cli::try_parse_from(["notevault", "note", "edit", "1", "--protect", "--unprotect"]).is_err());
    }

    #[test]
    fn test_add_and_list_notes() {
        let ctx = context();
        let mut prompt = ScriptedPrompt::default();
        run(&ctx, &["note", "add", "-t", "Groceries", "-c", "Milk, eggs"], &mut prompt).unwrap();
        run(&ctx, &["note", "add", "-t", "Ideas", "-c", "Write a paper", "--color", "#baffc9"], &mut prompt).unwrap();
        run(&ctx, &["note", "list", "--search", "milk"], &mut prompt).unwrap();

        let notes = ctx.store.load_all::<Note>().unwrap();
        let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Ideas", "Groceries"]);
        assert_eq!(notes[0].color, "#baffc9");
        assert_eq!(notes[1].color, "#ffb3ba");
    }

    #[test]
    fn test_add_rejects_blank_title() {
        let ctx = context();
        match run(&ctx, &["note", "add", "-t", "  ", "-c", "body"], &mut ScriptedPrompt::default()) {
            Err(AppError::Validation(ValidationError::EmptyTitle)) => {}
            other => panic!("Expected EmptyTitle, got {:?}", other),
        }
        assert!(ctx.store.load_all::<Note>().unwrap().is_empty());
    }

    #[test]
    fn test_protected_note_mirrors_password_into_manager() {
        let ctx = context();
        let mut prompt = ScriptedPrompt::passwords(&["abcd", "abcd"]);
        run(&ctx, &["note", "add", "-t", "Diary", "-c", "dear diary", "--protect"], &mut prompt).unwrap();

        let note = only_note(&ctx);
        assert!(note.is_protected());
        assert_eq!(note.password.as_deref(), Some("abcd"));

        let creds = ctx.store.load_all::<SavedCredential>().unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].title, "Diary");
        assert_eq!(creds[0].password, "abcd");
    }

    #[test]
    fn test_argon2_scheme_hashes_and_skips_mirroring() {
        let mut config = Config::default();
        config.note_password_scheme = PasswordScheme::Argon2;
        config.argon2_params = Argon2Params { m_cost: 1024, t_cost: 1, p_cost: 1 };
        let ctx = Context::new(MemoryKv::new(), config);

        let mut prompt = ScriptedPrompt::passwords(&["abcd", "abcd"]);
        run(&ctx, &["note", "add", "-t", "Diary", "-c", "dear diary", "--protect"], &mut prompt).unwrap();

        let note = only_note(&ctx);
        assert!(note.password.as_deref().unwrap().starts_with("$argon2id$"));
        assert!(ctx.store.load_all::<SavedCredential>().unwrap().is_empty());

        run(&ctx, &["note", "show", &note.id, "--password", "abcd"], &mut ScriptedPrompt::default()).unwrap();
    }

    #[test]
    fn test_hashed_note_opens_after_switching_back_to_plaintext() {
        let mut config = Config::default();
        config.note_password_scheme = PasswordScheme::Argon2;
        config.argon2_params = Argon2Params { m_cost: 1024, t_cost: 1, p_cost: 1 };
        let hashing = Context::new(MemoryKv::new(), config);
        run(&hashing, &["note", "add", "-t", "Diary", "-c", "x", "--protect"], &mut ScriptedPrompt::passwords(&["abcd", "abcd"]))
            .unwrap();
        let id = only_note(&hashing).id;

        let stored = hashing.store.kv().raw(NOTES_KEY).unwrap();
        let plain = Context::new(MemoryKv::with_value(NOTES_KEY, &stored), Config::default());
        run(&plain, &["note", "show", &id, "--password", "abcd"], &mut ScriptedPrompt::default()).unwrap();
        assert!(run(&plain, &["note", "show", &id, "--password", "abce"], &mut ScriptedPrompt::default()).is_err());
    }

    #[test]
    fn test_protect_rejects_short_password() {
        let ctx = context();
        let mut prompt = ScriptedPrompt::passwords(&["abc", "abc"]);
        match run(&ctx, &["note", "add", "-t", "a", "-c", "b", "--protect"], &mut prompt) {
            Err(AppError::Validation(ValidationError::PasswordTooShort(4))) => {}
            other => panic!("Expected PasswordTooShort, got {:?}", other),
        }
        assert!(ctx.store.load_all::<Note>().unwrap().is_empty());
    }

    #[test]
    fn test_show_protected_note_reprompts_until_correct() {
        let ctx = context();
        run(&ctx, &["note", "add", "-t", "Diary", "-c", "x", "--protect"], &mut ScriptedPrompt::passwords(&["abcd", "abcd"]))
            .unwrap();
        let id = only_note(&ctx).id;

        let mut prompt = ScriptedPrompt::passwords(&["ABCD", "abcd ", "abcd"]);
        run(&ctx, &["note", "show", &id], &mut prompt).unwrap();
        assert!(prompt.passwords.is_empty());
    }

    #[test]
    fn test_show_protected_note_abandoned() {
        let ctx = context();
        run(&ctx, &["note", "add", "-t", "Diary", "-c", "x", "--protect"], &mut ScriptedPrompt::passwords(&["abcd", "abcd"]))
            .unwrap();
        let id = only_note(&ctx).id;

        // Wrong attempt, then the terminal closes.
        match run(&ctx, &["note", "show", &id], &mut ScriptedPrompt::passwords(&["nope"])) {
            Err(AppError::Cli(msg)) => assert_eq!(msg, "Note is locked"),
            other => panic!("Expected locked error, got {:?}", other),
        }
        // A blank entry gives up as well.
        assert!(run(&ctx, &["note", "show", &id], &mut ScriptedPrompt::passwords(&[""])).is_err());

        match run(&ctx, &["note", "show", &id, "--password", "ABCD"], &mut ScriptedPrompt::default()) {
            Err(AppError::Cli(msg)) => assert_eq!(msg, "Incorrect password"),
            other => panic!("Expected incorrect password, got {:?}", other),
        }
    }

    #[test]
    fn test_show_missing_note() {
        let ctx = context();
        match run(&ctx, &["note", "show", "nope"], &mut ScriptedPrompt::default()) {
            Err(AppError::Cli(msg)) => assert_eq!(msg, "Note not found"),
            other => panic!("Expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_keeps_position_and_updates_fields() {
        let ctx = context();
        let mut prompt = ScriptedPrompt::default();
        run(&ctx, &["note", "add", "-t", "A", "-c", "a"], &mut prompt).unwrap();
        run(&ctx, &["note", "add", "-t", "B", "-c", "b"], &mut prompt).unwrap();
        let before = ctx.store.load_all::<Note>().unwrap();
        let target = before[1].clone();

        run(&ctx, &["note", "edit", &target.id, "-t", "A2", "--color", "purple"], &mut prompt).unwrap();

        let after = ctx.store.load_all::<Note>().unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1].id, target.id);
        assert_eq!(after[1].title, "A2");
        assert_eq!(after[1].content, "a");
        assert_eq!(after[1].color, "#e6baff");
        assert_eq!(after[1].date, target.date);
    }

    #[test]
    fn test_edit_protected_note_requires_unlock_then_unprotects() {
        let ctx = context();
        run(&ctx, &["note", "add", "-t", "Diary", "-c", "x", "--protect"], &mut ScriptedPrompt::passwords(&["abcd", "abcd"]))
            .unwrap();
        let id = only_note(&ctx).id;

        assert!(run(&ctx, &["note", "edit", &id, "--unprotect", "--password", "wrong"], &mut ScriptedPrompt::default())
            .is_err());
        assert!(only_note(&ctx).is_protected());

        run(&ctx, &["note", "edit", &id, "--unprotect", "--password", "abcd"], &mut ScriptedPrompt::default()).unwrap();
        let note = only_note(&ctx);
        assert!(!note.is_protected());
        assert_eq!(note.password, None);
    }

    #[test]
    fn test_edit_protect_with_blank_password() {
        let ctx = context();
        run(&ctx, &["note", "add", "-t", "A", "-c", "a"], &mut ScriptedPrompt::default()).unwrap();
        let id = only_note(&ctx).id;
        match run(&ctx, &["note", "edit", &id, "--protect"], &mut ScriptedPrompt::passwords(&["   "])) {
            Err(AppError::Validation(ValidationError::MissingNotePassword)) => {}
            other => panic!("Expected MissingNotePassword, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_note_with_and_without_confirmation() {
        let ctx = context();
        run(&ctx, &["note", "add", "-t", "A", "-c", "a"], &mut ScriptedPrompt::default()).unwrap();
        let id = only_note(&ctx).id;

        let mut declined = ScriptedPrompt { confirmations: VecDeque::from(vec![false]), ..Default::default() };
        run(&ctx, &["note", "delete", &id], &mut declined).unwrap();
        assert_eq!(ctx.store.load_all::<Note>().unwrap().len(), 1);

        run(&ctx, &["note", "delete", &id, "--yes"], &mut ScriptedPrompt::default()).unwrap();
        assert!(ctx.store.load_all::<Note>().unwrap().is_empty());

        // Deleting again is fine.
        run(&ctx, &["note", "delete", &id, "--yes"], &mut ScriptedPrompt::default()).unwrap();
    }

    #[test]
    fn test_export_writes_selected_notes_as_stored() {
        let ctx = context();
        run(&ctx, &["note", "add", "-t", "Open", "-c", "a"], &mut ScriptedPrompt::default()).unwrap();
        run(&ctx, &["note", "add", "-t", "Diary", "-c", "x", "--protect"], &mut ScriptedPrompt::passwords(&["abcd", "abcd"]))
            .unwrap();
        let notes = ctx.store.load_all::<Note>().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let read_export = || -> Vec<Note> {
            let written = std::fs::read_to_string(dir.path().join("notes_export.json")).unwrap();
            serde_json::from_str(&written).unwrap()
        };

        // No password is asked for; protected notes go out unchanged.
        run(&ctx, &["note", "export", "--out", out], &mut ScriptedPrompt::default()).unwrap();
        assert_eq!(read_export(), notes);

        let diary = notes.iter().find(|n| n.title == "Diary").unwrap();
        run(&ctx, &["note", "export", &diary.id, "--out", out], &mut ScriptedPrompt::default()).unwrap();
        assert_eq!(read_export(), vec![diary.clone()]);

        assert!(run(&ctx, &["note", "export", "missing-id", "--out", out], &mut ScriptedPrompt::default()).is_err());
    }

    #[test]
    fn test_credential_lifecycle() {
        let ctx = context();
        run(&ctx, &["cred", "add", "-t", "me@example.com", "-g", "Work"], &mut ScriptedPrompt::passwords(&["s3cret"]))
            .unwrap();
        let cred = ctx.store.load_all::<SavedCredential>().unwrap().remove(0);
        assert_eq!(cred.category(), "Work");

        run(&ctx, &["cred", "edit", &cred.id, "--change-password"], &mut ScriptedPrompt::passwords(&[" n3w "]))
            .unwrap();
        let edited = ctx.store.find::<SavedCredential>(&cred.id).unwrap();
        assert_eq!(edited.password, "n3w");
        assert_eq!(edited.category(), "Work");
        assert_eq!(edited.date, cred.date);

        run(&ctx, &["cred", "list"], &mut ScriptedPrompt::default()).unwrap();
        run(&ctx, &["cred", "delete", &cred.id, "-y"], &mut ScriptedPrompt::default()).unwrap();
        assert!(ctx.store.load_all::<SavedCredential>().unwrap().is_empty());
    }

    #[test]
    fn test_credential_requires_title_and_password() {
        let ctx = context();
        match run(&ctx, &["cred", "add", "-t", "me@example.com"], &mut ScriptedPrompt::passwords(&["  "])) {
            Err(AppError::Validation(ValidationError::EmptyCredential)) => {}
            other => panic!("Expected EmptyCredential, got {:?}", other),
        }
    }

    #[test]
    fn test_biometric_commands_on_unsupported_host() {
        let ctx = context();
        run(&ctx, &["biometric", "status"], &mut ScriptedPrompt::default()).unwrap();
        match run(&ctx, &["biometric", "enable"], &mut ScriptedPrompt::default()) {
            Err(AppError::Biometric(crate::error::BiometricError::NotSupported)) => {}
            other => panic!("Expected NotSupported, got {:?}", other),
        }
    }

    #[test]
    fn test_user_set_and_greeting() {
        let ctx = context();
        run(&ctx, &["user", "set", "  Ada "], &mut ScriptedPrompt::default()).unwrap();
        assert_eq!(ctx.settings().username().as_deref(), Some("Ada"));
        assert!(run(&ctx, &["user", "set", "   "], &mut ScriptedPrompt::default()).is_err());
        run(&ctx, &[], &mut ScriptedPrompt::default()).unwrap();
    }

    #[test]
    fn test_store_failure_surfaces_as_message() {
        let ctx = context();
        ctx.store.kv().set_failing_writes(true);
        match run(&ctx, &["note", "add", "-t", "A", "-c", "a"], &mut ScriptedPrompt::default()) {
            Err(AppError::Cli(msg)) => assert_eq!(msg, "Failed to save note"),
            other => panic!("Expected save failure, got {:?}", other),
        }
    }
}
