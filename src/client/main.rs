/**
 * Parley Command-Line Client
 *
 * Account management and an interactive chat loop on top of the client
 * library. The session survives between runs in the user's config directory.
 */
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use parley::client::{ChatController, ChatStore, ClientError, Config, HttpClient, SessionContext, SessionStore};
use parley::shared::auth::{SignupRequest, UpdateProfileRequest};
use parley::shared::media::{content_type_for_extension, ImageAttachment};
use parley::shared::{Message, MessageDraft, SharedError, UserProfile};

#[derive(Debug, Parser)]
#[command(name = "parley", version, about = "Parley messaging client")]
struct Cli {
    /// Server URL, e.g. http://127.0.0.1:3000
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Image file used as profile picture
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List every other user
    Contacts,
    /// List conversations, most recent first
    Chats,
    /// Change name or profile picture
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Open an interactive conversation
    Chat { peer: Uuid },
}

const CHAT_HELP: &str = "Type a message and press Enter. Commands: /image <path> [caption], /retry, /quit";

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.is_unauthorized() {
                eprintln!("hint: run `parley login` first");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let mut config = Config::load()?;
    if let Some(server) = cli.server {
        config = config.with_server_url(server)?;
    }

    let store = SessionStore::default_location()
        .ok_or_else(|| ClientError::Session("no config directory on this platform".to_string()))?;
    let session = match store.load()? {
        Some(session) => SessionContext::with_session(session),
        None => SessionContext::new(),
    };
    let client = HttpClient::new(&config, session)?;

    match cli.command {
        Command::Signup {
            name,
            email,
            password,
            avatar,
        } => {
            let profile_pic = avatar.as_deref().map(load_image).transpose()?;
            let request = SignupRequest {
                full_name: name,
                email,
                password,
                profile_pic: profile_pic.map(|image| image.to_data_uri()),
            };
            let session = client.signup(&request).await?;
            store.save(&session)?;
            println!("Welcome, {}!", describe(&session.user));
        }
        Command::Login { email, password } => {
            let session = client.login(&email, &password).await?;
            store.save(&session)?;
            println!("Logged in as {}", describe(&session.user));
        }
        Command::Logout => {
            if let Err(e) = client.logout().await {
                tracing::warn!("Server logout failed: {}", e);
            }
            store.clear()?;
            println!("Logged out");
        }
        Command::Whoami => {
            let user = match client.check_auth().await {
                Ok(user) => user,
                Err(e) => {
                    if e.is_unauthorized() {
                        store.clear()?;
                    }
                    return Err(e);
                }
            };
            save_current(&client, &store)?;
            println!("{}  {}", user.id, describe(&user));
        }
        Command::Contacts => {
            let chat = controller(client, &config)?;
            for user in chat.load_contacts().await? {
                println!("{}  {}", user.id, describe(&user));
            }
        }
        Command::Chats => {
            let chat = controller(client, &config)?;
            let partners = chat.load_chat_partners().await?;
            if partners.is_empty() {
                println!("No conversations yet");
            }
            for partner in partners {
                let preview = partner
                    .last_message
                    .as_ref()
                    .map(|m| format!("[{}] {}", m.created_at.format("%Y-%m-%d %H:%M"), m.preview(60)))
                    .unwrap_or_default();
                println!("{}  {:<24} {}", partner.user.id, partner.user.full_name, preview);
            }
        }
        Command::Profile { name, avatar } => {
            let profile_pic = avatar.as_deref().map(load_image).transpose()?;
            let request = UpdateProfileRequest {
                full_name: name,
                profile_pic: profile_pic.map(|image| image.to_data_uri()),
            };
            let user = client.update_profile(request).await?;
            save_current(&client, &store)?;
            println!("Updated {}", describe(&user));
        }
        Command::Chat { peer } => {
            let chat = controller(client, &config)?;
            chat_loop(chat, peer).await?;
        }
    }
    Ok(())
}

fn controller(client: HttpClient, config: &Config) -> Result<ChatController<HttpClient>, ClientError> {
    if !client.session().is_authenticated() {
        return Err(ClientError::NotAuthenticated);
    }
    Ok(ChatController::new(Arc::new(client), ChatStore::new(), config.app()))
}

fn save_current(client: &HttpClient, store: &SessionStore) -> Result<(), ClientError> {
    match client.session().current() {
        Some(session) => store.save(&session),
        None => Ok(()),
    }
}

fn describe(user: &UserProfile) -> String {
    format!("{} <{}>", user.full_name, user.email)
}

fn load_image(path: &Path) -> Result<ImageAttachment, ClientError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let content_type = content_type_for_extension(extension).ok_or_else(|| {
        SharedError::media(format!("unrecognised image type: {}", path.display()))
    })?;
    let bytes = std::fs::read(path)
        .map_err(|e| SharedError::media(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(ImageAttachment::new(content_type, bytes)?)
}

async fn chat_loop(chat: ChatController<HttpClient>, peer_id: Uuid) -> Result<(), ClientError> {
    let me = chat.api().session().user();
    let peer_name = chat
        .load_contacts()
        .await?
        .into_iter()
        .find(|user| user.id == peer_id)
        .map(|user| user.full_name)
        .ok_or_else(|| ClientError::http(404, "Receiver not found."))?;

    chat.set_current_user(me.clone()).await;
    chat.select_peer(Some(peer_id)).await;
    println!("Chatting with {}. {}", peer_name, CHAT_HELP);

    let printer = tokio::spawn(print_updates(
        chat.store().clone(),
        me.map(|user| user.id),
        peer_name,
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if line == "/retry" {
            let chat = chat.clone();
            tokio::spawn(async move {
                match chat.retry_send().await {
                    Ok(None) => println!("Nothing to retry"),
                    Ok(Some(_)) => {}
                    Err(e) => report_send_error(&e),
                }
            });
            continue;
        }

        let draft = match line.strip_prefix("/image ") {
            Some(args) => match image_draft(args) {
                Ok(draft) => draft,
                Err(e) => {
                    eprintln!("! {}", e);
                    continue;
                }
            },
            None => MessageDraft::text(line),
        };

        let chat = chat.clone();
        tokio::spawn(async move {
            if let Err(e) = chat.send(&draft).await {
                report_send_error(&e);
            }
        });
    }

    printer.abort();
    chat.teardown().await;
    Ok(())
}

/// `/image <path> [caption]`
fn image_draft(args: &str) -> Result<MessageDraft, ClientError> {
    let (path, caption) = match args.trim().split_once(char::is_whitespace) {
        Some((path, caption)) => (path, Some(caption.trim())),
        None => (args.trim(), None),
    };
    let draft = MessageDraft::image(load_image(Path::new(path))?);
    Ok(match caption.filter(|c| !c.is_empty()) {
        Some(caption) => draft.with_text(caption),
        None => draft,
    })
}

fn report_send_error(error: &ClientError) {
    match error {
        ClientError::Busy => eprintln!("! Still sending the previous message"),
        ClientError::Cancelled => {}
        // shown by the printer from the store
        _ => tracing::debug!("Send failed: {}", error),
    }
}

async fn print_updates(store: ChatStore, me: Option<Uuid>, peer_name: String) {
    let mut changes = store.subscribe();
    let mut printed: HashSet<Uuid> = HashSet::new();
    let mut last_error: Option<String> = None;

    loop {
        let state = store.snapshot().await;
        for message in state.messages.iter() {
            if printed.insert(message.id) {
                println!("{}", render(message, me, &peer_name));
            }
        }
        if state.message_error != last_error {
            if let Some(error) = &state.message_error {
                if state.pending_send.is_some() {
                    eprintln!("! {} (type /retry to resend)", error);
                } else {
                    eprintln!("! {}", error);
                }
            }
            last_error = state.message_error.clone();
        }

        if changes.changed().await.is_err() {
            break;
        }
    }
}

fn render(message: &Message, me: Option<Uuid>, peer_name: &str) -> String {
    let author = if Some(message.sender_id) == me {
        "you"
    } else {
        peer_name
    };
    format!(
        "[{}] {}: {}",
        message.created_at.format("%H:%M"),
        author,
        message.preview(200)
    )
}
