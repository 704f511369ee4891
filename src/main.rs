use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use raiboard::guard::{LoggingNavigator, NoUnloadPrompt};
use raiboard::notify::TracingNotifier;
use raiboard::types::CollaboratorRole;
use raiboard::{
    EditingSession, EntityId, GatewayError, HttpGateway, NavigationGuard, Position, Product, RaiboardConfig,
    TextElementPatch, TextKind,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] raiboard::config::ConfigError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("no product or text element with id `{0}` on this board")]
    UnknownElement(String),
}

#[derive(Parser, Debug)]
#[command(name = "raiboard", about = "Inspect and edit RaiBoard moodboards")]
struct Cli {
    /// Board API base URL.
    #[arg(long, env = "RAIBOARD_API_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a board as JSON.
    Show { board_id: String },
    /// Invite a collaborator by email.
    Invite {
        board_id: String,
        email: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Editor)]
        role: RoleArg,
    },
    /// Add a heading or paragraph and save.
    AddText {
        board_id: String,
        #[arg(value_enum)]
        kind: KindArg,
        x: f64,
        y: f64,
        #[arg(long)]
        content: Option<String>,
    },
    /// Pin a catalog product (JSON) and save.
    AddProduct { board_id: String, product: String, x: f64, y: f64 },
    /// Move a product or text element and save.
    Move {
        board_id: String,
        element_id: String,
        x: f64,
        y: f64,
        #[arg(long)]
        z_index: Option<i32>,
    },
    /// Remove a product or text element and save.
    Remove { board_id: String, element_id: String },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Owner,
    Editor,
    Viewer,
}

impl From<RoleArg> for CollaboratorRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Owner => Self::Owner,
            RoleArg::Editor => Self::Editor,
            RoleArg::Viewer => Self::Viewer,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Heading,
    Paragraph,
}

impl From<KindArg> for TextKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Heading => Self::Heading,
            KindArg::Paragraph => Self::Paragraph,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = RaiboardConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.api_base_url = RaiboardConfig::with_base_url(base_url)?.api_base_url;
    }

    let gateway = Arc::new(HttpGateway::new(&config)?);
    let guard = NavigationGuard::new(Box::new(LoggingNavigator::default()), Box::new(NoUnloadPrompt));
    let mut session =
        EditingSession::new(gateway, Arc::new(TracingNotifier), guard).with_board_list_path(config.board_list_path.clone());

    match cli.command {
        Command::Show { board_id } => {
            session.open(&board_id).await?;
            if let Some(board) = session.store().board() {
                println!("{}", serde_json::to_string_pretty(board)?);
            }
        }
        Command::Invite { board_id, email, role } => {
            session.open(&board_id).await?;
            session.facade().invite_collaborator(&email, role.into()).await?;
            println!("invited {email}");
        }
        Command::AddText { board_id, kind, x, y, content } => {
            session.open(&board_id).await?;
            let mut facade = session.facade();
            if let Some(id) = facade.add_text(kind.into(), Position { x, y })
                && content.is_some()
            {
                facade.edit_text(&id, TextElementPatch { content, ..TextElementPatch::default() });
            }
            session.save().await?;
            if let Some(text) = session.store().board().and_then(|board| board.text_elements.last()) {
                println!("{}", text.id);
            }
        }
        Command::AddProduct { board_id, product, x, y } => {
            let product: Product = serde_json::from_str(&product)?;
            session.open(&board_id).await?;
            session.facade().add_product(&product, Position { x, y });
            session.save().await?;
            if let Some(placed) = session.store().board().and_then(|board| board.products.last()) {
                println!("{}", placed.id);
            }
        }
        Command::Move { board_id, element_id, x, y, z_index } => {
            session.open(&board_id).await?;
            let id = EntityId::parse(element_id.as_str());
            let (is_product, is_text) = element_kind(&session, &id);
            let position = Position { x, y };
            if is_product {
                session.facade().move_product(&id, position, z_index);
            } else if is_text {
                session.facade().move_text(&id, position, z_index);
            } else {
                return Err(CliError::UnknownElement(element_id));
            }
            session.save().await?;
        }
        Command::Remove { board_id, element_id } => {
            session.open(&board_id).await?;
            let id = EntityId::parse(element_id.as_str());
            let (is_product, is_text) = element_kind(&session, &id);
            if is_product {
                session.facade().remove_product(&id);
            } else if is_text {
                session.facade().remove_text(&id);
            } else {
                return Err(CliError::UnknownElement(element_id));
            }
            session.save().await?;
        }
    }

    Ok(())
}

fn element_kind(session: &EditingSession, id: &EntityId) -> (bool, bool) {
    session
        .store()
        .board()
        .map_or((false, false), |board| (board.product(id).is_some(), board.text_element(id).is_some()))
}
