use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sharm_core::dto::CreateUserDto;
use sharm_core::models::{Category, Page, PageRequest, Role};
use sharm_core::{CategoryService, TokenKeys, UserService, UserStore};
use sharm_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "sharm", version, about = "Sharm Beauty operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Create an account and give it the admin role
    CreateAdmin {
        #[arg(short, long)]
        email: String,

        /// Reads from SHARM_ADMIN_PASSWORD if not provided
        #[arg(short, long, env = "SHARM_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, default_value = "Admin")]
        name: String,

        #[arg(long, default_value = "Sharm")]
        surname: String,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Change the role of an existing account
    SetRole {
        #[arg(short, long)]
        email: String,

        /// `admin` or `user`
        #[arg(short, long, value_parser = parse_role)]
        role: Role,
    },

    /// List accounts, newest first
    Users {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },

    /// Print the category tree
    Categories,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sharm=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = connect_db().await?;

    match cli.command {
        Commands::Migrate => {
            // Already applied by connect_db.
            println!("Migrations are up to date");
        }
        Commands::CreateAdmin {
            email,
            password,
            name,
            surname,
            phone,
        } => cmd_create_admin(&db, email, password, name, surname, phone).await?,
        Commands::SetRole { email, role } => cmd_set_role(&db, &email, role).await?,
        Commands::Users { page, limit } => cmd_users(&db, page, limit).await?,
        Commands::Categories => cmd_categories(&db).await?,
    }

    Ok(())
}

/// Connect using DATABASE_URL and bring the schema up to date.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await?;
    Ok(db)
}

/// Signing key for the session token `UserService::create` issues. The CLI
/// discards that token, so the server's secret is not needed here.
const DISCARDED_TOKEN_SECRET: &str = "sharm-cli-discarded-token";

async fn cmd_create_admin(
    db: &Database,
    email: String,
    password: String,
    name: String,
    surname: String,
    phone: Option<String>,
) -> Result<()> {
    let keys = TokenKeys::new(DISCARDED_TOKEN_SECRET, TimeDelta::minutes(1))?;
    let service = UserService::new(db.user_repo(), keys);
    let created = service
        .create(CreateUserDto {
            email,
            password,
            name,
            surname,
            phone,
        })
        .await?;

    let admin = db
        .user_repo()
        .set_role(created.user.id, Role::Admin)
        .await?
        .context("Account vanished before it could be promoted")?;

    tracing::info!(user_id = admin.id, "admin account created");
    println!("Created admin {} (id {})", admin.email, admin.id);
    Ok(())
}

async fn cmd_set_role(db: &Database, email: &str, role: Role) -> Result<()> {
    let repo = db.user_repo();
    let user = repo
        .find_by_email(email)
        .await?
        .with_context(|| format!("No account with email {email}"))?;

    let updated = repo
        .set_role(user.id, role)
        .await?
        .with_context(|| format!("No account with id {}", user.id))?;

    println!("{} is now {}", updated.email, updated.role);
    Ok(())
}

async fn cmd_users(db: &Database, page: u32, limit: u32) -> Result<()> {
    let request = PageRequest::new(page, limit)?;
    let repo = db.user_repo();
    let users = repo.list(request.offset(), request.limit).await?;
    let result = Page::new(users, repo.count().await?, request);

    if result.data.is_empty() {
        println!("No accounts on page {page}");
        return Ok(());
    }

    for user in &result.data {
        println!(
            "  {:>6}  {:<6} {:<32} {} {} ({})",
            user.id,
            user.role.as_str(),
            user.email,
            user.name,
            user.surname,
            user.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }

    println!(
        "\nPage {}/{}, {} accounts in total",
        result.current_page, result.total_pages, result.total
    );
    Ok(())
}

async fn cmd_categories(db: &Database) -> Result<()> {
    let categories = CategoryService::new(db.category_repo()).find_all().await?;
    for line in render_tree(&categories) {
        println!("{line}");
    }
    Ok(())
}

/// Indented outline of the category tree, children in id order.
fn render_tree(categories: &[Category]) -> Vec<String> {
    fn walk(categories: &[Category], parent: Option<i64>, depth: usize, out: &mut Vec<String>) {
        for c in categories.iter().filter(|c| c.parent_id == parent) {
            out.push(format!("{}{} [{}] /{}", "  ".repeat(depth), c.title, c.id, c.url));
            walk(categories, Some(c.id), depth + 1, out);
        }
    }

    let mut out = Vec::new();
    walk(categories, None, 0, &mut out);
    out
}
