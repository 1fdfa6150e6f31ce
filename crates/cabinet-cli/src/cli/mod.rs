//! CLI entry and dispatch.

use anyhow::{Context, Result};
use cabinet_core::api::types::ProfilePatch;
use cabinet_core::api::{AuthService, UserService};
use cabinet_core::config::Config;
use cabinet_core::session::AuthSession;
use cabinet_core::store::TokenStore;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "cabinet")]
#[command(version)]
#[command(about = "Learning cabinet client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with login and password (password is read from stdin)
    Login {
        /// Account login or email
        #[arg(long)]
        login: String,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the current session
    Status,

    /// Create an account (the verification code is read from stdin)
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long = "second-name")]
        second_name: String,
        #[arg(long)]
        age: Option<u32>,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Recover or change the account password
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },

    /// Google sign-in and account linking
    Google {
        #[command(subcommand)]
        command: GoogleCommands,
    },

    /// View or edit the profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum PasswordCommands {
    /// Request a recovery code, then set a new password
    Forgot {
        #[arg(long)]
        email: String,
    },
    /// Change the password of the signed-in account
    Change,
}

#[derive(clap::Subcommand)]
enum GoogleCommands {
    /// Print the Google sign-in URL
    Url,
    /// Open Google sign-in in the browser
    Open,
    /// Complete sign-in from the callback URL the browser landed on
    Callback {
        /// Callback URL or its query string
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Show whether a Google account is linked
    Status,
    /// Link a Google account to the signed-in account
    Link,
    /// Unlink the Google account
    Unlink,
}

#[derive(clap::Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        login: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "second-name")]
        second_name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

/// Everything a command needs, built once per invocation.
pub struct App {
    pub config: Config,
    pub session: AuthSession,
    pub users: UserService,
}

impl App {
    fn load() -> Result<Self> {
        let config = Config::load().context("load config")?;
        let store = TokenStore::file_backed();
        let auth = AuthService::from_config(&config, store.clone())?;
        let users = UserService::from_config(&config, store)?;

        let mut session = AuthSession::new(auth);
        session.bootstrap();

        Ok(Self {
            config,
            session,
            users,
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work even when the config file is broken.
    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let mut app = App::load()?;

    match cli.command {
        Commands::Login { login } => commands::auth::login(&mut app, login).await,
        Commands::Logout => commands::auth::logout(&mut app).await,
        Commands::Status => {
            commands::auth::status(&app);
            Ok(())
        }

        Commands::Register {
            email,
            name,
            second_name,
            age,
            phone,
        } => {
            commands::register::run(
                &app,
                commands::register::RegisterArgs {
                    email,
                    name,
                    second_name,
                    age,
                    phone,
                },
            )
            .await
        }

        Commands::Password { command } => match command {
            PasswordCommands::Forgot { email } => commands::password::forgot(&app, &email).await,
            PasswordCommands::Change => commands::password::change(&app).await,
        },

        Commands::Google { command } => match command {
            GoogleCommands::Url => {
                commands::google::url(&app);
                Ok(())
            }
            GoogleCommands::Open => {
                commands::google::open(&app);
                Ok(())
            }
            GoogleCommands::Callback { url } => commands::google::callback(&mut app, &url).await,
            GoogleCommands::Status => commands::google::status(&app).await,
            GoogleCommands::Link => commands::google::link(&app).await,
            GoogleCommands::Unlink => commands::google::unlink(&app).await,
        },

        Commands::Profile { command } => match command {
            ProfileCommands::Show => commands::profile::show(&app).await,
            ProfileCommands::Update {
                login,
                name,
                second_name,
                age,
                phone,
            } => {
                let patch = ProfilePatch {
                    login,
                    name,
                    second_name,
                    age,
                    telefon_number: phone,
                };
                commands::profile::update(&mut app, &patch).await
            }
        },

        Commands::Config { .. } => Ok(()),
    }
}
