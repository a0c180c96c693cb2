//! NeoShare CLI — command-line client for the NeoShare API.
//!
//! Set NEOSHARE_API_URL (or API_URL). Credentials persist in
//! ~/.neoshare/credentials.json after `login`.

use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use neoshare_api_client::{ApiClient, FileApi, FileCredentialStore};
use neoshare_cli::{format_size, init_tracing, truncate_string};
use neoshare_core::models::{
    CreateUserRequest, FileEntry, ProfileUpdate, RegisterRequest,
};
use neoshare_core::notebook::CellKind;
use neoshare_core::{ClientConfig, Namespace, Notebook, RemotePath};
use neoshare_store::{FileStore, PreviewPhase, PreviewSession, SessionStore, UploadJob};

#[derive(Parser)]
#[command(name = "neoshare", about = "NeoShare file sharing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the issued token
    Login {
        username: String,
        password: String,
    },
    /// Register a new account
    Register {
        username: String,
        password: String,
        /// Display name
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Discard the persisted token
    Logout,
    /// Show the authenticated identity
    Whoami,
    /// List a directory
    Ls {
        /// Directory path
        #[arg(default_value = "/")]
        path: String,
        /// Use the private namespace
        #[arg(long)]
        private: bool,
        /// Filter entries by name
        #[arg(long)]
        search: Option<String>,
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Upload one or more files
    Upload {
        /// Local files to upload
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
        /// Target directory path
        #[arg(long, default_value = "/")]
        path: String,
        /// Use the private namespace
        #[arg(long)]
        private: bool,
    },
    /// Create a directory
    Mkdir {
        name: String,
        /// Parent directory path
        #[arg(long, default_value = "/")]
        path: String,
        /// Use the private namespace
        #[arg(long)]
        private: bool,
    },
    /// Delete a file or directory by id
    Rm {
        id: i64,
    },
    /// Download a file by id
    Download {
        id: i64,
        /// Local output path
        #[arg(long)]
        output: std::path::PathBuf,
    },
    /// Print the text content of a file
    Cat {
        id: i64,
        /// Parse as a notebook and print cells with outputs
        #[arg(long)]
        cells: bool,
    },
    /// Replace the text content of a file from a local file
    Save {
        id: i64,
        file: std::path::PathBuf,
    },
    /// Preview a file by path
    Preview {
        /// Remote path of the file
        path: String,
        /// Use the private namespace
        #[arg(long)]
        private: bool,
        /// Print the external editor URL instead of rendering
        #[arg(long)]
        external: bool,
    },
    /// User administration
    Users {
        #[command(subcommand)]
        sub: UserCommands,
    },
    /// Update the authenticated profile
    Profile {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        signature: Option<String>,
    },
    /// Upload a new avatar image
    Avatar {
        file: std::path::PathBuf,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List all users (admin)
    List,
    /// Create a user (admin)
    Create {
        username: String,
        password: String,
        /// Role: user or admin
        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Delete a user by id (admin)
    Delete {
        id: i64,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn namespace(private: bool) -> Namespace {
    if private {
        Namespace::Private
    } else {
        Namespace::Public
    }
}

fn print_entries(entries: &[FileEntry]) {
    if entries.is_empty() {
        println!("(empty)");
        return;
    }
    println!(
        "{:<8} {:<10} {:<40} {:>10} {:>20}",
        "ID", "Type", "Name", "Size", "Updated"
    );
    println!("{}", "-".repeat(92));
    for entry in entries {
        println!(
            "{:<8} {:<10} {:<40} {:>10} {:>20}",
            entry.id,
            if entry.is_directory() { "dir" } else { "file" },
            truncate_string(&entry.name, 40),
            if entry.is_directory() {
                "-".to_string()
            } else {
                format_size(entry.size)
            },
            entry.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn print_notebook(notebook: &Notebook) {
    for (index, cell) in notebook.cells.iter().enumerate() {
        let label = match cell.cell_type {
            CellKind::Code => "code",
            CellKind::Markdown => "markdown",
            CellKind::Raw => "raw",
        };
        println!("--- cell {} ({label}) ---", index + 1);
        println!("{}", cell.source.joined());
        for output in &cell.outputs {
            if let Some(text) = output.plain_text() {
                println!(">>> {}", text.trim_end());
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env().context(
        "Failed to load configuration. Set NEOSHARE_API_URL (or API_URL)",
    )?;
    let credentials = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
    let client = ApiClient::new(&config, credentials.clone())?;
    let api: Arc<dyn FileApi> = Arc::new(client.clone());
    let session = SessionStore::new(api.clone(), credentials);

    let cli = Cli::parse();

    match cli.command {
        Commands::Login { username, password } => {
            let response = client.login(&username, &password).await?;
            session.login(response.access_token, response.user.clone())?;
            print_json(&response.user)?;
        }
        Commands::Register {
            username,
            password,
            nickname,
        } => {
            let user = client
                .register(&RegisterRequest {
                    username,
                    password,
                    nickname,
                })
                .await?;
            print_json(&user)?;
        }
        Commands::Logout => {
            session.logout();
            println!("Logged out");
        }
        Commands::Whoami => {
            session.revalidate().await;
            match session.current_user() {
                Some(user) => print_json(&user)?,
                None => bail!("Not logged in"),
            }
        }
        Commands::Ls {
            path,
            private,
            search,
            json,
        } => {
            let target = RemotePath::parse(&path)?;
            let store = Arc::new(FileStore::with_namespace(
                api.clone(),
                &config,
                namespace(private),
            ));
            if target.is_root() {
                store.refresh().await;
            } else {
                store.navigate(target.clone()).await;
                if store.snapshot().current_path != target {
                    bail!("Failed to list {target}");
                }
            }
            if let Some(query) = search.as_deref() {
                store.search(query).await;
                store.flush_search().await;
            }
            let state = store.snapshot();
            if json {
                print_json(&state.entries)?;
            } else {
                print_entries(&state.entries);
            }
        }
        Commands::Upload {
            files,
            path,
            private,
        } => {
            let target = RemotePath::parse(&path)?;
            let store = Arc::new(FileStore::with_namespace(
                api.clone(),
                &config,
                namespace(private),
            ));
            if !target.is_root() {
                store.navigate(target.clone()).await;
                if store.snapshot().current_path != target {
                    bail!("Cannot open {target}");
                }
            }
            let mut jobs = Vec::with_capacity(files.len());
            for file in &files {
                let filename = file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .with_context(|| format!("Invalid filename: {}", file.display()))?;
                let data = fs::read(file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                jobs.push(UploadJob::file(filename, data));
            }
            let outcomes = store.upload_batch(jobs).await;
            let mut failed = false;
            for outcome in &outcomes {
                match &outcome.error {
                    None => println!("{}: uploaded", outcome.filename),
                    Some(e) => {
                        failed = true;
                        eprintln!("{}: upload failed: {e}", outcome.filename);
                    }
                }
            }
            if failed {
                bail!("Some uploads failed");
            }
        }
        Commands::Mkdir {
            name,
            path,
            private,
        } => {
            let parent = RemotePath::parse(&path)?;
            let entry = client
                .create_directory(namespace(private), &parent, &name)
                .await?;
            print_json(&entry)?;
        }
        Commands::Rm { id } => {
            client.delete_file(id).await?;
            print_json(&serde_json::json!({ "success": true, "message": format!("Entry {id} deleted") }))?;
        }
        Commands::Download { id, output } => {
            let data = client.download_file(id, false).await?;
            fs::write(&output, &data)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {} ({})", output.display(), format_size(data.len() as i64));
        }
        Commands::Cat { id, cells } => {
            let response = client.get_content(id).await?;
            if cells {
                let notebook = Notebook::parse(&response.content)?;
                print_notebook(&notebook);
            } else {
                println!("{}", response.content);
            }
        }
        Commands::Save { id, file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            client.put_content(id, &content).await?;
            print_json(&serde_json::json!({ "success": true, "message": format!("Entry {id} saved") }))?;
        }
        Commands::Preview {
            path,
            private,
            external,
        } => {
            let path = RemotePath::parse(&path)?;
            let name = match path.file_name() {
                Some(name) => name.to_string(),
                None => bail!("Cannot preview the root directory"),
            };
            let parent = path.parent().unwrap_or_else(RemotePath::root);
            let entries = client
                .list_files(namespace(private), &parent, None)
                .await?;
            let entry = entries
                .into_iter()
                .find(|e| e.name == name)
                .with_context(|| format!("No such file: {path}"))?;

            session.revalidate().await;
            let viewer = session.current_user();
            let mut preview =
                PreviewSession::open(api.clone(), viewer.as_ref(), entry, &config).await;

            if external {
                let url = preview.enter_external_editor().await?;
                println!("{url}");
                return Ok(());
            }
            match preview.phase() {
                PreviewPhase::Error(message) => bail!("Preview failed: {message}"),
                PreviewPhase::Viewing | PreviewPhase::Editing => {
                    if let Some(html) = preview.preview_html() {
                        println!("{html}");
                    } else if !preview.content().is_empty() {
                        println!("{}", preview.content());
                    } else {
                        print_json(&serde_json::json!({
                            "mode": format!("{:?}", preview.mode()),
                            "download_url": client.download_url(preview.file().id, true),
                        }))?;
                    }
                }
                phase => bail!("Unexpected preview phase: {phase:?}"),
            }
        }
        Commands::Users { sub } => match sub {
            UserCommands::List => {
                let users = client.list_users().await?;
                print_json(&users)?;
            }
            UserCommands::Create {
                username,
                password,
                role,
            } => {
                let user = client
                    .create_user(&CreateUserRequest {
                        username,
                        password,
                        role,
                    })
                    .await?;
                print_json(&user)?;
            }
            UserCommands::Delete { id } => {
                client.delete_user(id).await?;
                print_json(&serde_json::json!({ "success": true, "message": format!("User {id} deleted") }))?;
            }
        },
        Commands::Profile {
            nickname,
            signature,
        } => {
            let me = client.fetch_me().await?;
            let user = client
                .update_profile(
                    me.id,
                    &ProfileUpdate {
                        nickname,
                        signature,
                        avatar_url: None,
                    },
                )
                .await?;
            print_json(&user)?;
        }
        Commands::Avatar { file } => {
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("Invalid filename: {}", file.display()))?
                .to_string();
            let data = fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let response = client.upload_avatar(&filename, data).await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
