//! Cardbox CLI - Command line access to the card collection's Dropbox store.
//!
//! This tool manages the stored access token and exposes each Dropbox client
//! operation as a subcommand.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cardbox_common::AccessToken;
use cardbox_storage::{
    ClientConfig, DropboxClient, Endpoint, GetMetadataArgs, Metadata, TokenStore, UploadArgs,
    WriteMode,
};

#[derive(Parser)]
#[command(name = "cardbox")]
#[command(about = "Cardbox - Dropbox storage for card collections")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Access token for this invocation only (overrides the stored token).
    #[arg(long, global = true)]
    token: Option<String>,

    /// JSON file with endpoint configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where the access token is stored (default: user config directory).
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Endpoint selection for the generic calls.
#[derive(Args, Debug)]
struct EndpointArgs {
    /// Use the RPC endpoint instead of the content endpoint.
    #[arg(long, conflicts_with = "endpoint")]
    rpc: bool,

    /// Explicit base URL, ending with '/'.
    #[arg(long)]
    endpoint: Option<String>,
}

impl EndpointArgs {
    fn resolve(self) -> Endpoint {
        match (self.rpc, self.endpoint) {
            (_, Some(url)) => Endpoint::Custom(url),
            (true, None) => Endpoint::Rpc,
            (false, None) => Endpoint::Content,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Store an access token for later calls.
    SetToken {
        /// The token, as generated in the Dropbox app console.
        #[arg(value_name = "TOKEN")]
        value: String,
    },

    /// Remove the stored access token.
    ClearToken,

    /// Show token and endpoint status.
    Status,

    /// Upload a local file.
    Upload {
        /// Destination path in the Dropbox.
        #[arg(short, long)]
        path: String,

        /// Local file to upload.
        #[arg(short, long)]
        file: PathBuf,

        /// Write mode: "add", "overwrite", or "update".
        #[arg(short, long, default_value = "add")]
        mode: WriteMode,

        /// Fail instead of renaming on conflict.
        #[arg(long)]
        no_autorename: bool,

        /// Do not notify the user's devices.
        #[arg(long)]
        mute: bool,
    },

    /// Download a file.
    Download {
        /// Path in the Dropbox.
        #[arg(short, long)]
        path: String,

        /// Output file (default: stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Download a folder as a zip archive.
    Zip {
        /// Folder path in the Dropbox.
        #[arg(short, long)]
        path: String,

        /// Output file.
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Show metadata of a file or folder.
    Metadata {
        /// Path, id ("id:...") or revision ("rev:...").
        #[arg(short, long)]
        path: String,

        /// Include media info for photos and videos.
        #[arg(long)]
        media_info: bool,

        /// Return metadata for deleted entries.
        #[arg(long)]
        deleted: bool,

        /// Include the explicit shared members flag.
        #[arg(long)]
        shared_members: bool,
    },

    /// Call any API method with GET.
    Get {
        /// API method, e.g. "files/download".
        method: String,

        /// Arguments as a JSON object.
        #[arg(short, long, default_value = "{}")]
        args: String,

        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Call any API method with POST, sending a local file as the body.
    Post {
        /// API method, e.g. "files/upload".
        method: String,

        /// Arguments as a JSON object.
        #[arg(short, long, default_value = "{}")]
        args: String,

        /// File whose bytes form the request body.
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Start the OAuth2 authorization flow.
    Authorize {
        /// The app key.
        #[arg(long)]
        client_id: String,

        /// Where Dropbox should redirect after authorization.
        #[arg(long)]
        redirect_uri: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ClientConfig::default(),
    };

    let store = match cli.token_file {
        Some(path) => TokenStore::new(path),
        None => TokenStore::default_location().context("Failed to locate token store")?,
    };

    let client = DropboxClient::from_store(config, &store)
        .await
        .context("Failed to create Dropbox client")?;
    let token = cli.token.as_deref();

    match cli.command {
        Commands::SetToken { value } => cmd_set_token(&client, &store, value).await,

        Commands::ClearToken => cmd_clear_token(&store).await,

        Commands::Status => cmd_status(&client, &store).await,

        Commands::Upload {
            path,
            file,
            mode,
            no_autorename,
            mute,
        } => {
            let args = UploadArgs::new(path)
                .mode(mode)
                .autorename(!no_autorename)
                .mute(mute);
            cmd_upload(&client, args, &file, token).await
        }

        Commands::Download { path, out } => cmd_download(&client, &path, out.as_deref(), token).await,

        Commands::Zip { path, out } => cmd_zip(&client, &path, &out, token).await,

        Commands::Metadata {
            path,
            media_info,
            deleted,
            shared_members,
        } => {
            let args = GetMetadataArgs::new(path)
                .include_media_info(media_info)
                .include_deleted(deleted)
                .include_has_explicit_shared_members(shared_members);
            cmd_metadata(&client, args, token).await
        }

        Commands::Get {
            method,
            args,
            endpoint,
        } => cmd_get(&client, &method, &args, endpoint.resolve(), token).await,

        Commands::Post {
            method,
            args,
            file,
            endpoint,
        } => cmd_post(&client, &method, &args, &file, endpoint.resolve(), token).await,

        Commands::Authorize {
            client_id,
            redirect_uri,
        } => cmd_authorize(&client, &store, &client_id, redirect_uri.as_deref()).await,
    }
}

/// Parse a `--args` value into a JSON value.
fn parse_args(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).with_context(|| format!("Arguments are not valid JSON: {}", raw))
}

/// Write bytes to a file, or to stdout when no file is given.
async fn write_output(out: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match out {
        Some(path) => tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(bytes).await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

async fn cmd_set_token(client: &DropboxClient, store: &TokenStore, token: String) -> Result<()> {
    store
        .update_access_token(client, AccessToken::new(token))
        .await
        .context("Failed to store token")?;

    println!("Token stored at {}", store.path().display());
    Ok(())
}

async fn cmd_clear_token(store: &TokenStore) -> Result<()> {
    store.clear().await.context("Failed to remove token")?;
    println!("Token removed from {}", store.path().display());
    Ok(())
}

async fn cmd_status(client: &DropboxClient, store: &TokenStore) -> Result<()> {
    let has_token = store.has_token().await.context("Failed to read token store")?;
    let config = client.config();

    println!("Cardbox status:");
    println!("  Token file: {}", store.path().display());
    println!("  Token stored: {}", if has_token { "yes" } else { "no" });
    println!("  Content endpoint: {}", config.content_endpoint);
    println!("  RPC endpoint: {}", config.rpc_endpoint);

    Ok(())
}

/// Upload a local file.
async fn cmd_upload(
    client: &DropboxClient,
    args: UploadArgs,
    file: &Path,
    token: Option<&str>,
) -> Result<()> {
    info!("Uploading {} to {}", file.display(), args.path);

    let content = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let size = content.len();

    let metadata = client
        .upload_file(args, content, token)?
        .await
        .context("Upload failed")?;

    println!(
        "Uploaded {} ({} bytes, rev {})",
        metadata.path_display.as_deref().unwrap_or(&metadata.name),
        size,
        metadata.rev
    );
    Ok(())
}

/// Download a file.
async fn cmd_download(
    client: &DropboxClient,
    path: &str,
    out: Option<&Path>,
    token: Option<&str>,
) -> Result<()> {
    let file = client
        .download_file(path, token)?
        .await
        .context("Download failed")?;

    write_output(out, &file.content).await?;

    if let Some(out) = out {
        println!("Downloaded {} to {} ({} bytes)", path, out.display(), file.content.len());
        if let Some(metadata) = file.metadata {
            println!("  Revision: {}", metadata.rev);
            println!("  Modified: {}", metadata.server_modified);
        }
    }
    Ok(())
}

/// Download a folder as zip.
async fn cmd_zip(client: &DropboxClient, path: &str, out: &Path, token: Option<&str>) -> Result<()> {
    info!("Downloading {} as zip", path);

    let response = client.zip(path, token)?.await.context("Zip download failed")?;
    write_output(Some(out), &response.body).await?;

    println!("Saved {} to {} ({} bytes)", path, out.display(), response.body.len());
    Ok(())
}

/// Show metadata.
async fn cmd_metadata(client: &DropboxClient, args: GetMetadataArgs, token: Option<&str>) -> Result<()> {
    let response = client
        .get_metadata(args, token)?
        .await
        .context("Metadata request failed")?;
    let metadata: Metadata = response.json().context("Unexpected metadata response")?;

    match &metadata {
        Metadata::File(file) => {
            println!("[FILE] {}", file.path_display.as_deref().unwrap_or(&file.name));
            println!("  Id: {}", file.id);
            println!("  Size: {} bytes", file.size);
            println!("  Revision: {}", file.rev);
            println!("  Modified: {}", file.server_modified);
        }
        Metadata::Folder(folder) => {
            println!("[DIR]  {}/", folder.path_display.as_deref().unwrap_or(&folder.name));
            println!("  Id: {}", folder.id);
        }
        Metadata::Deleted(_) => {
            println!("[DELETED] {}", metadata.path_display().unwrap_or(metadata.name()));
        }
    }
    Ok(())
}

/// Generic GET call.
async fn cmd_get(
    client: &DropboxClient,
    method: &str,
    raw_args: &str,
    endpoint: Endpoint,
    token: Option<&str>,
) -> Result<()> {
    let args = parse_args(raw_args)?;
    let response = client
        .get(method, &args, endpoint, token)?
        .await
        .with_context(|| format!("{} failed", method))?;

    write_output(None, &response.body).await
}

/// Generic POST call.
async fn cmd_post(
    client: &DropboxClient,
    method: &str,
    raw_args: &str,
    file: &Path,
    endpoint: Endpoint,
    token: Option<&str>,
) -> Result<()> {
    let args = parse_args(raw_args)?;
    let content = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let response = client
        .post(method, &args, content, endpoint, token)?
        .await
        .with_context(|| format!("{} failed", method))?;

    write_output(None, &response.body).await
}

/// OAuth2 authorization.
async fn cmd_authorize(
    client: &DropboxClient,
    store: &TokenStore,
    client_id: &str,
    redirect_uri: Option<&str>,
) -> Result<()> {
    let token = client
        .authorize(client_id, redirect_uri)
        .await
        .context("Authorization failed; generate a token in the Dropbox app console and run `cardbox set-token`")?;

    store.update_access_token(client, token).await?;
    println!("Authorized.");
    Ok(())
}
