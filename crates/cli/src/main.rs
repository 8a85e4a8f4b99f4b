use api_shared::TokenService;
use clap::{Parser, Subcommand};
use panel_core::config::{prepare_storage_base, resolve_storage_base};
use panel_core::panel_files::EntryKind;
use panel_core::{CoreConfig, StorageService, TenantId, UploadPayload, TOKEN_TTL_DAYS};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "panel")]
#[command(about = "Hosting panel file store CLI")]
struct Cli {
    /// Storage base (defaults to FILES_ROOT, then ./storage)
    #[arg(long, global = true)]
    files_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the tenant root for a hosting account
    Provision {
        /// Tenant UUID
        tenant: String,
    },
    /// List a directory
    Ls {
        /// Tenant UUID
        tenant: String,
        /// Directory relative to the tenant root
        #[arg(default_value = "")]
        path: String,
    },
    /// Create a folder
    Mkdir {
        /// Tenant UUID
        tenant: String,
        /// Folder name
        name: String,
        /// Parent directory relative to the tenant root
        #[arg(long, default_value = "")]
        dir: String,
    },
    /// Upload a local file
    Put {
        /// Tenant UUID
        tenant: String,
        /// Local file to upload
        file: PathBuf,
        /// Target directory relative to the tenant root
        #[arg(long, default_value = "")]
        dir: String,
        /// Stored name (defaults to the local file name)
        #[arg(long)]
        name: Option<String>,
        /// Move the local file into place instead of copying its content
        #[arg(long = "move")]
        move_file: bool,
    },
    /// Delete a file or folder
    Rm {
        /// Tenant UUID
        tenant: String,
        /// Path relative to the tenant root
        path: String,
    },
    /// Rename an entry in place
    Rename {
        /// Tenant UUID
        tenant: String,
        /// Path relative to the tenant root
        path: String,
        /// New name (single segment)
        new_name: String,
    },
    /// Move an entry into a directory
    Mv {
        /// Tenant UUID
        tenant: String,
        /// Source path
        from: String,
        /// Destination directory (defaults to the tenant root)
        #[arg(default_value = "")]
        to_dir: String,
    },
    /// Copy an entry into a directory
    Cp {
        /// Tenant UUID
        tenant: String,
        /// Source path
        from: String,
        /// Destination directory (defaults to the tenant root)
        #[arg(default_value = "")]
        to_dir: String,
    },
    /// Print the absolute location of a path
    Path {
        /// Tenant UUID
        tenant: String,
        /// Path relative to the tenant root
        path: String,
    },
    /// Issue a bearer token for a tenant (requires JWT_SECRET)
    IssueToken {
        /// Tenant UUID
        tenant: String,
        /// Email recorded in the token
        email: String,
    },
}

fn storage(files_root: Option<PathBuf>) -> Result<StorageService, Box<dyn std::error::Error>> {
    let override_dir = files_root.or_else(|| std::env::var("FILES_ROOT").ok().map(PathBuf::from));
    let base = resolve_storage_base(override_dir, &std::env::current_dir()?);
    prepare_storage_base(&base)?;
    let cfg = Arc::new(CoreConfig::new(base, None)?);
    Ok(StorageService::new(cfg)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("No command given. Try `panel --help`.");
        return Ok(());
    };

    let files_root = cli.files_root;
    let open = || storage(files_root.clone());

    match command {
        Commands::IssueToken { tenant, email } => {
            let secret = std::env::var("JWT_SECRET").map_err(|_| "JWT_SECRET is not set")?;
            let tenant = TenantId::parse(&tenant)?;
            let token = TokenService::new(secret, TOKEN_TTL_DAYS).issue(&tenant, &email)?;
            println!("{}", token);
        }
        Commands::Provision { tenant } => {
            let root = open()?.provision(TenantId::parse(&tenant)?)?;
            println!("Provisioned {}", root.display());
        }
        Commands::Ls { tenant, path } => {
            let listing = open()?.files(TenantId::parse(&tenant)?).list(&path)?;
            if listing.items.is_empty() {
                println!("(empty)");
            }
            for entry in listing.items {
                let marker = match entry.kind {
                    EntryKind::Dir => 'd',
                    EntryKind::File => '-',
                };
                println!(
                    "{} {:>12}  {}  {}",
                    marker,
                    entry.size,
                    entry.modified.format("%Y-%m-%d %H:%M:%S"),
                    entry.name
                );
            }
        }
        Commands::Mkdir { tenant, name, dir } => {
            let name = open()?
                .files(TenantId::parse(&tenant)?)
                .make_directory(&dir, &name)?;
            println!("Created folder {}", name);
        }
        Commands::Put {
            tenant,
            file,
            dir,
            name,
            move_file,
        } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or("cannot derive a file name; pass --name")?,
            };
            let payload = if move_file {
                UploadPayload::StagedFile(file)
            } else {
                UploadPayload::Memory(std::fs::read(&file)?)
            };
            let saved = open()?
                .files(TenantId::parse(&tenant)?)
                .save_upload(&dir, &name, payload)?;
            println!("Uploaded {}", saved);
        }
        Commands::Rm { tenant, path } => {
            open()?.files(TenantId::parse(&tenant)?).remove(&path)?;
            println!("Removed {}", path);
        }
        Commands::Rename {
            tenant,
            path,
            new_name,
        } => {
            open()?
                .files(TenantId::parse(&tenant)?)
                .rename(&path, &new_name)?;
            println!("Renamed {} to {}", path, new_name);
        }
        Commands::Mv {
            tenant,
            from,
            to_dir,
        } => {
            open()?
                .files(TenantId::parse(&tenant)?)
                .move_entry(&from, &to_dir)?;
            println!("Moved {} into /{}", from, to_dir);
        }
        Commands::Cp {
            tenant,
            from,
            to_dir,
        } => {
            open()?
                .files(TenantId::parse(&tenant)?)
                .copy_entry(&from, &to_dir)?;
            println!("Copied {} into /{}", from, to_dir);
        }
        Commands::Path { tenant, path } => {
            let abs = open()?
                .files(TenantId::parse(&tenant)?)
                .absolute_path_for(&path)?;
            println!("{}", abs.display());
        }
    }

    Ok(())
}
