use crate::config::Config;
use crate::database::{create_pool, run_migrations};
use crate::services::UserService;
use anyhow::{Context, Result, bail};

pub const USAGE: &str = "Usage:\n  fitzone-backend                                   start the HTTP server\n  fitzone-backend create-superuser <phone> <password>";

/// What the binary was asked to do.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Serve,
    CreateSuperuser { phone: String, password: String },
}

/// Arguments after the program name.
pub fn parse_args(args: &[String]) -> Result<Command> {
    match args.first().map(String::as_str) {
        None | Some("serve") => Ok(Command::Serve),
        Some("create-superuser") => {
            let (Some(phone), Some(password)) = (args.get(1), args.get(2)) else {
                bail!("create-superuser needs a phone number and a password\n{USAGE}");
            };
            Ok(Command::CreateSuperuser {
                phone: phone.clone(),
                password: password.clone(),
            })
        }
        Some(other) => bail!("Unknown command `{other}`\n{USAGE}"),
    }
}

pub async fn create_superuser(config: &Config, phone: &str, password: &str) -> Result<()> {
    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let user = UserService::new(pool)
        .create_superuser(phone, password)
        .await
        .context("Failed to create superuser")?;

    println!("Superuser {} created for {}", user.id, user.phone);
    Ok(())
}
