//! Operator commands: apply migrations and provision users.
//!
//! Token issuance lives with the identity provider; provisioning only records
//! the user so tokens naming its id resolve to a known role.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tokio::runtime::Builder;

use rollcall::domain::ports::{UserRepository, UserRepositoryError};
use rollcall::domain::{EmailAddress, Role, User, UserId, UserName};
use rollcall::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig, run_migrations};

/// `rollcall-admin` command arguments.
#[derive(Debug, Parser)]
#[command(name = "rollcall-admin", about = "Rollcall operator tooling", version)]
struct CliArgs {
    /// Database connection URL. Falls back to `ROLLCALL_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url", env = "ROLLCALL_DATABASE_URL")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending embedded migrations.
    Migrate,
    /// Insert a user and print its id.
    ProvisionUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// One of admin, teacher, or student.
        #[arg(long, value_parser = parse_role)]
        role: Role,
        /// Use a known id instead of generating one.
        #[arg(long, value_name = "uuid")]
        id: Option<String>,
    },
}

fn parse_role(raw: &str) -> Result<Role, String> {
    raw.trim().parse().map_err(|err| format!("{err}"))
}

fn build_user(name: String, email: String, role: Role, id: Option<String>) -> Result<User> {
    let id = match id {
        Some(raw) => UserId::new(raw).wrap_err("invalid --id")?,
        None => UserId::random(),
    };
    Ok(User::new(
        id,
        UserName::new(name).wrap_err("invalid --name")?,
        EmailAddress::new(email).wrap_err("invalid --email")?,
        role,
    ))
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build admin runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Migrate => {
            let applied = run_migrations(&args.database_url)
                .await
                .wrap_err("failed to apply migrations")?;
            println!("applied {applied} migration(s)");
        }
        Command::ProvisionUser {
            name,
            email,
            role,
            id,
        } => {
            let user = build_user(name, email, role, id)?;
            let pool = DbPool::new(PoolConfig::new(&args.database_url).with_max_size(1))
                .await
                .wrap_err("failed to create database pool")?;
            match DieselUserRepository::new(pool).insert(&user).await {
                Ok(()) => println!("{}", user.id()),
                Err(UserRepositoryError::DuplicateEmail { .. }) => {
                    return Err(eyre!("a user with email {} already exists", user.email().as_ref()));
                }
                Err(other) => return Err(other).wrap_err("failed to provision user"),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn provision_user_parses_flags() {
        let args = CliArgs::try_parse_from([
            "rollcall-admin",
            "--database-url",
            "postgres://localhost/rollcall",
            "provision-user",
            "--name",
            "Ada",
            "--email",
            "ada@school.test",
            "--role",
            "teacher",
        ])
        .expect("valid arguments");

        match args.command {
            Command::ProvisionUser { role, id, .. } => {
                assert_eq!(role, Role::Teacher);
                assert!(id.is_none());
            }
            Command::Migrate => panic!("expected provision-user"),
        }
    }

    #[rstest]
    fn unknown_roles_are_rejected_at_parse_time() {
        let result = CliArgs::try_parse_from([
            "rollcall-admin",
            "--database-url",
            "postgres://localhost/rollcall",
            "provision-user",
            "--name",
            "Ada",
            "--email",
            "ada@school.test",
            "--role",
            "janitor",
        ]);

        assert!(result.is_err());
    }

    #[rstest]
    #[case("", "ada@school.test", None)]
    #[case("Ada", "not-an-email", None)]
    #[case("Ada", "ada@school.test", Some("nope"))]
    fn invalid_user_fields_are_reported(
        #[case] name: &str,
        #[case] email: &str,
        #[case] id: Option<&str>,
    ) {
        let result = build_user(
            name.to_owned(),
            email.to_owned(),
            Role::Student,
            id.map(str::to_owned),
        );

        assert!(result.is_err());
    }

    #[rstest]
    fn explicit_ids_are_kept() {
        let user = build_user(
            "Ada".to_owned(),
            "Ada@School.test".to_owned(),
            Role::Admin,
            Some("3fa85f64-5717-4562-b3fc-2c963f66afa6".to_owned()),
        )
        .expect("valid user");

        assert_eq!(user.id().to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert_eq!(user.email().as_ref(), "ada@school.test");
    }
}
