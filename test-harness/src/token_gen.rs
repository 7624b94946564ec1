// Token generator: mints a bearer token for a given username and role
// without going through the HTTP API. Handy for smoke-testing deployments
// and for seeding load tests.
use anyhow::{bail, Context, Result};
use broker::auth;
use broker::model::Role;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "token-gen")]
#[command(about = "Mint a broker bearer token for a user/role pair")]
struct Args {
    /// Username to embed in the token
    #[arg(long)]
    username: String,

    /// Role: admin, publisher, or subscriber
    #[arg(long, default_value = "subscriber")]
    role: String,

    /// Signing secret; defaults to the broker's JWT_SECRET resolution
    #[arg(long, env = "JWT_SECRET")]
    secret: Option<String>,

    /// Token lifetime in hours
    #[arg(long, default_value_t = 24)]
    ttl_hours: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let Some(role) = Role::parse(&args.role) else {
        bail!("invalid role {:?}: must be admin, publisher, or subscriber", args.role);
    };
    let secret = match args.secret {
        Some(secret) => secret.into_bytes(),
        None => auth::jwt_secret_from_env(),
    };

    let token = auth::mint_token(
        &secret,
        &args.username,
        role,
        Duration::from_secs(args.ttl_hours * 60 * 60),
    )
    .context("mint token")?;
    println!("{token}");
    Ok(())
}
