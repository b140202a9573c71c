use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fluxo::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "fluxo", version, about = "Fluxo CLI - turn rough ideas into polished prompts")]
struct Cli {
    /// Backend URL
    #[arg(long, env = "FLUXO_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Where the session token is kept between runs
    #[arg(long, env = "FLUXO_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long, env = "FLUXO_PASSWORD")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account, then enter the emailed code interactively
    Register {
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "FLUXO_PASSWORD")]
        password: String,
    },
    /// Confirm an address with the emailed 6-digit code
    Confirm { email: String, code: String },
    /// Ask for a new confirmation code
    Resend { email: String },
    /// Change the password (signs out afterwards)
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Generate a prompt
    Generate {
        text: String,
        /// professional, creative, analytical, simple (or 1-4)
        #[arg(long, default_value = "professional")]
        style: PromptStyle,
    },
    /// List past generations
    History {
        #[arg(long, default_value = "10")]
        limit: u32,
        #[arg(long, default_value = "0")]
        offset: u32,
    },
    /// List available styles
    Styles,
    /// Show today's quota
    Limits,
    /// Check the backend is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    fluxo::init_tracing();

    let cli = Cli::parse();
    let store = cli
        .token_file
        .map(FileTokenStore::new)
        .unwrap_or_default();
    let app = Fluxo::builder()
        .base_url(cli.api_url)
        .build(store)
        .await
        .context("Failed to set up the client")?;

    match cli.command {
        Commands::Login { email, password } => {
            let user = app.sign_in(&LoginForm::new(email, password)).await?;
            println!("Signed in as {}", user.display_name());
        }
        Commands::Logout => {
            app.sign_out();
            println!("Signed out");
        }
        Commands::Whoami => cmd_whoami(&app),
        Commands::Register {
            email,
            name,
            password,
        } => {
            cmd_register(&app, &RegisterForm::new(email, password, name)).await?;
        }
        Commands::Confirm { email, code } => {
            let mut flow = ConfirmationFlow::new(email);
            let response = app.confirm(&mut flow, &code).await?;
            println!("{}", response.message);
        }
        Commands::Resend { email } => {
            let mut flow = ConfirmationFlow::new(email);
            let response = app.resend(&mut flow).await?;
            println!("{}", response.message);
        }
        Commands::ChangePassword { current, new } => {
            let form = PasswordChangeForm::new(current, new.clone(), new);
            let response = app.change_password(&form).await?;
            println!("{}\nPlease sign in again.", response.message);
        }
        Commands::Generate { text, style } => {
            let record = app.generate(&PromptForm::new(text, style)).await?;
            println!("{}", record.generated_prompt.unwrap_or_default());
            if let Some(user) = app.user() {
                println!(
                    "\n({} of {} requests left today)",
                    user.remaining_requests(),
                    user.daily_limit
                );
            }
        }
        Commands::History { limit, offset } => {
            cmd_history(&app, HistoryQuery { limit, offset }).await?;
        }
        Commands::Styles => {
            for (id, info) in app.styles().await?.iter() {
                println!(
                    "{:>2}  {:14} {}",
                    id,
                    info.name,
                    info.description.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Limits => {
            let limits = app.limits().await?;
            println!("Daily limit: {}", limits.daily_limit);
            println!("Used today:  {}", limits.requests_today);
            println!("Remaining:   {}", limits.remaining_requests);
        }
        Commands::Health => {
            let health = app.health().await?;
            println!("Backend: {}", health.status);
        }
    }

    Ok(())
}

fn cmd_whoami<S: TokenStore>(app: &Fluxo<S>) {
    let Some(user) = app.user() else {
        println!("Not signed in");
        return;
    };
    println!("Name:      {}", user.display_name());
    println!("Email:     {}", user.email);
    println!(
        "Confirmed: {}",
        if user.is_email_confirmed { "yes" } else { "no" }
    );
    println!(
        "Requests:  {}/{} today",
        user.requests_today, user.daily_limit
    );
    println!("Member since {}", user.created_at.format("%Y-%m-%d"));
}

/// Registers, then reads codes from stdin until the address is
/// confirmed. An `r` line asks for a new code.
async fn cmd_register<S: TokenStore>(app: &Fluxo<S>, form: &RegisterForm) -> Result<()> {
    let mut flow = app.register(form).await?;
    println!(
        "Account created. Enter the 6-digit code sent to {} ('r' to resend, empty line to stop):",
        flow.email()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        let result = match line {
            "" => break,
            "r" | "R" => app.resend(&mut flow).await.map(|r| r.message),
            code => app.confirm(&mut flow, code).await.map(|r| r.message),
        };
        match result {
            Ok(message) => println!("{message}"),
            Err(e) => eprintln!("error: {e}"),
        }
        if flow.is_confirmed() {
            println!("You can now sign in with `fluxo login {}`", flow.email());
            break;
        }
        if flow.resends_left() < flow.policy().max_resends {
            println!("({} resends left)", flow.resends_left());
        }
    }
    Ok(())
}

async fn cmd_history<S: TokenStore>(app: &Fluxo<S>, query: HistoryQuery) -> Result<()> {
    let records = app.history(query).await?;
    if records.is_empty() {
        println!("No prompts yet");
        return Ok(());
    }
    for record in records {
        let style = record
            .style_id
            .and_then(PromptStyle::from_id)
            .map_or("-", PromptStyle::name);
        println!(
            "#{:<5} {}  [{}]",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            style
        );
        println!("  in:  {}", record.original_prompt);
        if let Some(generated) = record.generated_prompt {
            println!("  out: {generated}");
        }
    }
    Ok(())
}
