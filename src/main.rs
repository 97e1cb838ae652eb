mod api;
mod chat;
mod config;
mod metrics;
mod models;
mod table;
mod utils;
mod views;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::io::{self, BufRead, Write as _};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::api::{ApiClient, Backend};
use crate::chat::{ExchangeOutcome, Transcript};
use crate::config::AppConfig;
use crate::views::analysis::{AnalysisForm, AnalysisPage, Frequency, Risk, Term};
use crate::views::auth::{self as auth_view, AuthStatus, LoginForm, RegisterForm};
use crate::views::portfolio::{AddStockForm, EditStockForm, PortfolioPage};
use crate::views::stock::StockPage;
use crate::views::trends::{MostActiveIndex, MoversIndex, TrendsPage};
use crate::views::{Page, PageContext};

#[derive(Parser)]
#[command(name = "tradenexus", about = "TradeNexus portfolio and stock analysis client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
        #[arg(long, env = "TRADENEXUS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "TRADENEXUS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show who the stored session belongs to
    Whoami,

    /// Portfolio dashboard: holdings, summary and allocation
    Portfolio,

    /// Add a stock to the portfolio
    Add {
        /// Company name or ticker
        name: String,
        quantity: String,
        /// Price paid per share
        #[arg(long, conflicts_with = "current")]
        price: Option<String>,
        /// Use the live quote as the purchase price
        #[arg(long)]
        current: bool,
    },

    /// Change quantity and/or purchase price of a holding
    Edit {
        id: i64,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },

    /// Remove a holding
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// AI investment strategy for an amount
    Analyze {
        amount: String,
        #[arg(long, value_enum, default_value_t)]
        term: Term,
        #[arg(long, value_enum, default_value_t)]
        risk: Risk,
        #[arg(long, value_enum, default_value_t)]
        frequency: Frequency,
    },

    /// AI prediction and raw figures for one company
    Predict {
        company: String,
        /// Column to sort by; repeat to flip direction (e.g. --sort Value --sort Value)
        #[arg(long)]
        sort: Vec<String>,
        #[arg(long, default_value = "")]
        raw_filter: String,
        #[arg(long, default_value = "")]
        technical_filter: String,
        #[arg(long, default_value = "")]
        fundamental_filter: String,
    },

    /// Current market movers
    Trends {
        #[arg(long, value_enum, default_value_t)]
        most_active: MostActiveIndex,
        #[arg(long, value_enum, default_value_t)]
        gainers: MoversIndex,
        #[arg(long, value_enum, default_value_t)]
        losers: MoversIndex,
    },

    /// Talk to the TradeNexus assistant
    Chat,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt("Password: "),
    }
}

fn header(ctx: &PageContext, status: &AuthStatus) {
    println!(
        "TradeNexus · {} · {}",
        ctx.title(),
        status.display_name().unwrap_or("guest")
    );
}

/// Protected pages need a live session; anything else means "log in first".
async fn require_session(backend: &dyn Backend) -> Result<AuthStatus> {
    let status = auth_view::check_session(backend).await;
    if status == AuthStatus::SignedOut {
        bail!("Not signed in. Run `tradenexus login <username>` first.");
    }
    Ok(status)
}

// ── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "tradenexus=info,warn",
        1 => "tradenexus=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;
    let backend: Arc<dyn Backend> =
        Arc::new(ApiClient::new(&config.api).context("Failed to build API client")?);
    let ctx = PageContext::default();
    let symbol = config.display.currency_symbol.clone();

    match cli.command {
        Command::Login { username, password } => {
            let _scope = ctx.mount(Page::Login);
            let form = LoginForm {
                username,
                password: password_or_prompt(password)?,
            };
            form.submit(backend.as_ref()).await.context("Login failed")?;
            let status = auth_view::check_session(backend.as_ref()).await;
            println!("Signed in as {}.", status.display_name().unwrap_or(&form.username));
        }

        Command::Register {
            full_name,
            email,
            username,
            password,
        } => {
            let _scope = ctx.mount(Page::Register);
            let password = password_or_prompt(password)?;
            let confirm_password = prompt("Confirm password: ")?;
            let form = RegisterForm {
                full_name,
                email,
                username,
                password,
                confirm_password,
            };
            let msg = form.submit(backend.as_ref()).await.context("Registration failed")?;
            println!("{}", msg.unwrap_or_else(|| "Registered.".into()));
            println!("Sign in with `tradenexus login {}`.", form.username);
        }

        Command::Logout => {
            backend.logout().await.context("Logout failed")?;
            println!("Signed out.");
        }

        Command::Whoami => match auth_view::check_session(backend.as_ref()).await {
            AuthStatus::SignedIn(profile) => {
                println!("{}", utils::rule());
                println!("  Name     : {}", profile.full_name.as_deref().unwrap_or("—"));
                println!("  Username : {}", profile.username.as_deref().unwrap_or("—"));
                println!("  Email    : {}", profile.email.as_deref().unwrap_or("—"));
                println!("{}", utils::rule());
            }
            AuthStatus::SignedOut => println!("Not signed in."),
        },

        Command::Portfolio => {
            let status = require_session(backend.as_ref()).await?;
            let mut scope = ctx.mount(Page::Portfolio);
            header(&ctx, &status);

            let _t = utils::Timer::start("Portfolio load");
            let b = Arc::clone(&backend);
            let page = scope
                .run(async move {
                    let mut page = PortfolioPage::new();
                    page.load(b.as_ref()).await;
                    page
                })
                .await?;

            let mut out = String::new();
            page.render(&mut out, &symbol, config.display.allocation_slices)?;
            print!("{}", out);
        }

        Command::Add {
            name,
            quantity,
            price,
            current,
        } => {
            let status = require_session(backend.as_ref()).await?;
            let _scope = ctx.mount(Page::Portfolio);
            header(&ctx, &status);

            let form = AddStockForm {
                name,
                quantity,
                purchase_price: price.unwrap_or_default(),
                use_current_price: current,
            };
            let mut page = PortfolioPage::new();
            let added = page.add(backend.as_ref(), &form).await?;
            println!(
                "Added {} ({}) × {} at {}{}",
                added.name,
                added.ticker,
                added.quantity,
                symbol,
                utils::fmt_amount(added.purchase_price)
            );

            page.refresh_if_stale(backend.as_ref()).await;
            if page.is_stale() {
                warn!("Refresh failed, showing the local copy of the portfolio");
            }
            let mut out = String::new();
            page.render(&mut out, &symbol, config.display.allocation_slices)?;
            print!("{}", out);
        }

        Command::Edit { id, quantity, price } => {
            let status = require_session(backend.as_ref()).await?;
            let _scope = ctx.mount(Page::Portfolio);
            header(&ctx, &status);

            let mut page = PortfolioPage::new();
            page.load(backend.as_ref()).await;
            if let Some(err) = &page.error {
                bail!("{}", err);
            }
            let Some(current) = page.find(id) else {
                bail!("No stock with id {} in the portfolio.", id);
            };

            let mut form = EditStockForm::for_holding(current);
            if let Some(q) = quantity {
                form.quantity = q;
            }
            if let Some(p) = price {
                form.purchase_price = p;
            }
            page.edit(backend.as_ref(), id, &form).await?;
            println!("Updated stock {}.", id);

            page.refresh_if_stale(backend.as_ref()).await;
            if page.is_stale() {
                warn!("Refresh failed, showing the local copy of the portfolio");
            }
            let mut out = String::new();
            page.render(&mut out, &symbol, config.display.allocation_slices)?;
            print!("{}", out);
        }

        Command::Delete { id, yes } => {
            let status = require_session(backend.as_ref()).await?;
            let _scope = ctx.mount(Page::Portfolio);
            header(&ctx, &status);

            if !yes {
                let answer = prompt(&format!("Delete stock {}? [y/N] ", id))?;
                if !matches!(answer.trim(), "y" | "Y" | "yes") {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let mut page = PortfolioPage::new();
            page.load(backend.as_ref()).await;
            page.delete(backend.as_ref(), id).await?;
            println!("Deleted stock {}.", id);

            page.refresh_if_stale(backend.as_ref()).await;
            if page.is_stale() {
                warn!("Refresh failed, showing the local copy of the portfolio");
            }
            let mut out = String::new();
            page.render(&mut out, &symbol, config.display.allocation_slices)?;
            print!("{}", out);
        }

        Command::Analyze {
            amount,
            term,
            risk,
            frequency,
        } => {
            let status = require_session(backend.as_ref()).await?;
            let mut scope = ctx.mount(Page::Analysis);
            header(&ctx, &status);

            let form = AnalysisForm {
                amount,
                term,
                risk,
                frequency,
            };
            let _t = utils::Timer::start("Strategy generation");
            let b = Arc::clone(&backend);
            let page = scope
                .run(async move {
                    let mut page = AnalysisPage::default();
                    // the page keeps the error for rendering
                    let _ = page.submit(b.as_ref(), &form).await;
                    page
                })
                .await?;

            let mut out = String::new();
            page.render(&mut out)?;
            print!("{}", out);
        }

        Command::Predict {
            company,
            sort,
            raw_filter,
            technical_filter,
            fundamental_filter,
        } => {
            let status = require_session(backend.as_ref()).await?;
            let mut scope = ctx.mount(Page::StockPrediction);
            header(&ctx, &status);

            let history_rows = config.display.history_rows;
            let _t = utils::Timer::start(format!("Prediction for {}", company.trim()));
            let b = Arc::clone(&backend);
            let mut page = scope
                .run(async move {
                    let mut page = StockPage::new(history_rows);
                    let _ = page.load(b.as_ref(), &company).await;
                    page
                })
                .await?;

            for key in &sort {
                page.toggle_sort(key);
            }
            page.raw_filter = raw_filter;
            page.technical_filter = technical_filter;
            page.fundamental_filter = fundamental_filter;

            let mut out = String::new();
            page.render(&mut out)?;
            print!("{}", out);
        }

        Command::Trends {
            most_active,
            gainers,
            losers,
        } => {
            let status = require_session(backend.as_ref()).await?;
            let mut scope = ctx.mount(Page::Trends);
            header(&ctx, &status);

            let b = Arc::clone(&backend);
            let mut page = scope
                .run(async move {
                    let mut page = TrendsPage::default();
                    let _ = page.load(b.as_ref()).await;
                    page
                })
                .await?;
            page.most_active = most_active;
            page.gainers = gainers;
            page.losers = losers;

            let mut out = String::new();
            page.render(&mut out)?;
            print!("{}", out);
        }

        Command::Chat => {
            let status = require_session(backend.as_ref()).await?;
            let _scope = ctx.mount(Page::Chat);
            header(&ctx, &status);
            run_chat(backend.as_ref(), config.chat.history_limit).await?;
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq)]
enum Input {
    Line(String),
    Eof,
    Interrupted,
}

/// Next line from `lines`, unless `interrupt` completes first.
async fn next_input<R, C>(lines: &mut Lines<R>, interrupt: C) -> io::Result<Input>
where
    R: AsyncBufRead + Unpin,
    C: Future,
{
    tokio::select! {
        biased;
        _ = interrupt => Ok(Input::Interrupted),
        line = lines.next_line() => Ok(line?.map_or(Input::Eof, Input::Line)),
    }
}

/// Line-based chat loop. `/clear` starts over, `/history` reprints the
/// transcript, `/quit` or EOF leaves. Ctrl-C at the prompt or while waiting
/// for a reply abandons the conversation.
async fn run_chat(backend: &dyn Backend, history_limit: usize) -> Result<()> {
    let mut transcript = Transcript::new(history_limit);
    transcript.open();
    println!("Ask about markets, stocks or your portfolio. /clear to reset, /history to review, /quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you › ");
        io::stdout().flush()?;
        // ctrl_c() keeps SIGINT hooked for the rest of the process
        let line = match next_input(&mut lines, tokio::signal::ctrl_c()).await? {
            Input::Line(line) => line,
            Input::Eof => break,
            Input::Interrupted => {
                println!();
                warn!("Chat interrupted at the prompt, conversation closed");
                break;
            }
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                transcript.close();
                transcript.open();
                println!("(conversation cleared)");
                continue;
            }
            "/history" => {
                if transcript.is_empty() {
                    println!("(nothing yet)");
                }
                for msg in transcript.messages() {
                    let who = if msg.is_user() { "you" } else { "bot" };
                    println!("{} › {}", who, msg.text());
                }
                continue;
            }
            _ => {}
        }

        match chat::send(&mut transcript, backend, &line, tokio::signal::ctrl_c()).await {
            ExchangeOutcome::Confirmed => {
                if let Some(msg) = transcript.messages().last() {
                    println!("bot › {}", msg.text());
                }
            }
            ExchangeOutcome::NoReply => println!("(no reply)"),
            ExchangeOutcome::Failed(msg) => println!("! {}", msg),
            ExchangeOutcome::Cancelled => {
                warn!("Chat interrupted, conversation closed");
                break;
            }
            ExchangeOutcome::Ignored | ExchangeOutcome::Stale => {}
        }
    }

    info!("Chat closed after {} messages", transcript.len());
    transcript.close();
    Ok(())
}
