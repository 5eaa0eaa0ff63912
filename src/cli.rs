// src/cli.rs
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::auth::{AuthClient, RegisterOutcome};
use crate::collections::{LocalCollections, LocalStore};
use crate::core::{ConfigManager, ServiceClient};
use crate::error::ClientError;
use crate::jobs::JobSearchClient;
use crate::resumes::{PickedFile, ResumeRepository};
use crate::session::SessionContext;
use crate::types::{JobResult, JobSearchRequest, ResumeRecord};
use crate::view_model::{relative_time, resume_subtitle, JobView};

const RECENT_SEARCHES_SHOWN: usize = 3;

#[derive(Parser)]
#[command(name = "jobmatch")]
#[command(about = "Upload resumes, search jobs and review AI match scores")]
pub struct JobMatchCli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ./jobmatch.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage uploaded resumes
    #[command(subcommand)]
    Resumes(ResumeCommand),
    /// Search jobs and score them against a resume
    Search(SearchArgs),
    /// Work with jobs from the last search (by number) or saved jobs (by key)
    #[command(subcommand)]
    Job(JobCommand),
    /// List saved or applied jobs
    #[command(subcommand)]
    MyJobs(MyJobsCommand),
    /// Recent searches
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Subcommand)]
pub enum ResumeCommand {
    /// List uploaded resumes
    List,
    /// Upload a PDF resume (max 10MB)
    Upload { path: PathBuf },
    /// Show a resume and its extracted text
    Show {
        id: String,
        /// Print the full extracted text instead of a preview
        #[arg(long)]
        full: bool,
    },
    /// Delete a resume
    Delete { id: String },
    /// Use this resume for searches
    Select { id: String },
    /// Search without a resume
    Unselect,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Job title to search for
    pub title: String,
    /// Location; blank means anywhere
    #[arg(long, default_value = "")]
    pub location: String,
    /// Resume to score against (defaults to the selected resume)
    #[arg(long, conflicts_with = "no_resume")]
    pub resume: Option<String>,
    /// Score without resume context
    #[arg(long)]
    pub no_resume: bool,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Show match details and improvement tips
    Show { reference: String },
    /// Save or unsave a job
    Save { reference: String },
    /// Mark a job as applied and print its application link
    Apply { reference: String },
}

#[derive(Subcommand)]
pub enum MyJobsCommand {
    Saved,
    Applied,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List recent searches
    List {
        #[arg(long, default_value_t = RECENT_SEARCHES_SHOWN)]
        limit: usize,
    },
    /// Run a previous search again
    Replay { id: String },
    /// Forget all searches
    Clear,
}

/// Everything a command needs, built once from configuration.
struct Context {
    config: ConfigManager,
    session: SessionContext,
    store: LocalStore,
    state: LocalCollections,
}

impl Context {
    async fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = ConfigManager::load(config_path)?;
        info!("API: {}", config.service.api_url);

        let session = SessionContext::load(config.storage.session_path()).await?;
        let store = LocalStore::new(config.storage.state_path());
        let state = store.load().await?;

        Ok(Self {
            config,
            session,
            store,
            state,
        })
    }

    fn api(&self) -> Result<ServiceClient> {
        ServiceClient::new(&self.config.service)
    }

    async fn persist(&self) -> Result<()> {
        self.store.save(&self.state).await?;
        Ok(())
    }
}

pub async fn handle_command(cli: JobMatchCli) -> Result<()> {
    let mut ctx = Context::open(cli.config.as_deref()).await?;

    match cli.command {
        Command::Login { email, password } => {
            let auth = AuthClient::new(&ctx.config.identity)?;
            let session = auth.sign_in(&email, &password).await?;
            ctx.session.establish(session).await?;
            println!("✅ Signed in as {}", email);
        }

        Command::Register {
            email,
            password,
            confirm_password,
        } => {
            let auth = AuthClient::new(&ctx.config.identity)?;
            match auth.sign_up(&email, &password, &confirm_password).await? {
                RegisterOutcome::SignedIn(session) => {
                    ctx.session.establish(session).await?;
                    println!("✅ Account created. Signed in as {}", email);
                }
                RegisterOutcome::ConfirmationRequired { email } => {
                    println!("✅ Account created. Check {} to confirm your email, then sign in.", email);
                }
            }
        }

        Command::Logout => {
            if let Some(session) = ctx.session.session().cloned() {
                if let Ok(auth) = AuthClient::new(&ctx.config.identity) {
                    auth.sign_out(&session).await;
                }
            }
            ctx.session.teardown().await?;
            println!("Signed out");
        }

        Command::Whoami => match ctx.session.session() {
            Some(session) => {
                let email = session.user.email.as_deref().unwrap_or("(no email)");
                println!("{} <{}>", session.user.id, email);
                match session.expiry() {
                    Some(expiry) if expiry <= Utc::now() => {
                        println!("   Session expired. Please login again.")
                    }
                    Some(expiry) => println!("   Session valid until {}", expiry.to_rfc3339()),
                    None => {}
                }
            }
            None => println!("Not signed in"),
        },

        Command::Resumes(command) => handle_resume_command(&mut ctx, command).await?,

        Command::Search(args) => {
            let resume_id = if args.no_resume {
                None
            } else {
                args.resume
                    .clone()
                    .or_else(|| ctx.state.selected_resume().map(str::to_string))
            };
            let request = JobSearchRequest::new(&args.title, &args.location, resume_id.as_deref())
                .map_err(ClientError::from)?;
            run_search(&mut ctx, request).await?;
        }

        Command::Job(command) => handle_job_command(&mut ctx, command).await?,

        Command::MyJobs(command) => {
            let (label, keys) = match command {
                MyJobsCommand::Saved => ("Saved", ctx.state.saved()),
                MyJobsCommand::Applied => ("Applied", ctx.state.applied()),
            };
            println!("{} ({})", label, keys.len());
            if keys.is_empty() {
                println!("   No {} Jobs", label);
            }
            for key in keys {
                match ctx.state.job(key) {
                    Some(job) => print_job_line(None, job),
                    None => println!("   {}", key),
                }
            }
        }

        Command::History(command) => match command {
            HistoryCommand::List { limit } => {
                let now = Utc::now();
                let recent = ctx.state.recent_searches(limit);
                if recent.is_empty() {
                    println!("No recent searches");
                }
                for entry in recent {
                    println!(
                        "{}  {} • {} • {}",
                        &entry.id.to_string()[..8],
                        entry.job_title,
                        entry.location,
                        relative_time(entry.searched_at, now)
                    );
                }
            }
            HistoryCommand::Replay { id } => {
                let entry = ctx
                    .state
                    .history_entry(&id)
                    .ok_or_else(|| anyhow::anyhow!("No search in history matches {}", id))?;
                let selected = ctx.state.selected_resume().map(str::to_string);
                let request = entry
                    .to_request(selected.as_deref())
                    .map_err(ClientError::from)?;
                run_search(&mut ctx, request).await?;
            }
            HistoryCommand::Clear => {
                ctx.state.clear_history();
                ctx.persist().await?;
                println!("Search history cleared");
            }
        },
    }

    Ok(())
}

async fn handle_resume_command(ctx: &mut Context, command: ResumeCommand) -> Result<()> {
    let mut repo = ResumeRepository::new(ctx.api()?);

    match command {
        ResumeCommand::List => {
            let resumes = repo.list(&ctx.session).await?;
            print_resumes(resumes, ctx.state.selected_resume());
        }
        ResumeCommand::Upload { path } => {
            let picked = PickedFile::from_path(&path).await?;
            let record = repo.upload_picked(&ctx.session, picked).await?;
            println!("✅ Resume uploaded successfully!");
            println!("   ID: {}", record.id);
            print_resumes(repo.resumes(), ctx.state.selected_resume());
        }
        ResumeCommand::Show { id, full } => {
            let record = repo.get_detail(&ctx.session, &id).await?;
            println!("{}", record.filename);
            println!("   {}", resume_subtitle(&record));
            if let Some(updated) = record.updated_at_utc() {
                println!("   Updated {}", relative_time(updated, Utc::now()));
            }
            let text = record.parsed_text.unwrap_or_default();
            println!();
            if full {
                println!("{}", text);
            } else {
                let preview: String = text.chars().take(600).collect();
                println!("{}", preview);
                if text.chars().count() > 600 {
                    println!("… (use --full for the complete text)");
                }
            }
        }
        ResumeCommand::Delete { id } => {
            let ack = repo.delete(&ctx.session, &id).await?;
            if ctx.state.forget_resume(&id) {
                ctx.persist().await?;
            }
            println!(
                "✅ {}",
                ack.message.as_deref().unwrap_or("Resume deleted")
            );
            print_resumes(repo.resumes(), ctx.state.selected_resume());
        }
        ResumeCommand::Select { id } => {
            let resumes = repo.list(&ctx.session).await?;
            if !resumes.iter().any(|r| r.id == id) {
                anyhow::bail!("No resume with id {}", id);
            }
            ctx.state.select_resume(Some(id.clone()));
            ctx.persist().await?;
            println!("Searches will use resume {}", id);
        }
        ResumeCommand::Unselect => {
            ctx.state.select_resume(None);
            ctx.persist().await?;
            println!("Searches will run without a resume");
        }
    }

    Ok(())
}

async fn handle_job_command(ctx: &mut Context, command: JobCommand) -> Result<()> {
    match command {
        JobCommand::Show { reference } => {
            let (key, job) = resolve(&ctx.state, &reference)?;
            let view = JobView::keyed(job, key);
            print_job_detail(&view, &ctx.state);
        }
        JobCommand::Save { reference } => {
            let key = resolve(&ctx.state, &reference)?.0.to_string();
            let saved = ctx.state.toggle_saved(&key);
            ctx.persist().await?;
            println!("{}", if saved { "♥ Saved" } else { "Removed from saved" });
        }
        JobCommand::Apply { reference } => {
            let (key, job) = resolve(&ctx.state, &reference)?;
            let (key, link) = (key.to_string(), job.apply_link.clone());
            ctx.state.add_applied(&key);
            ctx.persist().await?;
            println!("Marked as applied");
            if !link.is_empty() {
                println!("   Apply at: {}", link);
            }
        }
    }
    Ok(())
}

fn resolve<'a>(state: &'a LocalCollections, reference: &str) -> Result<(&'a str, &'a JobResult)> {
    state
        .resolve_job(reference)
        .ok_or_else(|| anyhow::anyhow!("No job matches {}. Run a search first.", reference))
}

async fn run_search(ctx: &mut Context, request: JobSearchRequest) -> Result<()> {
    let client = JobSearchClient::new(ctx.api()?);

    // History records the search as issued, whatever the outcome.
    ctx.state.record_search(&request);
    ctx.persist().await?;

    let response = client.submit(&ctx.session, &request).await?;

    ctx.state.remember_jobs(&response.data.jobs);
    ctx.persist().await?;

    if !response.message.is_empty() {
        println!("{}", response.message);
    }
    println!(
        "{} jobs for \"{}\" in {} ({} searched, {} analyzed)",
        response.data.jobs.len(),
        request.title,
        request.location,
        response.data.total_searched,
        response.data.analyzed
    );
    for (index, job) in response.data.jobs.iter().enumerate() {
        print_job_line(Some(index + 1), job);
    }
    Ok(())
}

fn print_resumes(resumes: &[ResumeRecord], selected: Option<&str>) {
    if resumes.is_empty() {
        println!("No resumes yet. Upload a PDF to get started.");
        return;
    }
    for record in resumes {
        let marker = if selected == Some(record.id.as_str()) { "*" } else { " " };
        println!("{} {}  {}", marker, record.id, record.filename);
        println!("     {}", resume_subtitle(record));
    }
}

fn print_job_line(index: Option<usize>, job: &JobResult) {
    let view = JobView::from(job);
    let prefix = index.map(|i| format!("{:>3}. ", i)).unwrap_or_else(|| "   ".to_string());
    println!(
        "{}[{}] {}  {}% {}",
        prefix, view.company_initials, view.title, view.score, view.tier.label()
    );
    println!("        {} • {}", view.company, view.location);
}

fn print_job_detail(view: &JobView, state: &LocalCollections) {
    println!("{}", view.title);
    println!("{} • {}", view.company, view.location);
    println!("{}% {} ({})", view.score, view.tier.label(), view.tier.color());
    if view.qualifies {
        println!("You meet the core requirements for this role");
    }
    if state.is_saved(&view.key) {
        println!("♥ Saved");
    }
    if state.is_applied(&view.key) {
        println!("✓ Applied");
    }

    if !view.description.is_empty() {
        println!();
        println!("{}", view.description);
    }

    let (met, missing): (Vec<_>, Vec<_>) = view.skills.iter().partition(|chip| chip.met);
    if !met.is_empty() {
        println!();
        println!("Matched skills:");
        for chip in met {
            println!("   ✓ {}", chip.name);
        }
    }
    if !missing.is_empty() {
        println!();
        println!("Missing skills:");
        for chip in missing {
            println!("   ✗ {}", chip.name);
        }
    }

    if !view.tips.is_empty() {
        println!();
        println!("How to improve:");
        for tip in &view.tips {
            println!("   • {}: {}", tip.qualification, tip.description);
            if !tip.steps.is_empty() {
                println!("     {}", tip.steps);
            }
            if !tip.link.is_empty() {
                println!("     {}", tip.link);
            }
        }
    }

    if !view.apply_link.is_empty() {
        println!();
        println!("Apply: {}", view.apply_link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_arguments() {
        let cli = JobMatchCli::try_parse_from([
            "jobmatch", "search", "  Engineer  ", "--location", "NYC", "--resume", "r1",
        ])
        .unwrap();
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.title, "  Engineer  ");
                assert_eq!(args.location, "NYC");
                assert_eq!(args.resume.as_deref(), Some("r1"));
                assert!(!args.no_resume);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_resume_and_no_resume_conflict() {
        let result = JobMatchCli::try_parse_from([
            "jobmatch", "search", "Engineer", "--resume", "r1", "--no-resume",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_nested_commands() {
        let cli = JobMatchCli::try_parse_from(["jobmatch", "resumes", "upload", "cv.pdf", "--log-json"])
            .unwrap();
        assert!(cli.log_json);
        assert!(matches!(
            cli.command,
            Command::Resumes(ResumeCommand::Upload { ref path }) if path == Path::new("cv.pdf")
        ));

        let cli = JobMatchCli::try_parse_from(["jobmatch", "history", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::History(HistoryCommand::List { limit: RECENT_SEARCHES_SHOWN })
        ));
    }
}
