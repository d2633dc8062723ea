use resumatch::config;
use resumatch::models::{HistoryQuery, SortBy};
use resumatch::session::parse_jwt_claims;
use resumatch::{
    ApiClient, ClientError, CoverLetterId, FileStorage, Page, PageState, ResumeFile, ResumeId,
    SessionStore, UploadForm,
};
use resumatch_cli::*;

use anyhow::anyhow;
use colored_json::to_colored_json_auto;
use log::{debug, info};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

#[derive(StructOpt)]
#[structopt(
    rename_all = "kebab-case",
    about = "CLI client for the resumatch resume review service"
)]
struct Opt {
    /// API root, eg "https://resumatch.example.com/api"
    ///
    /// If not given, RESUMATCH_API_BASE_URL or VITE_API_BASE_URL are used, then
    /// "http://localhost:5000/api".
    #[structopt(global = true, long = "--api-url")]
    api_url: Option<String>,

    /// Where the login session is kept between runs
    #[structopt(
        global = true,
        parse(from_os_str),
        long = "--session-file",
        env = "RESUMATCH_SESSION_FILE"
    )]
    session_file: Option<PathBuf>,

    /// Give up on a request after this many seconds
    #[structopt(global = true, long, default_value = "30")]
    timeout: u64,

    /// Print the raw JSON entity instead of the formatted view
    #[structopt(global = true, long)]
    json: bool,

    /// Log more messages. Pass multiple times for ever more verbosity
    ///
    /// By default, it'll only report errors. Passing `-v` one time also prints
    /// warnings, `-vv` enables info logging, `-vvv` debug, and `-vvvv` trace.
    #[structopt(global = true, long, short = "v", parse(from_occurrences))]
    verbose: i8,

    #[structopt(long = "--shell-completions", hidden = true)]
    shell_completions: Option<structopt::clap::Shell>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum AccountCommand {
    /// Register a new account, and log in with it
    Signup {
        #[structopt(long, short)]
        name: String,

        #[structopt(long, short)]
        email: String,

        #[structopt(long, short, env = "RESUMATCH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Login {
        #[structopt(long, short)]
        email: String,

        #[structopt(long, short, env = "RESUMATCH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the local session
    Logout,
    /// Show the cached profile
    Info,
    /// Change the display name on the cached profile
    Rename { name: String },
}

#[derive(StructOpt)]
enum CoverLetterCommand {
    /// Write a cover letter for an analysed resume
    Generate {
        resume_id: ResumeId,

        #[structopt(long, default_value = "professional")]
        tone: String,

        #[structopt(long, default_value = "medium")]
        length: String,
    },
    Get {
        id: CoverLetterId,
    },
    List {
        #[structopt(long, default_value = "1")]
        page: u32,

        #[structopt(long, default_value = "10")]
        limit: u32,
    },
    Delete {
        id: CoverLetterId,
    },
}

#[derive(StructOpt)]
enum Command {
    /// Upload a PDF resume with a job description, and show the analysis
    Upload {
        #[structopt(parse(from_os_str))]
        file: PathBuf,

        #[structopt(long, short = "j")]
        job_description: Option<String>,

        /// Read the job description from a file ("-" for stdin)
        #[structopt(long, parse(from_os_str))]
        job_description_file: Option<PathBuf>,
    },

    /// Show the analysis of a previously uploaded resume
    Analysis { id: ResumeId },

    /// List past analyses
    History {
        #[structopt(long, default_value = "1")]
        page: u32,

        #[structopt(long, default_value = "10")]
        limit: u32,

        #[structopt(long)]
        search: Option<String>,

        /// "date" or "score"
        #[structopt(long)]
        sort_by: Option<SortBy>,
    },

    /// Delete an analysis
    Delete { id: ResumeId },

    /// Sub-commands for cover letters
    CoverLetter {
        #[structopt(subcommand)]
        cmd: CoverLetterCommand,
    },

    /// Sub-commands for managing account
    Account {
        #[structopt(subcommand)]
        cmd: AccountCommand,
    },

    /// Summarize configuration and local session
    Status,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let opt = Opt::from_args();

    let log_level = match opt.verbose {
        std::i8::MIN..=-1 => "none",
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        4..=std::i8::MAX => "trace",
    };
    // hyper logging is very verbose, so crank that down even if everything else is more verbose
    let log_filter = format!("{},hyper=error", log_level);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter))
        .format_timestamp(None)
        .init();

    debug!("Args parsed, starting up");

    #[cfg(windows)]
    colored_json::enable_ansi_support();

    if let Some(shell) = opt.shell_completions {
        Opt::clap().gen_completions_to("resumatch", shell, &mut std::io::stdout());
        std::process::exit(0);
    }

    // everything is awaited one request at a time; no need for a thread pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if let Err(err) = runtime.block_on(run(opt)) {
        // Be graceful about some errors
        if let Some(io_err) = err.root_cause().downcast_ref::<std::io::Error>() {
            if let std::io::ErrorKind::BrokenPipe = io_err.kind() {
                // presumably due to something like writing to stdout and piped to `head -n10` and
                // stdout was closed
                debug!("got BrokenPipe error, assuming stdout closed as expected and exiting with success");
                std::process::exit(0);
            }
        }
        let mut color_stderr = StandardStream::stderr(if atty::is(atty::Stream::Stderr) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        });
        color_stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        eprintln!("Error: {}", err);
        color_stderr.set_color(&ColorSpec::new())?;
        debug!("error detail: {:?}", err);
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: Serialize>(val: &T) -> Result<()> {
    let val = serde_json::to_value(val)?;
    writeln!(&mut std::io::stdout(), "{}", to_colored_json_auto(&val)?)?;
    Ok(())
}

/// Renders a settled page: the entity when Ready, the page's message as the error otherwise
fn render<T: Serialize>(
    state: &PageState<T>,
    json: bool,
    pretty: impl FnOnce(&T) -> Result<()>,
) -> Result<()> {
    match state {
        PageState::Ready(val) if json => print_json(val),
        PageState::Ready(val) => pretty(val),
        PageState::Error(msg) => Err(anyhow!("{}", msg)),
        PageState::Loading => Err(anyhow!("request did not complete")),
    }
}

fn print_deletion(deletion: &Deletion, json: bool) -> Result<()> {
    if json {
        print_json(deletion)
    } else {
        println!("{}", deletion.message);
        Ok(())
    }
}

fn progress(msg: &str) {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("{msg}");
    }
}

async fn run(opt: Opt) -> Result<()> {
    let session_path = opt
        .session_file
        .clone()
        .or_else(config::default_session_path)
        .ok_or(anyhow!(
            "could not find a place to keep the session; pass --session-file"
        ))?;
    let storage = FileStorage::open(&session_path)?;
    let api_url = config::api_base_url(opt.api_url.clone());
    let mut client = ApiClient::with_timeout(
        &api_url,
        SessionStore::new(storage),
        Duration::from_secs(opt.timeout),
    )?;
    let json = opt.json;

    match opt.cmd {
        Command::Status => {
            println!("Configuration");
            println!("  API URL: {}", client.base_url());
            println!("  session file: {}", session_path.display());
            match client.session().get_token() {
                Some(token) => {
                    println!("  auth token: <configured>");
                    // informational only; the server is the judge of whether it is still valid
                    if let Ok(claims) = parse_jwt_claims(&token) {
                        if let Some(exp) = claims
                            .expires_at
                            .and_then(|ts| time::OffsetDateTime::from_unix_timestamp(ts).ok())
                        {
                            let exp = exp
                                .format(&time::format_description::well_known::Rfc3339)
                                .unwrap_or_default();
                            println!("  token expires: {}", exp);
                        }
                    }
                }
                None => println!("  auth token:"),
            }
            if let Some(user) = client.current_user() {
                println!("  user: {} <{}>", user.name, user.email);
            }
        }
        Command::Upload {
            file,
            job_description,
            job_description_file,
        } => {
            let job_description = job_description_from(job_description, job_description_file)?;
            let mut form = UploadForm::new();
            form.select_file(ResumeFile::load(&file).await?)?;
            form.set_job_description(&job_description);
            progress("Analyzing resume...");
            let id = form.submit(&client).await?;
            info!("uploaded, resume id {}", id);
            show_analysis(&client, id, json).await?;
        }
        Command::Analysis { id } => show_analysis(&client, id, json).await?,
        Command::History {
            page,
            limit,
            search,
            sort_by,
        } => {
            let query = HistoryQuery {
                page,
                limit,
                search,
                sort_by,
            };
            let client = &client;
            let mut history = Page::new();
            let state = history
                .load(query, |q| async move { client.get_all_resumes(&q).await })
                .await;
            render(state, json, |p| pretty::pp_history(p, page))?;
        }
        Command::Delete { id } => {
            let msg = client.delete_resume(&id).await?;
            print_deletion(&Deletion::new("analysis", id.as_str(), msg), json)?;
        }
        Command::CoverLetter {
            cmd:
                CoverLetterCommand::Generate {
                    resume_id,
                    tone,
                    length,
                },
        } => {
            progress("Generating cover letter...");
            let letter = client
                .generate_cover_letter(&resume_id, &tone, &length)
                .await?;
            show_cover_letter(&client, letter.id()?, json).await?;
        }
        Command::CoverLetter {
            cmd: CoverLetterCommand::Get { id },
        } => show_cover_letter(&client, id, json).await?,
        Command::CoverLetter {
            cmd: CoverLetterCommand::List { page, limit },
        } => {
            let client = &client;
            let mut listing = Page::new();
            let state = listing
                .load((page, limit), |(p, l)| async move {
                    client.get_all_cover_letters(p, l).await
                })
                .await;
            render(state, json, |l| pretty::pp_cover_letters(l, page))?;
        }
        Command::CoverLetter {
            cmd: CoverLetterCommand::Delete { id },
        } => {
            let msg = client.delete_cover_letter(&id).await?;
            print_deletion(&Deletion::new("cover letter", id.as_str(), msg), json)?;
        }
        Command::Account {
            cmd:
                AccountCommand::Signup {
                    name,
                    email,
                    password,
                },
        } => {
            let auth = client.signup(&name, &email, &password).await?;
            if json {
                print_json(&auth.user)?
            } else {
                println!("Account created for {} <{}>", auth.user.name, auth.user.email);
            }
        }
        Command::Account {
            cmd: AccountCommand::Login { email, password },
        } => {
            let auth = client.login(&email, &password).await?;
            if json {
                print_json(&auth.user)?
            } else {
                println!("Logged in as {} <{}>", auth.user.name, auth.user.email);
            }
        }
        Command::Account {
            cmd: AccountCommand::Logout,
        } => {
            client.logout()?;
            if json {
                print_json(&serde_json::json!({ "loggedIn": false }))?
            } else {
                println!("Logged out");
            }
        }
        Command::Account {
            cmd: AccountCommand::Info,
        } => {
            let user = client.current_user().ok_or(ClientError::NotAuthenticated)?;
            if json {
                print_json(&user)?
            } else {
                pretty::pp_user(&user)?
            }
        }
        Command::Account {
            cmd: AccountCommand::Rename { name },
        } => {
            let user = client.rename_cached_user(&name)?;
            if json {
                print_json(&user)?
            } else {
                pretty::pp_user(&user)?
            }
        }
    }
    Ok(())
}

async fn show_analysis(
    client: &ApiClient<FileStorage>,
    id: ResumeId,
    json: bool,
) -> Result<()> {
    let mut page = Page::new();
    let state = page
        .load(id, |id| async move { client.get_resume_analysis(&id).await })
        .await;
    render(state, json, pretty::pp_analysis)
}

async fn show_cover_letter(
    client: &ApiClient<FileStorage>,
    id: CoverLetterId,
    json: bool,
) -> Result<()> {
    let mut page = Page::new();
    let state = page
        .load(id, |id| async move { client.get_cover_letter(&id).await })
        .await;
    render(state, json, pretty::pp_cover_letter)
}
