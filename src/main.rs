use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moviematch_client::{
    config::Config,
    models::{LibraryAddOutcome, Movie},
    routes::{Navigation, HOME_PATH},
    services::{FormMode, LoginForm},
    Client,
};

#[derive(Parser, Debug)]
#[command(name = "moviematch", about = "MovieMatch terminal client")]
struct Cli {
    /// Origin of the MovieMatch API
    #[arg(long, env = "MOVIEMATCH_API_URL")]
    api_url: Option<String>,

    /// Log filter, e.g. `moviematch_client=debug`
    #[arg(long, env = "RUST_LOG", default_value = "moviematch_client=info")]
    log: String,
}

/// One line typed at the prompt
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Show the current session
    Whoami,
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        #[arg(num_args = 1..)]
        display_name: Vec<String>,
    },
    Logout,
    Refresh,
    /// Navigate to a page
    Visit { path: String },
    Search {
        #[arg(num_args = 1..)]
        query: Vec<String>,
    },
    Popular {
        #[arg(default_value_t = 1)]
        page: u32,
    },
    Library,
    /// Save a movie to the library
    Save { tmdb_id: i64 },
    /// Remove a movie from the library
    Remove { tmdb_id: i64 },
    /// Recommendations for you plus the given users
    Recs { user_ids: Vec<i64> },
    #[command(alias = "exit")]
    Quit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they don't interleave with command output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&cli.log).unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }

    let client = Client::new(&config)?;
    tracing::info!(api_url = %config.api_url, "Starting MovieMatch client");

    let sessions = client.sessions.clone();
    tokio::spawn(async move { sessions.initialize().await });

    let mut shell = Shell {
        client,
        current_path: HOME_PATH.to_string(),
    };
    shell.navigate(HOME_PATH).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let command = match Line::try_parse_from(words) {
            Ok(line) => line.command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if matches!(command, ShellCommand::Quit) {
            break;
        }

        shell.run(command).await;
        let path = shell.current_path.clone();
        shell.navigate(&path).await;
    }

    Ok(())
}

struct Shell {
    client: Client,
    current_path: String,
}

impl Shell {
    /// Resolves `path` against the latest session and prints the outcome
    async fn navigate(&mut self, path: &str) {
        let mut navigation = self.client.router.resolve(path, &self.client.sessions.session());

        if navigation == Navigation::Defer {
            println!("Loading…");
            let mut receiver = self.client.sessions.subscribe();
            if receiver.wait_for(|session| session.is_resolved()).await.is_err() {
                return;
            }
            navigation = self.client.router.resolve(path, &self.client.sessions.session());
        }

        match navigation {
            Navigation::Render { page, params } => {
                self.current_path = path.to_string();
                if params.is_empty() {
                    println!("[{}] {:?}", path, page);
                } else {
                    println!("[{}] {:?} {:?}", path, page, params);
                }
            }
            Navigation::Redirect { to, .. } => {
                println!("[{}] sign in required, redirecting to {}", path, to);
                self.current_path = to.to_string();
            }
            Navigation::Defer => {}
        }
    }

    async fn run(&mut self, command: ShellCommand) {
        let sessions = self.client.sessions.clone();
        let catalog = self.client.catalog.clone();

        match command {
            ShellCommand::Whoami => {
                let session = sessions.session();
                match session.user() {
                    Some(user) => println!("{} <{}> (id {})", user.display_name, user.email, user.id),
                    None => println!("not signed in ({:?})", session.status()),
                }
                if let Some(error) = session.last_error() {
                    println!("last error: {}", error);
                }
            }
            ShellCommand::Login { email, password } => {
                let mut form = LoginForm::new(FormMode::Login);
                form.email = email;
                form.password = password;
                self.submit(form).await;
            }
            ShellCommand::Register {
                email,
                password,
                display_name,
            } => {
                let mut form = LoginForm::new(FormMode::Register);
                form.email = email;
                form.password = password;
                form.display_name = display_name.join(" ");
                self.submit(form).await;
            }
            ShellCommand::Logout => {
                sessions.logout().await;
                println!("signed out");
            }
            ShellCommand::Refresh => match sessions.refresh().await {
                Some(user) => println!("signed in as {}", user.display_name),
                None => println!("not signed in"),
            },
            ShellCommand::Visit { path } => {
                self.current_path = path;
            }
            ShellCommand::Search { query } => {
                match catalog.search_movies(&query.join(" "), 1).await {
                    Ok(page) => print_movies(&page.results),
                    Err(e) => println!("search failed: {}", e),
                }
            }
            ShellCommand::Popular { page } => match catalog.popular_movies(page).await {
                Ok(page) => print_movies(&page.results),
                Err(e) => println!("could not load popular movies: {}", e),
            },
            ShellCommand::Library => match catalog.library().await {
                Ok(items) if items.is_empty() => println!("No saved movies yet"),
                Ok(items) => {
                    for item in items {
                        println!("{:>8}  {}", item.movie_id, item.title);
                    }
                }
                Err(e) => println!("could not load library: {}", e),
            },
            ShellCommand::Save { tmdb_id } => {
                let outcome = match catalog.movie(tmdb_id).await {
                    Ok(movie) => catalog.add_to_library(&movie).await,
                    Err(e) => Err(e),
                };
                match outcome {
                    Ok(LibraryAddOutcome::Added(item)) => println!("saved {}", item.title),
                    Ok(LibraryAddOutcome::AlreadyInLibrary) => println!("already in library"),
                    Err(e) => println!("could not save: {}", e),
                }
            }
            ShellCommand::Remove { tmdb_id } => match catalog.remove_from_library(tmdb_id).await {
                Ok(()) => println!("removed {}", tmdb_id),
                Err(e) => println!("could not remove: {}", e),
            },
            ShellCommand::Recs { user_ids } => match catalog.recommendations(&user_ids).await {
                Ok(recs) if recs.is_empty() => println!("no recommendations"),
                Ok(recs) => {
                    for rec in recs {
                        println!("{:>8}  {}\n          {}", rec.movie.id, rec.movie.title, rec.why);
                    }
                }
                Err(e) => println!("could not get recommendations: {}", e),
            },
            ShellCommand::Quit => {}
        }
    }

    async fn submit(&mut self, mut form: LoginForm) {
        match form.submit(&self.client.sessions).await {
            Ok(destination) => {
                if let Some(user) = self.client.sessions.session().user() {
                    println!("welcome, {}", user.display_name);
                }
                self.current_path = destination.to_string();
            }
            Err(e) => match form.error() {
                Some(message) => println!("{}", message),
                None => println!("{}", e),
            },
        }
    }
}

fn print_movies(movies: &[Movie]) {
    if movies.is_empty() {
        println!("no results");
        return;
    }
    for movie in movies {
        match movie.release_year() {
            Some(year) => println!("{:>8}  {} ({})", movie.id, movie.title, year),
            None => println!("{:>8}  {}", movie.id, movie.title),
        }
    }
}
