//! Command parsing and execution.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use trimax_core::models::{Connection, Post};
use trimax_core::queries::{DEFAULT_LISTING_SIZE, DEFAULT_POSTS_PER_PAGE, DEFAULT_RECENT_POSTS};
use trimax_core::{
    ApiError, Config, ContentClient, Credentials, LoginOutcome, QueryRequest, RestRequest,
};

use crate::secret::DEFAULT_SECRET_BYTES;

pub const USAGE: &str = "\
Usage: trimax <command> [args]

Commands:
  login [username]                  Log in and store the token
  logout                            Forget the stored token
  status                            Show whether a valid token is stored
  posts [first] [--after <cursor>]  List published posts
  post <slug>                       Show one post
  recent [first]                    List the most recent posts
  category <slug> [first]           List posts in a category
  categories                        List non-empty categories
  slugs                             List every published post slug
  services                          List services
  portfolio                         List portfolio items
  query <file> [--vars <json>] [--private]
                                    Run a query document from a file
  rest <endpoint>                   GET an endpoint of the REST API
  test-connection                   Check the GraphQL endpoint responds
  gen-secret [bytes]                Print random JWT signing secrets
  help                              Show this message

Environment:
  WORDPRESS_GRAPHQL_URL, WORDPRESS_JWT_URL, WORDPRESS_API_URL,
  TRIMAX_HTTP_TIMEOUT_SECS, RUST_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: Option<String> },
    Logout,
    Status,
    Posts { first: u32, after: Option<String> },
    Post { slug: String },
    Recent { first: u32 },
    Category { slug: String, first: u32 },
    Categories,
    Slugs,
    Services,
    Portfolio,
    Query { file: PathBuf, variables: Option<String>, private: bool },
    Rest { endpoint: String },
    TestConnection,
    GenSecret { bytes: usize },
    Help,
}

fn parse_number<T: std::str::FromStr>(value: Option<&String>, default: T, what: &str) -> Result<T> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow!("{} must be a positive number, got '{}'", what, raw)),
        None => Ok(default),
    }
}

fn required<'a>(value: Option<&'a String>, what: &str) -> Result<&'a String> {
    value.ok_or_else(|| anyhow!("missing {}", what))
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        let command = match name.as_str() {
            "login" => Command::Login {
                username: rest.first().cloned(),
            },
            "logout" => Command::Logout,
            "status" => Command::Status,
            "posts" => {
                let mut first = DEFAULT_POSTS_PER_PAGE;
                let mut after = None;
                let mut iter = rest.iter();
                while let Some(arg) = iter.next() {
                    if arg == "--after" {
                        after = Some(required(iter.next(), "cursor after --after")?.clone());
                    } else {
                        first = parse_number(Some(arg), first, "first")?;
                    }
                }
                Command::Posts { first, after }
            }
            "post" => Command::Post {
                slug: required(rest.first(), "post slug")?.clone(),
            },
            "recent" => Command::Recent {
                first: parse_number(rest.first(), DEFAULT_RECENT_POSTS, "first")?,
            },
            "category" => Command::Category {
                slug: required(rest.first(), "category slug")?.clone(),
                first: parse_number(rest.get(1), DEFAULT_POSTS_PER_PAGE, "first")?,
            },
            "categories" => Command::Categories,
            "slugs" => Command::Slugs,
            "services" => Command::Services,
            "portfolio" => Command::Portfolio,
            "query" => {
                let file = PathBuf::from(required(rest.first(), "query file")?);
                let mut variables = None;
                let mut private = false;
                let mut iter = rest.iter().skip(1);
                while let Some(arg) = iter.next() {
                    match arg.as_str() {
                        "--vars" => {
                            variables = Some(required(iter.next(), "JSON after --vars")?.clone())
                        }
                        "--private" => private = true,
                        other => bail!("unexpected argument '{}'", other),
                    }
                }
                Command::Query { file, variables, private }
            }
            "rest" => Command::Rest {
                endpoint: required(rest.first(), "endpoint")?.clone(),
            },
            "test-connection" => Command::TestConnection,
            "gen-secret" => Command::GenSecret {
                bytes: parse_number(rest.first(), DEFAULT_SECRET_BYTES, "bytes")?,
            },
            "help" | "--help" | "-h" => Command::Help,
            other => bail!("unknown command '{}'", other),
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Status => "status",
            Command::Posts { .. } => "posts",
            Command::Post { .. } => "post",
            Command::Recent { .. } => "recent",
            Command::Category { .. } => "category",
            Command::Categories => "categories",
            Command::Slugs => "slugs",
            Command::Services => "services",
            Command::Portfolio => "portfolio",
            Command::Query { .. } => "query",
            Command::Rest { .. } => "rest",
            Command::TestConnection => "test-connection",
            Command::GenSecret { .. } => "gen-secret",
            Command::Help => "help",
        }
    }
}

pub async fn run(client: &ContentClient, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => login(client, username).await,
        Command::Logout => {
            client.logout();
            println!("Logged out.");
            Ok(())
        }
        Command::Status => {
            match client.token_store().get_token() {
                Some(token) => println!(
                    "Logged in, token expires in {} minutes.",
                    token.minutes_until_expiry()
                ),
                None => println!("Not logged in."),
            }
            Ok(())
        }
        Command::Posts { first, after } => {
            let posts = client.all_posts(first, after.as_deref()).await?;
            print_posts(&posts);
            Ok(())
        }
        Command::Post { slug } => {
            let post = client
                .post_by_slug(&slug)
                .await?
                .ok_or_else(|| anyhow!("No published post with slug '{}'", slug))?;
            print_post(&post);
            Ok(())
        }
        Command::Recent { first } => {
            for post in client.recent_posts(first).await? {
                println!("{}  {}", post.date_display().unwrap_or_default(), post.display_title());
            }
            Ok(())
        }
        Command::Category { slug, first } => {
            let posts = client.posts_by_category(&slug, first, None).await?;
            print_posts(&posts);
            Ok(())
        }
        Command::Categories => {
            for category in client.categories().await? {
                println!("{:<24} {}", category.slug, category.display_count());
            }
            Ok(())
        }
        Command::Slugs => {
            for slug in client.all_post_slugs().await? {
                println!("{}", slug);
            }
            Ok(())
        }
        Command::Services => {
            for service in client.services(DEFAULT_LISTING_SIZE).await? {
                println!("{:<32} {}", service.display_title(), service.price_display());
                for feature in service.features() {
                    println!("  - {}", feature.feature_name);
                }
            }
            Ok(())
        }
        Command::Portfolio => {
            for item in client.portfolio_items(DEFAULT_LISTING_SIZE).await? {
                println!("{:<32} {}", item.display_title(), item.technologies_display());
                let filters = item.filter_slugs();
                if !filters.is_empty() {
                    println!("  filters: {}", filters.join(", "));
                }
            }
            Ok(())
        }
        Command::Query { file, variables, private } => {
            run_query(client, &file, variables.as_deref(), private).await
        }
        Command::Rest { endpoint } => {
            let value: Value = client.rest(&endpoint, RestRequest::default()).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Command::TestConnection => test_connection(client).await,
        // Handled before a client is built
        Command::GenSecret { .. } | Command::Help => Ok(()),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn login(client: &ContentClient, username: Option<String>) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config");
        Config::default()
    });

    let username = match username {
        Some(username) => username,
        None => match config.last_username.clone() {
            Some(last) => {
                let entered = prompt(&format!("Username [{}]: ", last))?;
                if entered.is_empty() { last } else { entered }
            }
            None => prompt("Username: ")?,
        },
    };
    if username.is_empty() {
        bail!("Username is required");
    }

    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    match client.login(&Credentials::new(username.clone(), password)).await {
        LoginOutcome::Success { user, .. } => {
            println!("Logged in as {} <{}>.", user.display_name, user.email);
            config.last_username = Some(username);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            Ok(())
        }
        LoginOutcome::Failure { error } => bail!("Login failed: {}", error),
    }
}

fn parse_variables(raw: Option<&str>) -> Result<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(raw) => match serde_json::from_str(raw).context("--vars must be valid JSON")? {
            Value::Object(map) => Ok(map),
            _ => bail!("--vars must be a JSON object"),
        },
    }
}

async fn run_query(
    client: &ContentClient,
    file: &Path,
    variables: Option<&str>,
    private: bool,
) -> Result<()> {
    let document = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read query file {}", file.display()))?;
    let request = QueryRequest::new(document).with_variables(parse_variables(variables)?);
    debug!(operation = request.operation_name().unwrap_or("anonymous"), private, "Running query");

    let result: Result<Value, ApiError> = if private {
        client.fetch_private(&request).await
    } else {
        client.fetch_public(&request).await
    };
    match result {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Err(e @ (ApiError::AuthenticationRequired | ApiError::AuthenticationExpired)) => {
            bail!("{} Run `trimax login` first.", e)
        }
        Err(e) => Err(e.into()),
    }
}

async fn test_connection(client: &ContentClient) -> Result<()> {
    println!("Testing {} ...", client.graphql().endpoint());

    let (site, categories) = futures::join!(client.site_info(), client.categories());
    let site = match site {
        Ok(site) => site,
        Err(e) => {
            let hint = match &e {
                ApiError::Network(inner) if inner.is_connect() => {
                    " Is the backend running and WORDPRESS_GRAPHQL_URL correct?"
                }
                ApiError::Http { status, .. } if status.as_u16() == 404 => {
                    " Is the GraphQL plugin installed and activated?"
                }
                _ => "",
            };
            bail!("Connection failed: {}.{}", e, hint);
        }
    };

    println!("Connection successful.");
    println!("  Title: {}", site.title());
    if let Some(settings) = &site.general_settings {
        println!("  Description: {}", settings.description.as_deref().unwrap_or("N/A"));
        println!("  URL: {}", settings.url.as_deref().unwrap_or("N/A"));
    }
    match site.latest_post() {
        Some(post) => println!(
            "  Latest post: {} ({})",
            post.display_title(),
            post.date_display().unwrap_or_else(|| "N/A".to_string())
        ),
        None => println!("  No posts found (normal for a new site)."),
    }
    match categories {
        Ok(categories) => println!("  Categories: {}", categories.len()),
        Err(e) => warn!(error = %e, "Category listing failed"),
    }
    Ok(())
}

fn print_posts(posts: &Connection<Post>) {
    if posts.nodes.is_empty() {
        println!("No posts.");
    }
    for post in &posts.nodes {
        println!("{}  {}", post.date_display().unwrap_or_default(), post.display_title());
        println!("    /blog/{}  by {}", post.slug, post.author_name());
        let excerpt = post.excerpt_text();
        if !excerpt.is_empty() {
            println!("    {}", excerpt);
        }
    }
    if posts.has_next_page() {
        match posts.next_cursor() {
            Some(cursor) => println!("\nMore posts: trimax posts --after {}", cursor),
            None => println!("\nMore posts available."),
        }
    }
}

fn print_post(post: &Post) {
    println!("{}", post.display_title());
    let mut meta = vec![format!("by {}", post.author_name())];
    if let Some(date) = post.date_display() {
        meta.push(format!("published {}", date));
    }
    if let Some(updated) = post.modified_display() {
        meta.push(format!("updated {}", updated));
    }
    if let Some(time) = post.reading_time() {
        meta.push(time);
    }
    println!("{}", meta.join(" | "));
    let terms: Vec<&str> = post
        .categories
        .iter()
        .chain(post.tags.iter())
        .map(|t| t.name.as_str())
        .collect();
    if !terms.is_empty() {
        println!("{}", terms.join(", "));
    }
    if let Some(avatar) = post.author.as_ref().and_then(|a| a.avatar_url()) {
        println!("Avatar: {}", avatar);
    }
    if let Some(image) = &post.featured_image {
        if let Some(url) = image.source_url.as_deref() {
            println!("Image: {} ({})", url, image.alt_or(post.display_title()));
        }
    }
    if let Some(content) = &post.content {
        println!("\n{}", trimax_core::utils::strip_html(content));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(Command::parse(&[]).expect("empty"), Command::Help);
        assert_eq!(
            Command::parse(&args(&["posts"])).expect("posts"),
            Command::Posts { first: 10, after: None }
        );
        assert_eq!(
            Command::parse(&args(&["recent"])).expect("recent"),
            Command::Recent { first: 5 }
        );
        assert_eq!(
            Command::parse(&args(&["gen-secret"])).expect("gen-secret"),
            Command::GenSecret { bytes: 64 }
        );
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            Command::parse(&args(&["posts", "12", "--after", "YXJyYXk6MTA="])).expect("posts"),
            Command::Posts { first: 12, after: Some("YXJyYXk6MTA=".to_string()) }
        );
        assert_eq!(
            Command::parse(&args(&["query", "q.graphql", "--vars", "{\"id\":1}", "--private"]))
                .expect("query"),
            Command::Query {
                file: PathBuf::from("q.graphql"),
                variables: Some("{\"id\":1}".to_string()),
                private: true,
            }
        );
        assert_eq!(
            Command::parse(&args(&["category", "news", "3"])).expect("category"),
            Command::Category { slug: "news".to_string(), first: 3 }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse(&args(&["post"])).is_err());
        assert!(Command::parse(&args(&["posts", "many"])).is_err());
        assert!(Command::parse(&args(&["query", "q.graphql", "--bogus"])).is_err());
        assert!(Command::parse(&args(&["deploy"])).is_err());
    }

    #[test]
    fn test_parse_variables() {
        assert!(parse_variables(None).expect("none").is_empty());
        let vars = parse_variables(Some(r#"{"slug":"hello"}"#)).expect("object");
        assert_eq!(vars["slug"], "hello");
        assert!(parse_variables(Some("[1,2]")).is_err());
        assert!(parse_variables(Some("{")).is_err());
    }
}
