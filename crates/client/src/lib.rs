//! Interactive command menu for the movie catalog HTTP API.

use reqwest::StatusCode;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub const MENU: &str = "\
Options menu:
1 - Show all movies.
2 - Get all movies by year.
    - Input:>2 *year*<
3 - Add all movies by year.
    - Input:>3 *year*<
4 - Update all movies by year.
    - Input:>4 *year*<
5 - Delete movies by year and name.
    - Input:>5 *year* *name*<
0 - Exit.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListAll,
    Get(u32),
    Add(u32),
    Update(u32),
    Delete { year: u32, name: String },
    Exit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("No option given.")]
    Empty,
    #[error("Too many parameters.")]
    TooManyParameters,
    #[error("No year specified.")]
    MissingYear,
    #[error("No year and/or name specified.")]
    MissingYearOrName,
    #[error("Invalid year: {0}")]
    InvalidYear(String),
    #[error("Unknown option.")]
    UnknownOption,
}

/// Split off the first whitespace-separated word.
fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (s, ""),
    }
}

fn parse_year(s: &str) -> Result<u32, CommandError> {
    match s.parse::<u32>() {
        Ok(y) if y > 0 => Ok(y),
        _ => Err(CommandError::InvalidYear(s.to_string())),
    }
}

impl Command {
    /// Parse one menu line. For option 5 everything after the year is the name.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let (option, rest) = split_word(line);
        let (year, name) = split_word(rest);

        let year_only = |make: fn(u32) -> Command| {
            if !name.is_empty() {
                Err(CommandError::TooManyParameters)
            } else if year.is_empty() {
                Err(CommandError::MissingYear)
            } else {
                parse_year(year).map(make)
            }
        };

        match option {
            "1" if rest.is_empty() => Ok(Command::ListAll),
            "1" => Err(CommandError::TooManyParameters),
            "2" => year_only(Command::Get),
            "3" => year_only(Command::Add),
            "4" => year_only(Command::Update),
            "5" if year.is_empty() || name.is_empty() => Err(CommandError::MissingYearOrName),
            "5" => Ok(Command::Delete { year: parse_year(year)?, name: name.trim_end().to_string() }),
            "0" => Ok(Command::Exit),
            _ => Err(CommandError::UnknownOption),
        }
    }
}

/// Status and raw body of one API call.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// Pretty JSON for successful replies, the raw text otherwise.
    pub fn render(&self) -> String {
        if !self.status.is_success() {
            return if self.body.is_empty() {
                format!("Error {}: no text received.", self.status)
            } else {
                format!("Error {}: {}", self.status, self.body)
            };
        }
        match serde_json::from_str::<serde_json::Value>(&self.body) {
            Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| self.body.clone()),
            Err(_) if self.body.is_empty() => "No content received.".to_string(),
            Err(_) => self.body.clone(),
        }
    }
}

/// Thin HTTP client for the `/movies` routes.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url }
    }

    pub async fn execute(&self, cmd: &Command) -> anyhow::Result<Option<Reply>> {
        let movies = format!("{}/movies", self.base_url);
        let req = match cmd {
            Command::ListAll => self.http.get(movies),
            Command::Get(year) => self.http.get(format!("{movies}/{year}")),
            Command::Add(year) => self.http.post(format!("{movies}/{year}")),
            Command::Update(year) => self.http.put(format!("{movies}/{year}")),
            Command::Delete { year, name } => {
                // names may contain spaces and slashes; push() percent-encodes them
                let mut url = reqwest::Url::parse(&format!("{movies}/{year}/"))?;
                url.path_segments_mut()
                    .map_err(|_| anyhow::anyhow!("base url {} cannot carry a path", self.base_url))?
                    .pop_if_empty()
                    .push(name);
                self.http.delete(url)
            }
            Command::Exit => return Ok(None),
        };
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(%status, ?cmd, "api call finished");
        Ok(Some(Reply { status, body }))
    }
}

/// Read commands from `input` until `0` or end of input, writing results to `output`.
pub async fn run_menu<R, W>(client: &CatalogClient, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(format!("\n{MENU}\nOption:> ").as_bytes()).await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else { break };

        let text = match Command::parse(&line) {
            Ok(Command::Exit) => {
                output.write_all(b"Exiting.\n").await?;
                break;
            }
            Ok(cmd) => match client.execute(&cmd).await {
                Ok(Some(reply)) => reply.render(),
                Ok(None) => continue,
                Err(e) => format!("Error: {e}"),
            },
            Err(CommandError::Empty) => continue,
            Err(e) => e.to_string(),
        };
        output.write_all(format!("{text}\n").as_bytes()).await?;
    }
    output.flush().await?;
    Ok(())
}
