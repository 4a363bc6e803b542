//! Line-oriented command layer between the terminal and the session.

mod render;

pub use render::render;

use crate::normalize::normalize_optional_string;
use crate::session::{Session, Tab};
use crate::sheet::{FormulaKind, GridSheet};
use render::render_table;
use std::str::FromStr;
use std::sync::Arc;

pub const HELP: &str = "\
Commands:
  status                         show connection, lists and message
  connect <api-key>              save the key and connect
  disconnect                     forget the stored key
  search <query>                 search the series catalog
  fav <series-id>                toggle a favorite
  tab <search|favorites|recent>  switch the list shown by status
  select <cell|none>             select a cell, e.g. B2
  insert <series-id> [array|latest|yoy|value <date>|meta <field>]
  preview <series-id>            show the newest observations
  cells                          list written formulas
  help                           this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Connect(String),
    Disconnect,
    Search(String),
    Favorite(String),
    Tab(Tab),
    Select(String),
    Insert { id: String, kind: FormulaKind },
    Preview(String),
    Cells,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = normalize_optional_string(Some(rest)).unwrap_or_default();
        let required = |what: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("Usage: {} <{}>", name, what))
            } else {
                Ok(rest.clone())
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "" | "status" => Ok(Command::Status),
            "connect" => Ok(Command::Connect(rest.clone())),
            "disconnect" => Ok(Command::Disconnect),
            "search" => Ok(Command::Search(rest.clone())),
            "fav" | "favorite" => required("series-id").map(Command::Favorite),
            "tab" => rest.parse().map(Command::Tab),
            "select" => required("cell").map(Command::Select),
            "insert" => {
                let mut parts = rest.splitn(3, char::is_whitespace);
                let id = parts.next().filter(|p| !p.is_empty()).ok_or_else(|| {
                    "Usage: insert <series-id> [kind] [argument]".to_string()
                })?;
                let kind = match parts.next() {
                    Some(kind) => FormulaKind::parse(kind, parts.next())?,
                    None => FormulaKind::Array,
                };
                Ok(Command::Insert { id: id.to_string(), kind })
            }
            "preview" => required("series-id").map(Command::Preview),
            "cells" => Ok(Command::Cells),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command: {} (try `help`)", other)),
        }
    }
}

pub struct Shell {
    session: Session,
    sheet: Arc<GridSheet>,
}

impl Shell {
    pub fn new(session: Session, sheet: Arc<GridSheet>) -> Self {
        Self { session, sheet }
    }

    /// Run one command and return the text to print
    pub async fn execute(&self, command: Command) -> Result<String, String> {
        match command {
            Command::Status => {}
            Command::Connect(key) => {
                self.session.set_api_key_input(&key).await;
                self.session.save_api_key(&key).await;
            }
            Command::Disconnect => self.session.disconnect().await,
            Command::Search(query) => {
                self.session.set_tab(Tab::Search).await;
                self.session.search(&query).await;
            }
            Command::Favorite(id) => self.session.toggle_favorite(&id).await,
            Command::Tab(tab) => self.session.set_tab(tab).await,
            Command::Select(address) if address.eq_ignore_ascii_case("none") => {
                self.sheet.clear_selection().await;
                return Ok("Selection cleared".to_string());
            }
            Command::Select(address) => {
                let cell = self.sheet.select(&address).await.map_err(|e| e.to_string())?;
                return Ok(format!("Selected {}", cell));
            }
            Command::Insert { id, kind } => self.session.insert_formula(&id, &kind).await,
            Command::Preview(id) => {
                let table = self.session.preview(&id).await.map_err(|e| e.to_string())?;
                return Ok(render_table(&table));
            }
            Command::Cells => {
                let selection = match self.sheet.selection().await {
                    Some(cell) => cell.to_string(),
                    None => "none".to_string(),
                };
                let mut lines: Vec<String> = self
                    .sheet
                    .cells()
                    .await
                    .iter()
                    .map(|(addr, formula)| format!("{:>6}  {}", addr, formula))
                    .collect();
                if lines.is_empty() {
                    lines.push("No formulas yet.".to_string());
                }
                lines.push(format!("Selection: {}", selection));
                return Ok(lines.join("\n"));
            }
            Command::Help => return Ok(HELP.to_string()),
            Command::Quit => return Ok(String::new()),
        }
        Ok(render(&self.session.snapshot().await))
    }
}
