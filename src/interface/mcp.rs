//! MCP Server for bookshelf-mcp
//!
//! MCP Protocol (stdio) <-> application::Library / domain::SearchManager
//!
//! 4 tools: book_add, book_remove, book_list, book_search

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::command::{AddBookCommand, Command, RemoveBookCommand};
use crate::application::error::AppError;
use crate::application::library::Library;
use crate::application::render::{RenderObserver, ShelfRenderer};
use crate::domain::model::book::{Book, BookBuilder};
use crate::domain::model::id::BookId;
use crate::domain::observer::ShelfObserver;
use crate::domain::search::{SearchManager, SearchStrategy};
use crate::infra::json_store::JsonFileStore;

/// 永続化スナップショットのストレージキー。Library構築時に注入する。
pub const BOOKS_STORAGE_KEY: &str = "books";

// =============================================================================
// Public entry point
// =============================================================================

/// MCP Serverを起動する。data_dirは永続化スナップショットの格納ディレクトリ。
pub async fn run(data_dir: PathBuf) -> anyhow::Result<()> {
    let store = JsonFileStore::new(data_dir);
    let mut library = Library::open(store, BOOKS_STORAGE_KEY)?;

    let render = Arc::new(RenderObserver::new());
    library.attach(render.clone());
    // 初期描画。以後はadd/removeの通知経路で描き直される。
    render.notify(library.books());

    let server = BookshelfMcpServer::new(library, render);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct BookshelfMcpServer {
    library: Arc<RwLock<Library<JsonFileStore>>>,
    search: Arc<RwLock<SearchManager>>,
    render: Arc<RenderObserver>,
    tool_router: ToolRouter<Self>,
}

impl BookshelfMcpServer {
    fn new(library: Library<JsonFileStore>, render: Arc<RenderObserver>) -> Self {
        Self {
            library: Arc::new(RwLock::new(library)),
            search: Arc::new(RwLock::new(SearchManager::new(SearchStrategy::Title))),
            render,
            tool_router: Self::tool_router(),
        }
    }

    fn library(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, Library<JsonFileStore>>, McpError> {
        self.library
            .read()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))
    }

    fn library_mut(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, Library<JsonFileStore>>, McpError> {
        self.library
            .write()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))
    }
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for BookshelfMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bookshelf-mcp".to_string(),
                title: Some("Bookshelf MCP — Personal Book Collection".to_string()),
                description: Some(
                    "Numbered bookshelf with add/remove/search. \
                     2-step workflow: `book_list` → pick number → `book_remove`."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Manage a persistent personal bookshelf.\n\
                 \n\
                 Intended flow: register books with `book_add` (title/author/year required, \
                 genre/isbn optional), inspect with `book_list`, and narrow with `book_search` \
                 (strategy: title, author, or year).\n\
                 \n\
                 Tools: `book_add`, `book_remove`, `book_list`, `book_search`."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

fn to_mcp_error(e: AppError) -> McpError {
    McpError::internal_error(format!("{e}"), None)
}

/// 必須テキストフィールドが空白のみでないことを検証する。
fn validate_field(value: &str, field: &str) -> Result<(), McpError> {
    if value.trim().is_empty() {
        return Err(McpError::invalid_params(
            format!("{field} must not be empty"),
            None,
        ));
    }
    Ok(())
}

/// 出版年のフィールド文字列を整数として解析する。
fn parse_year(s: &str) -> Result<i32, McpError> {
    s.trim().parse::<i32>().map_err(|_| {
        McpError::invalid_params(format!("year must be an integer, got: '{s}'"), None)
    })
}

fn parse_strategy(s: &str) -> Result<SearchStrategy, McpError> {
    SearchStrategy::from_key(s).ok_or_else(|| {
        McpError::invalid_params(
            format!("Unknown strategy: '{s}'. Use: title, author, year"),
            None,
        )
    })
}

/// 表示番号 / ID完全一致 / IDプレフィックス / タイトル部分一致 → Book。
///
/// 優先順位:
/// 1. 表示番号 (e.g. "2") — `book_list` 出力と対応
/// 2. ID完全一致
/// 3. IDプレフィックス
/// 4. タイトル部分一致（case-insensitive, フォールバック）
fn resolve_book(books: &[Book], reference: &str) -> Result<Book, McpError> {
    // 1. 表示番号
    if !reference.is_empty() && reference.chars().all(|c| c.is_ascii_digit()) {
        let num: usize = reference.parse().map_err(|_| {
            McpError::invalid_params(format!("Invalid book number: '{reference}'"), None)
        })?;
        if num == 0 || num > books.len() {
            return Err(McpError::invalid_params(
                format!(
                    "Book number {} out of range (1-{}). Use `book_list` to see current numbers.",
                    num,
                    books.len()
                ),
                None,
            ));
        }
        return Ok(books[num - 1].clone());
    }

    // 2. ID完全一致
    if let Some(book) = books.iter().find(|b| b.id().as_str() == reference) {
        return Ok(book.clone());
    }

    // 3. IDプレフィックス
    let id_matches: Vec<&Book> = books
        .iter()
        .filter(|b| b.id().as_str().starts_with(reference))
        .collect();
    match id_matches.len() {
        1 => return Ok(id_matches[0].clone()),
        n if n > 1 => {
            return Err(McpError::invalid_params(
                format!("Ambiguous id prefix: '{reference}' matches {n} books"),
                None,
            ))
        }
        _ => {}
    }

    // 4. タイトル部分一致
    let query = reference.to_lowercase();
    let title_matches: Vec<&Book> = books
        .iter()
        .filter(|b| b.title().to_lowercase().contains(&query))
        .collect();
    match title_matches.len() {
        0 => Err(McpError::invalid_params(
            format!("No book found matching: '{reference}'"),
            None,
        )),
        1 => Ok(title_matches[0].clone()),
        n => Err(McpError::invalid_params(
            format!(
                "Ambiguous title match: '{reference}' matches {n} books: {}",
                title_matches
                    .iter()
                    .map(|b| format!("'{}' ({})", b.title(), b.id().short()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None,
        )),
    }
}

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookAddRequest {
    #[schemars(description = "Book title (required, must not be empty)")]
    pub title: String,
    #[schemars(description = "Author name (required, must not be empty)")]
    pub author: String,
    #[schemars(description = "Publication year as a string, e.g. '1954'")]
    pub year: String,
    #[schemars(description = "Optional genre label")]
    pub genre: Option<String>,
    #[schemars(description = "Optional ISBN")]
    pub isbn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookRemoveRequest {
    #[schemars(
        description = "Book to remove: number from `book_list` output (e.g. '2'), full id, id prefix, or title fragment"
    )]
    pub book: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookListRequest {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookSearchRequest {
    #[schemars(description = "Search query string")]
    pub query: String,
    #[schemars(description = "Search strategy: title, author, or year")]
    pub strategy: String,
}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl BookshelfMcpServer {
    #[tool(
        name = "book_add",
        description = "Add a book to the shelf. Title, author, and year are required; genre and isbn are optional. Returns the refreshed shelf view.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_add(
        &self,
        Parameters(req): Parameters<McpBookAddRequest>,
    ) -> Result<CallToolResult, McpError> {
        validate_field(&req.title, "title")?;
        validate_field(&req.author, "author")?;
        let year = parse_year(&req.year)?;

        let mut builder = BookBuilder::new(
            BookId::new(),
            req.title.trim(),
            req.author.trim(),
            year,
        );
        if let Some(genre) = req.genre.filter(|g| !g.trim().is_empty()) {
            builder = builder.genre(genre.trim());
        }
        if let Some(isbn) = req.isbn.filter(|i| !i.trim().is_empty()) {
            builder = builder.isbn(isbn.trim());
        }
        let book = builder.build();
        let title = book.title().to_string();
        let short = book.id().short().to_string();

        {
            let mut library = self.library_mut()?;
            AddBookCommand::new(book)
                .execute(&mut library)
                .map_err(to_mcp_error)?;
        }

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Added: {} (id: {})\n\n{}",
            title,
            short,
            self.render.snapshot()
        ))]))
    }

    #[tool(
        name = "book_remove",
        description = "Remove a book from the shelf. Specify it by number from `book_list` output (e.g. '2'), full id, id prefix, or title fragment. Returns the refreshed shelf view.",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_remove(
        &self,
        Parameters(req): Parameters<McpBookRemoveRequest>,
    ) -> Result<CallToolResult, McpError> {
        let book = {
            let mut library = self.library_mut()?;
            let book = resolve_book(library.books(), &req.book)?;
            RemoveBookCommand::new(book.clone())
                .execute(&mut library)
                .map_err(to_mcp_error)?;
            book
        };

        Ok(CallToolResult::success(vec![Content::text(format!(
            "Removed: {} (id: {})\n\n{}",
            book.title(),
            book.id().short(),
            self.render.snapshot()
        ))]))
    }

    #[tool(
        name = "book_list",
        description = "Show the current shelf: every book in insertion order, numbered for use with `book_remove`.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_list(
        &self,
        Parameters(_req): Parameters<McpBookListRequest>,
    ) -> Result<CallToolResult, McpError> {
        let library = self.library()?;
        Ok(CallToolResult::success(vec![Content::text(
            ShelfRenderer::render(library.books()),
        )]))
    }

    #[tool(
        name = "book_search",
        description = "Search the shelf without changing it. Strategy 'title' and 'author' match case-insensitive substrings; 'year' matches the exact year (non-numeric query yields no results).",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_search(
        &self,
        Parameters(req): Parameters<McpBookSearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let strategy = parse_strategy(&req.strategy)?;

        let library = self.library()?;
        let mut manager = self
            .search
            .write()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))?;
        manager.set_strategy(strategy);
        let results = manager.search(library.books(), &req.query);

        Ok(CallToolResult::success(vec![Content::text(
            ShelfRenderer::render_results(&results, &req.query),
        )]))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_books() -> Vec<Book> {
        vec![
            BookBuilder::new(BookId::from("b-hobbit"), "The Hobbit", "J.R.R. Tolkien", 1937)
                .genre("fantasy")
                .build(),
            BookBuilder::new(BookId::from("b-dune"), "Dune", "Frank Herbert", 1965).build(),
            BookBuilder::new(BookId::from("x-dune-m"), "Dune Messiah", "Frank Herbert", 1969)
                .build(),
        ]
    }

    // ---- Request DTO parsing ----

    #[test]
    fn book_add_request_minimal() {
        let req: McpBookAddRequest = serde_json::from_str(
            r#"{"title": "Dune", "author": "Frank Herbert", "year": "1965"}"#,
        )
        .unwrap();
        assert_eq!(req.title, "Dune");
        assert!(req.genre.is_none());
        assert!(req.isbn.is_none());
    }

    #[test]
    fn book_list_request_empty() {
        let _req: McpBookListRequest = serde_json::from_str("{}").unwrap();
    }

    #[test]
    fn book_search_request() {
        let req: McpBookSearchRequest =
            serde_json::from_str(r#"{"query": "tolkien", "strategy": "author"}"#).unwrap();
        assert_eq!(req.query, "tolkien");
        assert_eq!(req.strategy, "author");
    }

    // ---- Validators ----

    #[test]
    fn validate_field_rejects_blank() {
        assert!(validate_field("The Hobbit", "title").is_ok());
        assert!(validate_field("", "title").is_err());
        assert!(validate_field("   ", "author").is_err());
    }

    #[test]
    fn parse_year_accepts_integer_strings() {
        assert_eq!(parse_year("1954").unwrap(), 1954);
        assert_eq!(parse_year(" 1954 ").unwrap(), 1954);
    }

    #[test]
    fn parse_year_rejects_non_numeric() {
        assert!(parse_year("abc").is_err());
        assert!(parse_year("19.54").is_err());
        assert!(parse_year("").is_err());
    }

    #[test]
    fn parse_strategy_known_keys() {
        assert_eq!(parse_strategy("title").unwrap(), SearchStrategy::Title);
        assert_eq!(parse_strategy("author").unwrap(), SearchStrategy::Author);
        assert_eq!(parse_strategy("year").unwrap(), SearchStrategy::Year);
        assert!(parse_strategy("publisher").is_err());
    }

    // ---- resolve_book ladder ----

    #[test]
    fn resolve_by_list_number() {
        let books = sample_books();
        assert_eq!(resolve_book(&books, "2").unwrap().title(), "Dune");
    }

    #[test]
    fn resolve_number_out_of_range() {
        let books = sample_books();
        assert!(resolve_book(&books, "0").is_err());
        assert!(resolve_book(&books, "4").is_err());
    }

    #[test]
    fn resolve_by_exact_id() {
        let books = sample_books();
        assert_eq!(resolve_book(&books, "b-hobbit").unwrap().title(), "The Hobbit");
    }

    #[test]
    fn resolve_by_id_prefix() {
        let books = sample_books();
        assert_eq!(resolve_book(&books, "b-h").unwrap().title(), "The Hobbit");
    }

    #[test]
    fn resolve_ambiguous_id_prefix() {
        let books = sample_books();
        // "b-" は b-hobbit と b-dune の両方に一致する
        assert!(resolve_book(&books, "b-").is_err());
    }

    #[test]
    fn resolve_by_title_fragment() {
        let books = sample_books();
        assert_eq!(resolve_book(&books, "hobbit").unwrap().title(), "The Hobbit");
    }

    #[test]
    fn resolve_ambiguous_title_fragment() {
        let books = sample_books();
        // "dune" は Dune と Dune Messiah の両方に一致する
        assert!(resolve_book(&books, "dune").is_err());
    }

    #[test]
    fn resolve_no_match() {
        let books = sample_books();
        assert!(resolve_book(&books, "nonexistent").is_err());
    }
}
