//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::state::AppState;
use crate::tools::cache::{CacheGetParams, CacheInvalidateParams, get_impl, invalidate_impl};
use crate::tools::{GetSitemapParams, get_sitemap_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for sitescan.
#[derive(Clone)]
pub struct SitescanServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SitescanServer {
    /// Create a new server handler over shared state.
    pub fn new(state: AppState) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Resolve every sitemap of a site.
    ///
    /// Results are cached per URL; `refresh_cache` forces a new resolution.
    #[tool(
        description = "Resolve a website's sitemaps (robots.txt, fallbacks, nested indexes) into one list of page URLs. Cached per URL."
    )]
    async fn get_sitemap(&self, params: Parameters<GetSitemapParams>) -> Result<CallToolResult, McpError> {
        get_sitemap_impl(&self.state, params.0).await
    }

    #[tool(description = "Read the cached sitemap resolution for a URL without touching the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.state.cache, params.0).await
    }

    #[tool(description = "Remove the cached sitemap resolution for a URL.")]
    async fn cache_invalidate(&self, params: Parameters<CacheInvalidateParams>) -> Result<CallToolResult, McpError> {
        invalidate_impl(&self.state.cache, params.0).await
    }
}

impl ServerHandler for SitescanServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sitescan".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
