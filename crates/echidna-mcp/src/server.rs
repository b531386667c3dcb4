//! MCP stdio server: tool routing, the features resource and the help prompt.

use async_trait::async_trait;
use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        AnnotateAble, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
        ListPromptsResult, ListResourcesResult, PaginatedRequestParam, ProgressNotificationParam,
        ProgressToken, Prompt, PromptMessage, PromptMessageRole, RawResource,
        ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerCapabilities,
        ServerInfo,
    },
    service::{Peer, RequestContext},
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServiceExt,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::progress::{NoProgress, ProgressReporter};
use crate::resources::{
    help_text, read_features_doc, FEATURES_NAME, FEATURES_URI, HELP_PROMPT, HELP_QUESTION,
};
use crate::state::ToolDispatcher;
use crate::tools::inputs::input_schema;
use crate::tools::ToolName;

/// Forwards milestones to the client as `notifications/progress`.
struct PeerProgress {
    peer: Peer<RoleServer>,
    token: ProgressToken,
}

#[async_trait]
impl ProgressReporter for PeerProgress {
    async fn report(&self, message: &str, progress: u32, total: u32) {
        let param = ProgressNotificationParam {
            progress_token: self.token.clone(),
            progress: f64::from(progress),
            total: Some(f64::from(total)),
            message: Some(message.to_string()),
        };
        if let Err(e) = self.peer.notify_progress(param).await {
            debug!(error = %e, "dropped progress notification");
        }
    }
}

#[derive(Clone)]
pub struct EchidnaMcpServer {
    dispatcher: Arc<ToolDispatcher>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl EchidnaMcpServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        // Handlers take raw JSON so the truthiness rules apply; advertise the
        // typed argument schema instead of the generic object one.
        let mut tool_router = Self::tool_router();
        for route in tool_router.map.values_mut() {
            if let Ok(tool) = route.attr.name.parse::<ToolName>() {
                route.attr.input_schema = input_schema(tool);
            }
        }
        Self {
            dispatcher: Arc::new(dispatcher),
            tool_router,
        }
    }

    async fn dispatch_tool(
        &self,
        tool: ToolName,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let response = match ctx.meta.get_progress_token() {
            Some(token) => {
                let reporter = PeerProgress {
                    peer: ctx.peer.clone(),
                    token,
                };
                self.dispatcher
                    .dispatch_with_progress(tool.as_str(), params.0, &reporter)
                    .await
            }
            None => {
                self.dispatcher
                    .dispatch_with_progress(tool.as_str(), params.0, &NoProgress)
                    .await
            }
        };

        let content_text = if response.success {
            "ok".to_string()
        } else {
            response
                .error
                .clone()
                .unwrap_or_else(|| "error".to_string())
        };
        Ok(CallToolResult {
            content: vec![Content::text(content_text)],
            structured_content: Some(serde_json::to_value(&response).unwrap_or(Value::Null)),
            is_error: Some(!response.success),
            meta: None,
        })
    }

    #[tool(
        name = "run_echidna_test",
        description = "Run Echidna on a Solidity contract file"
    )]
    async fn run_echidna_test(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::RunEchidnaTest, params, ctx).await
    }

    #[tool(
        name = "create_echidna_config",
        description = "Create an Echidna configuration file"
    )]
    async fn create_echidna_config(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::CreateEchidnaConfig, params, ctx)
            .await
    }

    #[tool(
        name = "create_solidity_contract",
        description = "Create a Solidity file with provided code"
    )]
    async fn create_solidity_contract(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::CreateSolidityContract, params, ctx)
            .await
    }

    #[tool(
        name = "analyze_corpus",
        description = "Analyze an Echidna corpus directory"
    )]
    async fn analyze_corpus(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::AnalyzeCorpus, params, ctx).await
    }

    #[tool(
        name = "filter_functions",
        description = "Create a config to filter functions for testing"
    )]
    async fn filter_functions(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::FilterFunctions, params, ctx).await
    }

    #[tool(
        name = "setup_end_to_end_test",
        description = "Set up end-to-end testing with Etheno"
    )]
    async fn setup_end_to_end_test(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::SetupEndToEndTest, params, ctx)
            .await
    }

    #[tool(
        name = "generate_property_template",
        description = "Generate template code for various property types"
    )]
    async fn generate_property_template(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::GeneratePropertyTemplate, params, ctx)
            .await
    }

    #[tool(
        name = "create_assertion_contract",
        description = "Create a contract with assertion-based properties"
    )]
    async fn create_assertion_contract(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::CreateAssertionContract, params, ctx)
            .await
    }

    #[tool(
        name = "create_fork_test",
        description = "Create a test using state forking from an RPC provider"
    )]
    async fn create_fork_test(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::CreateForkTest, params, ctx).await
    }

    #[tool(
        name = "visualize_coverage",
        description = "Visualize code coverage data from an Echidna corpus"
    )]
    async fn visualize_coverage(
        &self,
        params: Parameters<Value>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool(ToolName::VisualizeCoverage, params, ctx)
            .await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for EchidnaMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Echidna MCP server. Use run_echidna_test to fuzz a contract, the create_* tools \
                 to write configs and harnesses, and analyze_corpus or visualize_coverage to \
                 inspect results."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut resource = RawResource::new(FEATURES_URI, FEATURES_NAME);
        resource.description = Some("Documentation on Echidna features".to_string());
        resource.mime_type = Some("text/markdown".to_string());
        Ok(ListResourcesResult {
            resources: vec![resource.no_annotation()],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if request.uri != FEATURES_URI {
            return Err(McpError::resource_not_found(
                format!("Unknown resource: {}", request.uri),
                None,
            ));
        }
        let text = read_features_doc()
            .map_err(|e| McpError::resource_not_found(format!("{:#}", e), None))?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, FEATURES_URI)],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            prompts: vec![Prompt::new(
                HELP_PROMPT,
                Some("Help on using Echidna through this server"),
                None,
            )],
            next_cursor: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        if request.name != HELP_PROMPT {
            return Err(McpError::invalid_params(
                format!("Unknown prompt: {}", request.name),
                None,
            ));
        }
        Ok(GetPromptResult {
            description: Some("Help on using Echidna through this server".to_string()),
            messages: vec![
                PromptMessage::new_text(PromptMessageRole::User, HELP_QUESTION),
                PromptMessage::new_text(PromptMessageRole::Assistant, help_text()),
            ],
        })
    }
}

/// Serve `dispatcher` over stdin/stdout until the client disconnects.
pub async fn serve_stdio(dispatcher: ToolDispatcher) -> anyhow::Result<()> {
    let server = EchidnaMcpServer::new(dispatcher);
    info!("starting echidna MCP server on stdio");
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
