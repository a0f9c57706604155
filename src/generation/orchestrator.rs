//! Generation orchestration - design, render, retry and improve stages

use std::sync::Arc;

use crate::core::config::ToolSettings;
use crate::core::{
    ConfigResolver, ContextProvider, DataSourceKind, GenerationContext, StyleProvider,
};
use crate::generation::sanitizers::strip_code_fences;
use crate::generation::{
    ActionType, GenerationError, GenerationRequest, GenerationResult, ImproveRoute, Stage,
};
use crate::llm::CompletionService;
use crate::prompts::{PromptAssembler, attach_reference_image, fragments};

/// Runs the two-stage workflow: a thinking model writes a technical design,
/// a rendering model turns it into HTML.
pub struct TwoStageGenerator {
    completion: Arc<dyn CompletionService>,
    assembler: PromptAssembler,
    context_provider: Arc<dyn ContextProvider>,
    style_provider: Option<Arc<dyn StyleProvider>>,
    config: ConfigResolver,
    tools: ToolSettings,
}

impl TwoStageGenerator {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        assembler: PromptAssembler,
        context_provider: Arc<dyn ContextProvider>,
        config: ConfigResolver,
    ) -> Self {
        Self {
            completion,
            assembler,
            context_provider,
            style_provider: None,
            config,
            tools: ToolSettings::default(),
        }
    }

    pub fn with_style_provider(mut self, provider: Arc<dyn StyleProvider>) -> Self {
        self.style_provider = Some(provider);
        self
    }

    /// Tool identifiers offered during the design stage and the HTML stages
    pub fn with_tools(mut self, tools: ToolSettings) -> Self {
        self.tools = tools;
        self
    }

    /// Execute a generate or improve request.
    ///
    /// Returns `Err` only for invalid input or a missing API key. Stage
    /// failures come back as a result whose `html` holds the error message.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let scope = request.scope;
        if self.config.resolve_api_key(scope).is_none() {
            return Err(GenerationError::Configuration(format!(
                "API key is not configured for store {scope}"
            )));
        }

        tracing::info!(
            store = %scope,
            action = %request.action,
            data_source = ?request.data_source.as_ref().map(|s| s.to_string()),
            interactive = request.interactive,
            "Starting generation"
        );

        match request.action {
            ActionType::Generate => {
                if !request.has_custom_prompt() && request.data_source.is_none() {
                    return Err(GenerationError::missing_instruction(
                        "A custom prompt is required for generation if no product or category is selected",
                    ));
                }
                let context = self.build_context(request).await;
                Ok(self.generate_design_and_html(request, &context).await)
            }
            ActionType::Improve => {
                let route = ImproveRoute::select(
                    request.design_plan.as_deref(),
                    request.current_content.as_deref(),
                );
                if route == ImproveRoute::Improve && !request.has_custom_prompt() {
                    return Err(GenerationError::missing_instruction(
                        "An improvement instruction is required when improving content",
                    ));
                }
                let context = self.build_context(request).await;
                Ok(match route {
                    ImproveRoute::Retry => self.retry_html(request, &context).await,
                    ImproveRoute::Improve => self.improve_html(request, &context).await,
                })
            }
        }
    }

    async fn generate_design_and_html(
        &self,
        request: &GenerationRequest,
        context: &GenerationContext,
    ) -> GenerationResult {
        let goal = self.content_goal(request, context, false);
        let instruction = fragments::design_instruction(&goal, &request.custom_prompt);
        let design = match self
            .run_stage(Stage::Design, request, context, None, &instruction)
            .await
        {
            Ok(design) => design,
            Err(e) => return soft_failure(Stage::Design, None, e),
        };

        let goal = self.content_goal(request, context, request.interactive);
        let artifact = fragments::design_plan(&design);
        let instruction = fragments::render_instruction(&goal);
        match self
            .run_stage(Stage::Render, request, context, Some(&artifact), &instruction)
            .await
        {
            Ok(html) => finished(Some(design), &html),
            Err(e) => soft_failure(Stage::Render, Some(design), e),
        }
    }

    async fn retry_html(
        &self,
        request: &GenerationRequest,
        context: &GenerationContext,
    ) -> GenerationResult {
        let plan = request.design_plan.clone().unwrap_or_default();
        if request.has_custom_prompt() {
            tracing::info!(store = %request.scope, "Improvement prompt provided for retry");
        }

        let goal = self.content_goal(request, context, request.interactive);
        let artifact = fragments::design_plan(&plan);
        let instruction = fragments::retry_instruction(&goal, &request.custom_prompt);
        match self
            .run_stage(Stage::Retry, request, context, Some(&artifact), &instruction)
            .await
        {
            Ok(html) => finished(Some(plan), &html),
            Err(e) => soft_failure(Stage::Retry, Some(plan), e),
        }
    }

    async fn improve_html(
        &self,
        request: &GenerationRequest,
        context: &GenerationContext,
    ) -> GenerationResult {
        let goal = self.content_goal(request, context, request.interactive);
        let artifact = fragments::current_html(request.current_content.as_deref());
        let instruction = fragments::improve_instruction(&goal, &request.custom_prompt);
        match self
            .run_stage(Stage::Improve, request, context, Some(&artifact), &instruction)
            .await
        {
            Ok(html) => finished(None, &html),
            Err(e) => soft_failure(Stage::Improve, None, e),
        }
    }

    /// Assemble the stage conversation and run it through the completion loop
    async fn run_stage(
        &self,
        stage: Stage,
        request: &GenerationRequest,
        context: &GenerationContext,
        artifact: Option<&str>,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        tracing::info!(store = %request.scope, stage = %stage, "Starting stage");

        let mut conversation = self
            .assembler
            .build_messages(
                stage.system_template(),
                context,
                artifact,
                instruction,
                request.interactive,
            )
            .await?;
        attach_reference_image(&mut conversation, request.reference_image_url.as_deref());

        let output = self
            .completion
            .complete(
                conversation.into_messages(),
                stage.model_kind(),
                self.tools_for(stage),
                request.scope,
            )
            .await?;

        tracing::info!(store = %request.scope, stage = %stage, "Completed stage");
        Ok(output)
    }

    fn tools_for(&self, stage: Stage) -> &[String] {
        match stage {
            Stage::Design => &self.tools.design,
            Stage::Render | Stage::Retry | Stage::Improve => &self.tools.render,
        }
    }

    /// Content goal for the request. The data-source specific goal is only
    /// used when there is data-source context to go with it.
    fn content_goal(
        &self,
        request: &GenerationRequest,
        context: &GenerationContext,
        interactive: bool,
    ) -> String {
        let kind: Option<DataSourceKind> = request
            .data_source
            .as_ref()
            .filter(|_| context.has_data_source_context())
            .map(|source| source.kind);
        self.config
            .resolve_base_prompt(kind, interactive, request.scope)
    }

    async fn build_context(&self, request: &GenerationRequest) -> GenerationContext {
        let catalog = self
            .context_provider
            .build_context(request.data_source.as_ref(), request.scope)
            .await;

        let styling = match &self.style_provider {
            Some(provider) => provider.auxiliary_style_config(request.scope).await,
            None => None,
        };

        GenerationContext::new(catalog, styling)
    }
}

fn finished(design: Option<String>, html: &str) -> GenerationResult {
    GenerationResult {
        design,
        html: strip_code_fences(html),
    }
}

fn soft_failure(stage: Stage, design: Option<String>, error: GenerationError) -> GenerationResult {
    tracing::error!(stage = %stage, error = %error, "Stage failed");
    GenerationResult {
        design,
        html: format!("{}: {}", stage.error_prefix(), error),
    }
}
