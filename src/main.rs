//! landgen CLI entrypoint
//! Parses command-line arguments and dispatches to the generator and account clients.
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use landgen::core::{ConfigResolver, DataSource, ModelKind, Settings, StoreScope};
use landgen::generation::{GenerationRequest, TwoStageGenerator};
use landgen::infrastructure::{FileStyleProvider, YamlCatalog};
use landgen::llm::{AccountClient, CompletionClient, HttpTransport, Transport};
use landgen::prompts::{
    EmbeddedTemplateStore, FileSystemTemplateStore, LayeredTemplateStore, PromptAssembler,
    TemplateStore,
};
use landgen::tools::{CATALOG_LOOKUP_TOOL, CatalogLookupTool, ToolRegistry};

const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Parser)]
#[command(name = "landgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Store scope to resolve settings and catalog data for
    #[arg(long, global = true, default_value_t = 1)]
    store: u32,
    /// Directory whose prompt templates override the built-in ones
    #[arg(long, global = true)]
    prompts_dir: Option<PathBuf>,
    /// Catalog file (YAML) with store, product and category data
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct PageArgs {
    /// Custom instructions for the model
    #[arg(long, default_value = "")]
    prompt: String,
    /// Catalog entity the page is about, e.g. product:42 or category:7
    #[arg(long)]
    source: Option<DataSource>,
    /// Reference image URL attached to the final instruction
    #[arg(long)]
    image: Option<String>,
    /// Load dynamic data through the storefront GraphQL API
    #[arg(long)]
    interactive: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Write a technical design and render it to HTML
    Generate {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Improve existing HTML, or re-render it from a stored design plan
    Improve {
        #[command(flatten)]
        page: PageArgs,
        /// File holding the design plan from an earlier generation
        #[arg(long)]
        design_file: Option<PathBuf>,
        /// File holding the current HTML
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// Show credit and rate-limit state of the API key
    Account,
    /// Show details of a model (defaults to the configured model)
    Model {
        /// Model id, e.g. deepseek/deepseek-r1:free
        id: Option<String>,
        /// Which configured model to use when no id is given
        #[arg(long, default_value = "rendering")]
        kind: ModelKind,
    },
    /// List the registered tools
    Tools,
}

/// Shared services built from the global options
struct App {
    settings: Arc<Settings>,
    config: ConfigResolver,
    config_dir: Option<PathBuf>,
    scope: StoreScope,
    transport: Arc<dyn Transport>,
    registry: Arc<ToolRegistry>,
    catalog: Arc<YamlCatalog>,
    templates: Arc<dyn TemplateStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = App::build(&cli).await?;

    match cli.command {
        Commands::Generate { page } => {
            let request = page.into_request(
                |prompt, scope| GenerationRequest::generate(prompt, scope),
                app.scope,
            );
            run_generation(&app, request).await?
        }
        Commands::Improve {
            page,
            design_file,
            content_file,
        } => {
            let mut request = page.into_request(
                |prompt, scope| GenerationRequest::improve(prompt, scope),
                app.scope,
            );
            if let Some(path) = design_file {
                request = request.with_design_plan(read_input(&path).await?);
            }
            if let Some(path) = content_file {
                request = request.with_current_content(read_input(&path).await?);
            }
            run_generation(&app, request).await?
        }
        Commands::Account => {
            let client = AccountClient::new(app.transport.clone(), app.config.clone());
            let status = client
                .account_status(app.scope)
                .await
                .context("Failed to fetch account status")?;
            print_json(&status)?;
        }
        Commands::Model { id, kind } => {
            let id = id.unwrap_or_else(|| app.config.resolve_model(kind, app.scope));
            let client = AccountClient::new(app.transport.clone(), app.config.clone());
            match client
                .model_details(&id, app.scope)
                .await
                .context("Failed to fetch model list")?
            {
                Some(details) => print_json(&details)?,
                None => bail!("Model '{id}' is not listed by the provider"),
            }
        }
        Commands::Tools => {
            for id in app.registry.list_identifiers() {
                let definition = app.registry.definition(&id)?;
                println!("{id}\t{}", definition.description);
            }
        }
    }
    Ok(())
}

impl App {
    async fn build(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli.config.clone().or_else(default_config_path);
        let settings = match &config_path {
            Some(path) if path.exists() => Settings::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            Some(path) if cli.config.is_some() => {
                bail!("Settings file {} does not exist", path.display())
            }
            _ => {
                info!("No settings file found, using defaults");
                Settings::default()
            }
        };
        let settings = Arc::new(settings.with_api_key_fallback(std::env::var(API_KEY_ENV).ok()));
        let config = ConfigResolver::new(settings.clone());

        let catalog = match &cli.catalog {
            Some(path) => YamlCatalog::load(path)
                .await
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
            None => YamlCatalog::default(),
        };
        let catalog = Arc::new(catalog);

        let registry = ToolRegistry::builder()
            .register(
                CATALOG_LOOKUP_TOOL,
                Arc::new(CatalogLookupTool::new(catalog.clone())),
            )?
            .build();

        let embedded: Arc<dyn TemplateStore> = Arc::new(EmbeddedTemplateStore::new());
        let templates: Arc<dyn TemplateStore> = match &cli.prompts_dir {
            Some(dir) => Arc::new(LayeredTemplateStore::new(
                Arc::new(FileSystemTemplateStore::new(dir)),
                embedded,
            )),
            None => embedded,
        };

        let transport = HttpTransport::new(settings.api_base())
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config_dir: config_path
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf),
            settings,
            config,
            scope: StoreScope(cli.store),
            transport: Arc::new(transport),
            registry: Arc::new(registry),
            catalog,
            templates,
        })
    }

    fn generator(&self) -> TwoStageGenerator {
        let completion = CompletionClient::new(
            self.transport.clone(),
            self.config.clone(),
            self.registry.clone(),
        );
        let mut style = FileStyleProvider::new(self.config.clone());
        if let Some(dir) = &self.config_dir {
            style = style.with_base_dir(dir);
        }

        TwoStageGenerator::new(
            Arc::new(completion),
            PromptAssembler::new(self.templates.clone()),
            self.catalog.clone(),
            self.config.clone(),
        )
        .with_style_provider(Arc::new(style))
        .with_tools(self.settings.tools.clone())
    }
}

impl PageArgs {
    fn into_request(
        self,
        new: fn(String, StoreScope) -> GenerationRequest,
        scope: StoreScope,
    ) -> GenerationRequest {
        let mut request = new(self.prompt, scope).interactive(self.interactive);
        if let Some(source) = self.source {
            request = request.with_data_source(source);
        }
        if let Some(url) = self.image {
            request = request.with_reference_image(url);
        }
        request
    }
}

async fn run_generation(app: &App, request: GenerationRequest) -> anyhow::Result<()> {
    let result = app
        .generator()
        .generate(&request)
        .await
        .context("Generation failed")?;
    print_json(&result)
}

async fn read_input(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("landgen").join("config.toml"))
}
